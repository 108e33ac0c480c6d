use dioxus::prelude::*;
use strum::Display;

#[allow(dead_code)]
#[derive(Display, Clone, Copy, PartialEq)]
pub enum Color {
    #[strum(to_string = "text")]
    Text,
    #[strum(to_string = "link")]
    Link,
    #[strum(to_string = "primary")]
    Primary,
    #[strum(to_string = "info")]
    Info,
    #[strum(to_string = "success")]
    Success,
    #[strum(to_string = "warning")]
    Warning,
    #[strum(to_string = "danger")]
    Danger,
    #[strum(to_string = "dark")]
    Dark,
}

#[component]
pub fn Block(children: Element, class: Option<String>) -> Element {
    rsx! {
        div {
            class: "block",
            class: if let Some(class) = &class { "{class}" },
            {children}
        }
    }
}

#[component]
pub fn CenteredBlock(children: Element) -> Element {
    rsx! {
        div { class: "block has-text-centered", {children} }
    }
}

#[component]
pub fn WhiteBox(children: Element) -> Element {
    rsx! {
        div { class: "box", {children} }
    }
}

#[component]
pub fn Loading() -> Element {
    rsx! {
        div {
            class: "is-size-4 has-text-centered",
            i { class: "fas fa-spinner fa-pulse" }
        }
    }
}

#[component]
pub fn LoadingPage() -> Element {
    rsx! {
        div {
            class: "is-size-2 has-text-centered m-6",
            i { class: "fas fa-spinner fa-pulse" }
        }
    }
}

#[component]
pub fn Message(children: Element, color: Color) -> Element {
    rsx! {
        div {
            class: "message my-1 is-{color}",
            div {
                class: "message-body p-2",
                {children}
            }
        }
    }
}

#[component]
pub fn ErrorMessage(message: String) -> Element {
    rsx! {
        div {
            class: "message is-danger mx-2",
            div {
                class: "message-body has-text-dark",
                div {
                    class: "title has-text-danger is-size-4",
                    "{message}"
                }
            }
        }
    }
}

#[component]
pub fn NoConnection() -> Element {
    rsx! {
        div {
            class: "block has-text-centered has-text-grey-light mb-6",
            IconText { icon: "plug-circle-xmark", text: "No connection to server" }
        }
    }
}

#[component]
pub fn Icon(
    name: String,
    is_small: Option<bool>,
    px: Option<u8>,
    onclick: Option<EventHandler<MouseEvent>>,
) -> Element {
    rsx! {
        span {
            class: "icon",
            class: if is_small.unwrap_or_default() { "is-small" },
            class: if let Some(px) = px { "px-{px}" },
            onclick: move |evt| {
                if let Some(event_handler) = onclick {
                    event_handler.call(evt);
                }
            },
            i { class: "fas fa-{name}" }
        }
    }
}

#[component]
pub fn IconText(
    icon: String,
    text: String,
    color: Option<Color>,
    onclick: Option<EventHandler<MouseEvent>>,
) -> Element {
    rsx! {
        span {
            class: "icon-text",
            class: if let Some(color) = color { "has-text-{color}" },
            onclick: move |evt| {
                if let Some(event_handler) = onclick {
                    event_handler.call(evt);
                }
            },
            Icon { name: icon }
            span { {text} }
        }
    }
}

#[component]
pub fn Title(title: String, class: Option<String>) -> Element {
    rsx! {
        CenteredBlock {
            div {
                class: "container",
                h1 {
                    class: "title is-5",
                    class: if let Some(c) = &class { "{c}" },
                    "{title}"
                }
            }
        }
    }
}

#[component]
pub fn Table(head: Option<Vec<Element>>, body: Vec<Vec<Element>>) -> Element {
    rsx! {
        div {
            class: "table-container mt-4",
            table {
                class: "table is-fullwidth is-hoverable",
                if let Some(head) = head {
                    thead {
                        tr {
                            for element in head {
                                th {
                                    {element}
                                }
                            }
                        }
                    }
                }
                tbody {
                    for row in body {
                        tr {
                            for element in row {
                                td {
                                    {element}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn FloatingActionButton(icon: String, onclick: EventHandler<MouseEvent>) -> Element {
    rsx! {
        button {
            class: "button is-fab is-medium is-link",
            onclick,
            Icon { name: icon }
        }
    }
}

#[component]
pub fn Dialog(
    children: Element,
    title: Option<Element>,
    close_event: EventHandler<MouseEvent>,
    color: Option<Color>,
) -> Element {
    let color = color.unwrap_or(Color::Primary);
    rsx! {
        div {
            class: "modal is-active",
            div {
                class: "modal-background",
                onclick: close_event
            }
            div {
                class: "modal-content",
                div {
                    class: "message is-{color} mx-2",
                    div {
                        class: "message-body has-text-text-bold has-background-scheme-main",
                        if let Some(title) = title {
                            div {
                                class: "title has-text-{color}",
                                {title}
                            }
                        }
                        {children}
                    }
                }
            }
            button {
                aria_label: "close",
                class: "modal-close",
                onclick: close_event,
            }
        }
    }
}

#[component]
pub fn DeleteConfirmationDialog(
    element_type: String,
    element_name: Element,
    delete_event: EventHandler<MouseEvent>,
    cancel_event: EventHandler<MouseEvent>,
    is_loading: bool,
) -> Element {
    rsx! {
        Dialog {
            title: rsx! {
                span {
                    "Delete the {element_type} "
                    {element_name}
                    "?"
                }
            },
            close_event: move |evt| cancel_event.call(evt),
            color: Color::Danger,
            div {
                class: "block",
                "The {element_type} and all elements that depend on it will be permanently deleted."
            }
            div {
                class: "field is-grouped is-grouped-centered",
                div {
                    class: "control",
                    onclick: move |evt| cancel_event.call(evt),
                    button {
                        class: "button is-light is-soft",
                        "No"
                    }
                }
                div {
                    class: "control",
                    onclick: move |evt| delete_event.call(evt),
                    button {
                        class: "button is-danger",
                        class: if is_loading { "is-loading" },
                        "Yes, delete {element_type}"
                    }
                }
            }
        }
    }
}
