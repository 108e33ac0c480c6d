use dioxus::prelude::*;

#[component]
pub fn Field(children: Element, label: String) -> Element {
    rsx! {
        div {
            class: "field",
            label { class: "label", "{label}" }
            div {
                class: "control",
                {children}
            }
        }
    }
}

#[component]
pub fn InputField(
    label: Option<String>,
    help: Option<String>,
    left_icon: Option<Element>,
    right_icon: Option<Element>,
    r#type: Option<String>,
    inputmode: Option<String>,
    size: Option<usize>,
    min: Option<String>,
    max: Option<String>,
    step: Option<usize>,
    value: String,
    error: Option<String>,
    has_changed: bool,
    has_text_right: Option<bool>,
    is_disabled: Option<bool>,
    oninput: EventHandler<FormEvent>,
) -> Element {
    let error = error.and_then(|error| if error.is_empty() { None } else { Some(error) });
    let has_error = error.is_some();
    rsx! {
        div {
            class: "field",
            if let Some(label) = label { label { class: "label", "{label}" } }
            div {
                class: "control",
                class: if left_icon.is_some() { "has-icons-left" },
                class: if right_icon.is_some() { "has-icons-right" },
                input {
                    class: "input",
                    class: if has_error { "is-danger" },
                    class: if has_changed { "is-info" },
                    class: if has_text_right.unwrap_or_default() { "has-text-right" },
                    disabled: if let Some(is_disabled) = is_disabled { is_disabled },
                    r#type: if let Some(r#type) = r#type { r#type } else { "text" },
                    inputmode: if let Some(inputmode) = inputmode { inputmode },
                    size: if let Some(size) = size { size },
                    min: if let Some(min) = min { min },
                    max: if let Some(max) = max { max },
                    step: if let Some(step) = step { step },
                    value: "{value}",
                    oninput: move |evt| oninput.call(evt),
                }
                if let Some(ref left_icon) = left_icon {
                    span {
                        class: "icon is-left",
                        {left_icon}
                    }
                }
                if let Some(ref right_icon) = right_icon {
                    span {
                        class: "icon is-right",
                        {right_icon}
                    }
                }
            }
            if let Some(ref error) = error {
                p { class: "help is-danger", "{error}" }
            } else if let Some(ref help) = help {
                p { class: "help", "{help}" }
            }
        }
    }
}

#[component]
pub fn SelectField(
    label: String,
    options: Vec<Element>,
    has_changed: bool,
    onchange: EventHandler<FormEvent>,
) -> Element {
    rsx! {
        div {
            class: "field",
            label { class: "label", "{label}" }
            div {
                class: "control",
                div {
                    class: "select is-fullwidth",
                    select {
                        class: if has_changed { "has-text-info" },
                        onchange,
                        for option in options {
                            {option}
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn SelectOption(text: String, value: String, selected: bool) -> Element {
    rsx! {
        option {
            selected,
            value,
            "{text}"
        }
    }
}

/// Tri-state input value: the raw input string, the validation outcome and
/// the original value the input started from. An empty `validated` error
/// marks a field that has not been filled in yet.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue<T> {
    pub input: String,
    pub validated: Result<T, String>,
    pub orig: String,
}

impl<T> Default for FieldValue<T> {
    fn default() -> Self {
        Self {
            input: String::new(),
            validated: Err(String::new()),
            orig: String::new(),
        }
    }
}

impl<T: ToString> FieldValue<T> {
    pub fn new(value: T) -> Self {
        let value_string = value.to_string();
        Self {
            input: value_string.clone(),
            validated: Ok(value),
            orig: value_string,
        }
    }
}

pub trait FieldValueState {
    fn valid(&self) -> bool;
    fn changed(&self) -> bool;
}

impl<T> FieldValueState for FieldValue<T> {
    fn valid(&self) -> bool {
        self.validated.is_ok()
    }

    fn changed(&self) -> bool {
        self.input.trim() != self.orig.trim()
    }
}
