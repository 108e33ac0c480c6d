use dioxus::prelude::*;

use vigor_domain::SessionService;
use vigor_web_app::{self as web_app, SettingsService};

use crate::{
    Route,
    component::element::{Color, Dialog, ErrorMessage, Icon, Loading},
    use_app,
};

#[component]
pub fn Navbar() -> Element {
    let app = use_app();
    let mut menu_visible = use_signal(|| false);
    let mut settings_visible = use_signal(|| false);
    let mut session = use_resource(move || async move { app.domain.read().get_session().await });
    let settings = use_resource(move || async move { app.web_app.read().get_settings().await });
    let navigator = use_navigator();

    let user = match *session.read() {
        Some(Ok(ref user)) => Some(user.clone()),
        Some(Err(_)) | None => None,
    };
    let page_title = match use_route::<Route>() {
        Route::Root {} | Route::Login {} | Route::Home {} => String::new(),
        Route::WorkoutNew {} => "New workout".to_string(),
        Route::Workout { .. } => "Workout".to_string(),
        Route::NotFound { .. } => String::new(),
    };

    rsx! {
        nav {
            class: "navbar is-fixed-top is-primary has-shadow has-text-weight-bold",
            div {
                class: "container",
                div {
                    class: "navbar-brand is-flex-grow-1",
                    Link {
                        class: "navbar-item is-size-5",
                        to: Route::Home {},
                        "Vigor"
                    }
                    div { class: "navbar-item is-size-5", "{page_title}" }
                    div { class: "mx-auto" }
                    a {
                        aria_expanded: menu_visible(),
                        aria_label: "menu",
                        class: "navbar-burger ml-0",
                        class: if menu_visible() { "is-active" },
                        role: "button",
                        onclick: move |_| { *menu_visible.write() = !menu_visible() },
                        span { aria_hidden: "true" }
                        span { aria_hidden: "true" }
                        span { aria_hidden: "true" }
                        span { aria_hidden: "true" }
                    }
                }
                div {
                    class: "navbar-menu is-flex-grow-0",
                    class: if menu_visible() { "is-active" },
                    div {
                        class: "navbar-end",
                        a {
                            class: "navbar-item",
                            onclick: move |_| {
                                *settings_visible.write() = true;
                                *menu_visible.write() = false;
                            },
                            Icon { name: "gear", px: 5 }
                            "Settings"
                        }
                        if let Some(user) = user {
                            a {
                                class: "navbar-item",
                                onclick: move |_| {
                                    async move {
                                        let result = app.domain.read().delete_session().await;
                                        match result {
                                            Ok(()) => {
                                                session.restart();
                                                navigator.push(Route::Login {});
                                            }
                                            Err(err) => {
                                                let mut notifications = app.notifications;
                                                notifications
                                                    .write()
                                                    .push(format!("Failed to log out: {err}"));
                                            }
                                        }
                                        *menu_visible.write() = false;
                                    }
                                },
                                Icon { name: "sign-out-alt", px: 5 }
                                "Log out ({user.name})"
                            }
                        }
                    }
                }
            }
        }

        if *settings_visible.read() {
            Settings { settings, settings_visible }
        }

        Outlet::<Route> {}
    }
}

#[component]
fn Settings(
    settings: Resource<Result<web_app::Settings, String>>,
    settings_visible: Signal<bool>,
) -> Element {
    let app = use_app();

    match settings.read().clone() {
        Some(Ok(current)) => rsx! {
            Dialog {
                color: Color::Primary,
                title: rsx! { "Settings" },
                close_event: {
                    let mut settings = settings;
                    move |_| {
                        let mut settings_visible = settings_visible;
                        *settings_visible.write() = false;
                        settings.restart();
                    }
                },
                p {
                    h1 { class: "subtitle", "Beep volume" }
                    input {
                        class: "slider is-fullwidth is-info",
                        max: "100",
                        min: "0",
                        r#type: "range",
                        step: "10",
                        value: current.beep_volume,
                        oninput: move |event| {
                            let mut current = current;
                            let mut settings = settings;
                            current.beep_volume = event.value().parse().unwrap_or(100);
                            async move {
                                let _ = app.web_app.read().set_settings(current).await;
                                settings.restart();
                            }
                        },
                    }
                }
                p {
                    class: "mb-5",
                    h1 { class: "subtitle", "Theme" }
                    div {
                        class: "field has-addons",
                        for (theme, icon, label) in [
                            (web_app::Theme::Light, "sun", "Light"),
                            (web_app::Theme::Dark, "moon", "Dark"),
                            (web_app::Theme::System, "desktop", "System"),
                        ] {
                            p {
                                class: "control",
                                button {
                                    class: "button",
                                    class: if current.theme == theme { "is-link" },
                                    onclick: move |_| {
                                        let mut current = current;
                                        let mut settings = settings;
                                        current.theme = theme;
                                        async move {
                                            let _ = app.web_app.read().set_settings(current).await;
                                            settings.restart();
                                        }
                                    },
                                    Icon { name: icon, is_small: true }
                                    span { "{label}" }
                                }
                            }
                        }
                    }
                }
            }
        },
        Some(Err(err)) => rsx! {
            ErrorMessage { message: "Failed to get settings: {err}" }
        },
        None => Loading(),
    }
}
