#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]

use std::sync::{Arc, Mutex};

use dioxus::prelude::*;
use log::error;

use vigor_domain::{self as domain, SessionService};
use vigor_storage as storage;
use vigor_web_app::{self as web_app, SettingsService};

use component::{
    element::{Color, Dialog},
    navbar::Navbar,
};
use page::{
    home::Home, login::Login, not_found::NotFound, root::Root, workout::Workout,
    workout_new::WorkoutNew,
};

mod component;
mod page;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Navbar)]
    #[route("/")]
    Root {},
    #[route("/login")]
    Login {},
    #[route("/home")]
    Home {},
    #[route("/workouts/new")]
    WorkoutNew {},
    #[route("/workout#:id")]
    Workout { id: domain::WorkoutID },
    #[route("/:..route")]
    NotFound { route: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

type DomainService = domain::Service<storage::realtime::RealtimeDB>;
type WebAppService = web_app::Service<storage::local_storage::LocalStorage>;

/// Application context constructed once at startup and injected into every
/// page, instead of reaching for module-level backend handles.
#[derive(Clone, Copy)]
pub(crate) struct AppContext {
    pub domain: Signal<DomainService>,
    pub web_app: Signal<WebAppService>,
    pub notifications: Signal<Vec<String>>,
}

pub(crate) fn use_app() -> AppContext {
    use_context()
}

/// Redirects to the login page when no session exists.
pub(crate) fn use_session_guard() -> Resource<Result<domain::User, domain::ReadError>> {
    let app = use_app();
    let session = use_resource(move || async move { app.domain.read().get_session().await });
    if let Some(Err(_)) = *session.read() {
        navigator().push(Route::Login {});
    }
    session
}

fn main() {
    init_logging();
    dioxus::launch(App);
}

fn init_logging() {
    let _ = web_app::log::init(Arc::new(Mutex::new(storage::local_storage::LocalStorage)));
}

#[component]
fn App() -> Element {
    std::panic::set_hook(Box::new(|info| {
        error!("{info}");
    }));

    let app = use_context_provider(|| AppContext {
        domain: Signal::new(domain::Service::new(storage::realtime::RealtimeDB::new(
            storage::Config::from_build_env(),
        ))),
        web_app: Signal::new(web_app::Service::new(
            storage::local_storage::LocalStorage,
        )),
        notifications: Signal::new(Vec::new()),
    });

    let settings = use_resource(move || async move { app.web_app.read().get_settings().await });
    use_effect(move || {
        if let Some(Ok(settings)) = settings.read().as_ref() {
            apply_theme(settings.current_theme());
        }
    });

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        div {
            class: "container is-max-desktop py-4",
            Router::<Route> {},
            Notification {}
        }
    }
}

fn apply_theme(theme: web_app::Theme) {
    if let Some(element) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.document_element())
    {
        let _ = element.set_attribute(
            "data-theme",
            match theme {
                web_app::Theme::Dark => "dark",
                web_app::Theme::System | web_app::Theme::Light => "light",
            },
        );
    }
}

#[component]
fn Notification() -> Element {
    let app = use_app();
    let notification = app.notifications.read().last().cloned();

    rsx! {
        if let Some(message) = notification {
            Dialog {
                color: Color::Danger,
                title: rsx! { "Error" },
                close_event: move |_| {
                    let mut notifications = app.notifications;
                    let _ = notifications.write().pop();
                },
                div {
                    class: "block",
                    "{message}"
                }
                div {
                    class: "field is-grouped is-grouped-centered",
                    div {
                        class: "control",
                        button {
                            class: "button is-danger",
                            onclick: move |_| {
                                let mut notifications = app.notifications;
                                let _ = notifications.write().pop();
                            },
                            "Close"
                        }
                    }
                }
            }
        }
    }
}
