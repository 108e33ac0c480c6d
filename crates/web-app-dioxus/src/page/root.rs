use dioxus::prelude::*;

use crate::{Route, component::element::LoadingPage, use_app};

use vigor_domain::SessionService;

#[component]
pub fn Root() -> Element {
    let app = use_app();
    let session = use_resource(move || async move { app.domain.read().get_session().await });
    let navigator = use_navigator();

    match *session.read() {
        Some(Ok(_)) => {
            navigator.push(Route::Home {});
            rsx! {}
        }
        Some(Err(_)) => {
            navigator.push(Route::Login {});
            rsx! {}
        }
        None => rsx! {
            LoadingPage {}
        },
    }
}
