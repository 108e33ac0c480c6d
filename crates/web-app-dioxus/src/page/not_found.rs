use dioxus::prelude::*;

use crate::{Route, component::element::ErrorMessage};

#[component]
pub fn NotFound(route: Vec<String>) -> Element {
    rsx! {
        ErrorMessage { message: "Page not found" }
        div {
            class: "block has-text-centered",
            Link {
                class: "button is-link",
                to: Route::Home {},
                "Back home"
            }
        }
    }
}
