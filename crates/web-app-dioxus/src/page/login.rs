use dioxus::prelude::*;

use vigor_domain::{self as domain, SessionService};

use crate::{
    Route,
    component::{
        element::{CenteredBlock, Title, WhiteBox},
        form::InputField,
    },
    use_app,
};

#[component]
pub fn Login() -> Element {
    let app = use_app();
    let navigator = use_navigator();
    let session = use_resource(move || async move { app.domain.read().get_session().await });
    if let Some(Ok(_)) = *session.read() {
        navigator.push(Route::Home {});
    }
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut is_loading = use_signal(|| false);

    let sign_in = move |_| async move {
        *is_loading.write() = true;
        error.set(None);
        let credentials = domain::Credentials {
            email: email().trim().to_string(),
            password: password(),
        };
        match app.domain.read().request_session(credentials).await {
            Ok(_) => {
                navigator.push(Route::Home {});
            }
            Err(err) => {
                error.set(Some(format!("{err}")));
            }
        }
        *is_loading.write() = false;
    };

    rsx! {
        div {
            class: "container px-3",
            Title { title: "Sign in" }
            WhiteBox {
                InputField {
                    label: "Email".to_string(),
                    r#type: "email".to_string(),
                    value: email(),
                    has_changed: false,
                    oninput: move |event: FormEvent| { email.set(event.value()); },
                }
                InputField {
                    label: "Password".to_string(),
                    r#type: "password".to_string(),
                    value: password(),
                    error: if let Some(err) = error() { err },
                    has_changed: false,
                    oninput: move |event: FormEvent| { password.set(event.value()); },
                }
                CenteredBlock {
                    button {
                        class: "button is-primary",
                        class: if is_loading() { "is-loading" },
                        disabled: email().trim().is_empty() || password().is_empty(),
                        onclick: sign_in,
                        "Sign in"
                    }
                }
            }
        }
    }
}
