use dioxus::prelude::*;
use futures_util::StreamExt;

use vigor_domain::{self as domain, WorkoutService};

use crate::{
    Route,
    component::element::{CenteredBlock, FloatingActionButton, LoadingPage},
    use_app, use_session_guard,
};

#[component]
pub fn Home() -> Element {
    use_session_guard();
    let app = use_app();
    let navigator = use_navigator();

    let mut workouts = use_signal(|| None::<Vec<domain::Workout>>);
    use_coroutine(move |_: UnboundedReceiver<()>| async move {
        let mut stream = app.domain.read().watch_workouts();
        while let Some(snapshot) = stream.next().await {
            workouts.set(Some(snapshot));
        }
    });

    match &*workouts.read() {
        Some(current) => rsx! {
            if current.is_empty() {
                CenteredBlock {
                    "No workouts yet. Create your first one!"
                }
            }
            div {
                class: "grid is-col-min-12 mx-3 my-3",
                for workout in current {
                    div {
                        class: "cell",
                        WorkoutTile { workout: workout.clone() }
                    }
                }
            }
            FloatingActionButton {
                icon: "plus".to_string(),
                onclick: move |_| { navigator.push(Route::WorkoutNew {}); },
            }
        },
        None => rsx! { LoadingPage {} },
    }
}

#[component]
fn WorkoutTile(workout: domain::Workout) -> Element {
    let name = workout
        .name
        .as_ref()
        .map_or_else(|| "Unnamed workout".to_string(), ToString::to_string);
    let last_accessed = workout.last_accessed.map_or_else(
        || "Never accessed".to_string(),
        |accessed| format!("Last accessed: {}", accessed.date_naive()),
    );

    rsx! {
        div {
            class: "box px-4 py-3",
            div {
                class: "is-flex is-justify-content-space-between",
                Link {
                    class: "title is-size-5 has-text-link",
                    to: Route::Workout { id: workout.id.clone() },
                    "{name}"
                }
            }
            p {
                class: "is-size-7 has-text-grey",
                "{last_accessed}"
            }
        }
    }
}
