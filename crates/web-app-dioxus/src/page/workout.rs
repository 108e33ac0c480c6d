use std::rc::Rc;

use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use futures_util::StreamExt;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use vigor_domain::{self as domain, ExerciseService, WorkoutLogService, WorkoutService};
use vigor_web_app::SettingsService;

use crate::{
    Route,
    component::{
        element::{
            Block, CenteredBlock, Color, DeleteConfirmationDialog, ErrorMessage, LoadingPage,
            Message, NoConnection, Table, Title, WhiteBox,
        },
        form::{Field, FieldValue, FieldValueState, InputField},
        timer::{RestCountdown, RestTimer},
    },
    use_app, use_session_guard,
};

/// Number of past logs fetched for the recent-history view.
const RECENT_LOGS: u32 = 3;

/// Remaining rest below which no mini countdown is shown after logging
/// early.
const MINI_COUNTDOWN_THRESHOLD: i64 = 5;

#[component]
pub fn Workout(id: domain::WorkoutID) -> Element {
    use_session_guard();
    let app = use_app();
    let navigator = use_navigator();

    // The workout definition is read once; the running session operates on
    // that snapshot. Exercises and logs stay subscribed and are replaced
    // wholesale on every remote change.
    let resource_id = id.clone();
    let workout = use_resource(move || {
        let id = resource_id.clone();
        async move {
            let result = app.domain.read().get_workout(id.clone()).await;
            if let Ok(Some(_)) = result {
                let _ = app.domain.read().touch_workout(id, Utc::now()).await;
            }
            result
        }
    });
    let workout_value = use_memo(move || {
        workout
            .read()
            .as_ref()
            .and_then(|result| result.as_ref().ok())
            .and_then(Clone::clone)
    });

    let mut exercises = use_signal(|| None::<Vec<domain::Exercise>>);
    use_coroutine(move |_: UnboundedReceiver<()>| async move {
        let mut stream = app.domain.read().watch_exercises();
        while let Some(snapshot) = stream.next().await {
            exercises.set(Some(snapshot));
        }
    });

    let mut logs = use_signal(|| None::<Vec<domain::WorkoutLog>>);
    let logs_id = id.clone();
    use_coroutine(move |_: UnboundedReceiver<()>| {
        let id = logs_id.clone();
        async move {
            let mut stream = app.domain.read().watch_workout_logs(id, RECENT_LOGS);
            while let Some(snapshot) = stream.next().await {
                logs.set(Some(snapshot));
            }
        }
    });

    let mut execution = use_signal(|| None::<domain::Execution>);
    use_effect(move || {
        if execution.read().is_none() {
            if let Some(workout) = workout_value() {
                execution.set(Some(domain::Execution::new(&workout)));
            }
        }
    });
    let current_set_id = use_memo(move || {
        execution
            .read()
            .as_ref()
            .and_then(|execution| execution.current().cloned())
    });

    let mut log_id = use_signal(|| None::<domain::WorkoutLogID>);
    let mut start = use_signal(|| None::<DateTime<Utc>>);
    let mut end = use_signal(|| None::<DateTime<Utc>>);
    let mut timer = use_signal(RestTimer::new);
    let mut show_mini = use_signal(|| false);
    let logging_subsets = use_signal(Vec::<SubsetForm>::new);
    let mut logging_notes = use_signal(String::new);
    let mut delete_requested = use_signal(|| false);
    let mut is_deleting = use_signal(|| false);

    let settings = use_resource(move || async move { app.web_app.read().get_settings().await });
    use_effect(move || {
        if let Some(Ok(settings)) = settings.read().as_ref() {
            timer.write().set_beep_volume(settings.beep_volume);
        }
    });

    // best-effort warning before navigating away from a running session
    let unload_guard = use_hook(|| {
        Rc::new(Closure::<dyn FnMut(web_sys::BeforeUnloadEvent)>::new(
            |event: web_sys::BeforeUnloadEvent| {
                event.prevent_default();
                event.set_return_value("Workout in progress. Are you sure you want to leave?");
            },
        ))
    });
    {
        let unload_guard = unload_guard.clone();
        use_effect(move || {
            let active = matches!(
                execution.read().as_ref().map(domain::Execution::phase),
                Some(domain::Phase::Running | domain::Phase::Resting)
            );
            if let Some(window) = web_sys::window() {
                if active {
                    window
                        .set_onbeforeunload(Some(unload_guard.as_ref().as_ref().unchecked_ref()));
                } else {
                    window.set_onbeforeunload(None);
                }
            }
        });
    }
    use_drop(move || {
        if let Some(window) = web_sys::window() {
            window.set_onbeforeunload(None);
        }
    });

    let mut finish_if_complete = move || {
        if matches!(
            execution.read().as_ref().map(domain::Execution::phase),
            Some(domain::Phase::Finished)
        ) {
            let now = Utc::now();
            end.set(Some(now));
            show_mini.set(false);
            timer.write().clear();
            if let Some(log) = log_id() {
                spawn(async move {
                    let _ = app.domain.read().finish_workout_log(log, now).await;
                });
            }
        }
    };

    let start_id = id.clone();
    let on_start = EventHandler::new(move |_: MouseEvent| {
        if let Some(execution) = execution.write().as_mut() {
            execution.start();
        }
        let now = Utc::now();
        start.set(Some(now));
        let workout_id = start_id.clone();
        spawn(async move {
            if let Ok(created) = app.domain.read().create_workout_log(workout_id, now).await {
                log_id.set(Some(created));
            }
        });
    });

    let on_done = EventHandler::new(move |_: MouseEvent| {
        let Some(workout) = workout_value() else {
            return;
        };
        let Some(set_id) = current_set_id() else {
            return;
        };
        let Some(set) = workout.sets.get(&set_id) else {
            return;
        };
        let Some(rest_interval) = set.rest_interval else {
            return;
        };
        if let Some(execution) = execution.write().as_mut() {
            execution.mark_done();
        }
        timer
            .write()
            .start(Utc::now() + chrono::Duration::seconds(i64::from(rest_interval.as_secs())));
        show_mini.set(false);
        let mut logging_subsets = logging_subsets;
        logging_subsets.set(vec![SubsetForm::with_target(set.target_reps)]);
        logging_notes.set(String::new());
    });

    let on_skip = EventHandler::new(move |_: MouseEvent| {
        let Some(set_id) = current_set_id() else {
            return;
        };
        if let Some(log) = log_id() {
            spawn(async move {
                let _ = app.domain.read().log_skipped_set(log, set_id).await;
            });
        }
        if let Some(execution) = execution.write().as_mut() {
            execution.skip();
        }
        finish_if_complete();
    });

    let on_snooze = EventHandler::new(move |_: MouseEvent| {
        if let Some(execution) = execution.write().as_mut() {
            execution.snooze();
        }
    });

    let on_submit = EventHandler::new(move |_: MouseEvent| {
        let Some(set_id) = current_set_id() else {
            return;
        };
        let subsets = logging_subsets
            .read()
            .iter()
            .map(SubsetForm::to_subset)
            .collect::<Vec<_>>();
        if subsets.is_empty() || !subsets.iter().all(domain::WorkoutSubset::is_filled) {
            return;
        }
        let notes = Some(logging_notes()).filter(|notes| !notes.trim().is_empty());
        if let Some(log) = log_id() {
            spawn(async move {
                let _ = app
                    .domain
                    .read()
                    .log_finished_set(log, set_id, notes, subsets)
                    .await;
            });
        }
        if let Some(execution) = execution.write().as_mut() {
            execution.submit();
        }
        show_mini.set(timer.read().is_set() && timer.read().seconds() > MINI_COUNTDOWN_THRESHOLD);
        if !show_mini() {
            timer.write().clear();
        }
        finish_if_complete();
    });

    let delete_id = id.clone();
    let on_delete_confirm = EventHandler::new(move |_: MouseEvent| {
        let workout_id = delete_id.clone();
        spawn(async move {
            *is_deleting.write() = true;
            match app.domain.read().delete_workout(workout_id).await {
                Ok(_) => {
                    navigator.push(Route::Home {});
                }
                Err(err) => {
                    let mut notifications = app.notifications;
                    notifications
                        .write()
                        .push(format!("Failed to delete workout: {err}"));
                }
            }
            *is_deleting.write() = false;
            delete_requested.set(false);
        });
    });

    match (
        workout.read().as_ref(),
        exercises.read().as_ref(),
        logs.read().as_ref(),
    ) {
        (Some(Ok(Some(workout))), Some(exercises), Some(logs)) => {
            let execution_guard = execution.read();
            let phase = execution_guard
                .as_ref()
                .map_or(domain::Phase::Staging, domain::Execution::phase);
            let can_snooze = execution_guard
                .as_ref()
                .is_some_and(domain::Execution::can_snooze);
            let name = workout
                .name
                .as_ref()
                .map_or_else(|| "Unnamed workout".to_string(), ToString::to_string);

            rsx! {
                {match phase {
                    domain::Phase::Staging => view_staging(
                        workout,
                        logs,
                        on_start,
                        EventHandler::new(move |_: MouseEvent| { delete_requested.set(true); }),
                    ),
                    domain::Phase::Running | domain::Phase::Resting => view_active(
                        workout,
                        exercises,
                        logs,
                        execution_guard.as_ref(),
                        timer,
                        show_mini(),
                        can_snooze,
                        logging_subsets,
                        logging_notes,
                        on_done,
                        on_skip,
                        on_snooze,
                        on_submit,
                    ),
                    domain::Phase::Finished => view_finished(start(), end()),
                }}
                if phase != domain::Phase::Finished {
                    {view_summary(workout, exercises, execution_guard.as_ref())}
                }
                if delete_requested() {
                    DeleteConfirmationDialog {
                        element_type: "workout".to_string(),
                        element_name: rsx! { "{name}" },
                        delete_event: on_delete_confirm,
                        cancel_event: move |_| { delete_requested.set(false); },
                        is_loading: is_deleting(),
                    }
                }
            }
        }
        (Some(Ok(None)), _, _) => rsx! {
            ErrorMessage { message: "This workout doesn't exist" }
        },
        (Some(Err(domain::ReadError::Storage(domain::StorageError::NoConnection))), _, _) => {
            rsx! { NoConnection {} }
        }
        (Some(Err(err)), _, _) => rsx! {
            ErrorMessage { message: "{err}" }
        },
        _ => rsx! { LoadingPage {} },
    }
}

fn view_staging(
    workout: &domain::Workout,
    logs: &[domain::WorkoutLog],
    on_start: EventHandler<MouseEvent>,
    on_delete_request: EventHandler<MouseEvent>,
) -> Element {
    let name = workout
        .name
        .as_ref()
        .map_or_else(|| "Unnamed workout".to_string(), ToString::to_string);
    let history_summary = logs.last().map_or_else(
        || "You've never done this workout before.".to_string(),
        |log| format!("You last did this workout on {}", log.start.date_naive()),
    );

    rsx! {
        Block {
            WhiteBox {
                Title { title: name }
                CenteredBlock { "{history_summary}" }
                div {
                    class: "field is-grouped is-grouped-centered",
                    div {
                        class: "control",
                        button {
                            class: "button is-primary",
                            disabled: !workout.is_runnable(),
                            onclick: on_start,
                            "Start workout"
                        }
                    }
                    div {
                        class: "control",
                        button {
                            class: "button is-danger",
                            onclick: on_delete_request,
                            "Delete workout"
                        }
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn view_active(
    workout: &domain::Workout,
    exercises: &[domain::Exercise],
    logs: &[domain::WorkoutLog],
    execution: Option<&domain::Execution>,
    timer: Signal<RestTimer>,
    show_mini: bool,
    can_snooze: bool,
    logging_subsets: Signal<Vec<SubsetForm>>,
    logging_notes: Signal<String>,
    on_done: EventHandler<MouseEvent>,
    on_skip: EventHandler<MouseEvent>,
    on_snooze: EventHandler<MouseEvent>,
    on_submit: EventHandler<MouseEvent>,
) -> Element {
    let (Some(execution), Some(set_id)) = (execution, execution.and_then(domain::Execution::current))
    else {
        return rsx! { LoadingPage {} };
    };
    let Some(set) = workout.sets.get(set_id) else {
        return rsx! { LoadingPage {} };
    };
    let exercise = set
        .exercise_id
        .as_ref()
        .and_then(|id| exercises.iter().find(|exercise| exercise.id == *id));
    let resting = execution.phase() == domain::Phase::Resting;
    let history = domain::set_history(logs, set_id);

    rsx! {
        if show_mini && !timer.read().is_complete() {
            Block {
                RestCountdown { timer, mini: true }
            }
        }
        Block {
            WhiteBox {
                Title {
                    title: exercise.map_or_else(
                        || "Unknown exercise".to_string(),
                        |exercise| exercise.name.to_string(),
                    ),
                }
                if resting {
                    {view_logging(timer, logging_subsets, logging_notes)}
                    {view_logging_actions(logging_subsets, on_submit)}
                } else {
                    {view_execution_info(set, exercise)}
                    {view_execution_actions(can_snooze, on_done, on_skip, on_snooze)}
                }
            }
        }
        if !history.is_empty() {
            {view_history(&history)}
        }
    }
}

fn view_execution_info(set: &domain::WorkoutSet, exercise: Option<&domain::Exercise>) -> Element {
    let target = set.target_reps.map(u32::from);
    rsx! {
        if let Some(target) = target {
            p {
                class: "is-size-5 has-text-centered",
                "Target: {target} rep"
                if target != 1 { "s" }
            }
        }
        if let Some(notes) = exercise.and_then(|exercise| exercise.notes.as_ref()) {
            p { class: "has-text-centered", "{notes}" }
        }
        if let Some(notes) = set.notes.as_ref() {
            p { class: "has-text-centered is-italic", "{notes}" }
        }
        if let Some(url) = exercise.and_then(|exercise| exercise.reference_url.as_ref()) {
            p {
                class: "has-text-centered",
                a {
                    href: "{url}",
                    target: "_blank",
                    "More info"
                }
            }
        }
    }
}

fn view_execution_actions(
    can_snooze: bool,
    on_done: EventHandler<MouseEvent>,
    on_skip: EventHandler<MouseEvent>,
    on_snooze: EventHandler<MouseEvent>,
) -> Element {
    rsx! {
        div {
            class: "field is-grouped is-grouped-centered",
            div {
                class: "control",
                button {
                    class: "button is-primary",
                    onclick: on_done,
                    "Done!"
                }
            }
            if can_snooze {
                div {
                    class: "control",
                    button {
                        class: "button is-warning",
                        onclick: on_snooze,
                        "Snooze"
                    }
                }
            }
            div {
                class: "control",
                button {
                    class: "button is-light",
                    onclick: on_skip,
                    "Skip"
                }
            }
        }
    }
}

fn view_logging(
    timer: Signal<RestTimer>,
    logging_subsets: Signal<Vec<SubsetForm>>,
    mut logging_notes: Signal<String>,
) -> Element {
    rsx! {
        Block {
            RestCountdown { timer }
        }
        for index in 0..logging_subsets.read().len() {
            {view_subset_row(index, &logging_subsets.read()[index], logging_subsets)}
        }
        Field {
            label: "Notes".to_string(),
            textarea {
                class: "textarea",
                value: "{logging_notes}",
                oninput: move |event: FormEvent| {
                    logging_notes.set(event.value());
                },
            }
        }
    }
}

fn view_subset_row(
    index: usize,
    subset: &SubsetForm,
    mut subsets: Signal<Vec<SubsetForm>>,
) -> Element {
    let is_last = index + 1 == subsets.read().len();
    let is_filled = subset.is_filled();

    rsx! {
        div {
            class: "columns is-mobile is-vcentered",
            div {
                class: "column",
                InputField {
                    label: "Reps".to_string(),
                    r#type: "number".to_string(),
                    min: "1".to_string(),
                    max: "999".to_string(),
                    step: 1,
                    value: subset.reps.input.clone(),
                    error: if let Err(err) = &subset.reps.validated { err.clone() },
                    has_changed: subset.reps.changed(),
                    oninput: move |event: FormEvent| {
                        let mut current = subsets.write();
                        let field = &mut current[index].reps;
                        field.input = event.value();
                        field.validated = domain::Reps::try_from(event.value().as_ref())
                            .map_err(|err| err.to_string());
                    },
                }
            }
            div {
                class: "column",
                InputField {
                    label: "Weight (lbs)".to_string(),
                    inputmode: "numeric".to_string(),
                    value: subset.weight.input.clone(),
                    error: if let Err(err) = &subset.weight.validated { err.clone() },
                    has_changed: subset.weight.changed(),
                    oninput: move |event: FormEvent| {
                        let mut current = subsets.write();
                        let field = &mut current[index].weight;
                        field.input = event.value();
                        field.validated = domain::Weight::try_from(event.value().as_ref())
                            .map_err(|err| err.to_string());
                    },
                }
            }
            div {
                class: "column is-narrow",
                if is_filled && is_last {
                    button {
                        class: "button is-primary is-small",
                        onclick: move |_| {
                            subsets.write().push(SubsetForm::default());
                        },
                        "Add"
                    }
                }
                if index > 0 {
                    button {
                        class: "button is-danger is-small ml-1",
                        onclick: move |_| {
                            subsets.write().remove(index);
                        },
                        "Remove"
                    }
                }
            }
        }
    }
}

fn view_logging_actions(
    logging_subsets: Signal<Vec<SubsetForm>>,
    on_submit: EventHandler<MouseEvent>,
) -> Element {
    let current = logging_subsets.read();
    let ready = !current.is_empty() && current.iter().all(SubsetForm::is_filled);

    rsx! {
        if ready {
            CenteredBlock {
                button {
                    class: "button is-primary",
                    onclick: on_submit,
                    "Proceed"
                }
            }
        } else {
            Message {
                color: Color::Info,
                "You must complete all the logging fields to continue."
            }
        }
    }
}

fn view_history(history: &[domain::SetHistoryEntry]) -> Element {
    rsx! {
        Block {
            WhiteBox {
                Title { title: "Recent history" }
                for entry in history {
                    p {
                        class: "subtitle is-6 mb-1 mt-3",
                        "{entry.start.date_naive()}"
                    }
                    match &entry.outcome {
                        domain::SetHistory::Skipped => rsx! {
                            p { class: "has-text-grey", "Skipped" }
                        },
                        domain::SetHistory::Completed(subsets) => rsx! {
                            Table {
                                head: vec![
                                    rsx! { "#" },
                                    rsx! { "Reps" },
                                    rsx! { "Weight (lbs)" },
                                ],
                                body: subsets
                                    .iter()
                                    .enumerate()
                                    .map(|(index, (reps, weight))| {
                                        let position = index + 1;
                                        vec![
                                            rsx! { "{position}" },
                                            rsx! { "{reps}" },
                                            rsx! { "{weight}" },
                                        ]
                                    })
                                    .collect::<Vec<_>>(),
                            }
                        },
                    }
                }
            }
        }
    }
}

fn view_summary(
    workout: &domain::Workout,
    exercises: &[domain::Exercise],
    execution: Option<&domain::Execution>,
) -> Element {
    let rows = workout
        .sets
        .iter()
        .filter_map(|(set_id, set)| {
            let exercise = set
                .exercise_id
                .as_ref()
                .and_then(|id| exercises.iter().find(|exercise| exercise.id == *id))?;
            let status = execution.map_or(domain::SetStatus::Fresh, |execution| {
                execution.status(set_id)
            });
            let is_current = execution.and_then(domain::Execution::current) == Some(set_id);
            let label = set.target_reps.map_or_else(
                || exercise.name.to_string(),
                |reps| format!("{} ✕ {reps}", exercise.name),
            );
            let status_class = match status {
                domain::SetStatus::Fresh => "is-link is-light",
                domain::SetStatus::Finished => "is-success",
                domain::SetStatus::Skipped => "is-dark",
                domain::SetStatus::Snoozed => "is-warning",
            };
            Some(rsx! {
                div {
                    class: "py-1",
                    class: if is_current { "has-text-weight-bold" },
                    span {
                        class: "tag {status_class}",
                        "{label}"
                    }
                }
            })
        })
        .collect::<Vec<_>>();

    if rows.is_empty() {
        return rsx! {};
    }

    rsx! {
        Block {
            WhiteBox {
                Title { title: "Sets" }
                for row in rows {
                    {row}
                }
            }
        }
    }
}

fn view_finished(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Element {
    let duration = start.zip(end).map(|(start, end)| {
        let seconds = (end - start).num_seconds().max(0);
        format!(
            "{}:{:02}:{:02}",
            seconds / 3600,
            (seconds % 3600) / 60,
            seconds % 60
        )
    });

    rsx! {
        CenteredBlock {
            h1 { class: "title", "All done! 💪" }
            if let Some(duration) = duration {
                p { "Workout duration: {duration}" }
            }
            Link {
                class: "button is-link mt-4",
                to: Route::Home {},
                "Back home"
            }
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct SubsetForm {
    reps: FieldValue<domain::Reps>,
    weight: FieldValue<domain::Weight>,
}

impl SubsetForm {
    fn with_target(target: Option<domain::Reps>) -> Self {
        Self {
            reps: target.map(FieldValue::new).unwrap_or_default(),
            weight: FieldValue::default(),
        }
    }

    fn is_filled(&self) -> bool {
        self.reps.valid() && self.weight.valid()
    }

    fn to_subset(&self) -> domain::WorkoutSubset {
        domain::WorkoutSubset {
            reps: self.reps.validated.clone().ok(),
            weight: self.weight.validated.clone().ok(),
        }
    }
}
