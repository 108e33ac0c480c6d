use dioxus::prelude::*;
use futures_util::StreamExt;

use vigor_domain::{self as domain, ExerciseService, WorkoutService};

use crate::{
    Route,
    component::{
        element::{Block, Dialog, Icon, WhiteBox},
        form::{FieldValue, FieldValueState, InputField, SelectField, SelectOption},
    },
    use_app, use_session_guard,
};

#[component]
pub fn WorkoutNew() -> Element {
    use_session_guard();
    let app = use_app();
    let navigator = use_navigator();

    let mut exercises = use_signal(Vec::<domain::Exercise>::new);
    use_coroutine(move |_: UnboundedReceiver<()>| async move {
        let mut stream = app.domain.read().watch_exercises();
        while let Some(snapshot) = stream.next().await {
            exercises.set(snapshot);
        }
    });

    let mut name = use_signal(FieldValue::<domain::Name>::default);
    let sets = use_signal(Vec::<SetForm>::new);
    let dialog = use_signal(|| None::<(usize, ExerciseForm)>);
    let mut is_saving = use_signal(|| false);

    let can_submit = name.read().valid()
        && !sets.read().is_empty()
        && sets.read().iter().all(SetForm::is_complete);

    let submit = move |_| async move {
        let Ok(workout_name) = name.read().validated.clone() else {
            return;
        };
        let workout_sets = sets
            .read()
            .iter()
            .map(SetForm::to_workout_set)
            .collect::<Vec<_>>();
        *is_saving.write() = true;
        match app
            .domain
            .read()
            .create_workout(workout_name, workout_sets)
            .await
        {
            Ok(_) => {
                navigator.push(Route::Home {});
            }
            Err(err) => {
                let mut notifications = app.notifications;
                notifications
                    .write()
                    .push(format!("Failed to create workout: {err}"));
            }
        }
        *is_saving.write() = false;
    };

    rsx! {
        div {
            class: "container px-3",
            InputField {
                label: "Workout name".to_string(),
                value: name.read().input.clone(),
                error: if let Err(err) = &name.read().validated { err.clone() },
                has_changed: name.read().changed(),
                oninput: move |event: FormEvent| {
                    let mut field = name.write();
                    field.input = event.value();
                    field.validated =
                        domain::Name::new(&event.value()).map_err(|err| err.to_string());
                },
            }
            if name.read().valid() {
                for index in 0..sets.read().len() {
                    {view_set(index, &sets.read()[index], &exercises.read(), sets, dialog)}
                }
                Block {
                    button {
                        class: "button is-fullwidth",
                        onclick: {
                            let mut sets = sets;
                            move |_| { sets.write().push(SetForm::default()); }
                        },
                        Icon { name: "plus", is_small: true }
                        span { "Add set" }
                    }
                }
                if can_submit {
                    Block {
                        button {
                            class: "button is-primary is-fullwidth",
                            class: if is_saving() { "is-loading" },
                            onclick: submit,
                            "Create workout"
                        }
                    }
                }
            }
        }
        {view_exercise_dialog(dialog, sets)}
    }
}

fn view_set(
    index: usize,
    set: &SetForm,
    exercises: &[domain::Exercise],
    mut sets: Signal<Vec<SetForm>>,
    mut dialog: Signal<Option<(usize, ExerciseForm)>>,
) -> Element {
    let mut options = vec![rsx! {
        SelectOption {
            text: "Select exercise…",
            value: "",
            selected: set.exercise_id.is_none(),
        }
    }];
    options.extend(exercises.iter().map(|exercise| {
        rsx! {
            SelectOption {
                text: exercise.name.to_string(),
                value: exercise.id.to_string(),
                selected: set.exercise_id.as_ref() == Some(&exercise.id),
            }
        }
    }));
    options.push(rsx! {
        SelectOption {
            text: "Add new exercise…",
            value: "new",
            selected: false,
        }
    });

    rsx! {
        Block {
            WhiteBox {
                SelectField {
                    label: "Exercise".to_string(),
                    options,
                    has_changed: false,
                    onchange: move |event: FormEvent| {
                        match event.value().as_str() {
                            "" => {
                                sets.write()[index].exercise_id = None;
                            }
                            "new" => {
                                dialog.set(Some((index, ExerciseForm::default())));
                            }
                            id => {
                                sets.write()[index].exercise_id = Some(id.into());
                            }
                        }
                    },
                }
                div {
                    class: "columns is-mobile",
                    div {
                        class: "column",
                        InputField {
                            label: "Target reps".to_string(),
                            r#type: "number".to_string(),
                            min: "1".to_string(),
                            max: "999".to_string(),
                            step: 1,
                            value: set.target_reps.input.clone(),
                            error: if let Err(err) = &set.target_reps.validated { err.clone() },
                            has_changed: set.target_reps.changed(),
                            oninput: move |event: FormEvent| {
                                let mut current = sets.write();
                                let field = &mut current[index].target_reps;
                                field.input = event.value();
                                field.validated = domain::Reps::try_from(event.value().as_ref())
                                    .map_err(|err| err.to_string());
                            },
                        }
                    }
                    div {
                        class: "column",
                        InputField {
                            label: "Rest interval (s)".to_string(),
                            r#type: "number".to_string(),
                            min: "1".to_string(),
                            max: "3600".to_string(),
                            step: 1,
                            value: set.rest_interval.input.clone(),
                            error: if let Err(err) = &set.rest_interval.validated { err.clone() },
                            has_changed: set.rest_interval.changed(),
                            oninput: move |event: FormEvent| {
                                let mut current = sets.write();
                                let field = &mut current[index].rest_interval;
                                field.input = event.value();
                                field.validated =
                                    domain::RestInterval::try_from(event.value().as_ref())
                                        .map_err(|err| err.to_string());
                            },
                        }
                    }
                }
                InputField {
                    label: "Notes".to_string(),
                    value: set.notes.clone(),
                    has_changed: false,
                    oninput: move |event: FormEvent| {
                        sets.write()[index].notes = event.value();
                    },
                }
                div {
                    class: "field is-grouped",
                    div {
                        class: "control",
                        button {
                            class: "button is-danger is-small",
                            onclick: move |_| {
                                sets.write().remove(index);
                            },
                            "Remove"
                        }
                    }
                    div {
                        class: "control",
                        button {
                            class: "button is-small",
                            onclick: move |_| {
                                let set = sets.read()[index].clone();
                                sets.write().insert(index + 1, set);
                            },
                            "Duplicate"
                        }
                    }
                }
            }
        }
    }
}

fn view_exercise_dialog(
    mut dialog: Signal<Option<(usize, ExerciseForm)>>,
    mut sets: Signal<Vec<SetForm>>,
) -> Element {
    let app = use_app();
    let mut is_saving = use_signal(|| false);

    let save = move |_| async move {
        let Some((index, form)) = dialog.read().clone() else {
            return;
        };
        let Ok(name) = form.name.validated.clone() else {
            return;
        };
        *is_saving.write() = true;
        let reference_url = Some(form.reference_url).filter(|url| !url.trim().is_empty());
        let notes = Some(form.notes).filter(|notes| !notes.trim().is_empty());
        match app
            .domain
            .read()
            .create_exercise(name, reference_url, notes)
            .await
        {
            Ok(exercise) => {
                if let Some(set) = sets.write().get_mut(index) {
                    set.exercise_id = Some(exercise.id);
                }
                dialog.set(None);
            }
            Err(err) => {
                let mut notifications = app.notifications;
                notifications
                    .write()
                    .push(format!("Failed to create exercise: {err}"));
            }
        }
        *is_saving.write() = false;
    };

    let current = dialog.read().clone();
    rsx! {
        if let Some((_, form)) = current {
            Dialog {
                title: rsx! { "Add new exercise" },
                close_event: move |_| { dialog.set(None); },
                InputField {
                    label: "Exercise name".to_string(),
                    value: form.name.input.clone(),
                    error: if let Err(err) = &form.name.validated { err.clone() },
                    has_changed: form.name.changed(),
                    oninput: move |event: FormEvent| {
                        if let Some((_, form)) = dialog.write().as_mut() {
                            form.name.input = event.value();
                            form.name.validated =
                                domain::Name::new(&event.value()).map_err(|err| err.to_string());
                        }
                    },
                }
                InputField {
                    label: "Reference URL".to_string(),
                    value: form.reference_url.clone(),
                    has_changed: false,
                    oninput: move |event: FormEvent| {
                        if let Some((_, form)) = dialog.write().as_mut() {
                            form.reference_url = event.value();
                        }
                    },
                }
                InputField {
                    label: "Notes".to_string(),
                    value: form.notes.clone(),
                    has_changed: false,
                    oninput: move |event: FormEvent| {
                        if let Some((_, form)) = dialog.write().as_mut() {
                            form.notes = event.value();
                        }
                    },
                }
                div {
                    class: "field is-grouped is-grouped-centered",
                    div {
                        class: "control",
                        button {
                            class: "button is-light is-soft",
                            onclick: move |_| { dialog.set(None); },
                            "Cancel"
                        }
                    }
                    div {
                        class: "control",
                        button {
                            class: "button is-primary",
                            class: if is_saving() { "is-loading" },
                            disabled: !form.name.valid(),
                            onclick: save,
                            "Save"
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct SetForm {
    exercise_id: Option<domain::ExerciseID>,
    target_reps: FieldValue<domain::Reps>,
    rest_interval: FieldValue<domain::RestInterval>,
    notes: String,
}

impl SetForm {
    fn is_complete(&self) -> bool {
        self.exercise_id.is_some() && self.target_reps.valid() && self.rest_interval.valid()
    }

    fn to_workout_set(&self) -> domain::WorkoutSet {
        domain::WorkoutSet {
            exercise_id: self.exercise_id.clone(),
            target_reps: self.target_reps.validated.clone().ok(),
            rest_interval: self.rest_interval.validated.clone().ok(),
            notes: Some(self.notes.clone()).filter(|notes| !notes.trim().is_empty()),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct ExerciseForm {
    name: FieldValue<domain::Name>,
    reference_url: String,
    notes: String,
}
