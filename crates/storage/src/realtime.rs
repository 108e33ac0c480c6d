//! Client for the hosted realtime database.
//!
//! All entities live in a key-path hierarchy scoped by the account
//! identifier (`exercises/{uid}/…`, `workouts/{uid}/…`,
//! `workoutLogs/{uid}/…`). Reads and writes go through the REST interface;
//! change subscriptions use the event-stream endpoint of the same paths and
//! re-read the full snapshot on every change notification, so subscribed
//! collections are always replaced wholesale.
//!
//! Child keys are generated client-side (see [`crate::push_key`]) and sort
//! chronologically, which makes key order the insertion order.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures_channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use futures_util::{Stream, StreamExt, stream::LocalBoxStream};
use gloo_net::http::{Request, Response};
use indexmap::IndexMap;
use log::{error, warn};
use serde::{Serialize, de::DeserializeOwned};
use vigor_domain as domain;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::{Config, auth, auth::AuthSession, push_key};

#[derive(Clone)]
pub struct RealtimeDB {
    config: Config,
}

impl RealtimeDB {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn session(&self) -> Result<AuthSession, domain::StorageError> {
        auth::cached_session().ok_or(domain::StorageError::NoSession)
    }

    fn url(&self, path: &str, query: &Query, session: &AuthSession) -> String {
        format!(
            "{}/{path}.json?auth={}{}",
            self.config.database_url.trim_end_matches('/'),
            session.id_token,
            query.as_query_string()
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
        session: &AuthSession,
    ) -> Result<Option<T>, domain::StorageError> {
        let response = send(
            Request::get(&self.url(path, query, session))
                .build()
                .expect("request building failed"),
        )
        .await?;
        response
            .json::<Option<T>>()
            .await
            .map_err(|err| domain::StorageError::Other(err.to_string().into()))
    }

    async fn put_json<T: Serialize>(
        &self,
        path: &str,
        value: &T,
        session: &AuthSession,
    ) -> Result<(), domain::StorageError> {
        send(
            Request::put(&self.url(path, &Query::default(), session))
                .json(value)
                .expect("serialization failed"),
        )
        .await?;
        Ok(())
    }

    async fn patch_json<T: Serialize>(
        &self,
        path: &str,
        value: &T,
        session: &AuthSession,
    ) -> Result<(), domain::StorageError> {
        send(
            Request::patch(&self.url(path, &Query::default(), session))
                .json(value)
                .expect("serialization failed"),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, path: &str, session: &AuthSession) -> Result<(), domain::StorageError> {
        send(
            Request::delete(&self.url(path, &Query::default(), session))
                .build()
                .expect("request building failed"),
        )
        .await?;
        Ok(())
    }

    /// Opens an event-stream subscription on a path. Every change
    /// notification is forwarded as a unit item; the caller re-reads the
    /// snapshot. The subscription closes when the listener is dropped.
    fn listen(&self, path: &str, query: &Query) -> Listener {
        let session = match self.session() {
            Ok(session) => session,
            Err(_) => return Listener::idle(),
        };
        let (tx, rx) = unbounded();
        let source = match web_sys::EventSource::new(&self.url(path, query, &session)) {
            Ok(source) => source,
            Err(err) => {
                error!("failed to open event stream on {path}: {err:?}");
                return Listener::idle();
            }
        };
        let on_event = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
            move |_event: web_sys::MessageEvent| {
                let _ = tx.unbounded_send(());
            },
        );
        for event in ["put", "patch"] {
            if let Err(err) = source
                .add_event_listener_with_callback(event, on_event.as_ref().unchecked_ref())
            {
                error!("failed to attach {event} listener: {err:?}");
            }
        }
        Listener {
            source: Some(source),
            _on_event: Some(on_event),
            _idle: None,
            rx,
        }
    }
}

async fn send(request: Request) -> Result<Response, domain::StorageError> {
    let response = request
        .send()
        .await
        .map_err(|_| domain::StorageError::NoConnection)?;
    if response.ok() {
        Ok(response)
    } else {
        Err(match response.status() {
            401 => domain::StorageError::NoSession,
            403 => domain::StorageError::AccessDenied,
            status => domain::StorageError::Other(format!("unexpected status {status}").into()),
        })
    }
}

pub(crate) struct Listener {
    source: Option<web_sys::EventSource>,
    _on_event: Option<Closure<dyn FnMut(web_sys::MessageEvent)>>,
    _idle: Option<UnboundedSender<()>>,
    rx: UnboundedReceiver<()>,
}

impl Listener {
    /// A listener without a session never fires but stays pending.
    fn idle() -> Self {
        let (tx, rx) = unbounded();
        Self {
            source: None,
            _on_event: None,
            _idle: Some(tx),
            rx,
        }
    }
}

impl Stream for Listener {
    type Item = ();

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<()>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Some(source) = &self.source {
            source.close();
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Query {
    order_by: Option<String>,
    equal_to: Option<String>,
    limit_to_last: Option<u32>,
}

impl Query {
    fn last_for_child(order_by: &str, equal_to: &str, limit: u32) -> Self {
        Self {
            order_by: Some(order_by.to_string()),
            equal_to: Some(equal_to.to_string()),
            limit_to_last: Some(limit),
        }
    }

    fn as_query_string(&self) -> String {
        let mut result = String::new();
        if let Some(order_by) = &self.order_by {
            let _ = write!(result, "&orderBy=%22{order_by}%22");
        }
        if let Some(equal_to) = &self.equal_to {
            let _ = write!(result, "&equalTo=%22{equal_to}%22");
        }
        if let Some(limit_to_last) = &self.limit_to_last {
            let _ = write!(result, "&limitToLast={limit_to_last}");
        }
        result
    }
}

impl domain::SessionRepository for RealtimeDB {
    async fn request_session(
        &self,
        credentials: domain::Credentials,
    ) -> Result<domain::User, domain::ReadError> {
        let session = auth::sign_in(&self.config.api_key, credentials).await?;
        auth::store_session(&session);
        session.to_user()
    }

    async fn initialize_session(&self) -> Result<domain::User, domain::ReadError> {
        auth::cached_session()
            .ok_or(domain::ReadError::Storage(domain::StorageError::NoSession))?
            .to_user()
    }

    async fn delete_session(&self) -> Result<(), domain::DeleteError> {
        auth::clear_session();
        Ok(())
    }
}

impl domain::ExerciseRepository for RealtimeDB {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let session = self.session()?;
        let docs = self
            .get_json::<BTreeMap<String, ExerciseDoc>>(
                &format!("exercises/{}", session.uid),
                &Query::default(),
                &session,
            )
            .await?
            .unwrap_or_default();
        Ok(docs
            .into_iter()
            .filter_map(|(id, doc)| exercise_from_doc(id, doc))
            .collect())
    }

    fn watch_exercises(&self) -> LocalBoxStream<'static, Vec<domain::Exercise>> {
        let listener = match self.session() {
            Ok(session) => self.listen(&format!("exercises/{}", session.uid), &Query::default()),
            Err(_) => Listener::idle(),
        };
        let db = self.clone();
        listener
            .then(move |()| {
                let db = db.clone();
                async move {
                    match db.read_exercises().await {
                        Ok(exercises) => exercises,
                        Err(err) => {
                            error!("failed to read exercises: {err}");
                            vec![]
                        }
                    }
                }
            })
            .boxed_local()
    }

    async fn create_exercise(
        &self,
        name: domain::Name,
        reference_url: Option<String>,
        notes: Option<String>,
    ) -> Result<domain::Exercise, domain::CreateError> {
        let session = self.session()?;
        let id = push_key::generate_now();
        let doc = ExerciseDoc {
            name: name.to_string(),
            reference_url: reference_url.filter(|url| !url.trim().is_empty()),
            notes: notes.filter(|notes| !notes.trim().is_empty()),
        };
        self.put_json(&format!("exercises/{}/{id}", session.uid), &doc, &session)
            .await?;
        Ok(domain::Exercise {
            id: id.into(),
            name,
            reference_url: doc.reference_url,
            notes: doc.notes,
        })
    }
}

impl domain::WorkoutRepository for RealtimeDB {
    async fn read_workouts(&self) -> Result<Vec<domain::Workout>, domain::ReadError> {
        let session = self.session()?;
        let docs = self
            .get_json::<BTreeMap<String, WorkoutDoc>>(
                &format!("workouts/{}", session.uid),
                &Query::default(),
                &session,
            )
            .await?
            .unwrap_or_default();
        let mut workouts = docs
            .into_iter()
            .map(|(id, doc)| workout_from_doc(id, doc))
            .collect::<Vec<_>>();
        workouts.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        Ok(workouts)
    }

    fn watch_workouts(&self) -> LocalBoxStream<'static, Vec<domain::Workout>> {
        let listener = match self.session() {
            Ok(session) => self.listen(&format!("workouts/{}", session.uid), &Query::default()),
            Err(_) => Listener::idle(),
        };
        let db = self.clone();
        listener
            .then(move |()| {
                let db = db.clone();
                async move {
                    match db.read_workouts().await {
                        Ok(workouts) => workouts,
                        Err(err) => {
                            error!("failed to read workouts: {err}");
                            vec![]
                        }
                    }
                }
            })
            .boxed_local()
    }

    async fn read_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<Option<domain::Workout>, domain::ReadError> {
        let session = self.session()?;
        let doc = self
            .get_json::<WorkoutDoc>(
                &format!("workouts/{}/{id}", session.uid),
                &Query::default(),
                &session,
            )
            .await?;
        Ok(doc.map(|doc| workout_from_doc(id.to_string(), doc)))
    }

    async fn create_workout(
        &self,
        name: domain::Name,
        sets: Vec<domain::WorkoutSet>,
    ) -> Result<domain::Workout, domain::CreateError> {
        let session = self.session()?;
        let id = push_key::generate_now();
        let workout = domain::Workout {
            id: id.clone().into(),
            name: Some(name),
            sets: sets
                .into_iter()
                .map(|set| (domain::SetID::from(push_key::generate_now()), set))
                .collect(),
            last_accessed: None,
        };
        self.put_json(
            &format!("workouts/{}/{id}", session.uid),
            &workout_to_doc(&workout),
            &session,
        )
        .await?;
        Ok(workout)
    }

    async fn touch_workout(
        &self,
        id: domain::WorkoutID,
        accessed: DateTime<Utc>,
    ) -> Result<(), domain::UpdateError> {
        let session = self.session()?;
        self.patch_json(
            &format!("workouts/{}/{id}", session.uid),
            &serde_json::json!({ "lastAccessed": accessed.timestamp_millis() }),
            &session,
        )
        .await?;
        Ok(())
    }

    async fn delete_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::WorkoutID, domain::DeleteError> {
        let session = self.session()?;
        self.delete(&format!("workouts/{}/{id}", session.uid), &session)
            .await?;
        Ok(id)
    }
}

impl domain::WorkoutLogRepository for RealtimeDB {
    async fn read_workout_logs(
        &self,
        workout_id: domain::WorkoutID,
        limit: u32,
    ) -> Result<Vec<domain::WorkoutLog>, domain::ReadError> {
        let session = self.session()?;
        let docs = self
            .get_json::<BTreeMap<String, WorkoutLogDoc>>(
                &format!("workoutLogs/{}", session.uid),
                &Query::last_for_child("workoutId", workout_id.as_ref(), limit),
                &session,
            )
            .await?
            .unwrap_or_default();
        Ok(docs
            .into_iter()
            .filter_map(|(id, doc)| workout_log_from_doc(id, doc))
            .collect())
    }

    fn watch_workout_logs(
        &self,
        workout_id: domain::WorkoutID,
        limit: u32,
    ) -> LocalBoxStream<'static, Vec<domain::WorkoutLog>> {
        let query = Query::last_for_child("workoutId", workout_id.as_ref(), limit);
        let listener = match self.session() {
            Ok(session) => self.listen(&format!("workoutLogs/{}", session.uid), &query),
            Err(_) => Listener::idle(),
        };
        let db = self.clone();
        listener
            .then(move |()| {
                let db = db.clone();
                let workout_id = workout_id.clone();
                async move {
                    match db.read_workout_logs(workout_id, limit).await {
                        Ok(logs) => logs,
                        Err(err) => {
                            error!("failed to read workout logs: {err}");
                            vec![]
                        }
                    }
                }
            })
            .boxed_local()
    }

    async fn create_workout_log(
        &self,
        workout_id: domain::WorkoutID,
        start: DateTime<Utc>,
    ) -> Result<domain::WorkoutLogID, domain::CreateError> {
        let session = self.session()?;
        let id = push_key::generate_now();
        self.put_json(
            &format!("workoutLogs/{}/{id}", session.uid),
            &serde_json::json!({
                "workoutId": workout_id.as_ref(),
                "start": start.timestamp_millis(),
            }),
            &session,
        )
        .await?;
        Ok(id.into())
    }

    async fn log_skipped_set(
        &self,
        id: domain::WorkoutLogID,
        set_id: domain::SetID,
    ) -> Result<(), domain::UpdateError> {
        let session = self.session()?;
        self.patch_json(
            &format!("workoutLogs/{}/{id}/workoutSets/{set_id}", session.uid),
            &serde_json::json!({ "skipped": true }),
            &session,
        )
        .await?;
        Ok(())
    }

    async fn log_finished_set(
        &self,
        id: domain::WorkoutLogID,
        set_id: domain::SetID,
        notes: Option<String>,
        subsets: Vec<domain::WorkoutSubset>,
    ) -> Result<(), domain::UpdateError> {
        let session = self.session()?;
        let doc = WorkoutLogSetDoc {
            sets_completed: Some(u32::try_from(subsets.len()).unwrap_or(u32::MAX)),
            skipped: false,
            notes: notes.filter(|notes| !notes.trim().is_empty()),
            subsets: subsets
                .iter()
                .map(|subset| (push_key::generate_now(), subset_to_doc(*subset)))
                .collect(),
        };
        self.put_json(
            &format!("workoutLogs/{}/{id}/workoutSets/{set_id}", session.uid),
            &doc,
            &session,
        )
        .await?;
        Ok(())
    }

    async fn finish_workout_log(
        &self,
        id: domain::WorkoutLogID,
        end: DateTime<Utc>,
    ) -> Result<(), domain::UpdateError> {
        let session = self.session()?;
        self.patch_json(
            &format!("workoutLogs/{}/{id}", session.uid),
            &serde_json::json!({ "end": end.timestamp_millis() }),
            &session,
        )
        .await?;
        Ok(())
    }
}

#[derive(Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
struct ExerciseDoc {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

#[derive(Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
struct WorkoutDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_accessed: Option<i64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    workout_sets: BTreeMap<String, WorkoutSetDoc>,
}

#[derive(Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
struct WorkoutSetDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    exercise_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_reps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rest_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

#[derive(Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
struct WorkoutLogDoc {
    workout_id: String,
    start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<i64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    workout_sets: BTreeMap<String, WorkoutLogSetDoc>,
}

#[derive(Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
struct WorkoutLogSetDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    sets_completed: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    subsets: BTreeMap<String, SubsetDoc>,
}

#[derive(Serialize, serde::Deserialize, Debug, Default, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase", default)]
struct SubsetDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    reps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f32>,
}

fn exercise_from_doc(id: String, doc: ExerciseDoc) -> Option<domain::Exercise> {
    let Ok(name) = domain::Name::new(&doc.name) else {
        warn!("ignoring exercise {id} with invalid name");
        return None;
    };
    Some(domain::Exercise {
        id: id.into(),
        name,
        reference_url: doc.reference_url,
        notes: doc.notes,
    })
}

fn workout_from_doc(id: String, doc: WorkoutDoc) -> domain::Workout {
    domain::Workout {
        id: id.into(),
        name: doc.name.and_then(|name| domain::Name::new(&name).ok()),
        sets: doc
            .workout_sets
            .into_iter()
            .map(|(set_id, set)| (domain::SetID::from(set_id), workout_set_from_doc(set)))
            .collect(),
        last_accessed: doc.last_accessed.and_then(DateTime::from_timestamp_millis),
    }
}

fn workout_set_from_doc(doc: WorkoutSetDoc) -> domain::WorkoutSet {
    domain::WorkoutSet {
        exercise_id: doc.exercise_id.map(Into::into),
        target_reps: doc.target_reps.and_then(|reps| domain::Reps::new(reps).ok()),
        rest_interval: doc
            .rest_interval
            .and_then(|interval| domain::RestInterval::new(interval).ok()),
        notes: doc.notes,
    }
}

fn workout_to_doc(workout: &domain::Workout) -> WorkoutDoc {
    WorkoutDoc {
        name: workout.name.as_ref().map(ToString::to_string),
        last_accessed: workout
            .last_accessed
            .map(|accessed| accessed.timestamp_millis()),
        workout_sets: workout
            .sets
            .iter()
            .map(|(set_id, set)| {
                (
                    set_id.to_string(),
                    WorkoutSetDoc {
                        exercise_id: set.exercise_id.as_ref().map(ToString::to_string),
                        target_reps: set.target_reps.map(Into::into),
                        rest_interval: set.rest_interval.map(Into::into),
                        notes: set.notes.clone().filter(|notes| !notes.trim().is_empty()),
                    },
                )
            })
            .collect(),
    }
}

fn workout_log_from_doc(id: String, doc: WorkoutLogDoc) -> Option<domain::WorkoutLog> {
    let Some(start) = doc.start.and_then(DateTime::from_timestamp_millis) else {
        warn!("ignoring workout log {id} without start time");
        return None;
    };
    Some(domain::WorkoutLog {
        id: id.into(),
        workout_id: doc.workout_id.into(),
        start,
        end: doc.end.and_then(DateTime::from_timestamp_millis),
        sets: doc
            .workout_sets
            .into_iter()
            .map(|(set_id, set)| {
                (
                    domain::SetID::from(set_id),
                    domain::WorkoutLogSet {
                        sets_completed: set.sets_completed.unwrap_or_default(),
                        skipped: set.skipped,
                        notes: set.notes,
                        subsets: set
                            .subsets
                            .into_iter()
                            .map(|(subset_id, subset)| {
                                (
                                    domain::SubsetID::from(subset_id),
                                    domain::WorkoutSubset {
                                        reps: subset
                                            .reps
                                            .and_then(|reps| domain::Reps::new(reps).ok()),
                                        weight: subset
                                            .weight
                                            .and_then(|weight| domain::Weight::new(weight).ok()),
                                    },
                                )
                            })
                            .collect::<IndexMap<_, _>>(),
                    },
                )
            })
            .collect(),
    })
}

fn subset_to_doc(subset: domain::WorkoutSubset) -> SubsetDoc {
    SubsetDoc {
        reps: subset.reps.map(Into::into),
        weight: subset.weight.map(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Query::default(), "")]
    #[case(
        Query::last_for_child("workoutId", "-Nw1", 3),
        "&orderBy=%22workoutId%22&equalTo=%22-Nw1%22&limitToLast=3"
    )]
    fn test_query_as_query_string(#[case] query: Query, #[case] expected: &str) {
        assert_eq!(query.as_query_string(), expected);
    }

    #[test]
    fn test_workout_from_doc() {
        let doc = serde_json::from_str::<WorkoutDoc>(
            r#"{
                "name": "Push A",
                "lastAccessed": 1700000000000,
                "workoutSets": {
                    "-Ns2": {"exerciseId": "-Ne1", "targetReps": 8, "restInterval": 45},
                    "-Ns1": {"exerciseId": "-Ne1", "targetReps": 10, "restInterval": 30,
                             "notes": "slow negatives"}
                }
            }"#,
        )
        .unwrap();

        let workout = workout_from_doc("-Nw1".to_string(), doc);

        assert_eq!(workout.id, "-Nw1".into());
        assert_eq!(workout.name, Some(domain::Name::new("Push A").unwrap()));
        assert_eq!(
            workout.last_accessed,
            DateTime::from_timestamp_millis(1_700_000_000_000)
        );
        // key order is insertion order
        assert_eq!(
            workout.set_ids(),
            vec![domain::SetID::from("-Ns1"), domain::SetID::from("-Ns2")]
        );
        assert!(workout.is_runnable());
    }

    #[test]
    fn test_workout_from_doc_tolerates_invalid_fields() {
        let doc = serde_json::from_str::<WorkoutDoc>(
            r#"{
                "name": " ",
                "workoutSets": {
                    "-Ns1": {"exerciseId": "-Ne1", "targetReps": 0, "restInterval": 9999}
                }
            }"#,
        )
        .unwrap();

        let workout = workout_from_doc("-Nw1".to_string(), doc);

        assert_eq!(workout.name, None);
        let set = &workout.sets[&domain::SetID::from("-Ns1")];
        assert_eq!(set.target_reps, None);
        assert_eq!(set.rest_interval, None);
        assert!(!workout.is_runnable());
    }

    #[test]
    fn test_workout_to_doc_round_trips_order() {
        let workout = domain::Workout {
            id: "-Nw1".into(),
            name: Some(domain::Name::new("Push A").unwrap()),
            sets: [
                (
                    domain::SetID::from("-Ns1"),
                    domain::WorkoutSet {
                        exercise_id: Some("-Ne1".into()),
                        target_reps: Some(domain::Reps::new(10).unwrap()),
                        rest_interval: Some(domain::RestInterval::new(30).unwrap()),
                        notes: None,
                    },
                ),
                (
                    domain::SetID::from("-Ns2"),
                    domain::WorkoutSet {
                        exercise_id: Some("-Ne1".into()),
                        target_reps: Some(domain::Reps::new(8).unwrap()),
                        rest_interval: Some(domain::RestInterval::new(45).unwrap()),
                        notes: None,
                    },
                ),
            ]
            .into_iter()
            .collect(),
            last_accessed: None,
        };

        assert_eq!(workout_from_doc("-Nw1".to_string(), workout_to_doc(&workout)), workout);
    }

    #[test]
    fn test_workout_log_from_doc() {
        let doc = serde_json::from_str::<WorkoutLogDoc>(
            r#"{
                "workoutId": "-Nw1",
                "start": 1700000000000,
                "workoutSets": {
                    "-Ns1": {"setsCompleted": 1, "subsets": {"-Nx1": {"reps": 10, "weight": 50}}},
                    "-Ns2": {"skipped": true}
                }
            }"#,
        )
        .unwrap();

        let log = workout_log_from_doc("-Nl1".to_string(), doc).unwrap();

        assert_eq!(log.workout_id, "-Nw1".into());
        assert_eq!(log.end, None);
        assert!(log.sets[&domain::SetID::from("-Ns2")].skipped);
        let logged = &log.sets[&domain::SetID::from("-Ns1")];
        assert_eq!(logged.sets_completed, 1);
        assert_eq!(
            logged.subsets[&domain::SubsetID::from("-Nx1")],
            domain::WorkoutSubset {
                reps: Some(domain::Reps::new(10).unwrap()),
                weight: Some(domain::Weight::new(50.0).unwrap()),
            }
        );
    }

    #[test]
    fn test_workout_log_from_doc_requires_start() {
        let doc = serde_json::from_str::<WorkoutLogDoc>(r#"{"workoutId": "-Nw1"}"#).unwrap();
        assert_eq!(workout_log_from_doc("-Nl1".to_string(), doc), None);
    }

    #[test]
    fn test_log_set_doc_omits_empty_fields() {
        let doc = WorkoutLogSetDoc {
            sets_completed: Some(1),
            skipped: false,
            notes: None,
            subsets: [("-Nx1".to_string(), SubsetDoc { reps: Some(10), weight: Some(50.0) })]
                .into_iter()
                .collect(),
        };
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            serde_json::json!({
                "setsCompleted": 1,
                "subsets": {"-Nx1": {"reps": 10, "weight": 50.0}}
            })
        );
    }
}
