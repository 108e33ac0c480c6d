use chrono::{DateTime, Utc};
use derive_more::{AsRef, Display, Into};
use futures_util::stream::LocalBoxStream;
use indexmap::IndexMap;

use crate::{CreateError, ReadError, Reps, SetID, UpdateError, WorkoutID};

#[allow(async_fn_in_trait)]
pub trait WorkoutLogService {
    async fn get_workout_logs(
        &self,
        workout_id: WorkoutID,
        limit: u32,
    ) -> Result<Vec<WorkoutLog>, ReadError>;
    fn watch_workout_logs(
        &self,
        workout_id: WorkoutID,
        limit: u32,
    ) -> LocalBoxStream<'static, Vec<WorkoutLog>>;
    async fn create_workout_log(
        &self,
        workout_id: WorkoutID,
        start: DateTime<Utc>,
    ) -> Result<WorkoutLogID, CreateError>;
    async fn log_skipped_set(&self, id: WorkoutLogID, set_id: SetID) -> Result<(), UpdateError>;
    async fn log_finished_set(
        &self,
        id: WorkoutLogID,
        set_id: SetID,
        notes: Option<String>,
        subsets: Vec<WorkoutSubset>,
    ) -> Result<(), UpdateError>;
    async fn finish_workout_log(
        &self,
        id: WorkoutLogID,
        end: DateTime<Utc>,
    ) -> Result<(), UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutLogRepository {
    async fn read_workout_logs(
        &self,
        workout_id: WorkoutID,
        limit: u32,
    ) -> Result<Vec<WorkoutLog>, ReadError>;
    /// Snapshot stream of the last `limit` logs of a workout, oldest first.
    fn watch_workout_logs(
        &self,
        workout_id: WorkoutID,
        limit: u32,
    ) -> LocalBoxStream<'static, Vec<WorkoutLog>>;
    async fn create_workout_log(
        &self,
        workout_id: WorkoutID,
        start: DateTime<Utc>,
    ) -> Result<WorkoutLogID, CreateError>;
    async fn log_skipped_set(&self, id: WorkoutLogID, set_id: SetID) -> Result<(), UpdateError>;
    async fn log_finished_set(
        &self,
        id: WorkoutLogID,
        set_id: SetID,
        notes: Option<String>,
        subsets: Vec<WorkoutSubset>,
    ) -> Result<(), UpdateError>;
    async fn finish_workout_log(
        &self,
        id: WorkoutLogID,
        end: DateTime<Utc>,
    ) -> Result<(), UpdateError>;
}

/// The record of one execution session of a workout. `end` is absent while
/// the session is in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutLog {
    pub id: WorkoutLogID,
    pub workout_id: WorkoutID,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub sets: IndexMap<SetID, WorkoutLogSet>,
}

#[derive(AsRef, Debug, Display, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutLogID(String);

impl WorkoutLogID {
    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for WorkoutLogID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WorkoutLogID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Per-set outcome within a log. A skipped set has no subsets; a completed
/// set has subsets and no skipped flag.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorkoutLogSet {
    pub sets_completed: u32,
    pub skipped: bool,
    pub notes: Option<String>,
    pub subsets: IndexMap<SubsetID, WorkoutSubset>,
}

#[derive(AsRef, Debug, Display, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubsetID(String);

impl SubsetID {
    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SubsetID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SubsetID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One logged repetition cluster. "Filled" means both reps and weight are
/// present; the newtypes rule out zero values.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct WorkoutSubset {
    pub reps: Option<Reps>,
    pub weight: Option<Weight>,
}

impl WorkoutSubset {
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.reps.is_some() && self.weight.is_some()
    }
}

/// Weight in lbs.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) || value == 0.0 {
            return Err(WeightError::OutOfRange);
        }

        if (value * 10.0 % 1.0).abs() > f32::EPSILON {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.1 to 999.9 lbs")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.1 lbs")]
    InvalidResolution,
    #[error("Weight must be a decimal")]
    ParseError,
}

/// One line of the recent history of a workout set.
#[derive(Debug, Clone, PartialEq)]
pub struct SetHistoryEntry {
    pub start: DateTime<Utc>,
    pub outcome: SetHistory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetHistory {
    Skipped,
    Completed(Vec<(Reps, Weight)>),
}

/// Collects the history of a single workout set from an already bounded list
/// of logs (oldest first), most recent entry first. Logs without an outcome
/// for the set are ignored; an empty result means "no history".
#[must_use]
pub fn set_history(logs: &[WorkoutLog], set_id: &SetID) -> Vec<SetHistoryEntry> {
    logs.iter()
        .rev()
        .filter_map(|log| {
            let log_set = log.sets.get(set_id)?;
            if log_set.skipped {
                Some(SetHistoryEntry {
                    start: log.start,
                    outcome: SetHistory::Skipped,
                })
            } else if log_set.subsets.is_empty() {
                None
            } else {
                Some(SetHistoryEntry {
                    start: log.start,
                    outcome: SetHistory::Completed(
                        log_set
                            .subsets
                            .values()
                            .filter_map(|subset| Some((subset.reps?, subset.weight?)))
                            .collect(),
                    ),
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn date(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn subset(reps: u32, weight: f32) -> WorkoutSubset {
        WorkoutSubset {
            reps: Some(Reps::new(reps).unwrap()),
            weight: Some(Weight::new(weight).unwrap()),
        }
    }

    fn log(id: &str, start_ms: i64, sets: Vec<(&str, WorkoutLogSet)>) -> WorkoutLog {
        WorkoutLog {
            id: id.into(),
            workout_id: "w1".into(),
            start: date(start_ms),
            end: None,
            sets: sets.into_iter().map(|(id, s)| (id.into(), s)).collect(),
        }
    }

    fn completed_log_set(subsets: Vec<(&str, WorkoutSubset)>) -> WorkoutLogSet {
        WorkoutLogSet {
            sets_completed: u32::try_from(subsets.len()).unwrap(),
            skipped: false,
            notes: None,
            subsets: subsets.into_iter().map(|(id, s)| (id.into(), s)).collect(),
        }
    }

    fn skipped_log_set() -> WorkoutLogSet {
        WorkoutLogSet {
            skipped: true,
            ..WorkoutLogSet::default()
        }
    }

    #[rstest]
    #[case(15.0, Ok(Weight(15.0)))]
    #[case(0.1, Ok(Weight(0.1)))]
    #[case(0.0, Err(WeightError::OutOfRange))]
    #[case(1000.0, Err(WeightError::OutOfRange))]
    #[case(10.05, Err(WeightError::InvalidResolution))]
    fn test_weight_new(#[case] value: f32, #[case] expected: Result<Weight, WeightError>) {
        assert_eq!(Weight::new(value), expected);
    }

    #[rstest]
    #[case(WorkoutSubset::default(), false)]
    #[case(WorkoutSubset { reps: Some(Reps::new(10).unwrap()), weight: None }, false)]
    #[case(subset(10, 50.0), true)]
    fn test_workout_subset_is_filled(#[case] subset: WorkoutSubset, #[case] expected: bool) {
        assert_eq!(subset.is_filled(), expected);
    }

    #[test]
    fn test_set_history_empty_for_unknown_set() {
        let logs = vec![
            log("l1", 1_000, vec![("a", completed_log_set(vec![("x", subset(10, 50.0))]))]),
            log("l2", 2_000, vec![("a", skipped_log_set())]),
        ];
        assert_eq!(set_history(&logs, &"b".into()), vec![]);
    }

    #[test]
    fn test_set_history_ignores_logs_without_outcome() {
        let logs = vec![
            log("l1", 1_000, vec![("a", WorkoutLogSet::default())]),
            log("l2", 2_000, vec![]),
        ];
        assert_eq!(set_history(&logs, &"a".into()), vec![]);
    }

    #[test]
    fn test_set_history_reverse_chronological() {
        let logs = vec![
            log("l1", 1_000, vec![("a", completed_log_set(vec![("x", subset(10, 50.0))]))]),
            log("l2", 2_000, vec![("a", skipped_log_set())]),
            log(
                "l3",
                3_000,
                vec![(
                    "a",
                    completed_log_set(vec![("x", subset(8, 55.0)), ("y", subset(6, 55.0))]),
                )],
            ),
        ];
        assert_eq!(
            set_history(&logs, &"a".into()),
            vec![
                SetHistoryEntry {
                    start: date(3_000),
                    outcome: SetHistory::Completed(vec![
                        (Reps::new(8).unwrap(), Weight::new(55.0).unwrap()),
                        (Reps::new(6).unwrap(), Weight::new(55.0).unwrap()),
                    ]),
                },
                SetHistoryEntry {
                    start: date(2_000),
                    outcome: SetHistory::Skipped,
                },
                SetHistoryEntry {
                    start: date(1_000),
                    outcome: SetHistory::Completed(vec![(
                        Reps::new(10).unwrap(),
                        Weight::new(50.0).unwrap()
                    )]),
                },
            ]
        );
    }

    #[test]
    fn test_set_history_drops_unfilled_subsets() {
        let logs = vec![log(
            "l1",
            1_000,
            vec![(
                "a",
                completed_log_set(vec![
                    ("x", subset(10, 50.0)),
                    ("y", WorkoutSubset { reps: Some(Reps::new(5).unwrap()), weight: None }),
                ]),
            )],
        )];
        assert_eq!(
            set_history(&logs, &"a".into()),
            vec![SetHistoryEntry {
                start: date(1_000),
                outcome: SetHistory::Completed(vec![(
                    Reps::new(10).unwrap(),
                    Weight::new(50.0).unwrap()
                )]),
            }]
        );
    }
}
