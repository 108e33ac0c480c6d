use chrono::{DateTime, Utc};
use derive_more::{AsRef, Display, Into};
use futures_util::stream::LocalBoxStream;
use indexmap::IndexMap;

use crate::{CreateError, DeleteError, ExerciseID, Name, ReadError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    async fn get_workouts(&self) -> Result<Vec<Workout>, ReadError>;
    fn watch_workouts(&self) -> LocalBoxStream<'static, Vec<Workout>>;
    async fn get_workout(&self, id: WorkoutID) -> Result<Option<Workout>, ReadError>;
    async fn create_workout(&self, name: Name, sets: Vec<WorkoutSet>)
    -> Result<Workout, CreateError>;
    async fn touch_workout(
        &self,
        id: WorkoutID,
        accessed: DateTime<Utc>,
    ) -> Result<(), UpdateError>;
    async fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_workouts(&self) -> Result<Vec<Workout>, ReadError>;
    /// Snapshot stream of all workouts of the current account, most recently
    /// accessed first.
    fn watch_workouts(&self) -> LocalBoxStream<'static, Vec<Workout>>;
    async fn read_workout(&self, id: WorkoutID) -> Result<Option<Workout>, ReadError>;
    async fn create_workout(&self, name: Name, sets: Vec<WorkoutSet>)
    -> Result<Workout, CreateError>;
    async fn touch_workout(
        &self,
        id: WorkoutID,
        accessed: DateTime<Utc>,
    ) -> Result<(), UpdateError>;
    async fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;
}

/// A named, ordered collection of sets. The set mapping preserves insertion
/// order, which is the order sets are presented in during execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: WorkoutID,
    pub name: Option<Name>,
    pub sets: IndexMap<SetID, WorkoutSet>,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl Workout {
    /// A workout can be run only if it has at least one set and every set
    /// prescribes an exercise, a target rep count and a rest interval.
    #[must_use]
    pub fn is_runnable(&self) -> bool {
        !self.sets.is_empty() && self.sets.values().all(WorkoutSet::is_complete)
    }

    #[must_use]
    pub fn set_ids(&self) -> Vec<SetID> {
        self.sets.keys().cloned().collect()
    }
}

#[derive(AsRef, Debug, Display, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutID(String);

impl WorkoutID {
    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for WorkoutID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WorkoutID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for WorkoutID {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self(value.to_string()))
    }
}

#[derive(AsRef, Debug, Display, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SetID(String);

impl SetID {
    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SetID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SetID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One exercise prescription within a workout. All fields are optional while
/// a workout is being authored; [`WorkoutSet::is_complete`] decides whether
/// the set can be executed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkoutSet {
    pub exercise_id: Option<ExerciseID>,
    pub target_reps: Option<Reps>,
    pub rest_interval: Option<RestInterval>,
    pub notes: Option<String>,
}

impl WorkoutSet {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.exercise_id.is_some() && self.target_reps.is_some() && self.rest_interval.is_some()
    }
}

#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(1..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 1 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

/// Rest interval in seconds.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct RestInterval(u32);

impl RestInterval {
    pub fn new(value: u32) -> Result<Self, RestIntervalError> {
        if !(1..=3600).contains(&value) {
            return Err(RestIntervalError::OutOfRange);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn as_secs(&self) -> u32 {
        self.0
    }
}

impl TryFrom<&str> for RestInterval {
    type Error = RestIntervalError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => RestInterval::new(parsed_value),
            Err(_) => Err(RestIntervalError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RestIntervalError {
    #[error("Rest interval must be in the range 1 to 3600 s")]
    OutOfRange,
    #[error("Rest interval must be an integer")]
    ParseError,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn complete_set() -> WorkoutSet {
        WorkoutSet {
            exercise_id: Some("e1".into()),
            target_reps: Some(Reps::new(10).unwrap()),
            rest_interval: Some(RestInterval::new(30).unwrap()),
            notes: None,
        }
    }

    fn workout(sets: Vec<(&str, WorkoutSet)>) -> Workout {
        Workout {
            id: "w1".into(),
            name: Some(Name::new("Push A").unwrap()),
            sets: sets.into_iter().map(|(id, s)| (id.into(), s)).collect(),
            last_accessed: None,
        }
    }

    #[rstest]
    #[case(WorkoutSet::default(), false)]
    #[case(WorkoutSet { target_reps: None, ..complete_set() }, false)]
    #[case(WorkoutSet { rest_interval: None, ..complete_set() }, false)]
    #[case(WorkoutSet { exercise_id: None, ..complete_set() }, false)]
    #[case(complete_set(), true)]
    #[case(WorkoutSet { notes: Some("slow negatives".to_string()), ..complete_set() }, true)]
    fn test_workout_set_is_complete(#[case] set: WorkoutSet, #[case] expected: bool) {
        assert_eq!(set.is_complete(), expected);
    }

    #[test]
    fn test_workout_is_runnable() {
        assert!(!workout(vec![]).is_runnable());
        assert!(!workout(vec![("s1", complete_set()), ("s2", WorkoutSet::default())]).is_runnable());
        assert!(workout(vec![("s1", complete_set()), ("s2", complete_set())]).is_runnable());
    }

    #[test]
    fn test_workout_set_ids_preserve_insertion_order() {
        let workout = workout(vec![
            ("s2", complete_set()),
            ("s1", complete_set()),
            ("s3", complete_set()),
        ]);
        assert_eq!(
            workout.set_ids(),
            vec![SetID::from("s2"), SetID::from("s1"), SetID::from("s3")]
        );
    }

    #[rstest]
    #[case("10", Ok(Reps::new(10).unwrap()))]
    #[case(" 1 ", Ok(Reps::new(1).unwrap()))]
    #[case("0", Err(RepsError::OutOfRange))]
    #[case("1000", Err(RepsError::OutOfRange))]
    #[case("ten", Err(RepsError::ParseError))]
    fn test_reps_try_from(#[case] value: &str, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::try_from(value), expected);
    }

    #[rstest]
    #[case("30", Ok(RestInterval::new(30).unwrap()))]
    #[case("0", Err(RestIntervalError::OutOfRange))]
    #[case("3601", Err(RestIntervalError::OutOfRange))]
    #[case("1m", Err(RestIntervalError::ParseError))]
    fn test_rest_interval_try_from(
        #[case] value: &str,
        #[case] expected: Result<RestInterval, RestIntervalError>,
    ) {
        assert_eq!(RestInterval::try_from(value), expected);
    }
}
