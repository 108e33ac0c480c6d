use derive_more::{AsRef, Display};
use futures_util::stream::LocalBoxStream;

use crate::{CreateError, Name, ReadError};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    fn watch_exercises(&self) -> LocalBoxStream<'static, Vec<Exercise>>;
    async fn create_exercise(
        &self,
        name: Name,
        reference_url: Option<String>,
        notes: Option<String>,
    ) -> Result<Exercise, CreateError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    /// Snapshot stream of all exercises of the current account. Emits the
    /// current value immediately and again on every remote change.
    fn watch_exercises(&self) -> LocalBoxStream<'static, Vec<Exercise>>;
    async fn create_exercise(
        &self,
        name: Name,
        reference_url: Option<String>,
        notes: Option<String>,
    ) -> Result<Exercise, CreateError>;
}

/// An exercise definition. Exercises are created once and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub reference_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(AsRef, Debug, Display, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(String);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ExerciseID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_exercise_id_nil() {
        assert!(ExerciseID::nil().is_nil());
        assert_eq!(ExerciseID::nil(), ExerciseID::default());
        assert!(!ExerciseID::from("-Nabc").is_nil());
    }
}
