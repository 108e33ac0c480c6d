#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod execution;
mod exercise;
mod name;
mod service;
mod session;
mod user;
mod workout;
mod workout_log;

pub use error::{CreateError, DeleteError, ReadError, StorageError, UpdateError};
pub use execution::{Execution, Phase, SetStatus};
pub use exercise::{Exercise, ExerciseID, ExerciseRepository, ExerciseService};
pub use name::{Name, NameError};
pub use service::Service;
pub use session::{Credentials, SessionRepository, SessionService};
pub use user::{User, UserID};
pub use workout::{
    Reps, RepsError, RestInterval, RestIntervalError, SetID, Workout, WorkoutID, WorkoutRepository,
    WorkoutService, WorkoutSet,
};
pub use workout_log::{
    SetHistory, SetHistoryEntry, SubsetID, Weight, WeightError, WorkoutLog, WorkoutLogID,
    WorkoutLogRepository, WorkoutLogService, WorkoutLogSet, WorkoutSubset, set_history,
};
