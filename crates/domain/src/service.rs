use chrono::{DateTime, Utc};
use futures_util::stream::LocalBoxStream;
use log::{debug, error};

use crate::{
    CreateError, Credentials, DeleteError, Exercise, ExerciseRepository, ExerciseService, Name,
    ReadError, SessionRepository, SessionService, SetID, UpdateError, User, Workout, WorkoutID,
    WorkoutLog, WorkoutLogID, WorkoutLogRepository, WorkoutLogService, WorkoutRepository,
    WorkoutService, WorkoutSet, WorkoutSubset,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: SessionRepository> SessionService for Service<R> {
    async fn request_session(&self, credentials: Credentials) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.request_session(credentials),
            ReadError,
            "request",
            "session"
        )
    }

    async fn get_session(&self) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.initialize_session(),
            ReadError,
            "get",
            "session"
        )
    }

    async fn delete_session(&self) -> Result<(), DeleteError> {
        log_on_error!(
            self.repository.delete_session(),
            DeleteError,
            "delete",
            "session"
        )
    }
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    fn watch_exercises(&self) -> LocalBoxStream<'static, Vec<Exercise>> {
        self.repository.watch_exercises()
    }

    async fn create_exercise(
        &self,
        name: Name,
        reference_url: Option<String>,
        notes: Option<String>,
    ) -> Result<Exercise, CreateError> {
        log_on_error!(
            self.repository.create_exercise(name, reference_url, notes),
            CreateError,
            "create",
            "exercise"
        )
    }
}

impl<R: WorkoutRepository> WorkoutService for Service<R> {
    async fn get_workouts(&self) -> Result<Vec<Workout>, ReadError> {
        log_on_error!(self.repository.read_workouts(), ReadError, "get", "workouts")
    }

    fn watch_workouts(&self) -> LocalBoxStream<'static, Vec<Workout>> {
        self.repository.watch_workouts()
    }

    async fn get_workout(&self, id: WorkoutID) -> Result<Option<Workout>, ReadError> {
        log_on_error!(self.repository.read_workout(id), ReadError, "get", "workout")
    }

    async fn create_workout(
        &self,
        name: Name,
        sets: Vec<WorkoutSet>,
    ) -> Result<Workout, CreateError> {
        log_on_error!(
            self.repository.create_workout(name, sets),
            CreateError,
            "create",
            "workout"
        )
    }

    async fn touch_workout(
        &self,
        id: WorkoutID,
        accessed: DateTime<Utc>,
    ) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.touch_workout(id, accessed),
            UpdateError,
            "touch",
            "workout"
        )
    }

    async fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError> {
        log_on_error!(
            self.repository.delete_workout(id),
            DeleteError,
            "delete",
            "workout"
        )
    }
}

impl<R: WorkoutLogRepository> WorkoutLogService for Service<R> {
    async fn get_workout_logs(
        &self,
        workout_id: WorkoutID,
        limit: u32,
    ) -> Result<Vec<WorkoutLog>, ReadError> {
        log_on_error!(
            self.repository.read_workout_logs(workout_id, limit),
            ReadError,
            "get",
            "workout logs"
        )
    }

    fn watch_workout_logs(
        &self,
        workout_id: WorkoutID,
        limit: u32,
    ) -> LocalBoxStream<'static, Vec<WorkoutLog>> {
        self.repository.watch_workout_logs(workout_id, limit)
    }

    async fn create_workout_log(
        &self,
        workout_id: WorkoutID,
        start: DateTime<Utc>,
    ) -> Result<WorkoutLogID, CreateError> {
        log_on_error!(
            self.repository.create_workout_log(workout_id, start),
            CreateError,
            "create",
            "workout log"
        )
    }

    async fn log_skipped_set(&self, id: WorkoutLogID, set_id: SetID) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.log_skipped_set(id, set_id),
            UpdateError,
            "update",
            "workout log"
        )
    }

    async fn log_finished_set(
        &self,
        id: WorkoutLogID,
        set_id: SetID,
        notes: Option<String>,
        subsets: Vec<WorkoutSubset>,
    ) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.log_finished_set(id, set_id, notes, subsets),
            UpdateError,
            "update",
            "workout log"
        )
    }

    async fn finish_workout_log(
        &self,
        id: WorkoutLogID,
        end: DateTime<Utc>,
    ) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.finish_workout_log(id, end),
            UpdateError,
            "finish",
            "workout log"
        )
    }
}
