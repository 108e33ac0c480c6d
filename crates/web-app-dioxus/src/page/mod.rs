pub mod home;
pub mod login;
pub mod not_found;
pub mod root;
pub mod workout;
pub mod workout_new;
