use crate::{DeleteError, ReadError, User};

/// Credentials presented to the identity provider on sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[allow(async_fn_in_trait)]
pub trait SessionService {
    async fn request_session(&self, credentials: Credentials) -> Result<User, ReadError>;
    async fn get_session(&self) -> Result<User, ReadError>;
    async fn delete_session(&self) -> Result<(), DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    async fn request_session(&self, credentials: Credentials) -> Result<User, ReadError>;
    async fn initialize_session(&self) -> Result<User, ReadError>;
    async fn delete_session(&self) -> Result<(), DeleteError>;
}
