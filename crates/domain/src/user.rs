use derive_more::{AsRef, Display};

use crate::Name;

/// The authenticated principal as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserID,
    pub name: Name,
    pub email: String,
}

#[derive(AsRef, Debug, Display, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserID(String);

impl UserID {
    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for UserID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_user_id_nil() {
        assert!(UserID::nil().is_nil());
        assert_eq!(UserID::nil(), UserID::default());
        assert!(!UserID::from("u1").is_nil());
    }
}
