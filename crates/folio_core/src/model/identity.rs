//! Pre-verified caller identity.
//!
//! Token parsing and issuance live outside the core. Callers hand in an
//! identity that an upstream layer has already authenticated.

use crate::model::user::{User, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
}

impl Identity {
    pub fn new(user_id: UserId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.email.clone())
    }
}
