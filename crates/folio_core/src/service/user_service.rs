//! User registration and profile lookup.

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::model::identity::Identity;
use crate::model::user::{normalize_email, NewUser, User};
use crate::repo::user_repo::UserRepository;
use log::info;

pub struct UserService<U: UserRepository> {
    repo: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(repo: U) -> Self {
        Self { repo }
    }

    /// Registers a user after field validation.
    ///
    /// Duplicate email or handle is reported as a validation error on that
    /// field.
    pub fn register_user(&self, email: &str, handle: &str) -> CoreResult<User> {
        let new_user = NewUser::parse(email, handle)?;
        let user = self.repo.create_user(&new_user)?;
        info!(
            "event=user_register module=user status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Returns the caller's own user record.
    pub fn get_profile(&self, identity: &Identity) -> CoreResult<User> {
        self.repo
            .get_user(identity.user_id)?
            .ok_or_else(|| CoreError::not_found(EntityKind::User, identity.user_id))
    }

    /// Resolves a registered email (case of the domain ignored) to an identity.
    pub fn identity_for_email(&self, email: &str) -> CoreResult<Identity> {
        let normalized = normalize_email(email);
        self.repo
            .find_by_email(&normalized)?
            .map(|user| Identity::from(&user))
            .ok_or_else(|| CoreError::not_found(EntityKind::User, normalized))
    }
}
