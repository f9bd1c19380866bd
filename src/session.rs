//! Signed-in user context.
//!
//! The identity provider is an external collaborator; kelime only asks it
//! who is signed in. A [`UserSession`] is created once on sign-in and passed
//! by reference to every flow that reads or writes user data.

use serde::{Deserialize, Serialize};

use crate::error::{KelimeError, Result};

/// Identity returned by the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdentity {
    /// Stable user id; keys the `users/{uid}` document tree.
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Identity collaborator. kelime never authenticates anyone itself.
pub trait AuthProvider {
    /// The signed-in user, if any.
    fn current_user(&self) -> Option<UserIdentity>;
}

/// An auth provider with a fixed answer, for the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<UserIdentity>,
}

impl StaticAuth {
    /// A provider reporting `uid` as signed in.
    pub fn signed_in(uid: impl Into<String>) -> Self {
        Self {
            user: Some(UserIdentity::new(uid)),
        }
    }

    /// A provider with nobody signed in.
    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user.clone()
    }
}

/// Explicit session context for one signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    identity: UserIdentity,
}

impl UserSession {
    /// Sign in with whoever the provider reports.
    ///
    /// Returns `NotAuthenticated` when no user is signed in or the uid is
    /// blank.
    pub fn begin<A: AuthProvider + ?Sized>(auth: &A) -> Result<Self> {
        let identity = auth
            .current_user()
            .filter(|u| !u.uid.trim().is_empty())
            .ok_or(KelimeError::NotAuthenticated)?;
        tracing::debug!(uid = %identity.uid, "user session started");
        Ok(Self { identity })
    }

    pub fn uid(&self) -> &str {
        &self.identity.uid
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// Tear the session down on sign-out.
    pub fn end(self) -> UserIdentity {
        tracing::debug!(uid = %self.identity.uid, "user session ended");
        self.identity
    }
}
