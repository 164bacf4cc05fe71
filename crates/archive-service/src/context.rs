//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use archive_auth::AccessPolicy;
use archive_entity::user::User;

/// Context for the current authenticated request.
///
/// Built by the external authentication layer and passed into service
/// methods so that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user.
    pub user: User,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user: User) -> Self {
        Self {
            user,
            request_time: Utc::now(),
        }
    }

    /// The authenticated user's ID.
    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    /// Access rules for the authenticated user.
    pub fn policy(&self) -> AccessPolicy {
        AccessPolicy::for_user(&self.user)
    }
}
