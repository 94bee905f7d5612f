//! Account type definitions for the identity core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account identifier, assigned by the identity store.
pub type AccountId = u64;

/// Which identity provider created the account.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountOrigin {
    Local,
    Google,
    Facebook,
    Twitter,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Visitor,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NotificationChannel {
    Email,
    InApp,
}

/// Verification sub-state. A token exists exactly while the account is
/// pending, so a consumed token can never be replayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationState {
    Pending { token: String },
    Verified,
}

/// Password-reset sub-state. Token and expiry live and die together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResetState {
    None,
    Pending {
        token: String,
        expires_at: DateTime<Utc>,
    },
}

/// Main account record. Never hard-deleted by this core.
#[derive(Clone, Debug)]
pub struct Account {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    /// Unique across all accounts regardless of origin; compared
    /// case-insensitively.
    pub email: String,
    /// Argon2id hash. For federated accounts this is a hash of the
    /// provider-supplied secret.
    pub password_hash: String,
    pub origin: AccountOrigin,
    pub role: Role,
    pub verification: VerificationState,
    pub reset: ResetState,
    pub notifications: Vec<NotificationChannel>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn is_verified(&self) -> bool {
        matches!(self.verification, VerificationState::Verified)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The outward-facing view: no password hash, no internal timestamps.
    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role: self.role,
            verified: self.is_verified(),
        }
    }
}

/// Public profile fields joined into follow listings and stats responses.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub verified: bool,
}

pub fn default_notifications() -> Vec<NotificationChannel> {
    vec![NotificationChannel::Email, NotificationChannel::InApp]
}
