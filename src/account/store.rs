//! In-memory identity storage

use std::collections::HashMap;

use chrono::Utc;

use super::types::{Account, AccountId, ResetState, VerificationState};
use crate::error::ApiError;

/// Identity store: the account records plus a lowercased email index.
///
/// Uniqueness is enforced here, at the storage boundary. All writes go
/// through `&mut self`, so when the store sits behind a mutex two
/// concurrent writers for the same email serialize and the second one
/// receives `Conflict` rather than succeeding twice.
pub struct IdentityStore {
    accounts: HashMap<AccountId, Account>,
    email_index: HashMap<String, AccountId>,
    next_id: AccountId,
}

/// What the store needs to materialize a new account; the id is assigned
/// on insert.
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub origin: super::types::AccountOrigin,
    pub role: super::types::Role,
    pub verification: VerificationState,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            email_index: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new account, failing with `Conflict` if the email is
    /// already taken (case-insensitive). Check and insert happen under
    /// the same borrow, so no second writer can slip in between.
    pub fn insert(&mut self, new: NewAccount) -> Result<&Account, ApiError> {
        let key = new.email.to_lowercase();
        if self.email_index.contains_key(&key) {
            return Err(ApiError::Conflict);
        }

        let id = self.next_id;
        self.next_id += 1;

        let account = Account {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            origin: new.origin,
            role: new.role,
            verification: new.verification,
            reset: ResetState::None,
            notifications: super::types::default_notifications(),
            created_at: Utc::now(),
        };
        self.email_index.insert(key, id);
        Ok(self.accounts.entry(id).or_insert(account))
    }

    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.accounts.contains_key(&id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&Account> {
        let id = self.email_index.get(&email.to_lowercase())?;
        self.accounts.get(id)
    }

    /// Locate the account holding this reset token with an expiry strictly
    /// in the future. An expired token resolves exactly like an unknown
    /// one; callers cannot distinguish the two.
    pub fn find_by_reset_token(&self, token: &str) -> Option<&Account> {
        let now = Utc::now();
        self.accounts.values().find(|a| match &a.reset {
            ResetState::Pending { token: t, expires_at } => t == token && *expires_at > now,
            ResetState::None => false,
        })
    }

    /// Locate an unverified account holding this verification token.
    /// Verified accounts no longer carry a token, so a consumed token
    /// finds nothing.
    pub fn find_by_verification_token(&self, token: &str) -> Option<&Account> {
        self.accounts.values().find(|a| {
            matches!(&a.verification, VerificationState::Pending { token: t } if t == token)
        })
    }

    /// Mark a reset token as pending on the account. Token and expiry are
    /// one value, so they can never diverge.
    pub fn set_reset_state(&mut self, id: AccountId, reset: ResetState) -> Result<(), ApiError> {
        let account = self.accounts.get_mut(&id).ok_or(ApiError::NotFound)?;
        account.reset = reset;
        Ok(())
    }

    /// Install the new password hash and clear the reset sub-state in one
    /// update; the three fields change together or not at all.
    pub fn commit_password_reset(
        &mut self,
        id: AccountId,
        password_hash: String,
    ) -> Result<(), ApiError> {
        let account = self.accounts.get_mut(&id).ok_or(ApiError::NotFound)?;
        account.password_hash = password_hash;
        account.reset = ResetState::None;
        Ok(())
    }

    /// Flip an account to verified, dropping the token in the same update.
    /// Fails if the account is already verified.
    pub fn mark_verified(&mut self, id: AccountId) -> Result<(), ApiError> {
        let account = self.accounts.get_mut(&id).ok_or(ApiError::AlreadyVerified)?;
        if account.is_verified() {
            return Err(ApiError::AlreadyVerified);
        }
        account.verification = VerificationState::Verified;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::new()
    }
}
