//! Account lifecycle orchestration
//!
//! Signup, sign-in, federated sign-in merge, email verification and the
//! password-reset flow. Password hashing and mail dispatch always run
//! with no store lock held.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::info;

use super::store::{IdentityStore, NewAccount};
use super::types::{AccountId, AccountOrigin, PublicProfile, ResetState, Role, VerificationState};
use crate::config::AuthConfig;
use crate::credential::CredentialService;
use crate::error::ApiError;
use crate::mailer::{Mailer, OutboundMail};

/// Successful signup / sign-in outcome.
#[derive(Debug)]
pub struct AuthSuccess {
    pub token: String,
    pub account_id: AccountId,
    /// Whether this operation created the account (federated sign-in can
    /// go either way).
    pub created: bool,
}

/// Outcome of a password-reset request. The raw token is only surfaced to
/// HTTP clients when the debug flag allows it; it always goes in the mail.
pub struct ResetIssued {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Hook for the external collaborator that owns dependent profile records.
pub trait ProfileHook: Send + Sync + 'static {
    fn account_created(&self, profile: &PublicProfile);
}

struct NoopProfileHook;

impl ProfileHook for NoopProfileHook {
    fn account_created(&self, _profile: &PublicProfile) {}
}

#[derive(Clone)]
pub struct AccountManager {
    store: Arc<Mutex<IdentityStore>>,
    credentials: CredentialService,
    mailer: Mailer,
    auth: AuthConfig,
    profile_hook: Arc<dyn ProfileHook>,
}

impl AccountManager {
    pub fn new(
        store: Arc<Mutex<IdentityStore>>,
        credentials: CredentialService,
        mailer: Mailer,
        auth: AuthConfig,
    ) -> Self {
        Self {
            store,
            credentials,
            mailer,
            auth,
            profile_hook: Arc::new(NoopProfileHook),
        }
    }

    pub fn with_profile_hook(mut self, hook: Arc<dyn ProfileHook>) -> Self {
        self.profile_hook = hook;
        self
    }

    pub fn credentials(&self) -> &CredentialService {
        &self.credentials
    }

    pub fn expose_reset_tokens(&self) -> bool {
        self.auth.expose_reset_tokens
    }

    fn store(&self) -> Result<MutexGuard<'_, IdentityStore>, ApiError> {
        self.store
            .lock()
            .map_err(|e| ApiError::internal("identity store mutex poisoned", e))
    }

    /// Create a local account. The configured admin email is redirected to
    /// the admin provisioning path before any normal signup logic runs.
    pub fn signup(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSuccess, ApiError> {
        if email.eq_ignore_ascii_case(&self.auth.admin_email) {
            return self.provision_admin(first_name, last_name, password);
        }

        let password_hash = self.credentials.hash_password(password)?;
        let verification_token = self.credentials.issue_opaque_token();

        let (account_id, profile) = {
            let mut store = self.store()?;
            let account = store.insert(NewAccount {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: email.to_string(),
                password_hash,
                origin: AccountOrigin::Local,
                role: Role::User,
                verification: VerificationState::Pending {
                    token: verification_token.clone(),
                },
            })?;
            (account.id, account.profile())
        };

        // Dependent profile record and verification mail are best-effort
        // collaborator calls; neither can roll the account back.
        self.profile_hook.account_created(&profile);
        self.mailer
            .send(OutboundMail::verification(email, &verification_token));
        info!("account {} created for {}", account_id, email);

        Ok(AuthSuccess {
            token: self.credentials.issue_session_token(account_id)?,
            account_id,
            created: true,
        })
    }

    /// The designated admin bypasses normal signup: created already
    /// verified, with the admin role and no verification mail.
    fn provision_admin(
        &self,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> Result<AuthSuccess, ApiError> {
        let password_hash = self.credentials.hash_password(password)?;
        let account_id = {
            let mut store = self.store()?;
            store
                .insert(NewAccount {
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    email: self.auth.admin_email.clone(),
                    password_hash,
                    origin: AccountOrigin::Local,
                    role: Role::Admin,
                    verification: VerificationState::Verified,
                })?
                .id
        };
        info!("admin account {} provisioned", account_id);

        Ok(AuthSuccess {
            token: self.credentials.issue_session_token(account_id)?,
            account_id,
            created: true,
        })
    }

    /// Authenticate with email and password. Verification is not required
    /// here; it gates mail-originated trust, not basic login.
    pub fn signin(&self, email: &str, password: &str) -> Result<AuthSuccess, ApiError> {
        let (account_id, password_hash) = {
            let store = self.store()?;
            let account = store.find_by_email(email).ok_or(ApiError::NotFound)?;
            (account.id, account.password_hash.clone())
        };

        if !self.credentials.verify_password(password, &password_hash) {
            return Err(ApiError::InvalidCredentials);
        }

        Ok(AuthSuccess {
            token: self.credentials.issue_session_token(account_id)?,
            account_id,
            created: false,
        })
    }

    /// Federated sign-in merging into the same identity space. An existing
    /// account authenticates by checking the provider-supplied secret
    /// against the stored hash; a mismatch means the email belongs to an
    /// incompatible provider. A fresh email creates an account under the
    /// given origin, still issued a verification token for audit purposes.
    pub fn federated_sign_in(
        &self,
        email: &str,
        provider_secret: &str,
        first_name: &str,
        last_name: &str,
        origin: AccountOrigin,
    ) -> Result<AuthSuccess, ApiError> {
        let existing = {
            let store = self.store()?;
            store
                .find_by_email(email)
                .map(|a| (a.id, a.password_hash.clone()))
        };

        if let Some((account_id, password_hash)) = existing {
            if !self.credentials.verify_password(provider_secret, &password_hash) {
                return Err(ApiError::CrossProviderConflict);
            }
            return Ok(AuthSuccess {
                token: self.credentials.issue_session_token(account_id)?,
                account_id,
                created: false,
            });
        }

        let password_hash = self.credentials.hash_password(provider_secret)?;
        let verification_token = self.credentials.issue_opaque_token();

        let (account_id, profile) = {
            let mut store = self.store()?;
            let account = store.insert(NewAccount {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: email.to_string(),
                password_hash,
                origin,
                role: Role::User,
                verification: VerificationState::Pending {
                    token: verification_token.clone(),
                },
            })?;
            (account.id, account.profile())
        };

        self.profile_hook.account_created(&profile);
        self.mailer
            .send(OutboundMail::verification(email, &verification_token));
        info!("federated account {} created via {:?}", account_id, origin);

        Ok(AuthSuccess {
            token: self.credentials.issue_session_token(account_id)?,
            account_id,
            created: true,
        })
    }

    /// Issue an expiring reset token, persist it on the account and mail
    /// the reset link.
    pub fn request_password_reset(&self, email: &str) -> Result<ResetIssued, ApiError> {
        let account_id = {
            let store = self.store()?;
            store.find_by_email(email).ok_or(ApiError::NotFound)?.id
        };

        let (token, expires_at) = self
            .credentials
            .issue_expiring_token(account_id, self.auth.reset_token_ttl_secs)?;

        self.store()?.set_reset_state(
            account_id,
            ResetState::Pending {
                token: token.clone(),
                expires_at,
            },
        )?;

        self.mailer.send(OutboundMail::password_reset(email, &token));
        info!("password reset requested for account {}", account_id);

        Ok(ResetIssued { token, expires_at })
    }

    /// Resolve a reset token to the account it belongs to. An expired
    /// token answers exactly like an unknown one.
    pub fn resolve_reset_token(&self, token: &str) -> Result<AccountId, ApiError> {
        let store = self.store()?;
        store
            .find_by_reset_token(token)
            .map(|a| a.id)
            .ok_or(ApiError::NotFound)
    }

    /// Install the new password and clear the reset sub-state in one
    /// update, then send the confirmation mail.
    pub fn reset_password(&self, account_id: AccountId, new_password: &str) -> Result<(), ApiError> {
        let password_hash = self.credentials.hash_password(new_password)?;

        let email = {
            let mut store = self.store()?;
            store.commit_password_reset(account_id, password_hash)?;
            store
                .get(account_id)
                .map(|a| a.email.clone())
                .ok_or(ApiError::NotFound)?
        };

        self.mailer.send(OutboundMail::password_changed(&email));
        info!("password reset completed for account {}", account_id);
        Ok(())
    }

    /// Consume a verification token. Wrong token and already-consumed
    /// token are indistinguishable; both report `AlreadyVerified`.
    pub fn verify_account(&self, token: &str) -> Result<(), ApiError> {
        let mut store = self.store()?;
        let account_id = store
            .find_by_verification_token(token)
            .map(|a| a.id)
            .ok_or(ApiError::AlreadyVerified)?;
        store.mark_verified(account_id)?;
        info!("account {} verified", account_id);
        Ok(())
    }

    pub fn profile(&self, account_id: AccountId) -> Result<PublicProfile, ApiError> {
        let store = self.store()?;
        store
            .get(account_id)
            .map(|a| a.profile())
            .ok_or(ApiError::NotFound)
    }
}
