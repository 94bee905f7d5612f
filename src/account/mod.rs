//! Identity core: account records, storage and lifecycle orchestration

pub mod manager;
pub mod store;
pub mod types;

pub use manager::{AccountManager, AuthSuccess, ProfileHook, ResetIssued};
pub use store::{IdentityStore, NewAccount};
pub use types::{
    Account, AccountId, AccountOrigin, NotificationChannel, PublicProfile, ResetState, Role,
    VerificationState,
};
