pub mod account;
pub mod api;
pub mod config;
pub mod credential;
pub mod error;
pub mod follow;
pub mod mailer;
pub mod stats;
pub mod validation;
