//! Best-effort outbound mail
//!
//! Mail is a capability the identity core invokes, never a correctness
//! dependency: a dispatch failure is logged and the primary operation
//! proceeds. Messages go over an mpsc channel to a drain task so no store
//! lock is ever held while a transport is in flight.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailKind {
    Verification,
    PasswordReset,
    PasswordChanged,
}

#[derive(Debug, Clone)]
pub struct OutboundMail {
    pub to: String,
    pub kind: MailKind,
    pub subject: String,
    pub body: String,
}

impl OutboundMail {
    pub fn verification(to: &str, token: &str) -> Self {
        Self {
            to: to.to_string(),
            kind: MailKind::Verification,
            subject: "Verify your account".to_string(),
            body: format!("Visit /auth/verify/{} to confirm your account", token),
        }
    }

    pub fn password_reset(to: &str, token: &str) -> Self {
        Self {
            to: to.to_string(),
            kind: MailKind::PasswordReset,
            subject: "Reset your password".to_string(),
            body: format!("Visit /auth/resetPassword?token={} to choose a new password", token),
        }
    }

    pub fn password_changed(to: &str) -> Self {
        Self {
            to: to.to_string(),
            kind: MailKind::PasswordChanged,
            subject: "Your password was changed".to_string(),
            body: "Your password was just reset. If this wasn't you, contact support.".to_string(),
        }
    }
}

/// Delivery backend. The real deployment plugs an SMTP/API transport in
/// here; the default just logs.
#[async_trait]
pub trait MailTransport: Send + Sync + 'static {
    async fn deliver(&self, mail: OutboundMail) -> Result<(), String>;
}

pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn deliver(&self, mail: OutboundMail) -> Result<(), String> {
        tracing::info!("mail to {}: {} ({:?})", mail.to, mail.subject, mail.kind);
        Ok(())
    }
}

/// Cheap handle handed to the account manager. `send` never blocks and
/// never fails the caller.
#[derive(Clone)]
pub struct Mailer {
    tx: mpsc::Sender<OutboundMail>,
}

impl Mailer {
    /// Spawn the drain task for `transport` and return the send handle.
    pub fn spawn<T: MailTransport>(transport: T) -> Self {
        let (tx, mut rx) = mpsc::channel::<OutboundMail>(256);
        tokio::spawn(async move {
            while let Some(mail) = rx.recv().await {
                let to = mail.to.clone();
                if let Err(e) = transport.deliver(mail).await {
                    warn!("mail delivery to {} failed: {}", to, e);
                }
            }
        });
        Self { tx }
    }

    pub fn send(&self, mail: OutboundMail) {
        if let Err(e) = self.tx.try_send(mail) {
            warn!("mail dispatch failed: {}", e);
        }
    }
}
