pub mod smtp;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

#[derive(Debug)]
pub enum NotifyError {
    InvalidConfig(String),
    SendFailed(String),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::InvalidConfig(e) => write!(f, "Invalid mail configuration: {e}"),
            NotifyError::SendFailed(e) => write!(f, "Failed to send mail: {e}"),
        }
    }
}

/// Outbound notification port for the approval workflow.
///
/// Both sends are fire-and-forget from the workflow's point of view: the
/// caller logs failures and never lets them affect a committed transition.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Welcome a leader whose LifeLine was approved. `temp_credential` is
    /// present only when the workflow created the account just now.
    async fn send_welcome(
        &self,
        email: &str,
        display_name: &str,
        temp_credential: Option<&str>,
        group_title: &str,
    ) -> Result<(), NotifyError>;

    async fn send_rejection(
        &self,
        email: &str,
        display_name: &str,
        group_title: &str,
        reason: Option<&str>,
    ) -> Result<(), NotifyError>;
}

/// Notifier used when no SMTP host is configured. Records the event in the
/// server log and reports success, so environments without a mail relay
/// still provision normally. Credentials are withheld from the log line.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_welcome(
        &self,
        email: &str,
        _display_name: &str,
        temp_credential: Option<&str>,
        group_title: &str,
    ) -> Result<(), NotifyError> {
        log::info!(
            "Mail disabled — welcome for LifeLine '{}' to {} not sent (credential included: {})",
            group_title,
            email,
            temp_credential.is_some()
        );
        Ok(())
    }

    async fn send_rejection(
        &self,
        email: &str,
        _display_name: &str,
        group_title: &str,
        _reason: Option<&str>,
    ) -> Result<(), NotifyError> {
        log::info!("Mail disabled — rejection for LifeLine '{group_title}' to {email} not sent");
        Ok(())
    }
}

/// Build the notifier from SMTP_* environment variables. Falls back to the
/// logging notifier when SMTP_HOST is unset or the transport can't be built.
pub fn from_env() -> Arc<dyn Notifier> {
    let Ok(host) = std::env::var("SMTP_HOST") else {
        log::warn!("No SMTP_HOST set — notifications will only be logged");
        return Arc::new(LogNotifier);
    };

    let port = std::env::var("SMTP_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(587);
    let username = std::env::var("SMTP_USERNAME").ok();
    let password = std::env::var("SMTP_PASSWORD").ok();
    let use_tls = std::env::var("SMTP_TLS")
        .map(|v| v != "false")
        .unwrap_or(true);
    let from = std::env::var("MAIL_FROM")
        .unwrap_or_else(|_| "LifeLine Team <noreply@localhost>".to_string());

    match smtp::SmtpNotifier::new(&host, port, username, password, use_tls, from) {
        Ok(notifier) => {
            log::info!("Sending notifications via SMTP relay {host}:{port}");
            Arc::new(notifier)
        }
        Err(e) => {
            log::error!("SMTP setup failed ({e}) — notifications will only be logged");
            Arc::new(LogNotifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        assert!(
            notifier
                .send_welcome("leader@parish.test", "Pat", Some("secret"), "Young Families")
                .await
                .is_ok()
        );
        assert!(
            notifier
                .send_rejection("leader@parish.test", "Pat", "Young Families", None)
                .await
                .is_ok()
        );
    }
}
