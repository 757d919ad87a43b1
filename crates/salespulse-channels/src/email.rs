//! Email delivery via async SMTP (lettre).

use async_trait::async_trait;

use salespulse_core::config::SmtpConfig;
use salespulse_core::error::{PulseError, Result};
use salespulse_core::traits::NotificationSink;

/// SMTP-backed notification sink.
///
/// With `enabled = false` in config, sends become no-ops: in-app
/// notification rows are still written by the engine, only the outbound
/// email leg is skipped.
pub struct EmailSink {
    config: SmtpConfig,
}

impl EmailSink {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl NotificationSink for EmailSink {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        if !self.config.enabled {
            tracing::debug!("SMTP disabled — skipping email to {to}");
            return Ok(());
        }

        use lettre::{
            AsyncSmtpTransport, AsyncTransport, Message, message::Mailbox,
            message::header::ContentType, transport::smtp::authentication::Credentials,
        };

        let from_mailbox: Mailbox =
            format!("{} <{}>", self.config.from_name, self.config.from_email)
                .parse()
                .map_err(|e| PulseError::Channel(format!("Invalid from: {e}")))?;

        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| PulseError::Channel(format!("Invalid to: {e}")))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| PulseError::Channel(format!("Build email: {e}")))?;

        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        let mailer =
            AsyncSmtpTransport::<lettre::Tokio1Executor>::starttls_relay(&self.config.host)
                .map_err(|e| PulseError::Channel(format!("SMTP relay: {e}")))?
                .port(self.config.port)
                .credentials(creds)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| PulseError::Channel(format!("SMTP send: {e}")))?;

        tracing::info!("📤 Email sent to: {to}");
        Ok(())
    }
}
