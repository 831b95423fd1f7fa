//! SMTP delivery for the composed digest.
//!
//! The digest goes out over one STARTTLS SMTP session. Connect, TLS
//! upgrade, authentication and transmission count as a single retryable
//! unit: any failure inside the session consumes one attempt of the
//! `[mailer]` retry budget and the next attempt starts the session over.

use crate::config::MailerConfig;
use crate::error::{DigestError, Result};
use crate::retry::RetryPolicy;
use lettre::message::Mailbox;
use lettre::message::header::{Header, HeaderName, HeaderValue};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

/// `X-Priority` mail header; `2` marks the message high priority.
#[derive(Debug, Clone)]
struct XPriority(String);

impl XPriority {
    fn high() -> Self {
        Self("2".to_owned())
    }
}

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(s: &str) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_owned()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// Build the digest message.
///
/// Addresses are parsed strictly; a bad sender or recipient is a
/// construction-time error, not a send failure.
pub fn compose(
    sender: &str,
    recipients: &[String],
    subject: &str,
    body: &str,
    high_priority: bool,
) -> Result<Message> {
    let from: Mailbox = sender
        .parse()
        .map_err(|e| DigestError::Mail(format!("invalid sender address '{sender}': {e}")))?;

    let mut builder = Message::builder().from(from).subject(subject);
    for recipient in recipients {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| DigestError::Mail(format!("invalid recipient address '{recipient}': {e}")))?;
        builder = builder.to(to);
    }
    if high_priority {
        builder = builder.header(XPriority::high());
    }

    builder
        .body(body.to_owned())
        .map_err(|e| DigestError::Mail(format!("cannot build message: {e}")))
}

/// SMTP mail sender.
pub struct Mailer {
    config: MailerConfig,
    retry: RetryPolicy,
}

impl Mailer {
    /// Create a mailer for the configured SMTP relay.
    pub fn new(config: MailerConfig) -> Self {
        let retry = config.retry_policy();
        Self { config, retry }
    }

    /// Send `message` through the configured relay, retrying the whole
    /// session on failure.
    pub async fn send(&self, message: &Message) -> Result<()> {
        let transport = self.transport()?;
        self.send_via(&transport, message).await
    }

    /// Retry core, generic over the transport so tests can inject a stub.
    pub async fn send_via<T>(&self, transport: &T, message: &Message) -> Result<()>
    where
        T: AsyncTransport + Sync,
        T::Error: std::fmt::Display,
    {
        let envelope = message.envelope();
        let raw = message.formatted();

        self.retry
            .run("smtp send", || async {
                debug!("opening smtp session to {}", self.config.host);
                transport
                    .send_raw(envelope, &raw)
                    .await
                    .map(|_| ())
                    .map_err(|e| DigestError::Mail(format!("smtp session failed: {e}")))
            })
            .await?;

        info!("sent digest to {} recipients", envelope.to().len());
        Ok(())
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let credentials =
            Credentials::new(self.config.username.clone(), self.config.password.clone());
        let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
            .map_err(|e| DigestError::Mail(format!("smtp transport setup failed: {e}")))?;
        Ok(builder
            .port(self.config.port)
            .credentials(credentials)
            .build())
    }
}
