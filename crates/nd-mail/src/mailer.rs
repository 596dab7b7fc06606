//! Delivery backends.

use std::sync::Mutex;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::extension::ClientId;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use nd_config::SmtpConfig;

use crate::email::Email;
use crate::error::MailError;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// STARTTLS SMTP relay with PLAIN/LOGIN authentication.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, MailError> {
        if !config.is_configured() {
            return Err(MailError::NotConfigured(
                "smtp.address, smtp.user_name and smtp.password are required",
            ));
        }
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.address)?
            .port(config.port)
            .credentials(Credentials::new(
                config.user_name.clone(),
                config.password.clone(),
            ));
        if !config.domain.is_empty() {
            builder = builder.hello_name(ClientId::Domain(config.domain.clone()));
        }
        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let message = build_message(email)?;
        self.transport.send(message).await?;
        tracing::info!(subject = %email.subject, to = ?email.to, "mail sent");
        Ok(())
    }
}

/// Turn an [`Email`] into a MIME message.
pub fn build_message(email: &Email) -> Result<Message, MailError> {
    if email.to.is_empty() {
        return Err(MailError::NoRecipients {
            subject: email.subject.clone(),
        });
    }
    let mut builder = Message::builder()
        .from(mailbox(&email.from)?)
        .subject(&email.subject)
        .header(ContentType::TEXT_PLAIN);
    for to in &email.to {
        builder = builder.to(mailbox(to)?);
    }
    for cc in &email.cc {
        builder = builder.cc(mailbox(cc)?);
    }
    Ok(builder.body(email.body.clone())?)
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

/// Logs messages instead of sending them.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        build_message(email)?;
        tracing::info!(
            from = %email.from,
            to = ?email.to,
            cc = ?email.cc,
            subject = %email.subject,
            "mail delivery disabled\n{}",
            email.body
        );
        Ok(())
    }
}

/// Keeps every message in memory. Subjects containing a refusal marker fail.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
    refuse: Mutex<Vec<String>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse_subjects_containing(&self, marker: impl Into<String>) {
        if let Ok(mut refuse) = self.refuse.lock() {
            refuse.push(marker.into());
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        build_message(email)?;
        let refused = self
            .refuse
            .lock()
            .map(|r| r.iter().any(|m| email.subject.contains(m.as_str())))
            .unwrap_or(false);
        if refused {
            return Err(MailError::Refused {
                subject: email.subject.clone(),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }
        Ok(())
    }
}
