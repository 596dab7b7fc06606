//! # nd-mail
//!
//! Backup notification mail: a small [`Email`] value and the [`Mailer`]
//! backends that deliver it (SMTP, log-only, and in-memory recording).

pub mod email;
pub mod error;
pub mod mailer;

pub use email::Email;
pub use error::MailError;
pub use mailer::{LogMailer, Mailer, RecordingMailer, SmtpMailer, build_message};
