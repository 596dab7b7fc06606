use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("message {subject:?} has no recipients")]
    NoRecipients { subject: String },

    #[error("smtp not configured: {0}")]
    NotConfigured(&'static str),

    /// Delivery refused by a test mailer.
    #[error("delivery of {subject:?} refused")]
    Refused { subject: String },
}
