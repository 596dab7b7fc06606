//! SMTP transport and fixed mail addresses.

use serde::{Deserialize, Serialize};

const fn default_port() -> u16 {
    587
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// HELO domain.
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub password: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: default_port(),
            domain: String::new(),
            user_name: String::new(),
            password: String::new(),
        }
    }
}

impl SmtpConfig {
    pub fn is_configured(&self) -> bool {
        !self.address.is_empty() && !self.user_name.is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MailConfig {
    /// Operations mailbox: always copied, sole recipient of the full manifest.
    #[serde(default)]
    pub ops_address: String,
    /// Sender for mail that reaches external recipients.
    #[serde(default)]
    pub team_from: String,
    /// Sender for the internal manifest.
    #[serde(default)]
    pub noreply_from: String,
}

impl MailConfig {
    pub fn is_configured(&self) -> bool {
        !self.ops_address.is_empty() && !self.team_from.is_empty() && !self.noreply_from.is_empty()
    }
}
