/// A plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl Email {
    pub fn new(from: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: Vec::new(),
            cc: Vec::new(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Add recipients, skipping blanks and duplicates.
    #[must_use]
    pub fn to<I, S>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.to, recipients);
        self
    }

    #[must_use]
    pub fn cc<I, S>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.cc, recipients);
        self
    }
}

fn push_unique<I, S>(list: &mut Vec<String>, recipients: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for recipient in recipients {
        let recipient = recipient.into();
        let trimmed = recipient.trim();
        if !trimmed.is_empty() && !list.iter().any(|r| r == trimmed) {
            list.push(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn recipients_are_deduplicated() {
        let email = Email::new("team@example.org", "s", "b")
            .to(["a@example.org", " a@example.org ", "", "b@example.org"])
            .cc(["ops@example.org"]);
        assert_eq!(email.to, vec!["a@example.org", "b@example.org"]);
        assert_eq!(email.cc, vec!["ops@example.org"]);
    }
}
