use nd_config::NightdumpConfig;
use serde_json::Value;

const SECRET_KEYS: &[&str] = &["pass", "password", "secret_access_key"];
const MASK: &str = "****";

/// Handle `nightdump check-config`: config already validated, print it with secrets masked.
pub fn handle(config: &NightdumpConfig) -> anyhow::Result<()> {
    let summary = redacted(config)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn redacted(config: &NightdumpConfig) -> anyhow::Result<Value> {
    let mut value = serde_json::to_value(config)?;
    mask_secrets(&mut value);
    Ok(value)
}

fn mask_secrets(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                let is_secret = SECRET_KEYS.contains(&key.as_str())
                    && entry.as_str().is_some_and(|s| !s.is_empty());
                if is_secret {
                    *entry = Value::String(MASK.to_string());
                } else {
                    mask_secrets(entry);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use nd_config::StandaloneConfig;

    use super::*;

    #[test]
    fn masks_every_password_field() {
        let mut config = NightdumpConfig::default();
        config.mongo.admin.user = "admin".into();
        config.mongo.admin.pass = "hunter2".into();
        config.source.pass = "source-secret".into();
        config.storage.secret_access_key = "aws-secret".into();
        config.smtp.password = "smtp-secret".into();
        config.standalone_projects.insert(
            "Chimp & See".into(),
            StandaloneConfig {
                host: "chimps.example".into(),
                port: 27017,
                database: "chimps".into(),
                username: "reader".into(),
                password: "standalone-secret".into(),
                sanitized_excludes: vec![],
                email_recipients: vec![],
            },
        );

        let rendered = redacted(&config).expect("serializable").to_string();
        for secret in ["hunter2", "source-secret", "aws-secret", "smtp-secret", "standalone-secret"] {
            assert!(!rendered.contains(secret), "{secret} leaked: {rendered}");
        }
        assert!(rendered.contains("\"user\":\"admin\""));
        assert!(rendered.contains("chimps.example"));
    }

    #[test]
    fn empty_secrets_stay_empty() {
        let value = redacted(&NightdumpConfig::default()).expect("serializable");
        assert_eq!(value["smtp"]["password"], Value::String(String::new()));
    }
}
