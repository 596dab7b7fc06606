use nd_config::NightdumpConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &NightdumpConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &NightdumpConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
    let mut warnings = Vec::new();

    let sections = [
        ("storage", config.storage.is_configured(), "NIGHTDUMP_STORAGE", "NIGHTDUMP_STORAGE__BUCKET"),
        ("smtp", config.smtp.is_configured(), "NIGHTDUMP_SMTP", "NIGHTDUMP_SMTP__ADDRESS"),
        ("mail", config.mail.is_configured(), "NIGHTDUMP_MAIL", "NIGHTDUMP_MAIL__OPS_ADDRESS"),
        ("mongo admin", config.mongo.admin.is_configured(), "NIGHTDUMP_MONGO", "NIGHTDUMP_MONGO__ADMIN__PASS"),
    ];
    for (name, configured, prefix, example) in sections {
        if !configured && has_single_underscore_key(&env_keys, prefix) {
            warnings.push(format!(
                "{name} config appears default while {prefix}_* env vars exist. Use double underscores (example: {example})."
            ));
        }
    }

    warnings
}

/// A key under `prefix` that uses `_` where `__` was meant.
fn has_single_underscore_key(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| {
        key.strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('_') && !rest.starts_with("__"))
    })
}
