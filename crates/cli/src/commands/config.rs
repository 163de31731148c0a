use secrecy::ExposeSecret;
use serde_json::json;

use consulty_core::config::{AppConfig, LoadOptions, LogFormat, OracleProvider};

/// Print effective configuration with secrets redacted.
pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return json!({
                "command": "config",
                "status": "error",
                "error_class": "config_validation",
                "message": format!("configuration issue: {error}"),
            })
            .to_string();
        }
    };

    let api_key = config.oracle.api_key.as_ref().map(|secret| {
        if secret.expose_secret().is_empty() { "(empty)" } else { "***redacted***" }
    });

    let payload = json!({
        "command": "config",
        "status": "ok",
        "database": {
            "url": config.database.url,
            "max_connections": config.database.max_connections,
            "timeout_secs": config.database.timeout_secs,
        },
        "oracle": {
            "enabled": config.oracle.enabled,
            "provider": provider_name(config.oracle.provider),
            "api_key": api_key,
            "base_url": config.oracle.base_url,
            "model": config.oracle.model,
            "timeout_secs": config.oracle.timeout_secs,
            "max_retries": config.oracle.max_retries,
        },
        "engine": {
            "max_results": config.engine.max_results,
            "attached_providers": config.engine.attached_providers,
        },
        "logging": {
            "level": config.logging.level,
            "format": format_name(config.logging.format),
        },
    });

    serde_json::to_string_pretty(&payload).unwrap_or_else(|error| {
        json!({
            "command": "config",
            "status": "error",
            "error_class": "serialization",
            "message": error.to_string(),
        })
        .to_string()
    })
}

fn provider_name(provider: OracleProvider) -> &'static str {
    match provider {
        OracleProvider::OpenAi => "openai",
        OracleProvider::Anthropic => "anthropic",
        OracleProvider::Ollama => "ollama",
    }
}

fn format_name(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn output_is_json_and_never_leaks_secrets() {
        let output = super::run();
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("json output");
        if parsed["status"] == "ok" {
            assert!(parsed["oracle"].get("api_key").is_some());
            assert!(!output.contains("sk-"));
        }
    }
}
