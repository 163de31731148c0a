use serde_json::json;

use crate::commands::block_on;
use consulty_core::config::{AppConfig, LoadOptions};
use consulty_db::{connect_with_settings, connection, migrations};

struct Check {
    name: &'static str,
    passed: bool,
    detail: String,
}

/// Startup readiness checks: configuration, database connectivity and
/// schema, seed presence, and oracle configuration.
pub fn run(json_output: bool) -> String {
    let mut checks = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(Check {
                name: "config",
                passed: true,
                detail: "configuration loads and validates".to_string(),
            });
            Some(config)
        }
        Err(error) => {
            checks.push(Check { name: "config", passed: false, detail: error.to_string() });
            None
        }
    };

    if let Some(config) = &config {
        match block_on(database_checks(config)) {
            Ok(mut database_checks) => checks.append(&mut database_checks),
            Err(_) => checks.push(Check {
                name: "runtime",
                passed: false,
                detail: "async runtime failed to start".to_string(),
            }),
        }

        let oracle_detail = if config.oracle.enabled {
            format!(
                "enabled ({} / {}), timeout {}s",
                provider_label(config),
                config.oracle.model,
                config.oracle.timeout_secs
            )
        } else {
            "disabled - deterministic classifier only".to_string()
        };
        checks.push(Check { name: "oracle", passed: true, detail: oracle_detail });
    }

    render(checks, json_output)
}

async fn database_checks(config: &AppConfig) -> Vec<Check> {
    let mut checks = Vec::new();

    let pool = match connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    {
        Ok(pool) => pool,
        Err(error) => {
            checks.push(Check {
                name: "database",
                passed: false,
                detail: format!("connection failed: {error}"),
            });
            return checks;
        }
    };

    let ping = connection::ping(&pool).await;
    checks.push(Check {
        name: "database",
        passed: ping.is_ok(),
        detail: match &ping {
            Ok(()) => "connected and answering".to_string(),
            Err(error) => format!("ping failed: {error}"),
        },
    });

    match migrations::run_pending(&pool).await {
        Ok(()) => checks.push(Check {
            name: "schema",
            passed: true,
            detail: "migrations applied".to_string(),
        }),
        Err(error) => checks.push(Check {
            name: "schema",
            passed: false,
            detail: format!("migration failure: {error}"),
        }),
    }

    match consulty_db::fixtures::provider_count(&pool).await {
        Ok(count) => checks.push(Check {
            name: "catalog",
            passed: count > 0,
            detail: if count > 0 {
                format!("{count} providers present")
            } else {
                "catalog empty - run `consulty seed`".to_string()
            },
        }),
        Err(error) => checks.push(Check {
            name: "catalog",
            passed: false,
            detail: format!("count query failed: {error}"),
        }),
    }

    pool.close().await;
    checks
}

fn provider_label(config: &AppConfig) -> &'static str {
    use consulty_core::config::OracleProvider::{Anthropic, Ollama, OpenAi};
    match config.oracle.provider {
        OpenAi => "openai",
        Anthropic => "anthropic",
        Ollama => "ollama",
    }
}

fn render(checks: Vec<Check>, json_output: bool) -> String {
    let all_passed = checks.iter().all(|check| check.passed);

    if json_output {
        let payload = json!({
            "command": "doctor",
            "status": if all_passed { "ok" } else { "error" },
            "checks": checks
                .iter()
                .map(|check| {
                    json!({
                        "name": check.name,
                        "passed": check.passed,
                        "detail": check.detail,
                    })
                })
                .collect::<Vec<_>>(),
        });
        return serde_json::to_string_pretty(&payload)
            .unwrap_or_else(|error| format!("{{\"error\":\"{error}\"}}"));
    }

    let mut lines = Vec::new();
    for check in &checks {
        let marker = if check.passed { "ok" } else { "FAIL" };
        lines.push(format!("  [{marker}] {:<8} {}", check.name, check.detail));
    }
    lines.push(if all_passed {
        "doctor: all checks passed".to_string()
    } else {
        "doctor: some checks failed".to_string()
    });
    lines.join("\n")
}
