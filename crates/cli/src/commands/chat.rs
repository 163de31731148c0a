use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::commands::{block_on, CommandResult};
use consulty_agent::{
    AgentRuntime, ClassifierStack, HttpOracleClient, InMemorySessionStore, OracleClassifier,
};
use consulty_core::booking::AppointmentStore;
use consulty_core::config::{AppConfig, LoadOptions};
use consulty_core::domain::session::SessionId;
use consulty_core::domain::turn::{HistoryEntry, TurnRequest};
use consulty_core::ranking::ProviderCatalog;
use consulty_db::{
    connect_with_settings, fixtures, migrations, CatalogSeedDataset, DbPool,
    InMemoryAppointmentStore, InMemoryProviderCatalog, SqlAppointmentStore, SqlProviderCatalog,
};

/// Transcript window replayed to the engine each turn.
const HISTORY_WINDOW: usize = 10;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    init_logging(&config);

    match block_on(chat_loop(config)) {
        Ok(result) => result,
        Err(failure) => failure,
    }
}

async fn chat_loop(config: AppConfig) -> CommandResult {
    let (catalog, appointments) = storage(&config).await;

    let classifier = if config.oracle.enabled {
        ClassifierStack::with_oracle(OracleClassifier::new(
            Box::new(HttpOracleClient::from_config(&config.oracle)),
            Duration::from_secs(config.oracle.timeout_secs),
        ))
    } else {
        ClassifierStack::rules_only()
    };

    let runtime =
        AgentRuntime::new(classifier, catalog, InMemorySessionStore::new(), appointments)
            .with_limits(config.engine.max_results, config.engine.attached_providers);
    let session = SessionId("local-chat".to_string());
    let mut history: Vec<HistoryEntry> = Vec::new();
    let mut turns = 0usize;

    println!("consulty chat - describe what you need, or type 'exit' to quit.");
    let stdin = io::stdin();
    loop {
        print!("you> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(error) => {
                return CommandResult::failure("chat", "stdin", error.to_string(), 4);
            }
        }

        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }

        let request = TurnRequest {
            message: message.to_string(),
            user_id: None,
            session_id: session.clone(),
            history: history.clone(),
        };
        let response = runtime.handle_turn(&request).await;
        println!("consulty> {}", response.text);

        history.push(HistoryEntry {
            user_message: message.to_string(),
            bot_response: response.text.clone(),
            metadata: response.metadata(),
        });
        if history.len() > HISTORY_WINDOW {
            let excess = history.len() - HISTORY_WINDOW;
            history.drain(..excess);
        }
        turns += 1;
    }

    CommandResult::success("chat", format!("session ended after {turns} turn(s)"))
}

/// Prefer the configured database; fall back to the seeded in-memory
/// catalog so the chat loop works on a fresh checkout.
async fn storage(config: &AppConfig) -> (Box<dyn ProviderCatalog>, Box<dyn AppointmentStore>) {
    match prepared_pool(config).await {
        Some(pool) => (
            Box::new(SqlProviderCatalog::new(pool.clone())),
            Box::new(SqlAppointmentStore::new(pool)),
        ),
        None => {
            tracing::warn!(
                event_name = "chat.memory_catalog_fallback",
                "database unavailable, using the seeded in-memory catalog"
            );
            (
                Box::new(InMemoryProviderCatalog::seeded()),
                Box::new(InMemoryAppointmentStore::default()),
            )
        }
    }
}

async fn prepared_pool(config: &AppConfig) -> Option<DbPool> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .ok()?;
    migrations::run_pending(&pool).await.ok()?;

    if fixtures::provider_count(&pool).await.unwrap_or(0) == 0 {
        CatalogSeedDataset::load(&pool).await.ok()?;
    }
    Some(pool)
}

fn init_logging(config: &AppConfig) {
    use consulty_core::config::LogFormat::{Compact, Json, Pretty};
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}
