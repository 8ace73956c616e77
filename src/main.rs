use std::sync::Arc;

use causerie::config::AppConfig;
use causerie::dialogue::{
    DialogueResolver, InMemorySessionStore, Phrasebook, ResolverDeps, spawn_session_sweeper,
};
use causerie::llm::create_provider;
use causerie::matching::ResponseTables;
use causerie::web::chat_routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install rustls crypto provider")?;

    // Load .env before anything reads the environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: could not load .env: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("💬 Causerie v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {} ({:?})", config.llm.model, config.llm.backend);
    eprintln!("   Locale: {:?}", config.chat.locale);
    eprintln!("   Match threshold: {}", config.chat.match_threshold);
    eprintln!("   Chat API: http://0.0.0.0:{}/chat\n", config.port);

    let llm = create_provider(&config.llm)?;

    let tables = Arc::new(ResponseTables::load(
        config.chat.special_table.as_deref(),
        config.chat.predefined_table.as_deref(),
    )?);
    tracing::info!(
        special = tables.special.len(),
        predefined = tables.predefined.len(),
        "Response tables ready"
    );

    // ── Sessions ─────────────────────────────────────────────────────────
    let store = InMemorySessionStore::new();
    let _sweeper = spawn_session_sweeper(Arc::clone(&store), config.chat.session_idle_timeout);

    // ── Resolver ─────────────────────────────────────────────────────────
    let resolver = DialogueResolver::new(ResolverDeps {
        tables,
        phrases: Arc::new(Phrasebook::for_locale(config.chat.locale)),
        llm,
        store,
    })
    .with_threshold(config.chat.match_threshold);

    let app = chat_routes(Arc::new(resolver));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Chat server started");
    axum::serve(listener, app).await?;

    Ok(())
}
