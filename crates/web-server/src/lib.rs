use auth::Auth;
use axum::{
    Router,
    routing::{get, post},
};
use chrono::Duration;
use configuration::settings::Config;
use database::DbRepository;
use ledger::Ledger;
use quotes::{HttpQuoteClient, QuoteProvider};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod session;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub ledger: Ledger<DbRepository>,
    pub auth: Auth<DbRepository>,
}

/// The main function to configure and run the web server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let db_pool = database::connect().await?;
    database::run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool);

    let quote_client: Arc<dyn QuoteProvider> =
        Arc::new(HttpQuoteClient::new(&config.quotes.base_url)?);
    let ledger = Ledger::new(db_repo.clone(), quote_client);
    let auth = Auth::new(
        db_repo,
        Duration::minutes(config.sessions.ttl_minutes),
        config.ledger.starting_cash,
    );

    let app_state = Arc::new(AppState { ledger, auth });
    let app = router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router. Split out of `run_server` so the route
/// table is visible in one place.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/", get(handlers::index))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        // Logout is also reachable by plain link, so GET is accepted too.
        .route("/logout", get(handlers::logout).post(handlers::logout))
        .route("/buy", post(handlers::buy))
        .route("/sell", post(handlers::sell))
        .route("/quote", get(handlers::quote).post(handlers::quote_form))
        .route("/history", get(handlers::history))
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}
