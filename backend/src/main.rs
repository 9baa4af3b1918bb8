use std::sync::Arc;

use civreg_backend::{
    config::Config,
    db::connection::create_pool,
    repositories::PgServiceRequestRepository,
    routes::build_app,
    state::AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn redact_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civreg_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        database_url = %redact_database_url(&config.database_url),
        time_zone = %config.time_zone,
        db_max_connections = config.db_max_connections,
        cors_allowed_origins = ?config.cors_allowed_origins,
        "Loaded configuration from environment/.env"
    );

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let addr = config.bind_address();
    let state = AppState::new(Arc::new(PgServiceRequestRepository::new(pool)), config);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
