use rollcall::{db, AppState, Config};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting rollcall v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let db_pool = db::connect(&config.database_url, config.max_connections).await?;
    info!("Database ready at {}", config.database_url);

    if config.dev_login {
        warn!("DEV_LOGIN is on: anyone can pick an owner id at POST /dev/login");
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("rollcall listening on http://{}", config.bind_addr);

    let app = rollcall::app(AppState::new(db_pool, config));
    axum::serve(listener, app).await?;

    Ok(())
}
