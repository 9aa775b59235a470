use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use surveymeter_backend::{
    config::{get_config, init_config, StorageKind},
    database::{
        pool::{create_pool, run_migrations},
        MemorySurveyRepository, PgSurveyRepository,
    },
    routes,
    services::access_control::JwtAccessControl,
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let access = Arc::new(JwtAccessControl::new(&config.jwt_secret));
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let app = match config.storage {
        StorageKind::Postgres => {
            let pool = create_pool(config).await?;
            run_migrations(&pool).await?;
            info!("Connected to Postgres, migrations applied");
            let state = AppState::new(PgSurveyRepository::new(pool), access, config.survey);
            routes::router(state, timeout)
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory storage; surveys are lost on restart");
            let state = AppState::new(MemorySurveyRepository::new(), access, config.survey);
            routes::router(state, timeout)
        }
    };

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
