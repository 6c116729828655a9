use std::sync::Arc;

use sqlx::sqlite::SqlitePool;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rosteradmin_backend::state::AppState;
use rosteradmin_backend::{apps, config, db, search, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rosteradmin_backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_config = config::load_config().expect("Failed to load configuration");
    config::init_config(app_config.clone());

    tracing::info!(
        "rosteradmin-backend v{} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME")
    );

    let data_dir = app_config.get_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| app_config.get_database_url());
    let pool = SqlitePool::connect(&database_url).await?;

    db::run_migrations(&pool).await?;
    db::seed_admin_user(&pool).await?;
    db::seed_demo_data(&pool).await?;

    let admin_base = app_config.admin_base();
    let site = Arc::new(apps::build_admin_site(&pool, &admin_base));
    let aggregator = search::SearchAggregator::new(
        site.clone(),
        app_config.search.method.strategy(),
        app_config.debug,
    );

    let state = Arc::new(AppState {
        db: pool,
        site,
        search: aggregator,
    });
    let app = server::build_router(state);

    let bind_address = app_config.get_bind_address();
    tracing::info!("Listening on http://{}", bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
