use dotenvy::dotenv;
use finance_buddy::{
    api::{self, AppState},
    config::{self, database},
    core::clock::SystemClock,
    errors::Result,
    worker,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    if app_config.auth.proxy_secret.is_none() {
        warn!("No auth.proxy_secret configured, user-scoped requests will be rejected");
    }

    // 4. Connect and make sure the schema exists
    let db = database::create_connection(&app_config.database.url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    database::seed_global_categories(&db, &app_config.categories).await?;

    // 5. Shared state for the API and the recurrence worker
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let state = AppState::new(db, Arc::new(app_config), Arc::new(SystemClock));

    let worker = worker::spawn_recurrence_worker(state.clone(), shutdown_signal());

    // 6. Serve until Ctrl+C
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = worker.await {
        error!("Recurrence worker ended abnormally: {}", e);
    }
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
