//! Server assembly and startup

use std::sync::Arc;

use anyhow::Result;
use keystone_core::Database;
use tracing::info;

use crate::config::Config;
use crate::mailer::Mailer;
use crate::routes;
use crate::state::AppState;

pub async fn run(config: Config) -> Result<()> {
    let db = Database::open(&config.database_path).await?;

    let state = AppState {
        db: Arc::new(db),
        mailer: Arc::new(Mailer::new(config.mail.clone())),
        config: Arc::new(config.clone()),
    };

    let addr = config.http_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
