//! Demo server: registers a `notes` table and serves it at /api/v1/notes.
//!
//! Run from repo root: `cargo run -p demo-server`
//! Configure with DATABASE_URL, AUTOREST_BIND, AUTOREST_STORE_TIMEOUT_MS, ... (see `Settings`).

use autorest::{
    common_routes, path_routes, store, Column, ColumnType, Endpoints, Record, RecordShape,
    RegisteredType, Settings,
};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Note {
    #[serde(rename = "ID")]
    id: u64,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Body")]
    body: String,
    #[serde(rename = "Pinned")]
    pinned: bool,
    #[serde(rename = "Tags")]
    tags: Vec<String>,
}

impl Record for Note {
    const SHAPE: RecordShape = RecordShape::new(
        "notes",
        &[
            Column::new("Title", ColumnType::Text),
            Column::new("Body", ColumnType::Text),
            Column::new("Pinned", ColumnType::Boolean),
            Column::new("Tags", ColumnType::Json),
        ],
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("autorest=info,demo_server=info")),
        )
        .init();

    let store = store::connect(&settings).await?;
    let mut notes = RegisteredType::<Note>::register(store).await?;
    if let Some(timeout) = settings.store_timeout {
        notes = notes.with_timeout(timeout);
    }
    tracing::info!(table = notes.shape().table, "serving notes at /api/v1/notes");

    let app = Router::new()
        .merge(common_routes())
        .merge(path_routes(Arc::new(notes), Endpoints::ALL, "/api/v1/notes"))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(settings.body_limit)),
        );

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
