//! HTTP shell of the dropdown dashboard.

mod page;

pub use page::{render_page, PAGE_TITLE};

use crate::binder::{bind_dropdown, Payloads, Selection};
use crate::config::Config;
use crate::dataset::DataContext;
use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Json};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct DistrictQuery {
    pub district: Option<String>,
}

impl DistrictQuery {
    fn selection(&self) -> Selection {
        match self.district.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Selection::select(name),
            _ => Selection::Unselected,
        }
    }
}

pub fn router(ctx: Arc<DataContext>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/districts", get(districts))
        .route("/api/dashboard", get(dashboard))
        .with_state(ctx)
}

/// Dashboard page. Opens on the first district of the sheet.
async fn index(
    State(ctx): State<Arc<DataContext>>,
    Query(query): Query<DistrictQuery>,
) -> Result<Html<String>, StatusCode> {
    let selection = match query.selection() {
        Selection::Unselected => ctx
            .table
            .first()
            .map(|r| Selection::select(r.name.clone()))
            .unwrap_or_default(),
        selected => selected,
    };
    let payloads = bind_dropdown(&selection, &ctx);
    render_page(ctx.table.names(), selection.district(), &payloads)
        .map(Html)
        .map_err(|e| {
            tracing::error!(error = %e, "rendering dashboard page failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn districts(State(ctx): State<Arc<DataContext>>) -> Json<Vec<String>> {
    Json(ctx.table.names().map(str::to_string).collect())
}

async fn dashboard(State(ctx): State<Arc<DataContext>>, Query(query): Query<DistrictQuery>) -> Json<Payloads> {
    Json(bind_dropdown(&query.selection(), &ctx))
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &Config, ctx: DataContext) -> Result<()> {
    let addr = config.bind_addr();
    let app = router(Arc::new(ctx));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app).await.context("serving dashboard")?;
    Ok(())
}
