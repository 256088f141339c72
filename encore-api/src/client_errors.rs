use axum::{routing::post, Router};
use serde::Deserialize;

use crate::error::{success, ApiJson, ApiResult};
use crate::state::AppState;

/// Error reported by the web client
#[derive(Debug, Deserialize)]
pub struct ClientErrorReport {
    #[serde(default)]
    pub error: serde_json::Value,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/errors", post(report_error))
}

async fn report_error(ApiJson(report): ApiJson<ClientErrorReport>) -> ApiResult<()> {
    tracing::error!(target: "client", "Client error: {}", report.error);
    success(())
}
