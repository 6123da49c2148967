//! Routes for static script analysis.

use axum::{Json, Router, routing::post};
use serde::Serialize;
use storyloom_analysis::ReachabilityReport;
use storyloom_core::script::Script;
use tracing::{info, instrument};

use crate::state::AppState;

/// Response body for POST /analysis.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    /// Fingerprint of the analyzed script revision.
    pub fingerprint: String,
    /// Whether any issue has error severity.
    pub has_errors: bool,
    pub report: ReachabilityReport,
}

/// POST /
#[instrument(skip(script), fields(title = %script.title, commands = script.len()))]
async fn analyze(Json(script): Json<Script>) -> Json<AnalysisResponse> {
    let report = storyloom_analysis::analyze(&script);
    info!(issues = report.issues.len(), has_errors = report.has_errors(), "script analyzed");

    Json(AnalysisResponse {
        fingerprint: script.fingerprint(),
        has_errors: report.has_errors(),
        report,
    })
}

/// Returns the router for script analysis.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(analyze))
}
