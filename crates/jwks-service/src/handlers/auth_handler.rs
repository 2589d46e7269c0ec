use crate::errors::JwksError;
use crate::models::TokenResponse;
use crate::observability::metrics::record_token_issuance;
use crate::routes::AppState;
use crate::services::issuance_service::{self, IssuanceScenario};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Query parameters accepted by the issuance endpoint
#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    /// Any non-empty value selects the expired key.
    pub expired: Option<String>,
}

impl AuthQuery {
    pub fn scenario(&self) -> IssuanceScenario {
        match self.expired.as_deref() {
            Some(value) if !value.is_empty() => IssuanceScenario::ForcedExpiredKey,
            _ => IssuanceScenario::Normal,
        }
    }
}

/// Handle token issuance
///
/// POST /auth
/// POST /auth?expired=true
///
/// The request body is ignored. On failure the client gets a generic 500;
/// the cause is logged here.
#[instrument(name = "jwks.token.issue", skip_all, fields(scenario, status))]
pub async fn handle_issue_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthQuery>,
) -> Result<Json<TokenResponse>, JwksError> {
    let start = Instant::now();
    let scenario = query.scenario();
    tracing::Span::current().record("scenario", scenario.as_str());

    let result = issuance_service::issue(
        &state.registry,
        state.signer.as_ref(),
        scenario,
        Utc::now(),
        &state.config.issuance_options(),
    );

    let status = if result.is_ok() { "success" } else { "error" };
    tracing::Span::current().record("status", status);

    let error_code = result.as_ref().err().map(JwksError::code);
    record_token_issuance(scenario.as_str(), status, error_code, start.elapsed());

    let token = result.map_err(|e| {
        tracing::error!(target: "jwks.token", error = %e, "Token issuance failed");
        e
    })?;

    Ok(Json(TokenResponse { token }))
}
