/// Liveness probe
///
/// GET /health
///
/// Keys are generated before the listener binds, so a responding process
/// always has a populated registry.
pub async fn health_check() -> &'static str {
    "OK"
}
