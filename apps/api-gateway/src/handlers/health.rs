// [apps/api-gateway/src/handlers/health.rs]
/*!
 * =================================================================
 * APARATO: HEALTH SENTINEL HANDLER
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: SONDA DE SALUD NO AUTENTICADA
 * =================================================================
 */

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use lexia_domain_models::MEDIA_PIPELINE_QUEUE;

use crate::state::AppState;

pub struct HealthSentinelHandler;

impl HealthSentinelHandler {
    /**
     * Endpoint: GET /health (sin autenticación)
     *
     * Sondea base de datos, cola y backends de cómputo. El estado
     * global degrada si cualquier servicio no responde.
     */
    pub async fn handle_health_probe(
        State(application_state): State<AppState>,
    ) -> impl IntoResponse {
        let database_healthy = match application_state.database_client.connection() {
            Ok(connection) => connection.query("SELECT 1", ()).await.is_ok(),
            Err(_) => false,
        };

        let queue_healthy = application_state
            .task_queue
            .queue_depth(MEDIA_PIPELINE_QUEUE)
            .await
            .is_ok();

        let stt_healthy = application_state.stt_backend.health_check().await;
        let diarization_healthy = application_state.diarization_backend.health_check().await;

        let all_healthy = database_healthy && queue_healthy && stt_healthy && diarization_healthy;

        Json(json!({
            "status": if all_healthy { "healthy" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "services": {
                "database": service_verdict(database_healthy),
                "task_queue": service_verdict(queue_healthy),
                "stt": service_verdict(stt_healthy),
                "diarization": service_verdict(diarization_healthy),
            }
        }))
    }
}

fn service_verdict(is_healthy: bool) -> &'static str {
    if is_healthy { "healthy" } else { "unhealthy" }
}
// FIN DEL ARCHIVO [apps/api-gateway/src/handlers/health.rs]
