// [apps/api-gateway/src/routes.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY ROUTING MATRIX
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE ESTRATOS Y ESCUDOS PERIMETRALES
 *
 * Topología: /health queda fuera de los escudos; el resto de la
 * superficie pasa por el guardia de autenticación y, tras él, por el
 * guardia de cuota (que exime GET y la cancelación por sí mismo).
 * =================================================================
 */

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{
    api_keys::CredentialGovernanceHandler, diarization::DiarizationHandler,
    health::HealthSentinelHandler, jobs::JobGovernanceHandler,
    transcriptions::TranscriptionHandler,
};
use crate::middleware::{auth_guard, rate_limit_guard};
use crate::state::AppState;

pub fn create_gateway_router(application_shared_state: AppState) -> Router {
    // Escudo de red: CORS para consolas de cliente y herramientas de Ops.
    let network_security_shield = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    // Margen sobre el tope de carga para cabeceras multipart.
    let body_limit_bytes =
        (application_shared_state.config.max_upload_bytes() + 1024 * 1024) as usize;

    // ESTRATO DE GOBERNANZA DE CREDENCIALES
    let credential_stratum = Router::new()
        .route(
            "/api-keys",
            post(CredentialGovernanceHandler::handle_issue_credential)
                .get(CredentialGovernanceHandler::handle_list_credentials),
        )
        .route(
            "/api-keys/:id/revoke",
            post(CredentialGovernanceHandler::handle_revoke_credential),
        )
        .route(
            "/api-keys/:id",
            delete(CredentialGovernanceHandler::handle_delete_credential),
        );

    // ESTRATO DE INGESTA Y SONDEO DE MEDIOS
    let media_stratum = Router::new()
        .route(
            "/v1/transcriptions",
            post(TranscriptionHandler::handle_create_transcription),
        )
        .route(
            "/v1/transcriptions/sync",
            post(TranscriptionHandler::handle_sync_transcription),
        )
        .route(
            "/v1/transcriptions/:id",
            get(TranscriptionHandler::handle_get_transcription)
                .delete(TranscriptionHandler::handle_delete_transcription),
        )
        .route(
            "/v1/diarization",
            post(DiarizationHandler::handle_create_diarization),
        )
        .route(
            "/v1/diarization/sync",
            post(DiarizationHandler::handle_sync_diarization),
        )
        .route(
            "/v1/diarization/:id",
            get(DiarizationHandler::handle_get_diarization),
        );

    // ESTRATO DE GOBERNANZA DE TRABAJOS
    let job_stratum = Router::new()
        .route("/v1/jobs", get(JobGovernanceHandler::handle_list_jobs))
        .route(
            "/v1/jobs/:id",
            get(JobGovernanceHandler::handle_get_job)
                .delete(JobGovernanceHandler::handle_cancel_job),
        );

    // COMPOSICIÓN GLOBAL (los escudos envuelven sólo la zona protegida)
    Router::new()
        .merge(credential_stratum)
        .merge(media_stratum)
        .merge(job_stratum)
        .layer(middleware::from_fn_with_state(
            application_shared_state.clone(),
            rate_limit_guard,
        ))
        .layer(middleware::from_fn_with_state(
            application_shared_state.clone(),
            auth_guard,
        ))
        .route("/health", get(HealthSentinelHandler::handle_health_probe))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(network_security_shield)
        .with_state(application_shared_state)
}
// FIN DEL ARCHIVO [apps/api-gateway/src/routes.rs]
