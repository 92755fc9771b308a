// [apps/api-gateway/src/handlers/jobs.rs]
/*!
 * =================================================================
 * APARATO: JOB GOVERNANCE HANDLER
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: LISTADO, SONDEO Y CANCELACIÓN DE TRABAJOS
 *
 * # Invariante (Existence Hiding):
 * Un trabajo ajeno y un trabajo inexistente producen exactamente el
 * mismo cuerpo 404 (`job_not_found`).
 *
 * # Invariante (Cooperative Cancel):
 * La cancelación sólo procede desde pending/queued. La revocación del
 * handle en la cola es best-effort; la base de datos arbitra la
 * carrera contra el worker.
 * =================================================================
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use lexia_domain_models::{Job, JobError, JobProgress, JobStatus, JobType};
use lexia_infra_db::repositories::JobRepository;

use crate::errors::ApiError;
use crate::handlers::transcriptions::parse_identifier;
use crate::middleware::AuthenticatedPrincipal;
use crate::state::AppState;

/// Tope duro de paginación del listado.
const MAX_PAGE_SIZE: u32 = 100;

/// Vista pública completa de un trabajo.
#[derive(Serialize)]
pub struct JobView {
    pub id: uuid::Uuid,
    #[serde(rename = "type")]
    pub job_type: &'static str,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<JobProgress>,
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
    pub webhook_url: Option<String>,
    pub principal: String,
}

impl JobView {
    pub fn from_job(job: Job) -> Self {
        Self {
            id: job.id,
            job_type: job.job_type.as_str(),
            status: job.status.as_str(),
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
            progress: job.progress_view(),
            error: job.error_view(),
            result_url: job.result_url.clone(),
            result: job.result.clone(),
            webhook_url: job.webhook_url.clone(),
            principal: job.principal_id,
        }
    }
}

#[derive(Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<String>,
    pub job_type: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub struct JobGovernanceHandler;

impl JobGovernanceHandler {
    /**
     * Endpoint: GET /v1/jobs
     *
     * Listado paginado de los trabajos del principal, más recientes
     * primero, con filtros opcionales de estado y tipo.
     */
    pub async fn handle_list_jobs(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        Query(query): Query<ListJobsQuery>,
    ) -> Result<impl IntoResponse, ApiError> {
        let status_filter = query
            .status
            .as_deref()
            .map(|raw_status| {
                JobStatus::parse(raw_status).ok_or_else(|| {
                    ApiError::validation(
                        format!("Unknown job status filter: {}", raw_status),
                        Some("status"),
                        None,
                    )
                })
            })
            .transpose()?;

        let type_filter = query
            .job_type
            .as_deref()
            .map(|raw_type| {
                JobType::parse(raw_type).ok_or_else(|| {
                    ApiError::validation(
                        format!("Unknown job type filter: {}", raw_type),
                        Some("job_type"),
                        None,
                    )
                })
            })
            .transpose()?;

        let page_limit = query.limit.unwrap_or(50).min(MAX_PAGE_SIZE).max(1);
        let page_offset = query.offset.unwrap_or(0);

        let job_repository = JobRepository::new(application_state.database_client.clone());
        let jobs = job_repository
            .list_by_principal(
                caller.principal_id(),
                status_filter,
                type_filter,
                page_limit,
                page_offset,
            )
            .await?;

        let views: Vec<JobView> = jobs.into_iter().map(JobView::from_job).collect();
        Ok(Json(views))
    }

    /**
     * Endpoint: GET /v1/jobs/{id}
     */
    pub async fn handle_get_job(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        Path(raw_identifier): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        let job_id = parse_identifier(&raw_identifier, "job_id")?;

        let job_repository = JobRepository::new(application_state.database_client.clone());
        let job = job_repository
            .find_by_id(job_id)
            .await?
            .filter(|record| record.principal_id == caller.principal_id())
            .ok_or_else(|| ApiError::job_not_found(&raw_identifier))?;

        Ok(Json(JobView::from_job(job)))
    }

    /**
     * Endpoint: DELETE /v1/jobs/{id} (204)
     *
     * Cancelación cooperativa: revoca el handle de la cola
     * (best-effort) y sella `cancelled` sólo desde pending/queued.
     *
     * # Errors:
     * - `job_not_cancellable`: Estado processing o terminal.
     */
    #[instrument(skip_all, fields(job = %raw_identifier))]
    pub async fn handle_cancel_job(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        Path(raw_identifier): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        let job_id = parse_identifier(&raw_identifier, "job_id")?;

        let job_repository = JobRepository::new(application_state.database_client.clone());
        let job = job_repository
            .find_by_id(job_id)
            .await?
            .filter(|record| record.principal_id == caller.principal_id())
            .ok_or_else(|| ApiError::job_not_found(&raw_identifier))?;

        if !job.status.is_cancellable() {
            return Err(ApiError::CannotCancel);
        }

        // 1. REVOCACIÓN BEST-EFFORT DEL HANDLE EN LA COLA
        if let Some(queue_handle) = &job.queue_handle {
            match application_state.task_queue.revoke(queue_handle).await {
                Ok(true) => info!("🧹 [CANCEL]: Queue task {} revoked.", queue_handle),
                Ok(false) => warn!("⚪ [CANCEL]: Queue task {} beyond revocation.", queue_handle),
                Err(queue_fault) => {
                    warn!("⚠️ [CANCEL]: Queue revoke failed (ignored): {}.", queue_fault)
                }
            }
        }

        // 2. SELLADO EN EL LEDGER (ÁRBITRO DE LA CARRERA)
        if !job_repository.cancel(job_id).await? {
            // Un worker tomó la tarea entre la lectura y el sellado.
            return Err(ApiError::CannotCancel);
        }

        info!("🛑 [CANCEL]: Job {} cancelled by its principal.", job_id);
        Ok(StatusCode::NO_CONTENT)
    }
}
// FIN DEL ARCHIVO [apps/api-gateway/src/handlers/jobs.rs]
