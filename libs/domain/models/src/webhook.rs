// [libs/domain/models/src/webhook.rs]
/*!
 * =================================================================
 * APARATO: WEBHOOK EVENT MODEL
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DEL EVENTO DE FINALIZACIÓN DE TRABAJO
 *
 * # Invariante (At-Least-Once Payload):
 * El receptor puede observar entregas duplicadas con idéntico
 * `job_id`/`event`; el payload debe ser idempotente por construcción.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::job::{Job, JobError};

/// Cuerpo JSON enviado por POST a `webhook_url` al finalizar un trabajo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Nombre del evento: `job.completed` o `job.failed`.
    pub event: String,
    pub job_id: Uuid,
    pub job_type: String,
    pub status: String,
    /// Instante de finalización (ISO-8601) o nulo.
    pub completed_at: Option<DateTime<Utc>>,
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
}

impl WebhookEvent {
    /// Construye el evento a partir del estado terminal de un trabajo.
    pub fn from_terminal_job(job: &Job) -> Self {
        Self {
            event: format!("job.{}", job.status.as_str()),
            job_id: job.id,
            job_type: job.job_type.as_str().to_string(),
            status: job.status.as_str().to_string(),
            completed_at: job.completed_at,
            result_url: job.result_url.clone(),
            error: job.error_view(),
        }
    }
}
// FIN DEL ARCHIVO [libs/domain/models/src/webhook.rs]
