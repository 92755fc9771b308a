// [libs/domain/models/src/job.rs]
/*!
 * =================================================================
 * APARATO: JOB DOMAIN MODEL
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DEL CICLO DE VIDA DE TRABAJOS ASÍNCRONOS
 *
 * # Invariante (Lifecycle DAG):
 * Las transiciones de estado forman un grafo acíclico dirigido:
 * pending → queued → processing → {completed | failed}, con
 * cancelación permitida únicamente desde pending/queued. Todo estado
 * terminal es inmutable a perpetuidad.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Estados del ciclo de vida de un trabajo asíncrono.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Fila creada, tarea aún no aceptada por la cola. Transitorio.
    Pending,
    /// Tarea aceptada por la cola. Cancelación permitida.
    Queued,
    /// Un worker ha iniciado la ejecución. Progreso permitido.
    Processing,
    /// Terminal: resultado presente.
    Completed,
    /// Terminal: error_code y error_message presentes.
    Failed,
    /// Terminal: revocación best-effort de la tarea encolada.
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw_status: &str) -> Option<Self> {
        match raw_status {
            "pending" => Some(JobStatus::Pending),
            "queued" => Some(JobStatus::Queued),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            "cancelled" => Some(JobStatus::Cancelled),
            _ => None,
        }
    }

    /// Un estado terminal no admite transición posterior alguna.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }

    /// Tabla de transiciones legales del DAG de ciclo de vida.
    pub fn can_transition_to(&self, target_status: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, target_status),
            (Pending, Queued)
                | (Pending, Cancelled)
                | (Queued, Processing)
                | (Queued, Cancelled)
                | (Processing, Completed)
                | (Processing, Failed)
        )
    }

    /// La cancelación vía API sólo procede antes de que un worker tome la tarea.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Queued)
    }
}

/// Clasificación del trabajo según el pipeline de cómputo requerido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Transcription,
    Diarization,
    TranscriptionWithDiarization,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Transcription => "transcription",
            JobType::Diarization => "diarization",
            JobType::TranscriptionWithDiarization => "transcription_with_diarization",
        }
    }

    pub fn parse(raw_type: &str) -> Option<Self> {
        match raw_type {
            "transcription" => Some(JobType::Transcription),
            "diarization" => Some(JobType::Diarization),
            "transcription_with_diarization" => Some(JobType::TranscriptionWithDiarization),
            _ => None,
        }
    }
}

/// Estado de entrega de la notificación de finalización.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    /// Sin intento de entrega registrado (o trabajo sin webhook_url).
    Pending,
    /// Tarea de entrega encolada en la cola de webhooks.
    Queued,
    /// Entrega confirmada con respuesta 2xx.
    Delivered,
    /// Presupuesto de reintentos agotado. Sólo se registra en el log.
    Failed,
}

impl WebhookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookStatus::Pending => "pending",
            WebhookStatus::Queued => "queued",
            WebhookStatus::Delivered => "delivered",
            WebhookStatus::Failed => "failed",
        }
    }

    pub fn parse(raw_status: &str) -> Option<Self> {
        match raw_status {
            "pending" => Some(WebhookStatus::Pending),
            "queued" => Some(WebhookStatus::Queued),
            "delivered" => Some(WebhookStatus::Delivered),
            "failed" => Some(WebhookStatus::Failed),
            _ => None,
        }
    }
}

/// Progreso publicado por el worker durante la fase `processing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProgress {
    /// Porcentaje entero 0-100, monótonamente no decreciente.
    pub percentage: u8,
    /// Hito legible ("Downloading audio", "Transcribing audio"...).
    pub message: Option<String>,
}

/// Detalle de fallo registrado sobre la fila del trabajo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    pub code: String,
    pub message: String,
}

/// Unidad durable de trabajo asíncrono con su ranura de resultado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    /// Parámetros opacos capturados en la sumisión.
    pub params: serde_json::Value,
    /// Principal propietario; gobierna visibilidad y cancelación.
    pub principal_id: String,
    /// Credencial emisora de la sumisión.
    pub credential_id: Uuid,
    pub webhook_url: Option<String>,
    /// Handle opaco devuelto por la cola al encolar. Nulo hasta el despacho.
    pub queue_handle: Option<String>,
    pub progress_percent: u8,
    pub progress_message: Option<String>,
    pub result: Option<serde_json::Value>,
    pub result_url: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub webhook_status: WebhookStatus,
}

impl Job {
    /// Vista de progreso para el consumidor; nula mientras no haya avance.
    pub fn progress_view(&self) -> Option<JobProgress> {
        if self.progress_percent > 0 {
            Some(JobProgress {
                percentage: self.progress_percent,
                message: self.progress_message.clone(),
            })
        } else {
            None
        }
    }

    /// Vista de error; presente si y sólo si el trabajo está en `failed`.
    pub fn error_view(&self) -> Option<JobError> {
        self.error_message.as_ref().map(|message| JobError {
            code: self.error_code.clone().unwrap_or_else(|| "internal_error".to_string()),
            message: message.clone(),
        })
    }
}
// FIN DEL ARCHIVO [libs/domain/models/src/job.rs]
