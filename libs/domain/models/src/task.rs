// [libs/domain/models/src/task.rs]
/*!
 * =================================================================
 * APARATO: TASK DESCRIPTOR MODELS
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO POLIMÓRFICO DE UNIDADES DE TRABAJO
 *
 * # Invariante (At-Least-Once Transport):
 * El descriptor es el único material que viaja por la cola. Debe ser
 * auto-contenido: el worker reconstruye todo recurso de red a partir
 * de él, sin memoria compartida con la API de ingesta.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::webhook::WebhookEvent;

/// Cola nominal de etapas de cómputo (STT + diarización).
pub const MEDIA_PIPELINE_QUEUE: &str = "media_pipeline";
/// Cola nominal de entregas de notificación.
pub const WEBHOOK_DELIVERY_QUEUE: &str = "webhooks";

/// Definición polimórfica de la unidad de trabajo despachada.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "task_kind", content = "parameters")]
pub enum TaskDescriptor {
    /// Pipeline de transcripción, con diarización opcional encadenada.
    Transcription {
        job_id: Uuid,
        /// Clave del blob de audio; nula cuando la fuente es una URL.
        blob_key: Option<String>,
        /// URL remota del audio; el worker la materializa al blob store.
        source_url: Option<String>,
        /// Idioma solicitado; nulo activa la autodetección.
        language: Option<String>,
        speaker_labels: bool,
        word_timestamps: bool,
    },
    /// Pipeline de diarización pura ("quién habló cuándo").
    Diarization {
        job_id: Uuid,
        blob_key: Option<String>,
        source_url: Option<String>,
        num_speakers: Option<u8>,
        min_speakers: Option<u8>,
        max_speakers: Option<u8>,
    },
    /// Entrega de la notificación de finalización de un trabajo.
    WebhookDelivery {
        job_id: Uuid,
        webhook_url: String,
        payload: WebhookEvent,
    },
}

impl TaskDescriptor {
    /// Cola nominal donde debe depositarse este descriptor.
    pub fn queue_name(&self) -> &'static str {
        match self {
            TaskDescriptor::Transcription { .. } | TaskDescriptor::Diarization { .. } => {
                MEDIA_PIPELINE_QUEUE
            }
            TaskDescriptor::WebhookDelivery { .. } => WEBHOOK_DELIVERY_QUEUE,
        }
    }

    /// Identificador del trabajo al que pertenece la unidad.
    pub fn job_id(&self) -> Uuid {
        match self {
            TaskDescriptor::Transcription { job_id, .. }
            | TaskDescriptor::Diarization { job_id, .. }
            | TaskDescriptor::WebhookDelivery { job_id, .. } => *job_id,
        }
    }
}
// FIN DEL ARCHIVO [libs/domain/models/src/task.rs]
