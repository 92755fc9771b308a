// [libs/domain/models/src/transcription.rs]
/*!
 * =================================================================
 * APARATO: TRANSCRIPTION DOMAIN MODEL
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DEL REGISTRO HIJO DE TRANSCRIPCIÓN
 *
 * # Invariante (Source Exclusivity):
 * Exactamente uno de `audio_url` / `audio_blob_key` es no nulo. La
 * fila referencia a su trabajo por `job_id`; el trabajo no guarda
 * puntero inverso (la resolución inversa usa un índice).
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diarization::{DiarizationStats, SpeakerSegment, Utterance};
use crate::speech::{TranscriptSegment, Word};

/// Registro de transcripción asociado a un trabajo de tipo transcripción.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub id: Uuid,
    pub job_id: Uuid,
    /// URL fuente del audio (exclusiva con `audio_blob_key`).
    pub audio_url: Option<String>,
    /// Clave del blob subido (exclusiva con `audio_url`).
    pub audio_blob_key: Option<String>,
    /// Código de idioma solicitado; nulo activa la autodetección.
    pub language_code: Option<String>,
    /// Diarización de hablantes solicitada en la sumisión.
    pub speaker_labels: bool,
    /// Marcas temporales a nivel de palabra solicitadas.
    pub word_timestamps: bool,
    pub text: Option<String>,
    pub words: Option<Vec<Word>>,
    pub segments: Option<Vec<TranscriptSegment>>,
    pub language_detected: Option<String>,
    pub language_confidence: Option<f64>,
    /// Confianza media de palabra como confianza global del resultado.
    pub confidence: Option<f64>,
    /// Etiquetas de hablante detectadas, en orden de primera aparición.
    pub speakers: Option<Vec<String>>,
    pub utterances: Option<Vec<Utterance>>,
    pub diarization_segments: Option<Vec<SpeakerSegment>>,
    pub diarization_stats: Option<DiarizationStats>,
    pub error_message: Option<String>,
    pub principal_id: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
// FIN DEL ARCHIVO [libs/domain/models/src/transcription.rs]
