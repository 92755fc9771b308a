// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS BARREL
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: EXPOSICIÓN PÚBLICA DE CONTRATOS DEL DOMINIO
 * =================================================================
 */

pub mod credential;
pub mod diarization;
pub mod job;
pub mod speech;
pub mod task;
pub mod transcription;
pub mod webhook;

pub use credential::Credential;
pub use diarization::{DiarizationStats, OverlapSegment, Speaker, SpeakerSegment, Utterance};
pub use job::{Job, JobError, JobProgress, JobStatus, JobType, WebhookStatus};
pub use speech::{TranscriptSegment, Word};
pub use task::{TaskDescriptor, MEDIA_PIPELINE_QUEUE, WEBHOOK_DELIVERY_QUEUE};
pub use transcription::Transcription;
pub use webhook::WebhookEvent;
// FIN DEL ARCHIVO [libs/domain/models/src/lib.rs]
