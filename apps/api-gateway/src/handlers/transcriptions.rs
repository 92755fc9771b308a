// [apps/api-gateway/src/handlers/transcriptions.rs]
/*!
 * =================================================================
 * APARATO: TRANSCRIPTION INGESTION HANDLER
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: INGESTA, SONDEO, BORRADO Y TRANSCRIPCIÓN SÍNCRONA
 *
 * # Invariante (Ingestion Latency):
 * La sumisión asíncrona ejecuta únicamente: validación, subida del
 * blob, inserción transaccional de trabajo + transcripción y el
 * encolado del descriptor. La inferencia jamás ocurre en el handler.
 * =================================================================
 */

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use lexia_domain_models::{
    DiarizationStats, Job, JobError, JobProgress, JobStatus, JobType, SpeakerSegment, TaskDescriptor,
    TranscriptSegment, Transcription, Utterance, WebhookStatus, Word,
};
use lexia_infra_blob::generate_blob_key;
use lexia_infra_db::repositories::{JobRepository, TranscriptionRepository};

use crate::errors::ApiError;
use crate::handlers::ingestion::{parse_multipart_submission, resolve_audio_source};
use crate::middleware::AuthenticatedPrincipal;
use crate::state::AppState;

/// Prefijo de claves de blob para audios de transcripción.
const TRANSCRIPTION_BLOB_PREFIX: &str = "transcriptions";

/// Respuesta 202 de la sumisión asíncrona.
#[derive(Serialize)]
pub struct TranscriptionJobAccepted {
    pub id: Uuid,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Vista completa de una transcripción (sondeo y endpoints síncronos).
#[derive(Serialize)]
pub struct TranscriptionView {
    pub id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub audio_url: Option<String>,
    pub language_code: Option<String>,
    pub text: Option<String>,
    pub words: Option<Vec<Word>>,
    pub segments: Option<Vec<TranscriptSegment>>,
    pub language_detected: Option<String>,
    pub language_confidence: Option<f64>,
    pub confidence: Option<f64>,
    pub speakers: Option<Vec<String>>,
    pub utterances: Option<Vec<Utterance>>,
    pub diarization_segments: Option<Vec<SpeakerSegment>>,
    pub diarization_stats: Option<DiarizationStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<JobProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
}

/// Mapeo de estado del Ledger a la superficie pública de transcripciones.
fn public_transcription_status(job_status: JobStatus) -> String {
    match job_status {
        JobStatus::Pending | JobStatus::Queued => "queued",
        JobStatus::Processing => "processing",
        JobStatus::Completed => "completed",
        // La superficie publica 'error' para trabajos fallidos.
        JobStatus::Failed => "error",
        JobStatus::Cancelled => "cancelled",
    }
    .to_string()
}

fn build_transcription_view(transcription: Transcription, owning_job: Option<&Job>) -> TranscriptionView {
    TranscriptionView {
        id: transcription.id,
        status: owning_job
            .map(|job| public_transcription_status(job.status))
            .unwrap_or_else(|| "queued".to_string()),
        created_at: transcription.created_at,
        completed_at: transcription.completed_at,
        audio_url: transcription.audio_url,
        language_code: transcription.language_code,
        text: transcription.text,
        words: transcription.words,
        segments: transcription.segments,
        language_detected: transcription.language_detected,
        language_confidence: transcription.language_confidence,
        confidence: transcription.confidence,
        speakers: transcription.speakers,
        utterances: transcription.utterances,
        diarization_segments: transcription.diarization_segments,
        diarization_stats: transcription.diarization_stats,
        progress: owning_job.and_then(|job| job.progress_view()),
        error: owning_job.and_then(|job| job.error_view()),
    }
}

pub struct TranscriptionHandler;

impl TranscriptionHandler {
    /**
     * Endpoint: POST /v1/transcriptions (202)
     *
     * Acepta carga multipart O audio_url, crea trabajo + transcripción
     * en una transacción, encola el descriptor y responde en cuanto la
     * cola acepta la tarea.
     */
    #[instrument(skip_all, fields(principal = %caller.principal_id()))]
    pub async fn handle_create_transcription(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        multipart: Multipart,
    ) -> Result<impl IntoResponse, ApiError> {
        let submission = parse_multipart_submission(multipart).await?;
        let (upload, audio_url) = resolve_audio_source(
            &submission,
            application_state.config.max_upload_bytes(),
            application_state.config.max_upload_file_size_mb,
        )?;

        // 1. RESOLUCIÓN DE PARÁMETROS DE LA SUMISIÓN
        let language_code = submission.text_field("language_code").unwrap_or("fr").to_string();
        let language_detection = submission.bool_field("language_detection");
        let speaker_labels = submission.bool_field("speaker_labels");
        let speakers_expected: Option<u8> = submission.numeric_field("speakers_expected")?;
        let webhook_url = submission.text_field("webhook_url").map(str::to_string);

        let resolved_language = if language_detection || language_code == "auto" {
            None
        } else {
            Some(language_code.clone())
        };

        // 2. MATERIALIZACIÓN DEL BLOB (SÓLO PARA CARGAS DIRECTAS)
        let audio_blob_key = match upload {
            Some(upload) => {
                let blob_key = generate_blob_key(&upload.file_name, TRANSCRIPTION_BLOB_PREFIX);
                application_state
                    .blob_store
                    .put(
                        &blob_key,
                        upload.audio_bytes.clone(),
                        &format!("audio/{}", upload.audio_format),
                    )
                    .await?;
                Some(blob_key)
            }
            None => None,
        };

        // 3. INSERCIÓN TRANSACCIONAL DE TRABAJO + TRANSCRIPCIÓN
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            job_type: JobType::Transcription,
            status: JobStatus::Pending,
            params: serde_json::json!({
                "language_code": language_code,
                "language_detection": language_detection,
                "speaker_labels": speaker_labels,
                "speakers_expected": speakers_expected,
            }),
            principal_id: caller.principal_id().to_string(),
            credential_id: caller.credential.id,
            webhook_url,
            queue_handle: None,
            progress_percent: 0,
            progress_message: None,
            result: None,
            result_url: None,
            error_code: None,
            error_message: None,
            created_at: now,
            started_at: None,
            completed_at: None,
            webhook_status: WebhookStatus::Pending,
        };

        let transcription = Transcription {
            id: Uuid::new_v4(),
            job_id: job.id,
            audio_url: audio_url.clone(),
            audio_blob_key: audio_blob_key.clone(),
            language_code: resolved_language.clone(),
            speaker_labels,
            word_timestamps: true,
            text: None,
            words: None,
            segments: None,
            language_detected: None,
            language_confidence: None,
            confidence: None,
            speakers: None,
            utterances: None,
            diarization_segments: None,
            diarization_stats: None,
            error_message: None,
            principal_id: caller.principal_id().to_string(),
            created_at: now,
            completed_at: None,
        };

        let job_repository = JobRepository::new(application_state.database_client.clone());
        job_repository.create_with_transcription(&job, &transcription).await?;

        // 4. DESPACHO A LA COLA Y PROMOCIÓN A QUEUED
        let descriptor = TaskDescriptor::Transcription {
            job_id: job.id,
            blob_key: audio_blob_key,
            source_url: audio_url.clone(),
            language: resolved_language,
            speaker_labels,
            word_timestamps: true,
        };

        let queue_handle = application_state.task_queue.enqueue(&descriptor).await?;
        job_repository.mark_queued(job.id, &queue_handle).await?;

        info!("🎬 [INGESTION]: Transcription job {} queued (speaker_labels={}).",
            job.id, speaker_labels);

        Ok((
            StatusCode::ACCEPTED,
            Json(TranscriptionJobAccepted {
                id: transcription.id,
                status: "queued",
                created_at: now,
                audio_url,
            }),
        ))
    }

    /**
     * Endpoint: GET /v1/transcriptions/{id}
     *
     * El acceso a una transcripción ajena devuelve el mismo 404 que un
     * identificador inexistente.
     */
    pub async fn handle_get_transcription(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        Path(raw_identifier): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        let transcription_id = parse_identifier(&raw_identifier, "transcription_id")?;

        let transcription_repository =
            TranscriptionRepository::new(application_state.database_client.clone());
        let transcription = transcription_repository
            .find_by_id(transcription_id)
            .await?
            .filter(|record| record.principal_id == caller.principal_id())
            .ok_or_else(|| ApiError::transcription_not_found(&raw_identifier))?;

        let job_repository = JobRepository::new(application_state.database_client.clone());
        let owning_job = job_repository.find_by_id(transcription.job_id).await?;

        Ok(Json(build_transcription_view(transcription, owning_job.as_ref())))
    }

    /**
     * Endpoint: DELETE /v1/transcriptions/{id} (204)
     *
     * El borrado del blob es best-effort: su fallo se registra y la
     * fila se elimina igualmente (la intención del usuario prevalece).
     */
    #[instrument(skip_all, fields(transcription = %raw_identifier))]
    pub async fn handle_delete_transcription(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        Path(raw_identifier): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        let transcription_id = parse_identifier(&raw_identifier, "transcription_id")?;

        let transcription_repository =
            TranscriptionRepository::new(application_state.database_client.clone());
        let transcription = transcription_repository
            .find_by_id(transcription_id)
            .await?
            .filter(|record| record.principal_id == caller.principal_id())
            .ok_or_else(|| ApiError::transcription_not_found(&raw_identifier))?;

        if let Some(blob_key) = &transcription.audio_blob_key {
            if let Err(blob_fault) = application_state.blob_store.delete(blob_key).await {
                warn!("⚠️ [INGESTION]: Audio blob {} not deleted: {}.", blob_key, blob_fault);
            }
        }

        transcription_repository.delete(transcription_id).await?;
        info!("🗑️ [INGESTION]: Transcription {} deleted.", transcription_id);

        Ok(StatusCode::NO_CONTENT)
    }

    /**
     * Endpoint: POST /v1/transcriptions/sync
     *
     * Transcripción bloqueante para audio corto. No persiste nada: el
     * identificador de la respuesta existe sólo en este cuerpo.
     */
    #[instrument(skip_all, fields(principal = %caller.principal_id()))]
    pub async fn handle_sync_transcription(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        multipart: Multipart,
    ) -> Result<impl IntoResponse, ApiError> {
        let submission = parse_multipart_submission(multipart).await?;

        let upload = submission.upload.as_ref().ok_or_else(|| {
            ApiError::validation(
                "Sync transcription requires a direct 'audio' upload.",
                Some("audio"),
                Some("missing_audio_source"),
            )
        })?;

        if upload.audio_bytes.len() as u64 > application_state.config.max_sync_bytes() {
            return Err(ApiError::FileTooLarge {
                actual_mb: upload.audio_bytes.len() as f64 / (1024.0 * 1024.0),
                max_mb: application_state.config.max_sync_file_size_mb,
            });
        }

        let requested_language = submission
            .text_field("language_code")
            .filter(|code| *code != "auto")
            .map(str::to_string);

        // Materialización temporal y pase directo por el backend.
        let mut audio_temp_file = tempfile::Builder::new()
            .prefix("lexia-sync-")
            .suffix(&format!(".{}", upload.audio_format))
            .tempfile()
            .map_err(|fault| ApiError::Internal { detail: fault.to_string() })?;
        audio_temp_file
            .write_all(&upload.audio_bytes)
            .and_then(|_| audio_temp_file.flush())
            .map_err(|fault| ApiError::Internal { detail: fault.to_string() })?;

        let stt_output = application_state
            .stt_backend
            .transcribe(audio_temp_file.path(), requested_language.as_deref(), true)
            .await?;

        let words: Vec<Word> = stt_output
            .words
            .iter()
            .map(|word| Word {
                text: word.text.clone(),
                start: (word.start_seconds * 1000.0) as i64,
                end: (word.end_seconds * 1000.0) as i64,
                confidence: word.confidence,
                speaker: None,
            })
            .collect();

        let segments: Vec<TranscriptSegment> = stt_output
            .segments
            .iter()
            .map(|segment| TranscriptSegment {
                id: segment.id,
                text: segment.text.clone(),
                start: (segment.start_seconds * 1000.0) as i64,
                end: (segment.end_seconds * 1000.0) as i64,
                confidence: segment.confidence,
            })
            .collect();

        let overall_confidence = if words.is_empty() {
            None
        } else {
            Some(words.iter().map(|word| word.confidence).sum::<f64>() / words.len() as f64)
        };

        Ok(Json(TranscriptionView {
            id: Uuid::new_v4(),
            status: "completed".to_string(),
            created_at: Utc::now(),
            completed_at: Some(Utc::now()),
            audio_url: None,
            language_code: requested_language,
            text: Some(stt_output.text),
            words: Some(words),
            segments: Some(segments),
            language_detected: stt_output.language,
            language_confidence: stt_output.language_confidence,
            confidence: overall_confidence,
            speakers: None,
            utterances: None,
            diarization_segments: None,
            diarization_stats: None,
            progress: None,
            error: None,
        }))
    }
}

/// Parseo de identificadores de ruta con fallo 400 `invalid_id_format`.
pub fn parse_identifier(raw_identifier: &str, param_name: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw_identifier).map_err(|_| {
        ApiError::validation(
            format!("Invalid identifier format: {}", raw_identifier),
            Some(param_name),
            Some("invalid_id_format"),
        )
    })
}
// FIN DEL ARCHIVO [apps/api-gateway/src/handlers/transcriptions.rs]
