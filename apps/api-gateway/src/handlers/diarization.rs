// [apps/api-gateway/src/handlers/diarization.rs]
/*!
 * =================================================================
 * APARATO: DIARIZATION INGESTION HANDLER
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: INGESTA, SONDEO Y DIARIZACIÓN SÍNCRONA
 * =================================================================
 */

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use std::io::Write;
use tracing::{info, instrument};
use uuid::Uuid;

use lexia_domain_alignment::{
    compute_speaker_stats, detect_overlaps, filter_minimum_duration, generate_rttm,
    merge_speaker_gaps, relabel_speakers,
};
use lexia_domain_models::{
    DiarizationStats, Job, JobStatus, JobType, SpeakerSegment, TaskDescriptor, WebhookStatus,
};
use lexia_infra_blob::generate_blob_key;
use lexia_infra_db::repositories::JobRepository;

use crate::errors::ApiError;
use crate::handlers::ingestion::{parse_multipart_submission, resolve_audio_source};
use crate::handlers::transcriptions::parse_identifier;
use crate::middleware::AuthenticatedPrincipal;
use crate::state::AppState;

/// Prefijo de claves de blob para audios de diarización.
const DIARIZATION_BLOB_PREFIX: &str = "diarization";

pub struct DiarizationHandler;

impl DiarizationHandler {
    /**
     * Endpoint: POST /v1/diarization (202)
     */
    #[instrument(skip_all, fields(principal = %caller.principal_id()))]
    pub async fn handle_create_diarization(
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

        let num_speakers: Option<u8> = submission.numeric_field("num_speakers")?;
        let min_speakers: Option<u8> = submission.numeric_field("min_speakers")?;
        let max_speakers: Option<u8> = submission.numeric_field("max_speakers")?;
        let webhook_url = submission.text_field("webhook_url").map(str::to_string);

        let audio_blob_key = match upload {
            Some(upload) => {
                let blob_key = generate_blob_key(&upload.file_name, DIARIZATION_BLOB_PREFIX);
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

        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            job_type: JobType::Diarization,
            status: JobStatus::Pending,
            params: json!({
                "num_speakers": num_speakers,
                "min_speakers": min_speakers,
                "max_speakers": max_speakers,
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

        let job_repository = JobRepository::new(application_state.database_client.clone());
        job_repository.create(&job).await?;

        let descriptor = TaskDescriptor::Diarization {
            job_id: job.id,
            blob_key: audio_blob_key,
            source_url: audio_url,
            num_speakers,
            min_speakers,
            max_speakers,
        };

        let queue_handle = application_state.task_queue.enqueue(&descriptor).await?;
        job_repository.mark_queued(job.id, &queue_handle).await?;

        info!("🎬 [INGESTION]: Diarization job {} queued.", job.id);

        Ok((
            StatusCode::ACCEPTED,
            Json(json!({
                "id": job.id,
                "status": "queued",
                "created_at": now,
            })),
        ))
    }

    /**
     * Endpoint: GET /v1/diarization/{id}
     *
     * La vista aplana el payload de resultado (speakers, segments,
     * overlaps, stats, rttm) sobre el estado del trabajo.
     */
    pub async fn handle_get_diarization(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        Path(raw_identifier): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        let job_id = parse_identifier(&raw_identifier, "diarization_id")?;

        let job_repository = JobRepository::new(application_state.database_client.clone());
        let job = job_repository
            .find_by_id(job_id)
            .await?
            .filter(|record| {
                record.principal_id == caller.principal_id()
                    && record.job_type == JobType::Diarization
            })
            .ok_or_else(|| ApiError::job_not_found(&raw_identifier))?;

        let mut view = json!({
            "id": job.id,
            "status": job.status.as_str(),
            "created_at": job.created_at,
            "started_at": job.started_at,
            "completed_at": job.completed_at,
            "progress": job.progress_view(),
            "error": job.error_view(),
        });

        // Aplanado del payload de resultado sobre la vista.
        if let (Some(view_object), Some(serde_json::Value::Object(result_fields))) =
            (view.as_object_mut(), job.result.clone())
        {
            for (field_name, field_value) in result_fields {
                view_object.insert(field_name, field_value);
            }
        }

        Ok(Json(view))
    }

    /**
     * Endpoint: POST /v1/diarization/sync
     *
     * Diarización bloqueante y no persistente: reetiquetado, solapes,
     * estadísticas y RTTM se derivan en línea.
     */
    #[instrument(skip_all, fields(principal = %caller.principal_id()))]
    pub async fn handle_sync_diarization(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        multipart: Multipart,
    ) -> Result<impl IntoResponse, ApiError> {
        let submission = parse_multipart_submission(multipart).await?;

        let upload = submission.upload.as_ref().ok_or_else(|| {
            ApiError::validation(
                "Sync diarization requires a direct 'audio' upload.",
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

        let num_speakers: Option<u8> = submission.numeric_field("num_speakers")?;
        let min_speakers: Option<u8> = submission.numeric_field("min_speakers")?;
        let max_speakers: Option<u8> = submission.numeric_field("max_speakers")?;
        let merge_gaps_ms: Option<i64> = submission.numeric_field("merge_gaps_ms")?;
        let min_segment_ms: Option<i64> = submission.numeric_field("min_segment_ms")?;

        let mut audio_temp_file = tempfile::Builder::new()
            .prefix("lexia-sync-")
            .suffix(&format!(".{}", upload.audio_format))
            .tempfile()
            .map_err(|fault| ApiError::Internal { detail: fault.to_string() })?;
        audio_temp_file
            .write_all(&upload.audio_bytes)
            .and_then(|_| audio_temp_file.flush())
            .map_err(|fault| ApiError::Internal { detail: fault.to_string() })?;

        let diarization_output = application_state
            .diarization_backend
            .diarize(audio_temp_file.path(), num_speakers, min_speakers, max_speakers)
            .await?;

        // Consolidación en línea: ms, refinado, letras, solapes, RTTM.
        let mut raw_segments: Vec<SpeakerSegment> = diarization_output
            .turns
            .iter()
            .map(|turn| SpeakerSegment {
                speaker: turn.raw_label.clone(),
                start: (turn.start_seconds * 1000.0) as i64,
                end: (turn.end_seconds * 1000.0) as i64,
                confidence: turn.confidence,
            })
            .collect();

        if let Some(threshold) = min_segment_ms {
            raw_segments = filter_minimum_duration(&raw_segments, threshold);
        }
        if let Some(gap_budget) = merge_gaps_ms {
            raw_segments = merge_speaker_gaps(&raw_segments, gap_budget);
        }

        let (segments, speaker_letters) = relabel_speakers(&raw_segments);
        let overlaps = detect_overlaps(&segments);
        let overlap_duration: i64 = overlaps.iter().map(|overlap| overlap.duration).sum();
        let speakers = compute_speaker_stats(&segments);
        let rttm = generate_rttm(&segments, &upload.file_name.replace('.', "_"));

        let stats = DiarizationStats {
            num_speakers: speaker_letters.len() as u32,
            num_segments: segments.len() as u32,
            audio_duration: (diarization_output.audio_duration_seconds * 1000.0) as i64,
            num_overlaps: overlaps.len() as u32,
            overlap_duration,
            processing_time_ms: diarization_output.processing_time_ms,
        };

        Ok(Json(json!({
            "id": Uuid::new_v4(),
            "status": "completed",
            "created_at": Utc::now(),
            "speakers": speakers,
            "segments": segments,
            "overlaps": overlaps,
            "stats": stats,
            "rttm": rttm,
        })))
    }
}
// FIN DEL ARCHIVO [apps/api-gateway/src/handlers/diarization.rs]
