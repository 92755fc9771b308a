// [apps/media-worker/src/pipeline.rs]
/*!
 * =================================================================
 * APARATO: MEDIA PROCESSING PIPELINE WORKBENCH
 * CLASIFICACIÓN: WORKER EXECUTION LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: ETAPAS DE TRANSCRIPCIÓN, DIARIZACIÓN Y SELLADO
 *
 * # Invariante (Fresh Resources):
 * El Workbench se ensambla por tarea: cliente de base de datos, blob
 * store, cola y backends de inferencia nacen dentro de la frontera de
 * la tarea y mueren con ella.
 *
 * # Invariante (Milestone Monotony):
 * Los hitos de progreso se publican en secuencia creciente (5/10/20/
 * 60/70/90/100); la guardia del repositorio descarta retrocesos.
 *
 * # Invariante (Temp Hygiene):
 * El audio se materializa en un NamedTempFile cuyo drop garantiza la
 * eliminación en todos los caminos de salida, incluido el pánico.
 * =================================================================
 */

use std::io::Write;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use lexia_domain_alignment::{
    align_transcript_with_segments, compute_speaker_stats, detect_overlaps, generate_rttm,
    relabel_speakers,
};
use lexia_domain_models::{
    DiarizationStats, JobStatus, SpeakerSegment, TaskDescriptor, TranscriptSegment, WebhookEvent,
    WebhookStatus, Word,
};
use lexia_infra_blob::{generate_blob_key, BlobError, BlobStoreClient};
use lexia_infra_compute::{
    build_diarization_backend, build_stt_backend, ComputeError, DiarizationBackend, DiarizationOutput,
    SttBackend, SttOutput,
};
use lexia_infra_db::repositories::{JobRepository, TranscriptionRepository};
use lexia_infra_db::{DatabaseClient, DbError};
use lexia_infra_queue::{QueueError, TaskQueueClient};

use crate::engine::WorkerSettings;
use crate::webhook::WebhookCourier;

/// Prefijo de claves para audios materializados desde URL.
const URL_SOURCED_BLOB_PREFIX: &str = "transcriptions";

/// Desenlace de una tarea ejecutada por el Workbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Pipeline completado y trabajo sellado en el Ledger.
    Completed,
    /// La tarea ya no era procesable (cancelada o sellada por otro camino).
    Skipped,
    /// Entrega de webhook gestionada (éxito o presupuesto agotado).
    WebhookHandled,
}

/// Catálogo de fallos del pipeline con su política de reintento.
#[derive(Error, Debug)]
pub enum PipelineFault {
    #[error("{0}")]
    Compute(#[from] ComputeError),

    #[error("{0}")]
    Blob(#[from] BlobError),

    #[error("{0}")]
    Database(#[from] DbError),

    #[error("{0}")]
    Queue(#[from] QueueError),

    #[error("[L1_WORKER_FAULT]: URL_DOWNLOAD_FAILED -> {0}")]
    UrlDownload(String),

    #[error("[L1_WORKER_FAULT]: {0}")]
    Internal(String),
}

impl PipelineFault {
    /// Todo fallo transitorio consume presupuesto de reintentos.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PipelineFault::Internal(_))
    }

    /// Código público registrado sobre la fila del trabajo al fallar.
    pub fn error_code(&self) -> &'static str {
        match self {
            PipelineFault::Compute(compute_fault) => compute_fault.public_code(),
            _ => "internal_error",
        }
    }
}

/**
 * Banco de trabajo de una tarea: recursos frescos y etapas del pipeline.
 */
pub struct TaskWorkbench {
    database_client: DatabaseClient,
    blob_store: BlobStoreClient,
    task_queue: TaskQueueClient,
    stt_backend: SttBackend,
    diarization_backend: DiarizationBackend,
    url_download_client: reqwest::Client,
}

impl TaskWorkbench {
    /**
     * Ensambla el banco de trabajo con recursos recién ligados.
     */
    #[instrument(skip(settings), fields(worker = %settings.worker_identifier))]
    pub async fn assemble(settings: &WorkerSettings) -> Result<Self, PipelineFault> {
        let database_client =
            DatabaseClient::connect(&settings.database_url, settings.database_auth_token.clone())
                .await?;

        let task_queue =
            TaskQueueClient::connect(&settings.queue_url, settings.queue_auth_token.clone()).await?;

        let blob_store = match &settings.blob_endpoint {
            Some(endpoint) => BlobStoreClient::new_http(
                endpoint.clone(),
                settings.blob_bucket.clone(),
                settings.blob_access_token.clone(),
            )?,
            None => {
                let local_root = settings
                    .blob_local_root
                    .clone()
                    .unwrap_or_else(|| "./blob-store".to_string());
                BlobStoreClient::new_local(local_root.into())?
            }
        };

        let stt_backend = build_stt_backend(
            &settings.stt_backend_kind,
            settings.stt_service_url.clone(),
            settings.stt_model.clone(),
        )?;

        let diarization_backend = build_diarization_backend(
            &settings.diarization_backend_kind,
            settings.diarization_service_url.clone(),
            settings.diarization_model.clone(),
        )?;

        let url_download_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("Lexia-Audio-Fetch/0.3")
            .build()
            .map_err(|fault| PipelineFault::Internal(fault.to_string()))?;

        Ok(Self {
            database_client,
            blob_store,
            task_queue,
            stt_backend,
            diarization_backend,
            url_download_client,
        })
    }

    /**
     * Ensambla el banco con componentes ya construidos. Usado por el
     * Proving Grounds para inyectar backends con guion.
     */
    pub fn from_components(
        database_client: DatabaseClient,
        blob_store: BlobStoreClient,
        task_queue: TaskQueueClient,
        stt_backend: SttBackend,
        diarization_backend: DiarizationBackend,
    ) -> Result<Self, PipelineFault> {
        let url_download_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("Lexia-Audio-Fetch/0.3")
            .build()
            .map_err(|fault| PipelineFault::Internal(fault.to_string()))?;

        Ok(Self {
            database_client,
            blob_store,
            task_queue,
            stt_backend,
            diarization_backend,
            url_download_client,
        })
    }

    /// Despacha la etapa de pipeline que corresponde al descriptor.
    pub async fn execute(&self, descriptor: &TaskDescriptor) -> Result<TaskOutcome, PipelineFault> {
        match descriptor {
            TaskDescriptor::Transcription {
                job_id,
                blob_key,
                source_url,
                language,
                speaker_labels,
                word_timestamps,
            } => {
                self.run_transcription_stage(
                    *job_id,
                    blob_key.clone(),
                    source_url.clone(),
                    language.as_deref(),
                    *speaker_labels,
                    *word_timestamps,
                )
                .await
            }
            TaskDescriptor::Diarization {
                job_id,
                blob_key,
                source_url,
                num_speakers,
                min_speakers,
                max_speakers,
            } => {
                self.run_diarization_stage(
                    *job_id,
                    blob_key.clone(),
                    source_url.clone(),
                    *num_speakers,
                    *min_speakers,
                    *max_speakers,
                )
                .await
            }
            TaskDescriptor::WebhookDelivery { .. } => Err(PipelineFault::Internal(
                "webhook descriptor routed to pipeline stage".into(),
            )),
        }
    }

    // =================================================================
    // ETAPA 1: TRANSCRIPCIÓN (CON DIARIZACIÓN OPCIONAL ENCADENADA)
    // =================================================================

    #[instrument(skip_all, fields(job = %job_id))]
    async fn run_transcription_stage(
        &self,
        job_id: Uuid,
        blob_key: Option<String>,
        source_url: Option<String>,
        requested_language: Option<&str>,
        speaker_labels: bool,
        word_timestamps: bool,
    ) -> Result<TaskOutcome, PipelineFault> {
        let job_repository = JobRepository::new(self.database_client.clone());
        let transcription_repository = TranscriptionRepository::new(self.database_client.clone());

        if !self.take_job_ownership(&job_repository, job_id).await? {
            return Ok(TaskOutcome::Skipped);
        }

        let transcription = transcription_repository
            .find_by_job_id(job_id)
            .await?
            .ok_or_else(|| {
                PipelineFault::Internal(format!("transcription record void for job {}", job_id))
            })?;

        // 1. MATERIALIZACIÓN DEL AUDIO (BLOB O URL)
        let resolved_blob_key = self
            .resolve_audio_source(&job_repository, job_id, blob_key, source_url)
            .await?;

        job_repository.update_progress(job_id, 10, "Downloading audio").await?;
        let audio_temp_file = self.materialize_audio(&resolved_blob_key).await?;

        // 2. INFERENCIA STT
        job_repository.update_progress(job_id, 20, "Transcribing audio").await?;
        let stt_output = self
            .stt_backend
            .transcribe(audio_temp_file.path(), requested_language, word_timestamps)
            .await?;

        // 3. CONVERSIÓN DE FRONTERA (SEGUNDOS -> MILISEGUNDOS)
        job_repository.update_progress(job_id, 60, "Processing results").await?;

        let words_ms = convert_words_to_ms(&stt_output);
        let segments_ms = convert_segments_to_ms(&stt_output);
        let average_word_confidence = average_confidence(&words_ms);

        transcription_repository
            .set_stt_result(
                transcription.id,
                &stt_output.text,
                &if word_timestamps { Some(words_ms.clone()) } else { None },
                &Some(segments_ms),
                stt_output.language.as_deref(),
                stt_output.language_confidence,
                average_word_confidence,
            )
            .await?;

        // 4. DIARIZACIÓN ENCADENADA Y ALINEAMIENTO
        if speaker_labels {
            job_repository.update_progress(job_id, 70, "Diarizing speakers").await?;

            let diarization_output = self
                .diarization_backend
                .diarize(audio_temp_file.path(), None, None, None)
                .await?;

            let consolidated = consolidate_diarization(&diarization_output);

            let utterances = align_transcript_with_segments(
                &stt_output.text,
                &words_ms,
                &consolidated.segments,
            );

            transcription_repository
                .set_diarization_result(
                    transcription.id,
                    &Some(consolidated.speaker_letters.clone()),
                    &Some(utterances),
                    &Some(consolidated.segments.clone()),
                    &Some(consolidated.stats.clone()),
                )
                .await?;
        }

        // 5. SELLADO DEL TRABAJO Y NOTIFICACIÓN
        let result_payload = serde_json::json!({ "transcription_id": transcription.id });
        let result_url = format!("/v1/transcriptions/{}", transcription.id);
        job_repository
            .complete_with_result(job_id, &result_payload, Some(&result_url))
            .await?;

        self.enqueue_completion_webhook(&job_repository, job_id).await;

        info!("🏁 [PIPELINE]: Transcription job {} completed.", job_id);
        Ok(TaskOutcome::Completed)
    }

    // =================================================================
    // ETAPA 2: DIARIZACIÓN PURA
    // =================================================================

    #[instrument(skip_all, fields(job = %job_id))]
    async fn run_diarization_stage(
        &self,
        job_id: Uuid,
        blob_key: Option<String>,
        source_url: Option<String>,
        num_speakers: Option<u8>,
        min_speakers: Option<u8>,
        max_speakers: Option<u8>,
    ) -> Result<TaskOutcome, PipelineFault> {
        let job_repository = JobRepository::new(self.database_client.clone());

        if !self.take_job_ownership(&job_repository, job_id).await? {
            return Ok(TaskOutcome::Skipped);
        }

        let resolved_blob_key = self
            .resolve_audio_source(&job_repository, job_id, blob_key, source_url)
            .await?;

        job_repository.update_progress(job_id, 10, "Downloading audio").await?;
        let audio_temp_file = self.materialize_audio(&resolved_blob_key).await?;

        job_repository.update_progress(job_id, 30, "Processing diarization").await?;
        let diarization_output = self
            .diarization_backend
            .diarize(audio_temp_file.path(), num_speakers, min_speakers, max_speakers)
            .await?;

        job_repository.update_progress(job_id, 90, "Finalizing").await?;

        let consolidated = consolidate_diarization(&diarization_output);
        let speaker_statistics = compute_speaker_stats(&consolidated.segments);

        let audio_identifier = resolved_blob_key
            .rsplit('/')
            .next()
            .and_then(|file_name| file_name.split('.').next())
            .unwrap_or("audio");
        let rttm_document = generate_rttm(&consolidated.segments, audio_identifier);

        let result_payload = serde_json::json!({
            "speakers": speaker_statistics,
            "segments": consolidated.segments,
            "overlaps": consolidated.overlaps,
            "stats": consolidated.stats,
            "rttm": rttm_document,
        });
        let result_url = format!("/v1/diarization/{}", job_id);
        job_repository
            .complete_with_result(job_id, &result_payload, Some(&result_url))
            .await?;

        self.enqueue_completion_webhook(&job_repository, job_id).await;

        info!("🏁 [PIPELINE]: Diarization job {} completed ({} speakers).",
            job_id, consolidated.speaker_letters.len());
        Ok(TaskOutcome::Completed)
    }

    // =================================================================
    // SELLADO DE FALLOS Y ENTREGA DE WEBHOOKS
    // =================================================================

    /**
     * Registra el fallo terminal sobre el trabajo (presupuesto agotado)
     * y dispara la notificación de fallo si hay webhook configurado.
     */
    pub async fn seal_job_failure(&self, descriptor: &TaskDescriptor, fault: &PipelineFault) {
        let job_repository = JobRepository::new(self.database_client.clone());
        let job_id = descriptor.job_id();

        if let Err(seal_fault) = job_repository
            .mark_failed(job_id, fault.error_code(), &fault.to_string())
            .await
        {
            error!("❌ [PIPELINE]: Failure seal rejected for job {}: {}.", job_id, seal_fault);
            return;
        }

        if let TaskDescriptor::Transcription { .. } = descriptor {
            let transcription_repository = TranscriptionRepository::new(self.database_client.clone());
            if let Ok(Some(transcription)) = transcription_repository.find_by_job_id(job_id).await {
                let _ = transcription_repository
                    .set_error(transcription.id, &fault.to_string())
                    .await;
            }
        }

        self.enqueue_completion_webhook(&job_repository, job_id).await;
    }

    /**
     * Encola la entrega del evento terminal si el trabajo declara
     * webhook_url. El fallo de encolado se deja al sweeper periódico.
     */
    async fn enqueue_completion_webhook(&self, job_repository: &JobRepository, job_id: Uuid) {
        let terminal_job = match job_repository.find_by_id(job_id).await {
            Ok(Some(job)) => job,
            _ => return,
        };

        let webhook_url = match &terminal_job.webhook_url {
            Some(url) => url.clone(),
            None => return,
        };

        let delivery_descriptor = TaskDescriptor::WebhookDelivery {
            job_id,
            webhook_url,
            payload: WebhookEvent::from_terminal_job(&terminal_job),
        };

        match self.task_queue.enqueue(&delivery_descriptor).await {
            Ok(_) => {
                let _ = job_repository.set_webhook_status(job_id, WebhookStatus::Queued).await;
            }
            Err(enqueue_fault) => {
                // El outbox queda en 'pending'; el sweeper lo recogerá.
                warn!("⚠️ [PIPELINE]: Webhook enqueue deferred for job {}: {}.", job_id, enqueue_fault);
            }
        }
    }

    /// Ejecuta la entrega con el courier y sella el estado del webhook.
    pub async fn deliver_webhook(
        &self,
        courier: &WebhookCourier,
        job_id: Uuid,
        webhook_url: &str,
        payload: &WebhookEvent,
    ) {
        let job_repository = JobRepository::new(self.database_client.clone());

        match courier.deliver(webhook_url, payload).await {
            Ok(attempts_spent) => {
                info!("📬 [PIPELINE]: Webhook for job {} delivered after {} attempt(s).",
                    job_id, attempts_spent);
                let _ = job_repository.set_webhook_status(job_id, WebhookStatus::Delivered).await;
            }
            Err(delivery_fault) => {
                // El estado del trabajo no se ve afectado por el fallo de entrega.
                error!("📭 [PIPELINE]: Webhook for job {} undeliverable: {}.", job_id, delivery_fault);
                let _ = job_repository.set_webhook_status(job_id, WebhookStatus::Failed).await;
            }
        }
    }

    // =================================================================
    // UTILIDADES INTERNAS DE LA ETAPA
    // =================================================================

    /**
     * Toma de propiedad del trabajo. Verdadero si el worker puede
     * procesar: transición queued -> processing recién sellada, o el
     * trabajo ya estaba en processing (reintento del mismo worker).
     */
    async fn take_job_ownership(
        &self,
        job_repository: &JobRepository,
        job_id: Uuid,
    ) -> Result<bool, PipelineFault> {
        if job_repository.mark_processing(job_id).await? {
            return Ok(true);
        }

        match job_repository.find_by_id(job_id).await? {
            Some(job) if job.status == JobStatus::Processing => Ok(true),
            Some(job) => {
                warn!("⚪ [PIPELINE]: Job {} not processable (status={}).",
                    job_id, job.status.as_str());
                Ok(false)
            }
            None => {
                warn!("⚪ [PIPELINE]: Job {} vanished from ledger.", job_id);
                Ok(false)
            }
        }
    }

    /**
     * Resuelve la fuente de audio: clave de blob directa, o descarga
     * desde URL con materialización al blob store bajo clave generada.
     */
    async fn resolve_audio_source(
        &self,
        job_repository: &JobRepository,
        job_id: Uuid,
        blob_key: Option<String>,
        source_url: Option<String>,
    ) -> Result<String, PipelineFault> {
        if let Some(key) = blob_key {
            return Ok(key);
        }

        let remote_url = source_url
            .ok_or_else(|| PipelineFault::Internal("audio source void on descriptor".into()))?;

        job_repository.update_progress(job_id, 5, "Downloading from URL").await?;

        let response = self
            .url_download_client
            .get(&remote_url)
            .send()
            .await
            .map_err(|fault| PipelineFault::UrlDownload(fault.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineFault::UrlDownload(format!(
                "remote source replied {}",
                response.status()
            )));
        }

        let audio_bytes = response
            .bytes()
            .await
            .map_err(|fault| PipelineFault::UrlDownload(fault.to_string()))?
            .to_vec();

        let remote_file_name = remote_url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("audio.wav");
        let generated_key = generate_blob_key(remote_file_name, URL_SOURCED_BLOB_PREFIX);

        self.blob_store
            .put(&generated_key, audio_bytes, "application/octet-stream")
            .await?;

        Ok(generated_key)
    }

    /// Descarga el blob y lo materializa en un fichero temporal.
    async fn materialize_audio(
        &self,
        blob_key: &str,
    ) -> Result<tempfile::NamedTempFile, PipelineFault> {
        let audio_bytes = self.blob_store.get(blob_key).await?;

        let extension = blob_key.rsplit('.').next().unwrap_or("wav");
        let mut audio_temp_file = tempfile::Builder::new()
            .prefix("lexia-audio-")
            .suffix(&format!(".{}", extension))
            .tempfile()
            .map_err(|fault| PipelineFault::Internal(format!("temp file: {}", fault)))?;

        audio_temp_file
            .write_all(&audio_bytes)
            .map_err(|fault| PipelineFault::Internal(format!("temp write: {}", fault)))?;
        audio_temp_file
            .flush()
            .map_err(|fault| PipelineFault::Internal(format!("temp flush: {}", fault)))?;

        Ok(audio_temp_file)
    }
}

// =================================================================
// CONVERSIÓN DE FRONTERA Y CONSOLIDACIÓN DE DIARIZACIÓN
// =================================================================

/// Resultado consolidado de la diarización tras el reetiquetado.
struct ConsolidatedDiarization {
    segments: Vec<SpeakerSegment>,
    overlaps: Vec<lexia_domain_models::OverlapSegment>,
    speaker_letters: Vec<String>,
    stats: DiarizationStats,
}

/// Conversión de frontera: segundos flotantes a milisegundos enteros.
fn seconds_to_ms(seconds: f64) -> i64 {
    (seconds * 1000.0) as i64
}

fn convert_words_to_ms(stt_output: &SttOutput) -> Vec<Word> {
    stt_output
        .words
        .iter()
        .map(|word| Word {
            text: word.text.clone(),
            start: seconds_to_ms(word.start_seconds),
            end: seconds_to_ms(word.end_seconds),
            confidence: word.confidence,
            speaker: None,
        })
        .collect()
}

fn convert_segments_to_ms(stt_output: &SttOutput) -> Vec<TranscriptSegment> {
    stt_output
        .segments
        .iter()
        .map(|segment| TranscriptSegment {
            id: segment.id,
            text: segment.text.clone(),
            start: seconds_to_ms(segment.start_seconds),
            end: seconds_to_ms(segment.end_seconds),
            confidence: segment.confidence,
        })
        .collect()
}

fn average_confidence(words: &[Word]) -> Option<f64> {
    if words.is_empty() {
        return None;
    }
    let confidence_sum: f64 = words.iter().map(|word| word.confidence).sum();
    Some(confidence_sum / words.len() as f64)
}

/**
 * Convierte los turnos brutos a milisegundos, aplica el reetiquetado
 * determinista y deriva solapes y estadísticas globales.
 */
fn consolidate_diarization(diarization_output: &DiarizationOutput) -> ConsolidatedDiarization {
    let raw_segments: Vec<SpeakerSegment> = diarization_output
        .turns
        .iter()
        .map(|turn| SpeakerSegment {
            speaker: turn.raw_label.clone(),
            start: seconds_to_ms(turn.start_seconds),
            end: seconds_to_ms(turn.end_seconds),
            confidence: turn.confidence,
        })
        .collect();

    let (relabeled_segments, speaker_letters) = relabel_speakers(&raw_segments);
    let overlaps = detect_overlaps(&relabeled_segments);
    let overlap_duration: i64 = overlaps.iter().map(|overlap| overlap.duration).sum();

    let stats = DiarizationStats {
        num_speakers: speaker_letters.len() as u32,
        num_segments: relabeled_segments.len() as u32,
        audio_duration: seconds_to_ms(diarization_output.audio_duration_seconds),
        num_overlaps: overlaps.len() as u32,
        overlap_duration,
        processing_time_ms: diarization_output.processing_time_ms,
    };

    ConsolidatedDiarization {
        segments: relabeled_segments,
        overlaps,
        speaker_letters,
        stats,
    }
}
// FIN DEL ARCHIVO [apps/media-worker/src/pipeline.rs]
