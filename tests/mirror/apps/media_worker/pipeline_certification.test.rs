// [tests/mirror/apps/media_worker/pipeline_certification.test.rs]
/**
 * =================================================================
 * APARATO: PIPELINE CERTIFICATION TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: CERTIFICACIÓN END-TO-END DEL PIPELINE DE MEDIOS
 *
 * Ejecuta el banco de trabajo completo contra Ledger en memoria,
 * blob store local y backends con guion, sin red ni inferencia real.
 * =================================================================
 */

use chrono::Utc;
use uuid::Uuid;

use lexia_domain_models::{
    Job, JobStatus, JobType, TaskDescriptor, Transcription, WebhookStatus,
};
use lexia_infra_blob::BlobStoreClient;
use lexia_infra_compute::diarization::{DiarizationBackend, MockDiarizationBackend};
use lexia_infra_compute::stt::{MockSttBackend, SttBackend, SttOutput, SttWordOutput, SttSegmentOutput};
use lexia_infra_compute::{DiarizationOutput, RawSpeakerTurn};
use lexia_infra_db::repositories::{JobRepository, TranscriptionRepository};
use lexia_infra_db::DatabaseClient;
use lexia_infra_queue::TaskQueueClient;
use lexia_media_worker::pipeline::{TaskOutcome, TaskWorkbench};

struct Workbenchyard {
    database_client: DatabaseClient,
    task_queue: TaskQueueClient,
    blob_store: BlobStoreClient,
    _blob_root: tempfile::TempDir,
}

async fn assemble_yard(tag: &str) -> Workbenchyard {
    let database_client = DatabaseClient::connect(
        &format!("file:{}_db?mode=memory&cache=shared", tag),
        None,
    )
    .await
    .unwrap();

    let task_queue = TaskQueueClient::connect(
        &format!("file:{}_queue?mode=memory&cache=shared", tag),
        None,
    )
    .await
    .unwrap();

    let blob_root = tempfile::tempdir().unwrap();
    let blob_store = BlobStoreClient::new_local(blob_root.path().to_path_buf()).unwrap();

    Workbenchyard {
        database_client,
        task_queue,
        blob_store,
        _blob_root: blob_root,
    }
}

fn forged_job(job_type: JobType, webhook_url: Option<&str>) -> Job {
    Job {
        id: Uuid::new_v4(),
        job_type,
        status: JobStatus::Pending,
        params: serde_json::json!({}),
        principal_id: "pipeline-owner".to_string(),
        credential_id: Uuid::new_v4(),
        webhook_url: webhook_url.map(str::to_string),
        queue_handle: None,
        progress_percent: 0,
        progress_message: None,
        result: None,
        result_url: None,
        error_code: None,
        error_message: None,
        created_at: Utc::now(),
        started_at: None,
        completed_at: None,
        webhook_status: WebhookStatus::Pending,
    }
}

fn forged_transcription(job_id: Uuid, blob_key: &str) -> Transcription {
    Transcription {
        id: Uuid::new_v4(),
        job_id,
        audio_url: None,
        audio_blob_key: Some(blob_key.to_string()),
        language_code: Some("fr".to_string()),
        speaker_labels: true,
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
        principal_id: "pipeline-owner".to_string(),
        created_at: Utc::now(),
        completed_at: None,
    }
}

/// Guion STT: "Bonjour, bienvenue" con marcas de palabra en segundos.
fn scripted_stt() -> SttBackend {
    SttBackend::Mock(MockSttBackend::with_script(SttOutput {
        text: "Bonjour, bienvenue".to_string(),
        words: vec![
            SttWordOutput {
                text: "Bonjour,".to_string(),
                start_seconds: 0.0,
                end_seconds: 0.472,
                confidence: 0.9,
            },
            SttWordOutput {
                text: "bienvenue".to_string(),
                start_seconds: 0.472,
                end_seconds: 0.944,
                confidence: 0.9,
            },
        ],
        segments: vec![SttSegmentOutput {
            id: 0,
            text: "Bonjour, bienvenue".to_string(),
            start_seconds: 0.0,
            end_seconds: 25.04,
            confidence: 0.9,
        }],
        language: Some("fr".to_string()),
        language_confidence: Some(0.98),
        audio_duration_seconds: 25.04,
    }))
}

/// Guion de diarización: un único hablante sobre todo el audio.
fn scripted_diarization() -> DiarizationBackend {
    DiarizationBackend::Mock(MockDiarizationBackend::with_script(DiarizationOutput {
        turns: vec![RawSpeakerTurn {
            raw_label: "SPEAKER_00".to_string(),
            start_seconds: 0.0,
            end_seconds: 25.04,
            confidence: 1.0,
        }],
        audio_duration_seconds: 25.04,
        processing_time_ms: Some(7),
    }))
}

/**
 * CERTIFICACIÓN: Transcripción asíncrona con diarización. El camino
 * preciso produce un único enunciado A con el texto completo, las
 * palabras convertidas a milisegundos y speakers=["A"].
 */
#[tokio::test]
async fn certify_transcription_with_diarization_pipeline() {
    println!("\n🧪 [PROVING_GROUNDS]: Auditing full transcription pipeline strata...");

    let yard = assemble_yard("pipeline_e2e").await;
    let job_repository = JobRepository::new(yard.database_client.clone());
    let transcription_repository = TranscriptionRepository::new(yard.database_client.clone());

    // 1. SETUP: audio en el blob store + trabajo encolado
    let blob_key = "transcriptions/2026/08/01/probe.wav";
    yard.blob_store
        .put(blob_key, vec![82, 73, 70, 70, 0, 0], "audio/wav")
        .await
        .unwrap();

    let job = forged_job(JobType::Transcription, None);
    let transcription = forged_transcription(job.id, blob_key);
    job_repository
        .create_with_transcription(&job, &transcription)
        .await
        .unwrap();
    job_repository.mark_queued(job.id, "queue-handle").await.unwrap();

    // 2. EJECUCIÓN DEL BANCO DE TRABAJO
    let workbench = TaskWorkbench::from_components(
        yard.database_client.clone(),
        yard.blob_store.clone(),
        yard.task_queue.clone(),
        scripted_stt(),
        scripted_diarization(),
    )
    .unwrap();

    let descriptor = TaskDescriptor::Transcription {
        job_id: job.id,
        blob_key: Some(blob_key.to_string()),
        source_url: None,
        language: Some("fr".to_string()),
        speaker_labels: true,
        word_timestamps: true,
    };

    let outcome = workbench.execute(&descriptor).await.unwrap();
    assert_eq!(outcome, TaskOutcome::Completed);

    // 3. VALIDACIÓN DEL LEDGER
    let sealed_job = job_repository.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(sealed_job.status, JobStatus::Completed);
    assert_eq!(sealed_job.progress_percent, 100);
    assert_eq!(
        sealed_job.result_url.as_deref(),
        Some(format!("/v1/transcriptions/{}", transcription.id).as_str())
    );

    let sealed = transcription_repository
        .find_by_id(transcription.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(sealed.text.as_deref(), Some("Bonjour, bienvenue"));
    assert_eq!(sealed.language_detected.as_deref(), Some("fr"));

    let words = sealed.words.expect("L1_PIPELINE_FAULT: Words void.");
    assert_eq!(words.len(), 2);
    assert_eq!(words[0].text, "Bonjour,");
    assert_eq!(words[0].start, 0);
    assert_eq!(words[0].end, 472);
    assert_eq!(words[1].start, 472);
    assert_eq!(words[1].end, 944);
    assert!(words.iter().all(|word| word.speaker.is_none()), "Words must arrive unchanged.");

    assert_eq!(sealed.speakers.as_ref().unwrap(), &vec!["A".to_string()]);

    let utterances = sealed.utterances.expect("L1_PIPELINE_FAULT: Utterances void.");
    assert_eq!(utterances.len(), 1);
    assert_eq!(utterances[0].speaker, "A");
    assert_eq!(utterances[0].start, 0);
    assert_eq!(utterances[0].end, 25040);
    assert_eq!(utterances[0].text, "Bonjour, bienvenue");
    assert!((utterances[0].confidence - 1.0).abs() < f64::EPSILON);

    let stats = sealed.diarization_stats.unwrap();
    assert_eq!(stats.num_speakers, 1);
    assert_eq!(stats.audio_duration, 25040);
}

/**
 * CERTIFICACIÓN: Diarización pura. El payload consolidado transporta
 * speakers, segments, overlaps, stats y el documento RTTM.
 */
#[tokio::test]
async fn certify_pure_diarization_pipeline() {
    let yard = assemble_yard("pipeline_diar").await;
    let job_repository = JobRepository::new(yard.database_client.clone());

    let blob_key = "diarization/2026/08/01/duet.wav";
    yard.blob_store
        .put(blob_key, vec![1, 2, 3], "audio/wav")
        .await
        .unwrap();

    let job = forged_job(JobType::Diarization, None);
    job_repository.create(&job).await.unwrap();
    job_repository.mark_queued(job.id, "queue-handle").await.unwrap();

    let duet_diarization = DiarizationBackend::Mock(MockDiarizationBackend::with_script(
        DiarizationOutput {
            turns: vec![
                RawSpeakerTurn {
                    raw_label: "SPEAKER_01".to_string(),
                    start_seconds: 0.0,
                    end_seconds: 3.0,
                    confidence: 0.9,
                },
                RawSpeakerTurn {
                    raw_label: "SPEAKER_00".to_string(),
                    start_seconds: 2.0,
                    end_seconds: 5.0,
                    confidence: 0.8,
                },
            ],
            audio_duration_seconds: 5.0,
            processing_time_ms: Some(3),
        },
    ));

    let workbench = TaskWorkbench::from_components(
        yard.database_client.clone(),
        yard.blob_store.clone(),
        yard.task_queue.clone(),
        scripted_stt(),
        duet_diarization,
    )
    .unwrap();

    let descriptor = TaskDescriptor::Diarization {
        job_id: job.id,
        blob_key: Some(blob_key.to_string()),
        source_url: None,
        num_speakers: None,
        min_speakers: None,
        max_speakers: None,
    };

    assert_eq!(workbench.execute(&descriptor).await.unwrap(), TaskOutcome::Completed);

    let sealed_job = job_repository.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(sealed_job.status, JobStatus::Completed);

    let result = sealed_job.result.expect("L1_PIPELINE_FAULT: Result payload void.");

    // Primera aparición temporal: SPEAKER_01 (0.0s) recibe la letra A.
    let segments = result["segments"].as_array().unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0]["speaker"], "A");
    assert_eq!(segments[1]["speaker"], "B");

    let overlaps = result["overlaps"].as_array().unwrap();
    assert_eq!(overlaps.len(), 1, "L1_PIPELINE_FAULT: Overlap detection drift.");
    assert_eq!(overlaps[0]["start"], 2000);
    assert_eq!(overlaps[0]["end"], 3000);
    assert_eq!(overlaps[0]["duration"], 1000);

    let rttm_document = result["rttm"].as_str().unwrap();
    assert!(rttm_document.starts_with("SPEAKER duet 1 0.000 3.000"));

    assert_eq!(result["stats"]["num_speakers"], 2);
    assert_eq!(result["stats"]["overlap_duration"], 1000);
}

/**
 * CERTIFICACIÓN: Un trabajo cancelado antes del reclamo se omite sin
 * tocar su estado; el sellado de fallo registra código y mensaje.
 */
#[tokio::test]
async fn certify_skip_and_failure_seal() {
    let yard = assemble_yard("pipeline_fail").await;
    let job_repository = JobRepository::new(yard.database_client.clone());

    // 1. TRABAJO CANCELADO: el banco lo omite.
    let cancelled_job = forged_job(JobType::Diarization, None);
    job_repository.create(&cancelled_job).await.unwrap();
    job_repository.mark_queued(cancelled_job.id, "h1").await.unwrap();
    job_repository.cancel(cancelled_job.id).await.unwrap();

    let workbench = TaskWorkbench::from_components(
        yard.database_client.clone(),
        yard.blob_store.clone(),
        yard.task_queue.clone(),
        scripted_stt(),
        scripted_diarization(),
    )
    .unwrap();

    let cancelled_descriptor = TaskDescriptor::Diarization {
        job_id: cancelled_job.id,
        blob_key: Some("diarization/none.wav".to_string()),
        source_url: None,
        num_speakers: None,
        min_speakers: None,
        max_speakers: None,
    };

    assert_eq!(
        workbench.execute(&cancelled_descriptor).await.unwrap(),
        TaskOutcome::Skipped
    );
    let untouched = job_repository.find_by_id(cancelled_job.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, JobStatus::Cancelled, "Terminal state must stay frozen.");

    // 2. FALLO DE BLOB (clave ausente) Y SELLADO TERMINAL.
    let doomed_job = forged_job(JobType::Diarization, None);
    job_repository.create(&doomed_job).await.unwrap();
    job_repository.mark_queued(doomed_job.id, "h2").await.unwrap();

    let doomed_descriptor = TaskDescriptor::Diarization {
        job_id: doomed_job.id,
        blob_key: Some("diarization/vanished.wav".to_string()),
        source_url: None,
        num_speakers: None,
        min_speakers: None,
        max_speakers: None,
    };

    let fault = workbench.execute(&doomed_descriptor).await.unwrap_err();
    assert!(fault.is_retryable(), "Blob faults consume retry budget.");

    workbench.seal_job_failure(&doomed_descriptor, &fault).await;

    let failed = job_repository.find_by_id(doomed_job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert!(failed.error_code.is_some());
    assert!(failed.error_message.is_some());
}
// FIN DEL ARCHIVO [tests/mirror/apps/media_worker/pipeline_certification.test.rs]
