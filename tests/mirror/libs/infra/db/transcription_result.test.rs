// [tests/mirror/libs/infra/db/transcription_result.test.rs]
/**
 * =================================================================
 * APARATO: TRANSCRIPTION RESULT TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L3-DB)
 * RESPONSABILIDAD: CERTIFICACIÓN DE COLUMNAS JSON Y RESOLUCIÓN INVERSA
 * =================================================================
 */

use chrono::Utc;
use lexia_domain_models::{
    DiarizationStats, Job, JobStatus, JobType, SpeakerSegment, Transcription, Utterance,
    WebhookStatus, Word,
};
use lexia_infra_db::repositories::{JobRepository, TranscriptionRepository};
use lexia_infra_db::DatabaseClient;
use uuid::Uuid;

fn forged_pair(principal: &str) -> (Job, Transcription) {
    let job = Job {
        id: Uuid::new_v4(),
        job_type: JobType::Transcription,
        status: JobStatus::Pending,
        params: serde_json::json!({"speaker_labels": true}),
        principal_id: principal.to_string(),
        credential_id: Uuid::new_v4(),
        webhook_url: None,
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
    };

    let transcription = Transcription {
        id: Uuid::new_v4(),
        job_id: job.id,
        audio_url: None,
        audio_blob_key: Some("transcriptions/2026/08/01/audio.wav".to_string()),
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
        principal_id: principal.to_string(),
        created_at: Utc::now(),
        completed_at: None,
    };

    (job, transcription)
}

/**
 * CERTIFICACIÓN: Inserción transaccional trabajo + transcripción y
 * resolución inversa por job_id vía índice.
 */
#[tokio::test]
async fn certify_atomic_insert_and_reverse_lookup() {
    println!("\n🧪 [PROVING_GROUNDS]: Auditing transcription custody strata...");

    let client = DatabaseClient::connect("file:trans_atomic_test?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let job_repository = JobRepository::new(client.clone());
    let transcription_repository = TranscriptionRepository::new(client);

    let (job, transcription) = forged_pair("owner-1");
    job_repository
        .create_with_transcription(&job, &transcription)
        .await
        .unwrap();

    let by_job = transcription_repository
        .find_by_job_id(job.id)
        .await
        .unwrap()
        .expect("L3_TRANS_FAULT: Reverse lookup void.");
    assert_eq!(by_job.id, transcription.id);
    assert_eq!(by_job.audio_blob_key.as_deref(), Some("transcriptions/2026/08/01/audio.wav"));

    assert!(job_repository.find_by_id(job.id).await.unwrap().is_some());
}

/**
 * CERTIFICACIÓN: Roundtrip de las columnas JSON de resultado (words,
 * segments, utterances, diarization) sin deriva de esquema.
 */
#[tokio::test]
async fn certify_result_columns_roundtrip() {
    let client = DatabaseClient::connect("file:trans_result_test?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let transcription_repository = TranscriptionRepository::new(client.clone());
    let job_repository = JobRepository::new(client);

    let (job, transcription) = forged_pair("owner-2");
    job_repository
        .create_with_transcription(&job, &transcription)
        .await
        .unwrap();

    let words = vec![
        Word { text: "Bonjour,".into(), start: 0, end: 472, confidence: 0.9, speaker: None },
        Word { text: "bienvenue".into(), start: 472, end: 944, confidence: 0.9, speaker: None },
    ];

    transcription_repository
        .set_stt_result(
            transcription.id,
            "Bonjour, bienvenue",
            &Some(words.clone()),
            &None,
            Some("fr"),
            Some(0.98),
            Some(0.9),
        )
        .await
        .unwrap();

    let utterances = vec![Utterance {
        speaker: "A".into(),
        start: 0,
        end: 25040,
        text: "Bonjour, bienvenue".into(),
        confidence: 1.0,
    }];
    let segments = vec![SpeakerSegment { speaker: "A".into(), start: 0, end: 25040, confidence: 1.0 }];
    let stats = DiarizationStats {
        num_speakers: 1,
        num_segments: 1,
        audio_duration: 25040,
        num_overlaps: 0,
        overlap_duration: 0,
        processing_time_ms: Some(12),
    };

    transcription_repository
        .set_diarization_result(
            transcription.id,
            &Some(vec!["A".to_string()]),
            &Some(utterances.clone()),
            &Some(segments.clone()),
            &Some(stats.clone()),
        )
        .await
        .unwrap();

    let observed = transcription_repository
        .find_by_id(transcription.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(observed.text.as_deref(), Some("Bonjour, bienvenue"));
    assert_eq!(observed.words.as_ref().unwrap(), &words, "L3_TRANS_FAULT: Word column drift.");
    assert_eq!(observed.utterances.as_ref().unwrap(), &utterances);
    assert_eq!(observed.diarization_segments.as_ref().unwrap(), &segments);
    assert_eq!(observed.diarization_stats.as_ref().unwrap(), &stats);
    assert_eq!(observed.speakers.as_ref().unwrap(), &vec!["A".to_string()]);
    assert_eq!(observed.language_detected.as_deref(), Some("fr"));
    assert!(observed.completed_at.is_some());
}

/**
 * CERTIFICACIÓN: El borrado elimina la fila; la resolución posterior
 * es None (el blob se limpia en el estrato superior).
 */
#[tokio::test]
async fn certify_row_deletion() {
    let client = DatabaseClient::connect("file:trans_delete_test?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let transcription_repository = TranscriptionRepository::new(client.clone());
    let job_repository = JobRepository::new(client);

    let (job, transcription) = forged_pair("owner-3");
    job_repository
        .create_with_transcription(&job, &transcription)
        .await
        .unwrap();

    assert!(transcription_repository.delete(transcription.id).await.unwrap());
    assert!(transcription_repository
        .find_by_id(transcription.id)
        .await
        .unwrap()
        .is_none());
    assert!(!transcription_repository.delete(transcription.id).await.unwrap());
}
// FIN DEL ARCHIVO [tests/mirror/libs/infra/db/transcription_result.test.rs]
