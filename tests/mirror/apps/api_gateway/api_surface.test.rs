// [tests/mirror/apps/api_gateway/api_surface.test.rs]
/**
 * =================================================================
 * APARATO: API SURFACE TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L3-GATEWAY)
 * RESPONSABILIDAD: CERTIFICACIÓN END-TO-END DE INGESTA Y SONDEO
 *
 * Levanta el gateway sobre un listener efímero, lo golpea con reqwest
 * multipart y ejecuta la tarea encolada con el banco del worker para
 * cerrar el circuito sumisión -> cola -> pipeline -> sondeo.
 * =================================================================
 */

use chrono::Utc;
use uuid::Uuid;

use lexia_api_gateway::prelude::*;
use lexia_domain_models::{Credential, MEDIA_PIPELINE_QUEUE};
use lexia_infra_blob::BlobStoreClient;
use lexia_infra_compute::diarization::{DiarizationBackend, MockDiarizationBackend};
use lexia_infra_compute::stt::{MockSttBackend, SttBackend, SttOutput, SttSegmentOutput, SttWordOutput};
use lexia_infra_compute::{DiarizationOutput, RawSpeakerTurn};
use lexia_infra_db::repositories::CredentialRepository;
use lexia_infra_db::DatabaseClient;
use lexia_infra_queue::TaskQueueClient;
use lexia_media_worker::pipeline::TaskWorkbench;

fn test_config(max_upload_mb: u64) -> GatewayConfig {
    GatewayConfig {
        listening_port: 0,
        database_url: String::new(),
        database_auth_token: None,
        queue_url: String::new(),
        queue_auth_token: None,
        api_key_salt: "surface-salt".to_string(),
        api_key_prefix: "lx_".to_string(),
        blob_endpoint: None,
        blob_bucket: "lexia-audio".to_string(),
        blob_access_token: None,
        blob_local_root: None,
        stt_backend_kind: "mock".to_string(),
        stt_service_url: None,
        stt_model: None,
        diarization_backend_kind: "mock".to_string(),
        diarization_service_url: None,
        diarization_model: None,
        max_sync_file_size_mb: 50,
        max_upload_file_size_mb: max_upload_mb,
        default_rate_limit_per_minute: 60,
        cors_origins: vec!["*".to_string()],
    }
}

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

fn scripted_diarization() -> DiarizationBackend {
    DiarizationBackend::Mock(MockDiarizationBackend::with_script(DiarizationOutput {
        turns: vec![RawSpeakerTurn {
            raw_label: "SPEAKER_00".to_string(),
            start_seconds: 0.0,
            end_seconds: 25.04,
            confidence: 1.0,
        }],
        audio_duration_seconds: 25.04,
        processing_time_ms: Some(4),
    }))
}

async fn boot_gateway(tag: &str, max_upload_mb: u64) -> (String, AppState, tempfile::TempDir) {
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

    let state = AppState::new(
        database_client,
        task_queue,
        blob_store,
        scripted_stt(),
        scripted_diarization(),
        test_config(max_upload_mb),
    );

    let router = create_gateway_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let bound_address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", bound_address), state, blob_root)
}

async fn issue_token(state: &AppState, principal: &str, quota: u32) -> String {
    let plaintext_token = state.token_forge.generate_token();
    let credential = Credential {
        id: Uuid::new_v4(),
        name: "surface-probe".to_string(),
        key_hash: state.token_forge.hash_token(&plaintext_token),
        principal_id: principal.to_string(),
        group_id: None,
        permissions: vec!["*".to_string()],
        rate_limit_per_minute: quota,
        is_revoked: false,
        created_at: Utc::now(),
        last_used_at: None,
        expires_at: None,
    };

    CredentialRepository::new(state.database_client.clone())
        .insert(&credential)
        .await
        .unwrap();
    plaintext_token
}

fn audio_form(file_name: &str, payload: Vec<u8>) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().part(
        "audio",
        reqwest::multipart::Part::bytes(payload).file_name(file_name.to_string()),
    )
}

/// Ejecuta la siguiente tarea encolada con el banco del worker.
async fn drive_one_task(state: &AppState) {
    let claim = state
        .task_queue
        .claim_next(MEDIA_PIPELINE_QUEUE, "test-worker")
        .await
        .unwrap()
        .expect("L3_SURFACE_FAULT: Queue empty after submission.");

    let workbench = TaskWorkbench::from_components(
        state.database_client.clone(),
        (*state.blob_store).clone(),
        state.task_queue.clone(),
        scripted_stt(),
        scripted_diarization(),
    )
    .unwrap();

    workbench.execute(&claim.descriptor).await.unwrap();
    state.task_queue.complete(&claim.handle).await.unwrap();
}

/**
 * CERTIFICACIÓN: Circuito completo. Sumisión multipart 202 ->
 * pipeline -> sondeo completed con enunciados A y palabras intactas.
 */
#[tokio::test]
async fn certify_submission_to_completion_circuit() {
    println!("\n🧪 [PROVING_GROUNDS]: Auditing full surface circuit strata...");

    let (base_url, state, _blob_root) = boot_gateway("surface_circuit", 10).await;
    let token = issue_token(&state, "circuit-owner", 60).await;
    let http = reqwest::Client::new();

    // 1. SUMISIÓN MULTIPART (202 + estado queued)
    let submit_form = audio_form("meeting.wav", vec![82, 73, 70, 70])
        .text("speaker_labels", "true")
        .text("language_code", "fr");

    let accepted = http
        .post(format!("{}/v1/transcriptions", base_url))
        .bearer_auth(&token)
        .multipart(submit_form)
        .send()
        .await
        .unwrap();

    assert_eq!(accepted.status(), 202);
    let accepted_body: serde_json::Value = accepted.json().await.unwrap();
    assert_eq!(accepted_body["status"], "queued");
    let transcription_id = accepted_body["id"].as_str().unwrap().to_string();

    // 2. SONDEO INTERMEDIO (aún encolado)
    let pending_view = http
        .get(format!("{}/v1/transcriptions/{}", base_url, transcription_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(pending_view.status(), 200);
    let pending_body: serde_json::Value = pending_view.json().await.unwrap();
    assert_eq!(pending_body["status"], "queued");

    // 3. EJECUCIÓN DE LA TAREA ENCOLADA
    drive_one_task(&state).await;

    // 4. SONDEO FINAL (completed con resultado consolidado)
    let completed_view = http
        .get(format!("{}/v1/transcriptions/{}", base_url, transcription_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let completed_body: serde_json::Value = completed_view.json().await.unwrap();

    assert_eq!(completed_body["status"], "completed");
    assert_eq!(completed_body["text"], "Bonjour, bienvenue");
    assert_eq!(completed_body["speakers"], serde_json::json!(["A"]));

    let utterances = completed_body["utterances"].as_array().unwrap();
    assert_eq!(utterances.len(), 1);
    assert_eq!(utterances[0]["speaker"], "A");
    assert_eq!(utterances[0]["start"], 0);
    assert_eq!(utterances[0]["end"], 25040);
    assert_eq!(utterances[0]["text"], "Bonjour, bienvenue");

    let words = completed_body["words"].as_array().unwrap();
    assert_eq!(words.len(), 2);
    assert_eq!(words[0]["start"], 0);
    assert_eq!(words[0]["end"], 472);

    // El trabajo aparece en el listado del principal.
    let jobs_listing = http
        .get(format!("{}/v1/jobs?status=completed", base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let jobs_body: serde_json::Value = jobs_listing.json().await.unwrap();
    assert_eq!(jobs_body.as_array().unwrap().len(), 1);
}

/**
 * CERTIFICACIÓN: Taxonomía de validación de ingesta: fuente ausente,
 * URL sin esquema http(s), sufijo no soportado y tope de tamaño con
 * frontera exacta (límite pasa, límite+1 falla).
 */
#[tokio::test]
async fn certify_ingestion_validation_taxonomy() {
    let (base_url, state, _blob_root) = boot_gateway("surface_validation", 1).await;
    let token = issue_token(&state, "validation-owner", 60).await;
    let http = reqwest::Client::new();

    async fn submitted_code(response: reqwest::Response) -> (u16, String) {
        let status = response.status().as_u16();
        let body: serde_json::Value = response.json().await.unwrap();
        (status, body["error"]["code"].as_str().unwrap_or_default().to_string())
    }

    // 1. Fuente ausente.
    let missing_source = http
        .post(format!("{}/v1/transcriptions", base_url))
        .bearer_auth(&token)
        .multipart(reqwest::multipart::Form::new().text("language_code", "fr"))
        .send()
        .await
        .unwrap();
    let (status, code) = submitted_code(missing_source).await;
    assert_eq!((status, code.as_str()), (400, "missing_audio_source"));

    // 2. URL con esquema ajeno.
    let bad_url = http
        .post(format!("{}/v1/transcriptions", base_url))
        .bearer_auth(&token)
        .multipart(reqwest::multipart::Form::new().text("audio_url", "ftp://files/x.wav"))
        .send()
        .await
        .unwrap();
    let (status, code) = submitted_code(bad_url).await;
    assert_eq!((status, code.as_str()), (400, "invalid_url_format"));

    // 3. Sufijo no soportado.
    let bad_format = http
        .post(format!("{}/v1/transcriptions", base_url))
        .bearer_auth(&token)
        .multipart(audio_form("notes.txt", vec![1, 2, 3]))
        .send()
        .await
        .unwrap();
    let (status, code) = submitted_code(bad_format).await;
    assert_eq!((status, code.as_str()), (400, "invalid_audio_format"));

    // 4. Frontera de tamaño: exactamente 1 MB pasa; 1 MB + 1 byte falla.
    let at_limit = http
        .post(format!("{}/v1/transcriptions", base_url))
        .bearer_auth(&token)
        .multipart(audio_form("exact.wav", vec![0u8; 1024 * 1024]))
        .send()
        .await
        .unwrap();
    assert_eq!(at_limit.status(), 202, "L3_SURFACE_FAULT: At-limit upload rejected.");

    let over_limit = http
        .post(format!("{}/v1/transcriptions", base_url))
        .bearer_auth(&token)
        .multipart(audio_form("over.wav", vec![0u8; 1024 * 1024 + 1]))
        .send()
        .await
        .unwrap();
    let (status, code) = submitted_code(over_limit).await;
    assert_eq!((status, code.as_str()), (413, "file_too_large"));
}

/**
 * CERTIFICACIÓN: Frontera de cuota. La petición quota-ésima pasa, la
 * quota+1 falla con rate_limit_exceeded y pista Retry-After; los
 * sondeos GET quedan exentos.
 */
#[tokio::test]
async fn certify_rate_limit_boundary() {
    let (base_url, state, _blob_root) = boot_gateway("surface_quota", 10).await;
    let token = issue_token(&state, "quota-owner", 3).await;
    let http = reqwest::Client::new();

    for request_number in 1..=3 {
        let accepted = http
            .post(format!("{}/v1/diarization", base_url))
            .bearer_auth(&token)
            .multipart(audio_form("probe.wav", vec![9, 9, 9]))
            .send()
            .await
            .unwrap();
        assert_eq!(accepted.status(), 202,
            "L3_QUOTA_FAULT: Request {} within quota rejected.", request_number);
    }

    let over_quota = http
        .post(format!("{}/v1/diarization", base_url))
        .bearer_auth(&token)
        .multipart(audio_form("probe.wav", vec![9, 9, 9]))
        .send()
        .await
        .unwrap();
    assert_eq!(over_quota.status(), 429);
    let retry_hint: u64 = over_quota
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .expect("L3_QUOTA_FAULT: Retry-After hint void.");
    assert!(retry_hint <= 60, "Hint must be seconds-until-next-window.");

    // El sondeo queda exento de la cuota agotada.
    let polling = http
        .get(format!("{}/v1/jobs", base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(polling.status(), 200, "L3_QUOTA_FAULT: Polling must be exempt.");
}

/**
 * CERTIFICACIÓN: Gobernanza de llaves por HTTP: emisión (token
 * mostrado una vez), revocación idempotente y borrado.
 */
#[tokio::test]
async fn certify_credential_governance_surface() {
    let (base_url, state, _blob_root) = boot_gateway("surface_keys", 10).await;
    let admin_token = issue_token(&state, "keys-admin", 60).await;
    let http = reqwest::Client::new();

    // 1. Emisión.
    let issued = http
        .post(format!("{}/api-keys", base_url))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "name": "client-alpha",
            "principal": "client-1",
            "permissions": ["*"],
            "quota": 120
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(issued.status(), 201);
    let issued_body: serde_json::Value = issued.json().await.unwrap();
    let fresh_token = issued_body["plaintext_token"].as_str().unwrap().to_string();
    let fresh_id = issued_body["id"].as_str().unwrap().to_string();
    assert!(fresh_token.starts_with("lx_"));

    // El token emitido autentica de inmediato.
    let authenticated = http
        .get(format!("{}/v1/jobs", base_url))
        .bearer_auth(&fresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(authenticated.status(), 200);

    // 2. Revocación idempotente.
    let first_revoke = http
        .post(format!("{}/api-keys/{}/revoke", base_url, fresh_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let first_body: serde_json::Value = first_revoke.json().await.unwrap();
    assert_eq!(first_body["revoked"], true);

    let second_revoke = http
        .post(format!("{}/api-keys/{}/revoke", base_url, fresh_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let second_body: serde_json::Value = second_revoke.json().await.unwrap();
    assert_eq!(second_body["revoked"], true);
    assert!(second_body["message"].as_str().unwrap().contains("already"),
        "L3_KEYS_FAULT: Idempotent revoke message drift.");

    // El token revocado deja de autenticar.
    let rejected = http
        .get(format!("{}/v1/jobs", base_url))
        .bearer_auth(&fresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 401);

    // 3. Borrado.
    let deleted = http
        .delete(format!("{}/api-keys/{}", base_url, fresh_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let deleted_body: serde_json::Value = deleted.json().await.unwrap();
    assert_eq!(deleted_body["deleted"], true);
}
// FIN DEL ARCHIVO [tests/mirror/apps/api_gateway/api_surface.test.rs]
