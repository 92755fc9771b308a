// [tests/mirror/apps/api_gateway/auth_guard.test.rs]
/**
 * =================================================================
 * APARATO: AUTH GUARD TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L4-GATEWAY)
 * RESPONSABILIDAD: CERTIFICACIÓN DEL PERÍMETRO DE AUTENTICACIÓN
 * =================================================================
 */

use chrono::{Duration as ChronoDuration, Utc};
use uuid::Uuid;

use lexia_api_gateway::prelude::*;
use lexia_domain_models::Credential;
use lexia_infra_blob::BlobStoreClient;
use lexia_infra_compute::diarization::{DiarizationBackend, MockDiarizationBackend};
use lexia_infra_compute::stt::{MockSttBackend, SttBackend};
use lexia_infra_db::repositories::CredentialRepository;
use lexia_infra_db::DatabaseClient;
use lexia_infra_queue::TaskQueueClient;

fn test_config() -> GatewayConfig {
    GatewayConfig {
        listening_port: 0,
        database_url: String::new(),
        database_auth_token: None,
        queue_url: String::new(),
        queue_auth_token: None,
        api_key_salt: "proving-grounds-salt".to_string(),
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
        max_upload_file_size_mb: 10,
        default_rate_limit_per_minute: 60,
        cors_origins: vec!["*".to_string()],
    }
}

async fn boot_gateway(tag: &str) -> (String, AppState, tempfile::TempDir) {
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
        SttBackend::Mock(MockSttBackend::new()),
        DiarizationBackend::Mock(MockDiarizationBackend::new()),
        test_config(),
    );

    let router = create_gateway_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let bound_address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", bound_address), state, blob_root)
}

/// Emite una credencial directamente contra el Ledger del gateway.
async fn issue_token(
    state: &AppState,
    principal: &str,
    permissions: Vec<&str>,
    revoked: bool,
    expired: bool,
) -> (String, Uuid) {
    let plaintext_token = state.token_forge.generate_token();
    let credential = Credential {
        id: Uuid::new_v4(),
        name: "guard-probe".to_string(),
        key_hash: state.token_forge.hash_token(&plaintext_token),
        principal_id: principal.to_string(),
        group_id: None,
        permissions: permissions.into_iter().map(str::to_string).collect(),
        rate_limit_per_minute: 60,
        is_revoked: revoked,
        created_at: Utc::now(),
        last_used_at: None,
        expires_at: if expired {
            Some(Utc::now() - ChronoDuration::hours(1))
        } else {
            None
        },
    };

    CredentialRepository::new(state.database_client.clone())
        .insert(&credential)
        .await
        .unwrap();

    (plaintext_token, credential.id)
}

async fn error_code(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.unwrap();
    body["error"]["code"].as_str().unwrap_or_default().to_string()
}

/**
 * CERTIFICACIÓN: Taxonomía de fallos del guardia: cabecera ausente,
 * forma inválida, hash desconocido, revocada y expirada.
 */
#[tokio::test]
async fn certify_authentication_failure_taxonomy() {
    println!("\n🧪 [PROVING_GROUNDS]: Auditing perimeter guard strata...");

    let (base_url, state, _blob_root) = boot_gateway("auth_taxonomy").await;
    let http = reqwest::Client::new();

    // 1. Cabecera ausente.
    let missing = http.get(format!("{}/v1/jobs", base_url)).send().await.unwrap();
    assert_eq!(missing.status(), 401);
    assert_eq!(error_code(missing).await, "missing_authorization");

    // 2. Forma irreconocible (tres piezas).
    let malformed = http
        .get(format!("{}/v1/jobs", base_url))
        .header("Authorization", "Bearer lx_abc extra-garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), 401);
    assert_eq!(error_code(malformed).await, "invalid_api_key");

    // 3. Prefijo ajeno.
    let wrong_prefix = http
        .get(format!("{}/v1/jobs", base_url))
        .bearer_auth("zz_0123456789012345678901234567890123456789")
        .send()
        .await
        .unwrap();
    assert_eq!(error_code(wrong_prefix).await, "invalid_api_key");

    // 4. Hash desconocido (forma válida, credencial inexistente).
    let unknown = http
        .get(format!("{}/v1/jobs", base_url))
        .bearer_auth("lx_0123456789012345678901234567890123456789")
        .send()
        .await
        .unwrap();
    assert_eq!(error_code(unknown).await, "invalid_api_key");

    // 5. Revocada.
    let (revoked_token, _) = issue_token(&state, "p-revoked", vec!["*"], true, false).await;
    let revoked = http
        .get(format!("{}/v1/jobs", base_url))
        .bearer_auth(&revoked_token)
        .send()
        .await
        .unwrap();
    assert_eq!(error_code(revoked).await, "auth_revoked");

    // 6. Expirada.
    let (expired_token, _) = issue_token(&state, "p-expired", vec!["*"], false, true).await;
    let expired = http
        .get(format!("{}/v1/jobs", base_url))
        .bearer_auth(&expired_token)
        .send()
        .await
        .unwrap();
    assert_eq!(error_code(expired).await, "auth_expired");
}

/**
 * CERTIFICACIÓN: Frontera de longitud del token: cuerpo de 19
 * caracteres rechazado, de 20 aceptado (y resuelto contra el almacén).
 */
#[tokio::test]
async fn certify_token_length_boundary() {
    let (base_url, _state, _blob_root) = boot_gateway("auth_boundary").await;
    let http = reqwest::Client::new();

    let nineteen_body_token = format!("lx_{}", "a".repeat(19));
    let rejected = http
        .get(format!("{}/v1/jobs", base_url))
        .bearer_auth(&nineteen_body_token)
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 401);
    let rejected_body: serde_json::Value = rejected.json().await.unwrap();
    assert!(rejected_body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("too short"));

    // Con 20 caracteres la forma pasa; el fallo pasa a ser de resolución.
    let twenty_body_token = format!("lx_{}", "a".repeat(20));
    let shape_accepted = http
        .get(format!("{}/v1/jobs", base_url))
        .bearer_auth(&twenty_body_token)
        .send()
        .await
        .unwrap();
    let accepted_body: serde_json::Value = shape_accepted.json().await.unwrap();
    assert!(!accepted_body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("too short"));
}

/**
 * CERTIFICACIÓN: Camino feliz con Bearer y con token desnudo; /health
 * queda fuera del perímetro; el permiso keys:manage gobierna /api-keys.
 */
#[tokio::test]
async fn certify_happy_path_and_permission_gate() {
    let (base_url, state, _blob_root) = boot_gateway("auth_happy").await;
    let http = reqwest::Client::new();

    let (admin_token, _) = issue_token(&state, "p-admin", vec!["*"], false, false).await;
    let (plain_token, _) = issue_token(&state, "p-plain", vec!["jobs:read"], false, false).await;

    // Bearer y token desnudo autentican por igual.
    let with_bearer = http
        .get(format!("{}/v1/jobs", base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(with_bearer.status(), 200);

    let bare = http
        .get(format!("{}/v1/jobs", base_url))
        .header("Authorization", &plain_token)
        .send()
        .await
        .unwrap();
    assert_eq!(bare.status(), 200);

    // El token en claro jamás reaparece en un listado.
    let listing = http
        .get(format!("{}/api-keys", base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(listing.status(), 200);
    let listing_body = listing.text().await.unwrap();
    assert!(!listing_body.contains(&admin_token), "L4_GUARD_FAULT: Plaintext token leaked.");

    // Sin keys:manage, la gobernanza de llaves se rechaza con 403.
    let forbidden = http
        .get(format!("{}/api-keys", base_url))
        .bearer_auth(&plain_token)
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status(), 403);
    assert_eq!(error_code(forbidden).await, "insufficient_permissions");

    // /health vive fuera del perímetro.
    let health = http.get(format!("{}/health", base_url)).send().await.unwrap();
    assert_eq!(health.status(), 200);
    let health_body: serde_json::Value = health.json().await.unwrap();
    assert_eq!(health_body["status"], "healthy");
}
// FIN DEL ARCHIVO [tests/mirror/apps/api_gateway/auth_guard.test.rs]
