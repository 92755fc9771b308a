// [tests/mirror/libs/infra/db/credential_lifecycle.test.rs]
/**
 * =================================================================
 * APARATO: CREDENTIAL LIFECYCLE TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L3-DB)
 * RESPONSABILIDAD: CERTIFICACIÓN DE EMISIÓN, RESOLUCIÓN Y REVOCACIÓN
 * =================================================================
 */

use chrono::{Duration, Utc};
use lexia_domain_models::Credential;
use lexia_infra_db::repositories::{CredentialRepository, RevocationOutcome};
use lexia_infra_db::DatabaseClient;
use uuid::Uuid;

fn forged_credential(principal: &str, key_hash: &str) -> Credential {
    Credential {
        id: Uuid::new_v4(),
        name: "proving-grounds".to_string(),
        key_hash: key_hash.to_string(),
        principal_id: principal.to_string(),
        group_id: None,
        permissions: vec!["*".to_string()],
        rate_limit_per_minute: 60,
        is_revoked: false,
        created_at: Utc::now(),
        last_used_at: None,
        expires_at: None,
    }
}

/**
 * CERTIFICACIÓN: Inserción + resolución por hash. La tabla contiene
 * únicamente el hash; jamás un token en claro.
 */
#[tokio::test]
async fn certify_insert_and_hash_resolution() {
    println!("\n🧪 [PROVING_GROUNDS]: Auditing credential custody strata...");

    let client = DatabaseClient::connect("file:cred_hash_test?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let repository = CredentialRepository::new(client);

    let credential = forged_credential("principal-1", "aabbccdd00112233");
    repository.insert(&credential).await.unwrap();

    let resolved = repository
        .find_by_hash("aabbccdd00112233")
        .await
        .unwrap()
        .expect("L3_CREDENTIAL_FAULT: Hash resolution void.");

    assert_eq!(resolved.id, credential.id);
    assert_eq!(resolved.principal_id, "principal-1");
    assert!(!resolved.is_revoked);
    assert!(resolved.has_permission("anything"), "Wildcard must grant all.");

    assert!(repository.find_by_hash("ffff0000").await.unwrap().is_none());
}

/**
 * CERTIFICACIÓN: Revocación idempotente. La segunda revocación es un
 * no-op que reporta AlreadyRevoked; un id inexistente reporta NotFound.
 */
#[tokio::test]
async fn certify_idempotent_revocation() {
    let client = DatabaseClient::connect("file:cred_revoke_test?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let repository = CredentialRepository::new(client);

    let credential = forged_credential("principal-2", "1111222233334444");
    repository.insert(&credential).await.unwrap();

    assert_eq!(
        repository.revoke(credential.id).await.unwrap(),
        RevocationOutcome::Revoked
    );
    assert_eq!(
        repository.revoke(credential.id).await.unwrap(),
        RevocationOutcome::AlreadyRevoked,
        "L3_CREDENTIAL_FAULT: Revocation must be idempotent."
    );
    assert_eq!(
        repository.revoke(Uuid::new_v4()).await.unwrap(),
        RevocationOutcome::NotFound
    );

    let resolved = repository.find_by_hash("1111222233334444").await.unwrap().unwrap();
    assert!(resolved.is_revoked);
}

/**
 * CERTIFICACIÓN: Expiración, listado por principal y actualización
 * best-effort de last_used_at.
 */
#[tokio::test]
async fn certify_expiry_listing_and_last_used() {
    let client = DatabaseClient::connect("file:cred_expiry_test?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let repository = CredentialRepository::new(client);

    let mut expired = forged_credential("principal-3", "9999aaaabbbbcccc");
    expired.expires_at = Some(Utc::now() - Duration::hours(1));
    repository.insert(&expired).await.unwrap();

    let fresh = forged_credential("principal-3", "ddddeeeeffff0000");
    repository.insert(&fresh).await.unwrap();

    let resolved_expired = repository.find_by_hash("9999aaaabbbbcccc").await.unwrap().unwrap();
    assert!(resolved_expired.is_expired(Utc::now()), "L3_CREDENTIAL_FAULT: Expiry not honored.");

    let listing = repository.list_by_principal("principal-3").await.unwrap();
    assert_eq!(listing.len(), 2);

    repository.touch_last_used(fresh.id).await;
    let touched = repository.find_by_id(fresh.id).await.unwrap().unwrap();
    assert!(touched.last_used_at.is_some(), "L3_CREDENTIAL_FAULT: last_used_at void after touch.");
}
// FIN DEL ARCHIVO [tests/mirror/libs/infra/db/credential_lifecycle.test.rs]
