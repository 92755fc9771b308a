// [apps/api-gateway/src/handlers/api_keys.rs]
/*!
 * =================================================================
 * APARATO: CREDENTIAL GOVERNANCE HANDLER
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: EMISIÓN, LISTADO, REVOCACIÓN Y BORRADO DE LLAVES
 *
 * # Invariante (Show Once):
 * El token en claro aparece únicamente en la respuesta de emisión;
 * ninguna otra respuesta de la plataforma lo contiene jamás.
 *
 * # Invariante (Management Permission):
 * Toda operación de este handler exige el permiso `keys:manage`
 * (o el comodín) sobre la credencial llamante.
 * =================================================================
 */

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use lexia_domain_models::Credential;
use lexia_infra_db::repositories::{CredentialRepository, RevocationOutcome};

use crate::errors::ApiError;
use crate::middleware::AuthenticatedPrincipal;
use crate::state::AppState;

/// Permiso nominal de gobernanza de credenciales.
pub const KEYS_MANAGE_PERMISSION: &str = "keys:manage";

/// Sumisión de emisión de una credencial nueva.
#[derive(Deserialize)]
pub struct IssueCredentialRequest {
    pub name: String,
    pub principal: String,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    /// Cuota de peticiones por minuto; nula usa el valor por defecto.
    #[serde(default)]
    pub quota: Option<u32>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Respuesta de emisión: la única aparición del token en claro.
#[derive(Serialize)]
pub struct IssueCredentialResponse {
    pub id: Uuid,
    pub plaintext_token: String,
    pub name: String,
    pub principal: String,
    pub message: &'static str,
}

/// Resumen de credencial sin material secreto.
#[derive(Serialize)]
pub struct CredentialSummary {
    pub id: Uuid,
    pub name: String,
    pub principal: String,
    pub group: Option<String>,
    pub permissions: Vec<String>,
    pub quota: u32,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CredentialSummary {
    fn from_credential(credential: Credential) -> Self {
        Self {
            id: credential.id,
            name: credential.name,
            principal: credential.principal_id,
            group: credential.group_id,
            permissions: credential.permissions,
            quota: credential.rate_limit_per_minute,
            revoked: credential.is_revoked,
            created_at: credential.created_at,
            last_used_at: credential.last_used_at,
            expires_at: credential.expires_at,
        }
    }
}

#[derive(Deserialize)]
pub struct ListCredentialsQuery {
    pub principal: Option<String>,
}

pub struct CredentialGovernanceHandler;

impl CredentialGovernanceHandler {
    /**
     * Endpoint: POST /api-keys
     *
     * Emite una credencial nueva y devuelve el token en claro una
     * única vez.
     *
     * # Errors:
     * - `insufficient_permissions`: El llamante carece de `keys:manage`.
     */
    #[instrument(skip_all, fields(principal = %request_payload.principal))]
    pub async fn handle_issue_credential(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        Json(request_payload): Json<IssueCredentialRequest>,
    ) -> Result<impl IntoResponse, ApiError> {
        caller.require_permission(KEYS_MANAGE_PERMISSION)?;

        if request_payload.name.trim().is_empty() {
            return Err(ApiError::validation("name must not be empty.", Some("name"), None));
        }

        let plaintext_token = application_state.token_forge.generate_token();
        let key_hash = application_state.token_forge.hash_token(&plaintext_token);

        let credential = Credential {
            id: Uuid::new_v4(),
            name: request_payload.name.clone(),
            key_hash,
            principal_id: request_payload.principal.clone(),
            group_id: request_payload.group,
            permissions: request_payload
                .permissions
                .unwrap_or_else(|| vec!["*".to_string()]),
            rate_limit_per_minute: request_payload
                .quota
                .unwrap_or(application_state.config.default_rate_limit_per_minute),
            is_revoked: false,
            created_at: Utc::now(),
            last_used_at: None,
            expires_at: request_payload.expires_at,
        };

        let credential_repository =
            CredentialRepository::new(application_state.database_client.clone());
        credential_repository.insert(&credential).await?;

        info!("🔑 [KEYSMITH]: Credential {} issued for principal {}.",
            credential.id, credential.principal_id);

        Ok((
            StatusCode::CREATED,
            Json(IssueCredentialResponse {
                id: credential.id,
                plaintext_token,
                name: credential.name,
                principal: credential.principal_id,
                message: "Save this token now. It will not be shown again.",
            }),
        ))
    }

    /**
     * Endpoint: GET /api-keys?principal=...
     *
     * Lista resúmenes de credenciales (jamás el token) del principal
     * indicado; por defecto, el del llamante.
     */
    pub async fn handle_list_credentials(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        Query(query): Query<ListCredentialsQuery>,
    ) -> Result<impl IntoResponse, ApiError> {
        caller.require_permission(KEYS_MANAGE_PERMISSION)?;

        let target_principal = query
            .principal
            .unwrap_or_else(|| caller.principal_id().to_string());

        let credential_repository =
            CredentialRepository::new(application_state.database_client.clone());
        let credentials = credential_repository
            .list_by_principal(&target_principal)
            .await?;

        let summaries: Vec<CredentialSummary> = credentials
            .into_iter()
            .map(CredentialSummary::from_credential)
            .collect();

        Ok(Json(serde_json::json!({
            "keys": summaries,
            "total": summaries.len(),
        })))
    }

    /**
     * Endpoint: POST /api-keys/{id}/revoke
     *
     * Revocación idempotente: revocar una credencial ya revocada
     * devuelve `revoked=true` con el mensaje "already revoked".
     */
    #[instrument(skip_all, fields(credential = %credential_id))]
    pub async fn handle_revoke_credential(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        Path(credential_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, ApiError> {
        caller.require_permission(KEYS_MANAGE_PERMISSION)?;

        let credential_repository =
            CredentialRepository::new(application_state.database_client.clone());

        let response_message = match credential_repository.revoke(credential_id).await? {
            RevocationOutcome::Revoked => "API key revoked.",
            RevocationOutcome::AlreadyRevoked => "API key already revoked.",
            RevocationOutcome::NotFound => {
                return Err(ApiError::NotFound {
                    message: format!("API key not found: {}", credential_id),
                    code: "api_key_not_found",
                })
            }
        };

        Ok(Json(serde_json::json!({
            "id": credential_id,
            "revoked": true,
            "message": response_message,
        })))
    }

    /**
     * Endpoint: DELETE /api-keys/{id}
     */
    #[instrument(skip_all, fields(credential = %credential_id))]
    pub async fn handle_delete_credential(
        State(application_state): State<AppState>,
        Extension(caller): Extension<AuthenticatedPrincipal>,
        Path(credential_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, ApiError> {
        caller.require_permission(KEYS_MANAGE_PERMISSION)?;

        let credential_repository =
            CredentialRepository::new(application_state.database_client.clone());

        if !credential_repository.delete(credential_id).await? {
            return Err(ApiError::NotFound {
                message: format!("API key not found: {}", credential_id),
                code: "api_key_not_found",
            });
        }

        Ok(Json(serde_json::json!({
            "id": credential_id,
            "deleted": true,
            "message": "API key deleted.",
        })))
    }
}
// FIN DEL ARCHIVO [apps/api-gateway/src/handlers/api_keys.rs]
