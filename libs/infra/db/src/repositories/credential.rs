// [libs/infra/db/src/repositories/credential.rs]
/*!
 * =================================================================
 * APARATO: CREDENTIAL REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CUSTODIA DE CREDENCIALES PORTADORAS
 *
 * # Invariante (Hash-Only Custody):
 * La tabla jamás contiene tokens en claro: únicamente el hex de
 * SHA-256(salt ∥ cuerpo). La búsqueda de verificación resuelve por el
 * índice de `key_hash`.
 * =================================================================
 */

use chrono::Utc;
use libsql::params;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::client::DatabaseClient;
use crate::errors::DbError;
use lexia_domain_models::Credential;

use super::{
    optional_text, optional_timestamp, required_integer, required_text, required_timestamp,
    text_or_null, timestamp_or_null,
};

// --- REGISTRO DE SENTENCIAS SQL ---

const INSERT_CREDENTIAL: &str = r#"
    INSERT INTO credentials (
        id, name, key_hash, principal_id, group_id, permissions,
        rate_limit_per_minute, is_revoked, created_at, last_used_at, expires_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, key_hash, principal_id, group_id, permissions,
           rate_limit_per_minute, is_revoked, created_at, last_used_at, expires_at
    FROM credentials
"#;

const REVOKE_CREDENTIAL: &str = r#"
    UPDATE credentials SET is_revoked = 1 WHERE id = ?1 AND is_revoked = 0
"#;

const DELETE_CREDENTIAL: &str = "DELETE FROM credentials WHERE id = ?1";

const TOUCH_LAST_USED: &str = "UPDATE credentials SET last_used_at = ?2 WHERE id = ?1";

/// Resultado de una petición de revocación (operación idempotente).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationOutcome {
    Revoked,
    AlreadyRevoked,
    NotFound,
}

/**
 * Repositorio de autoridad única sobre el almacén de credenciales.
 */
pub struct CredentialRepository {
    database_client: DatabaseClient,
}

impl CredentialRepository {
    pub fn new(database_client: DatabaseClient) -> Self {
        Self { database_client }
    }

    /// Persiste una credencial recién emitida (el hash ya viene computado).
    #[instrument(skip(self, credential), fields(credential = %credential.id))]
    pub async fn insert(&self, credential: &Credential) -> Result<(), DbError> {
        let connection = self.database_client.connection()?;
        let permissions_json = serde_json::to_string(&credential.permissions)
            .map_err(|fault| DbError::MappingError(format!("PERMISSIONS_ENCODE_FAULT: {}", fault)))?;

        connection
            .execute(
                INSERT_CREDENTIAL,
                params![
                    credential.id.to_string(),
                    credential.name.clone(),
                    credential.key_hash.clone(),
                    credential.principal_id.clone(),
                    text_or_null(&credential.group_id),
                    permissions_json,
                    credential.rate_limit_per_minute as i64,
                    credential.is_revoked as i64,
                    credential.created_at.to_rfc3339(),
                    timestamp_or_null(&credential.last_used_at),
                    timestamp_or_null(&credential.expires_at),
                ],
            )
            .await?;

        info!("🔑 [CREDENTIAL_STORE]: Credential {} sealed for principal {}.",
            credential.id, credential.principal_id);
        Ok(())
    }

    /// Resuelve la credencial por el hash salado del token presentado.
    pub async fn find_by_hash(&self, key_hash: &str) -> Result<Option<Credential>, DbError> {
        let connection = self.database_client.connection()?;
        let mut rows = connection
            .query(&format!("{} WHERE key_hash = ?1", SELECT_COLUMNS), params![key_hash])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row_to_credential(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, credential_id: Uuid) -> Result<Option<Credential>, DbError> {
        let connection = self.database_client.connection()?;
        let mut rows = connection
            .query(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![credential_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row_to_credential(&row)?)),
            None => Ok(None),
        }
    }

    /// Lista las credenciales de un principal, la más reciente primero.
    pub async fn list_by_principal(&self, principal_id: &str) -> Result<Vec<Credential>, DbError> {
        let connection = self.database_client.connection()?;
        let mut rows = connection
            .query(
                &format!("{} WHERE principal_id = ?1 ORDER BY created_at DESC", SELECT_COLUMNS),
                params![principal_id],
            )
            .await?;

        let mut credentials = Vec::new();
        while let Some(row) = rows.next().await? {
            credentials.push(Self::map_row_to_credential(&row)?);
        }
        Ok(credentials)
    }

    /**
     * Revoca una credencial de forma idempotente.
     * Una segunda revocación es un no-op que reporta `AlreadyRevoked`.
     */
    #[instrument(skip(self))]
    pub async fn revoke(&self, credential_id: Uuid) -> Result<RevocationOutcome, DbError> {
        let connection = self.database_client.connection()?;
        let rows_affected = connection
            .execute(REVOKE_CREDENTIAL, params![credential_id.to_string()])
            .await?;

        if rows_affected > 0 {
            info!("🚫 [CREDENTIAL_STORE]: Credential {} revoked.", credential_id);
            return Ok(RevocationOutcome::Revoked);
        }

        // Distinción inexistente vs ya-revocada para el contrato idempotente.
        match self.find_by_id(credential_id).await? {
            Some(_) => Ok(RevocationOutcome::AlreadyRevoked),
            None => Ok(RevocationOutcome::NotFound),
        }
    }

    pub async fn delete(&self, credential_id: Uuid) -> Result<bool, DbError> {
        let connection = self.database_client.connection()?;
        let rows_affected = connection
            .execute(DELETE_CREDENTIAL, params![credential_id.to_string()])
            .await?;
        Ok(rows_affected > 0)
    }

    /**
     * Actualiza `last_used_at` tras una verificación exitosa.
     * Best-effort: el fallo se registra y jamás se propaga al llamante.
     */
    pub async fn touch_last_used(&self, credential_id: Uuid) {
        let update_result = async {
            let connection = self.database_client.connection()?;
            connection
                .execute(
                    TOUCH_LAST_USED,
                    params![credential_id.to_string(), Utc::now().to_rfc3339()],
                )
                .await
                .map_err(DbError::from)
        }
        .await;

        if let Err(fault) = update_result {
            warn!("⚠️ [CREDENTIAL_STORE]: last_used_at update lost for {}: {}", credential_id, fault);
        } else {
            debug!("📍 [CREDENTIAL_STORE]: last_used_at refreshed for {}.", credential_id);
        }
    }

    fn map_row_to_credential(row: &libsql::Row) -> Result<Credential, DbError> {
        let raw_identifier = required_text(row, 0)?;
        let permissions_json = required_text(row, 5)?;

        Ok(Credential {
            id: Uuid::parse_str(&raw_identifier)
                .map_err(|fault| DbError::MappingError(format!("UUID_PARSE_FAULT: {}", fault)))?,
            name: required_text(row, 1)?,
            key_hash: required_text(row, 2)?,
            principal_id: required_text(row, 3)?,
            group_id: optional_text(row, 4)?,
            permissions: serde_json::from_str(&permissions_json)
                .map_err(|fault| DbError::MappingError(format!("PERMISSIONS_DECODE_FAULT: {}", fault)))?,
            rate_limit_per_minute: required_integer(row, 6)? as u32,
            is_revoked: required_integer(row, 7)? != 0,
            created_at: required_timestamp(row, 8)?,
            last_used_at: optional_timestamp(row, 9)?,
            expires_at: optional_timestamp(row, 10)?,
        })
    }
}
// FIN DEL ARCHIVO [libs/infra/db/src/repositories/credential.rs]
