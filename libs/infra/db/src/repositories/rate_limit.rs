// [libs/infra/db/src/repositories/rate_limit.rs]
/*!
 * =================================================================
 * APARATO: RATE LIMIT COUNTER REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CONTADOR DE VENTANA FIJA POR CREDENCIAL Y MINUTO
 *
 * # Invariante (Atomic Increment):
 * El incremento-y-lectura es una única sentencia UPSERT ... RETURNING;
 * no existe ventana de carrera lectura-modificación-escritura entre
 * instancias del gateway.
 * =================================================================
 */

use libsql::params;
use tracing::{debug, instrument};

use crate::client::DatabaseClient;
use crate::errors::DbError;

use super::required_integer;

// --- REGISTRO DE SENTENCIAS SQL ---

/// Incremento atómico del contador de la ventana con lectura inmediata.
const INCREMENT_AND_READ: &str = r#"
    INSERT INTO rate_limit_counters (credential_id, window_minute, request_count)
    VALUES (?1, ?2, 1)
    ON CONFLICT (credential_id, window_minute)
    DO UPDATE SET request_count = request_count + 1
    RETURNING request_count
"#;

/// Purga de ventanas caducadas (equivalente funcional a un TTL de 60s).
const PURGE_STALE_WINDOWS: &str = r#"
    DELETE FROM rate_limit_counters WHERE window_minute < ?1
"#;

/**
 * Repositorio del contador de cuota compartido entre instancias de la API.
 */
pub struct RateLimitRepository {
    database_client: DatabaseClient,
}

impl RateLimitRepository {
    pub fn new(database_client: DatabaseClient) -> Self {
        Self { database_client }
    }

    /**
     * Incrementa el contador de la ventana (credencial, minuto unix) y
     * devuelve el total acumulado tras el incremento.
     */
    #[instrument(skip(self))]
    pub async fn increment_and_read(
        &self,
        credential_id: &str,
        window_minute: i64,
    ) -> Result<u32, DbError> {
        let connection = self.database_client.connection()?;
        let mut rows = connection
            .query(INCREMENT_AND_READ, params![credential_id, window_minute])
            .await?;

        let counter_row = rows
            .next()
            .await?
            .ok_or_else(|| DbError::MappingError("RATE_COUNTER_RETURNING_VOID".into()))?;

        let accumulated_count = required_integer(&counter_row, 0)? as u32;
        debug!("🧮 [RATE_LIMIT]: Window {} for {} at {} requests.",
            window_minute, credential_id, accumulated_count);
        Ok(accumulated_count)
    }

    /// Elimina las ventanas anteriores al minuto indicado.
    pub async fn purge_stale_windows(&self, before_minute: i64) -> Result<u64, DbError> {
        let connection = self.database_client.connection()?;
        let purged_count = connection
            .execute(PURGE_STALE_WINDOWS, params![before_minute])
            .await?;
        Ok(purged_count)
    }
}
// FIN DEL ARCHIVO [libs/infra/db/src/repositories/rate_limit.rs]
