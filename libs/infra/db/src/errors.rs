// [libs/infra/db/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DATABASE ERROR CATALOG
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 *
 * Los prefijos de estrato en los mensajes permiten al gateway mapear
 * cada fallo a la taxonomía pública sin inspección de texto libre.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Error de enlace físico o de red con el cluster libSQL.
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo en la configuración del entorno (variables vacías o malformadas).
    #[error("[L3_DB_CONFIG_FAULT]: ENVIRONMENT_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo en la transformación de tipos entre SQLite y el dominio Rust.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    /// Error al comprometer cambios en una secuencia multi-tabla.
    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE")]
    TransactionError,

    // --- ESTRATO DE CICLO DE VIDA DE TRABAJOS ---

    /// El trabajo solicitado no existe en el Ledger.
    #[error("[L3_JOB_FAULT]: IDENTIFIER_NOT_FOUND")]
    JobNotFound,

    /// El trabajo no admite la transición de estado solicitada.
    #[error("[L3_JOB_FAULT]: INVALID_STATE_TRANSITION")]
    InvalidStateTransition,

    // --- ESTRATO DE IDENTIDAD ---

    /// La credencial solicitada no existe en el almacén.
    #[error("[L3_CREDENTIAL_FAULT]: IDENTIFIER_NOT_FOUND")]
    CredentialNotFound,
}
// FIN DEL ARCHIVO [libs/infra/db/src/errors.rs]
