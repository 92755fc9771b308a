// [libs/infra/task-queue/src/errors.rs]
/*!
 * =================================================================
 * APARATO: TASK QUEUE ERROR CATALOG
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE LA COLA
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    /// Error de enlace físico con el sustrato de la cola.
    #[error("[L3_QUEUE_NET_FAULT]: QUEUE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Configuración de entorno incompleta para la cola.
    #[error("[L3_QUEUE_CONFIG_FAULT]: ENVIRONMENT_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de ejecución devuelto por el motor libSQL.
    #[error("[L3_QUEUE_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo de codificación del descriptor de tarea.
    #[error("[L3_QUEUE_CODEC_FAULT]: DESCRIPTOR_CODEC_VIOLATION -> {0}")]
    CodecError(String),

    /// Error al comprometer la secuencia atómica de reclamo.
    #[error("[L3_QUEUE_FAULT]: CLAIM_TRANSACTION_COLLAPSE")]
    TransactionError,
}
// FIN DEL ARCHIVO [libs/infra/task-queue/src/errors.rs]
