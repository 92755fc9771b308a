// [libs/infra/blob-store/src/errors.rs]
/*!
 * =================================================================
 * APARATO: BLOB STORE ERROR CATALOG
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE OBJETOS
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    /// Fallo de red o de protocolo contra el bucket remoto.
    #[error("[L3_BLOB_NET_FAULT]: OBJECT_UPLINK_SEVERED -> {0}")]
    TransportError(#[from] reqwest::Error),

    /// El bucket remoto rechazó la operación con un estado no exitoso.
    #[error("[L3_BLOB_FAULT]: REMOTE_REJECTION status={0}")]
    RemoteRejection(u16),

    /// La clave solicitada no existe en el almacén.
    #[error("[L3_BLOB_FAULT]: KEY_NOT_FOUND -> {0}")]
    KeyNotFound(String),

    /// Fallo de E/S sobre el directorio local de la variante de desarrollo.
    #[error("[L3_BLOB_IO_FAULT]: LOCAL_STORE_IO -> {0}")]
    LocalIo(#[from] std::io::Error),

    /// Configuración de entorno incompleta para la variante seleccionada.
    #[error("[L3_BLOB_CONFIG_FAULT]: ENVIRONMENT_VOID -> {0}")]
    ConfigurationError(String),
}
// FIN DEL ARCHIVO [libs/infra/blob-store/src/errors.rs]
