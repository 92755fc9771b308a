// [libs/infra/blob-store/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BLOB STORE LIBRARY BARREL
 * CLASIFICACIÓN: INFRASTRUCTURE LIB (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN PÚBLICA DEL ADAPTADOR DE OBJETOS
 * =================================================================
 */

pub mod client;
pub mod errors;

pub use client::{generate_blob_key, BlobStoreClient};
pub use errors::BlobError;
// FIN DEL ARCHIVO [libs/infra/blob-store/src/lib.rs]
