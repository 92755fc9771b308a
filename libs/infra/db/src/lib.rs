// [libs/infra/db/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DATABASE LIBRARY BARREL
 * CLASIFICACIÓN: INFRASTRUCTURE LIB (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN PÚBLICA DEL SUSTRATO DE PERSISTENCIA
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::DatabaseClient;
pub use errors::DbError;
// FIN DEL ARCHIVO [libs/infra/db/src/lib.rs]
