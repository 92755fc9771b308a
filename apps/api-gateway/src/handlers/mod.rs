// [apps/api-gateway/src/handlers/mod.rs]
/*!
 * =================================================================
 * APARATO: HANDLER ACCESS MATRIX
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE LOS ADAPTADORES HTTP
 * =================================================================
 */

/// Gestión del ciclo de vida de credenciales (emisión, listado, revocación).
pub mod api_keys;
/// Ingesta y sondeo de trabajos de diarización pura.
pub mod diarization;
/// Sonda de salud no autenticada.
pub mod health;
/// Utilidades compartidas de ingesta multipart y validación de audio.
pub mod ingestion;
/// Listado, sondeo y cancelación de trabajos del principal.
pub mod jobs;
/// Ingesta, sondeo y borrado de transcripciones.
pub mod transcriptions;
// FIN DEL ARCHIVO [apps/api-gateway/src/handlers/mod.rs]
