// [apps/media-worker/src/lib.rs]
/*!
 * =================================================================
 * APARATO: MEDIA WORKER LIBRARY BARREL
 * CLASIFICACIÓN: WORKER LIB (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: EXPOSICIÓN PÚBLICA DE MOTOR, PIPELINE Y COURIER
 * =================================================================
 */

pub mod engine;
pub mod pipeline;
pub mod webhook;

pub use engine::{WorkerEngine, WorkerSettings};
pub use pipeline::TaskWorkbench;
pub use webhook::WebhookCourier;
// FIN DEL ARCHIVO [apps/media-worker/src/lib.rs]
