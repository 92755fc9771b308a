// [libs/infra/task-queue/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TASK QUEUE LIBRARY BARREL
 * CLASIFICACIÓN: INFRASTRUCTURE LIB (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN PÚBLICA DE LA COLA DURABLE
 * =================================================================
 */

pub mod client;
pub mod errors;

pub use client::{ClaimedTask, TaskQueueClient};
pub use errors::QueueError;
// FIN DEL ARCHIVO [libs/infra/task-queue/src/lib.rs]
