// [libs/infra/compute/src/lib.rs]
/*!
 * =================================================================
 * APARATO: COMPUTE LIBRARY BARREL
 * CLASIFICACIÓN: INFRASTRUCTURE LIB (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN PÚBLICA DE LOS MOTORES DE INFERENCIA
 *
 * # Invariante (Seconds Inside, Milliseconds Outside):
 * Los motores operan en segundos flotantes; la conversión a
 * milisegundos enteros ocurre en la frontera del worker, nunca aquí.
 * =================================================================
 */

pub mod diarization;
pub mod errors;
pub mod factory;
pub mod stt;

pub use diarization::{DiarizationBackend, DiarizationOutput, RawSpeakerTurn};
pub use errors::ComputeError;
pub use factory::{build_diarization_backend, build_stt_backend};
pub use stt::{SttBackend, SttOutput, SttSegmentOutput, SttWordOutput};
// FIN DEL ARCHIVO [libs/infra/compute/src/lib.rs]
