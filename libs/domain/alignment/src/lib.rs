// [libs/domain/alignment/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ALIGNMENT LIBRARY BARREL
 * CLASIFICACIÓN: DOMAIN COMPUTE (ESTRATO L2)
 * RESPONSABILIDAD: EXPOSICIÓN PÚBLICA DEL MOTOR DE ALINEAMIENTO
 *
 * Estrato de cómputo puro sin I/O: todas las funciones son totales y
 * deterministas sobre sus entradas, lo que permite certificarlas sin
 * backends reales.
 * =================================================================
 */

pub mod engine;
pub mod overlap;
pub mod refine;
pub mod relabel;
pub mod rttm;
pub mod stats;

pub use engine::align_transcript_with_segments;
pub use overlap::detect_overlaps;
pub use refine::{filter_minimum_duration, merge_speaker_gaps};
pub use relabel::{letter_for_speaker_index, relabel_speakers};
pub use rttm::generate_rttm;
pub use stats::compute_speaker_stats;
// FIN DEL ARCHIVO [libs/domain/alignment/src/lib.rs]
