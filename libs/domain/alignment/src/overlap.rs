// [libs/domain/alignment/src/overlap.rs]
/*!
 * =================================================================
 * APARATO: OVERLAP DETECTION ENGINE
 * CLASIFICACIÓN: DOMAIN COMPUTE (ESTRATO L2)
 * RESPONSABILIDAD: DETECCIÓN DE HABLA SIMULTÁNEA ENTRE HABLANTES
 *
 * # Invariante (Unordered Distinct Pairs):
 * Cada solape emitido proviene de un par no ordenado de segmentos con
 * hablantes distintos; las etiquetas se publican ordenadas y el
 * intervalo es el recorte `[max(starts), min(ends))`.
 * =================================================================
 */

use lexia_domain_models::{OverlapSegment, SpeakerSegment};

/**
 * Detecta intervalos de habla simultánea entre pares de segmentos de
 * hablantes distintos.
 *
 * # Performance:
 * Escaneo O(n²) sobre pares; los volúmenes de segmentos por audio
 * (centenas) lo mantienen despreciable frente a la inferencia.
 */
pub fn detect_overlaps(segments: &[SpeakerSegment]) -> Vec<OverlapSegment> {
    let mut overlaps: Vec<OverlapSegment> = Vec::new();

    for (first_index, first_segment) in segments.iter().enumerate() {
        for second_segment in segments.iter().skip(first_index + 1) {
            if first_segment.speaker == second_segment.speaker {
                continue;
            }

            let overlap_start = first_segment.start.max(second_segment.start);
            let overlap_end = first_segment.end.min(second_segment.end);

            if overlap_start < overlap_end {
                let mut speaker_pair = vec![
                    first_segment.speaker.clone(),
                    second_segment.speaker.clone(),
                ];
                speaker_pair.sort();

                overlaps.push(OverlapSegment {
                    speakers: speaker_pair,
                    start: overlap_start,
                    end: overlap_end,
                    duration: overlap_end - overlap_start,
                });
            }
        }
    }

    overlaps
}
// FIN DEL ARCHIVO [libs/domain/alignment/src/overlap.rs]
