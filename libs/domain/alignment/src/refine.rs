// [libs/domain/alignment/src/refine.rs]
/*!
 * =================================================================
 * APARATO: SEGMENT REFINEMENT FILTERS
 * CLASIFICACIÓN: DOMAIN COMPUTE (ESTRATO L2)
 * RESPONSABILIDAD: FUSIÓN DE HUECOS Y FILTRO DE DURACIÓN MÍNIMA
 * =================================================================
 */

use lexia_domain_models::SpeakerSegment;

/**
 * Fusiona segmentos consecutivos del mismo hablante separados por un
 * hueco menor o igual al umbral.
 *
 * El segmento fusionado abarca `[prev.start, next.end]` y conserva la
 * confianza mínima de ambos. La entrada se ordena por inicio antes
 * del escaneo.
 */
pub fn merge_speaker_gaps(segments: &[SpeakerSegment], merge_gaps_ms: i64) -> Vec<SpeakerSegment> {
    if segments.is_empty() || merge_gaps_ms <= 0 {
        return segments.to_vec();
    }

    let mut sorted_segments = segments.to_vec();
    sorted_segments.sort_by_key(|segment| segment.start);

    let mut merged: Vec<SpeakerSegment> = Vec::with_capacity(sorted_segments.len());
    merged.push(sorted_segments[0].clone());

    for candidate_segment in sorted_segments.into_iter().skip(1) {
        let previous_segment = merged.last_mut().filter(|previous| {
            previous.speaker == candidate_segment.speaker
                && candidate_segment.start - previous.end <= merge_gaps_ms
        });

        match previous_segment {
            Some(previous) => {
                previous.end = previous.end.max(candidate_segment.end);
                previous.confidence = previous.confidence.min(candidate_segment.confidence);
            }
            None => merged.push(candidate_segment),
        }
    }

    merged
}

/// Descarta segmentos más cortos que el umbral antes del alineamiento.
pub fn filter_minimum_duration(
    segments: &[SpeakerSegment],
    min_segment_ms: i64,
) -> Vec<SpeakerSegment> {
    if min_segment_ms <= 0 {
        return segments.to_vec();
    }

    segments
        .iter()
        .filter(|segment| segment.duration() >= min_segment_ms)
        .cloned()
        .collect()
}
// FIN DEL ARCHIVO [libs/domain/alignment/src/refine.rs]
