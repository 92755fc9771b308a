// [libs/domain/alignment/src/relabel.rs]
/*!
 * =================================================================
 * APARATO: SPEAKER RELABELING ENGINE
 * CLASIFICACIÓN: DOMAIN COMPUTE (ESTRATO L2)
 * RESPONSABILIDAD: MAPEO DETERMINISTA DE ETIQUETAS NATIVAS A LETRAS
 *
 * # Invariante (First-Appearance Order):
 * El mapeo se construye escaneando los segmentos en orden temporal y
 * asignando la siguiente letra en la primera aparición de una
 * etiqueta inédita. El mismo listado produce siempre el mismo mapeo,
 * con independencia del formato nativo (SPEAKER_00, spk-3, ...).
 * =================================================================
 */

use std::collections::HashMap;

use lexia_domain_models::SpeakerSegment;

/// Convierte un índice de hablante a su etiqueta en letras (0→A, 25→Z, 26→AA).
pub fn letter_for_speaker_index(speaker_index: usize) -> String {
    let mut remaining = speaker_index;
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (remaining % 26) as u8) as char);
        if remaining < 26 {
            break;
        }
        remaining = remaining / 26 - 1;
    }
    letters.into_iter().rev().collect()
}

/**
 * Reetiqueta segmentos con identificadores nativos del backend a
 * letras públicas, en orden de primera aparición temporal.
 *
 * Devuelve los segmentos ordenados por inicio con la etiqueta pública
 * aplicada, junto al listado de letras en orden de asignación. El
 * mismo mapeo debe aplicarse a enunciados, solapes y estadísticas del
 * trabajo completo.
 */
pub fn relabel_speakers(raw_segments: &[SpeakerSegment]) -> (Vec<SpeakerSegment>, Vec<String>) {
    let mut sorted_segments: Vec<&SpeakerSegment> = raw_segments.iter().collect();
    sorted_segments.sort_by_key(|segment| segment.start);

    let mut letter_by_raw_label: HashMap<String, String> = HashMap::new();
    let mut assignment_order: Vec<String> = Vec::new();

    let relabeled_segments = sorted_segments
        .into_iter()
        .map(|segment| {
            let public_letter = letter_by_raw_label
                .entry(segment.speaker.clone())
                .or_insert_with(|| {
                    let next_letter = letter_for_speaker_index(assignment_order.len());
                    assignment_order.push(next_letter.clone());
                    next_letter
                })
                .clone();

            SpeakerSegment {
                speaker: public_letter,
                start: segment.start,
                end: segment.end,
                confidence: segment.confidence,
            }
        })
        .collect();

    (relabeled_segments, assignment_order)
}
// FIN DEL ARCHIVO [libs/domain/alignment/src/relabel.rs]
