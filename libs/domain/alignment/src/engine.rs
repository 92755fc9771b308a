// [libs/domain/alignment/src/engine.rs]
/*!
 * =================================================================
 * APARATO: TEMPORAL ALIGNMENT ENGINE
 * CLASIFICACIÓN: DOMAIN COMPUTE (ESTRATO L2)
 * RESPONSABILIDAD: FUSIÓN DE TRANSCRIPCIÓN Y SEGMENTOS DE HABLANTE
 *
 * # Invariante (Word Conservation):
 * En el camino proporcional, la suma de tokens asignados a los
 * enunciados es exactamente el número de tokens del texto: los
 * sobrantes del reparto por suelo se anexan al último enunciado.
 *
 * # Invariante (Timing Preservation):
 * Cada enunciado hereda el intervalo exacto de su segmento; la suma
 * de duraciones de enunciados iguala la suma de duraciones de
 * segmentos con independencia del camino tomado.
 * =================================================================
 */

use lexia_domain_models::{SpeakerSegment, Utterance, Word};

/**
 * Alinea el texto transcrito con los segmentos de diarización.
 *
 * Con lista de palabras no vacía usa el camino preciso: cada segmento
 * recoge las palabras cuyo intervalo lo solapa. Sin palabras, reparte
 * los tokens del texto proporcionalmente a la duración de cada
 * segmento. El resultado es determinista en ambos caminos.
 *
 * # Logic:
 * 1. Orden estable de segmentos por inicio.
 * 2. Camino preciso: solape estricto `w.start < s.end ∧ w.end > s.start`.
 *    Un segmento de duración cero no recoge palabra alguna.
 * 3. Camino proporcional: `max(1, ⌊(dur/D)·N⌋)` tokens por segmento
 *    desde un cursor corrido; los sobrantes se anexan al último.
 */
pub fn align_transcript_with_segments(
    transcript_text: &str,
    words: &[Word],
    segments: &[SpeakerSegment],
) -> Vec<Utterance> {
    if segments.is_empty() {
        return Vec::new();
    }

    // 1. ORDEN ESTABLE POR INICIO
    let mut sorted_segments: Vec<&SpeakerSegment> = segments.iter().collect();
    sorted_segments.sort_by_key(|segment| segment.start);

    if !words.is_empty() {
        align_with_word_timestamps(&sorted_segments, words)
    } else {
        align_proportionally(&sorted_segments, transcript_text)
    }
}

/// Camino preciso: selección de palabras por solape de intervalos.
fn align_with_word_timestamps(
    sorted_segments: &[&SpeakerSegment],
    words: &[Word],
) -> Vec<Utterance> {
    sorted_segments
        .iter()
        .map(|segment| {
            let joined_text = if segment.end <= segment.start {
                // Segmento de duración cero: se preserva sin palabras.
                String::new()
            } else {
                words
                    .iter()
                    .filter(|word| word.start < segment.end && word.end > segment.start)
                    .map(|word| word.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .trim()
                    .to_string()
            };

            Utterance {
                speaker: segment.speaker.clone(),
                start: segment.start,
                end: segment.end,
                text: joined_text,
                confidence: segment.confidence,
            }
        })
        .collect()
}

/// Camino proporcional: reparto de tokens por duración relativa.
fn align_proportionally(
    sorted_segments: &[&SpeakerSegment],
    transcript_text: &str,
) -> Vec<Utterance> {
    let total_speech_duration: i64 = sorted_segments
        .iter()
        .map(|segment| segment.end - segment.start)
        .sum();

    let transcript_tokens: Vec<&str> = transcript_text.split_whitespace().collect();
    let total_token_count = transcript_tokens.len();

    // Sin duración o sin texto: enunciados vacíos preservando el timing.
    if total_speech_duration <= 0 || total_token_count == 0 {
        return sorted_segments
            .iter()
            .map(|segment| Utterance {
                speaker: segment.speaker.clone(),
                start: segment.start,
                end: segment.end,
                text: String::new(),
                confidence: segment.confidence,
            })
            .collect();
    }

    let mut utterances: Vec<Utterance> = Vec::with_capacity(sorted_segments.len());
    let mut token_cursor: usize = 0;

    for segment in sorted_segments {
        let segment_duration = segment.end - segment.start;
        let proportional_share =
            (segment_duration as f64 / total_speech_duration as f64) * total_token_count as f64;
        let assigned_token_count = (proportional_share.floor() as usize).max(1);

        let slice_start = token_cursor.min(total_token_count);
        let slice_end = (token_cursor + assigned_token_count).min(total_token_count);
        let segment_text = transcript_tokens[slice_start..slice_end].join(" ");

        token_cursor += assigned_token_count;

        utterances.push(Utterance {
            speaker: segment.speaker.clone(),
            start: segment.start,
            end: segment.end,
            text: segment_text,
            confidence: segment.confidence,
        });
    }

    // Anexión de sobrantes al último enunciado (conservación de tokens).
    if token_cursor < total_token_count {
        if let Some(last_utterance) = utterances.last_mut() {
            let remaining_text = transcript_tokens[token_cursor..].join(" ");
            if last_utterance.text.is_empty() {
                last_utterance.text = remaining_text;
            } else {
                last_utterance.text = format!("{} {}", last_utterance.text, remaining_text);
            }
        }
    }

    utterances
}
// FIN DEL ARCHIVO [libs/domain/alignment/src/engine.rs]
