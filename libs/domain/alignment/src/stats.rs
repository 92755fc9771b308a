// [libs/domain/alignment/src/stats.rs]
/*!
 * =================================================================
 * APARATO: SPEAKER STATISTICS ENGINE
 * CLASIFICACIÓN: DOMAIN COMPUTE (ESTRATO L2)
 * RESPONSABILIDAD: AGREGACIÓN DE MÉTRICAS DE HABLA POR HABLANTE
 *
 * # Invariante (Percentage Budget):
 * Los porcentajes se redondean a 2 decimales; su suma converge a 100
 * con una deriva máxima de ±0.05 tolerada por los consumidores.
 * =================================================================
 */

use std::collections::BTreeMap;

use lexia_domain_models::{Speaker, SpeakerSegment};

/**
 * Computa las estadísticas agregadas por hablante: duración total,
 * número de segmentos, duración media y porcentaje del habla global.
 *
 * El resultado se ordena por etiqueta pública para una salida estable.
 */
pub fn compute_speaker_stats(segments: &[SpeakerSegment]) -> Vec<Speaker> {
    let mut segments_by_speaker: BTreeMap<&str, Vec<&SpeakerSegment>> = BTreeMap::new();
    for segment in segments {
        segments_by_speaker
            .entry(segment.speaker.as_str())
            .or_default()
            .push(segment);
    }

    let total_speech_all_speakers: i64 = segments.iter().map(SpeakerSegment::duration).sum();

    segments_by_speaker
        .into_iter()
        .map(|(speaker_label, speaker_segments)| {
            let total_duration: i64 = speaker_segments.iter().map(|s| s.duration()).sum();
            let num_segments = speaker_segments.len() as u32;
            let avg_segment_duration = total_duration / num_segments as i64;

            let percentage = if total_speech_all_speakers > 0 {
                let raw_percentage =
                    total_duration as f64 / total_speech_all_speakers as f64 * 100.0;
                (raw_percentage * 100.0).round() / 100.0
            } else {
                0.0
            };

            Speaker {
                id: speaker_label.to_string(),
                total_duration,
                num_segments,
                avg_segment_duration,
                percentage,
            }
        })
        .collect()
}
// FIN DEL ARCHIVO [libs/domain/alignment/src/stats.rs]
