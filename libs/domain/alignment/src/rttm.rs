// [libs/domain/alignment/src/rttm.rs]
/*!
 * =================================================================
 * APARATO: RTTM EMISSION ENGINE
 * CLASIFICACIÓN: DOMAIN COMPUTE (ESTRATO L2)
 * RESPONSABILIDAD: SERIALIZACIÓN AL FORMATO RICH TRANSCRIPTION
 *
 * # Invariante (External Convention):
 * RTTM es el único punto del sistema donde los tiempos se emiten en
 * segundos (flotante, 3 decimales) en lugar de milisegundos, por
 * convención del formato externo.
 * =================================================================
 */

use lexia_domain_models::SpeakerSegment;

/**
 * Genera el documento RTTM del listado de segmentos.
 *
 * Una línea por segmento:
 * `SPEAKER <audio_id> 1 <start_sec:.3> <dur_sec:.3> <NA> <NA> <letra> <NA> <NA>`
 */
pub fn generate_rttm(segments: &[SpeakerSegment], audio_identifier: &str) -> String {
    segments
        .iter()
        .map(|segment| {
            let start_seconds = segment.start as f64 / 1000.0;
            let duration_seconds = segment.duration() as f64 / 1000.0;
            format!(
                "SPEAKER {} 1 {:.3} {:.3} <NA> <NA> {} <NA> <NA>",
                audio_identifier, start_seconds, duration_seconds, segment.speaker
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
// FIN DEL ARCHIVO [libs/domain/alignment/src/rttm.rs]
