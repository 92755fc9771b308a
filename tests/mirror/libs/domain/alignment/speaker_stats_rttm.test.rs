// [tests/mirror/libs/domain/alignment/speaker_stats_rttm.test.rs]
/**
 * =================================================================
 * APARATO: SPEAKER STATISTICS & RTTM TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-ALIGNMENT)
 * RESPONSABILIDAD: CERTIFICACIÓN DE MÉTRICAS Y FORMATO EXTERNO
 * =================================================================
 */

use lexia_domain_alignment::{compute_speaker_stats, generate_rttm};
use lexia_domain_models::SpeakerSegment;

fn segment(speaker: &str, start: i64, end: i64) -> SpeakerSegment {
    SpeakerSegment {
        speaker: speaker.to_string(),
        start,
        end,
        confidence: 1.0,
    }
}

/**
 * CERTIFICACIÓN: Duración total, conteo, media y porcentaje por
 * hablante. Los porcentajes suman 100 con deriva máxima de ±0.05.
 */
#[test]
fn certify_speaker_statistics_budget() {
    println!("\n🧪 [PROVING_GROUNDS]: Auditing speaker statistics strata...");

    let segments = vec![
        segment("A", 0, 3000),
        segment("B", 3000, 4000),
        segment("A", 4000, 6000),
        segment("C", 6000, 7000),
    ];

    let stats = compute_speaker_stats(&segments);
    assert_eq!(stats.len(), 3);

    let speaker_a = stats.iter().find(|s| s.id == "A").expect("A void");
    assert_eq!(speaker_a.total_duration, 5000);
    assert_eq!(speaker_a.num_segments, 2);
    assert_eq!(speaker_a.avg_segment_duration, 2500);
    assert!((speaker_a.percentage - 71.43).abs() < 0.01, "L2_STATS_FAULT: Percentage drift on A.");

    let percentage_sum: f64 = stats.iter().map(|s| s.percentage).sum();
    assert!((percentage_sum - 100.0).abs() <= 0.05,
        "L2_STATS_FAULT: Percentage budget drift: {}", percentage_sum);
}

/**
 * CERTIFICACIÓN: Un tercio exacto por hablante reparte 33.33 x3 y la
 * suma queda dentro de la tolerancia documentada.
 */
#[test]
fn certify_thirds_rounding_tolerance() {
    let segments = vec![
        segment("A", 0, 1000),
        segment("B", 1000, 2000),
        segment("C", 2000, 3000),
    ];

    let stats = compute_speaker_stats(&segments);
    for speaker in &stats {
        assert!((speaker.percentage - 33.33).abs() < 0.01);
    }

    let percentage_sum: f64 = stats.iter().map(|s| s.percentage).sum();
    assert!((percentage_sum - 100.0).abs() <= 0.05);
}

/**
 * CERTIFICACIÓN: Línea RTTM canónica. Tiempos en segundos con 3
 * decimales; el único punto del sistema que emite segundos.
 */
#[test]
fn certify_rttm_line_format() {
    let segments = vec![segment("A", 0, 25040), segment("B", 25040, 26500)];

    let rttm = generate_rttm(&segments, "meeting_01");
    let lines: Vec<&str> = rttm.lines().collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "SPEAKER meeting_01 1 0.000 25.040 <NA> <NA> A <NA> <NA>");
    assert_eq!(lines[1], "SPEAKER meeting_01 1 25.040 1.460 <NA> <NA> B <NA> <NA>");
}

/**
 * CERTIFICACIÓN: Entradas vacías producen salidas vacías sin pánico.
 */
#[test]
fn certify_empty_inputs() {
    assert!(compute_speaker_stats(&[]).is_empty());
    assert_eq!(generate_rttm(&[], "void"), "");
}
// FIN DEL ARCHIVO [tests/mirror/libs/domain/alignment/speaker_stats_rttm.test.rs]
