// [tests/mirror/libs/domain/alignment/relabel_determinism.test.rs]
/**
 * =================================================================
 * APARATO: SPEAKER RELABELING DETERMINISM TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-ALIGNMENT)
 * RESPONSABILIDAD: CERTIFICACIÓN DEL MAPEO POR PRIMERA APARICIÓN
 * =================================================================
 */

use lexia_domain_alignment::{letter_for_speaker_index, relabel_speakers};
use lexia_domain_models::SpeakerSegment;

fn raw_segment(raw_label: &str, start: i64, end: i64) -> SpeakerSegment {
    SpeakerSegment {
        speaker: raw_label.to_string(),
        start,
        end,
        confidence: 0.9,
    }
}

/**
 * CERTIFICACIÓN: Etiquetas nativas en orden SPEAKER_07, SPEAKER_02,
 * SPEAKER_07 producen letras públicas A, B, A (primera aparición
 * temporal, no índice nativo).
 */
#[test]
fn certify_first_appearance_letter_mapping() {
    println!("\n🧪 [PROVING_GROUNDS]: Auditing relabeling determinism strata...");

    let raw_segments = vec![
        raw_segment("SPEAKER_07", 0, 1000),
        raw_segment("SPEAKER_02", 1000, 2000),
        raw_segment("SPEAKER_07", 2000, 3000),
    ];

    let (relabeled, assignment_order) = relabel_speakers(&raw_segments);

    let public_labels: Vec<&str> = relabeled.iter().map(|s| s.speaker.as_str()).collect();
    assert_eq!(public_labels, vec!["A", "B", "A"], "L2_RELABEL_FAULT: Mapping drift.");
    assert_eq!(assignment_order, vec!["A".to_string(), "B".to_string()]);
}

/**
 * CERTIFICACIÓN: Estabilidad. El mismo listado produce dos veces el
 * mismo mapeo, con independencia del orden de entrada del vector.
 */
#[test]
fn certify_relabeling_stability() {
    let raw_segments = vec![
        raw_segment("spk-9", 500, 900),
        raw_segment("spk-1", 0, 400),
        raw_segment("spk-4", 1000, 1500),
        raw_segment("spk-9", 1600, 1800),
    ];

    let (first_pass, first_order) = relabel_speakers(&raw_segments);
    let (second_pass, second_order) = relabel_speakers(&raw_segments);

    assert_eq!(first_pass, second_pass, "L2_RELABEL_FAULT: Non-deterministic relabeling.");
    assert_eq!(first_order, second_order);

    // spk-1 arranca primero en el tiempo, luego spk-9, luego spk-4.
    assert_eq!(first_pass[0].speaker, "A");
    assert_eq!(first_pass[1].speaker, "B");
    assert_eq!(first_pass[2].speaker, "C");
    assert_eq!(first_pass[3].speaker, "B");
}

/**
 * CERTIFICACIÓN: El alfabeto extiende más allá de la Z sin colisión.
 */
#[test]
fn certify_letter_alphabet_extension() {
    assert_eq!(letter_for_speaker_index(0), "A");
    assert_eq!(letter_for_speaker_index(25), "Z");
    assert_eq!(letter_for_speaker_index(26), "AA");
    assert_eq!(letter_for_speaker_index(27), "AB");
    assert_eq!(letter_for_speaker_index(51), "AZ");
    assert_eq!(letter_for_speaker_index(52), "BA");
}
// FIN DEL ARCHIVO [tests/mirror/libs/domain/alignment/relabel_determinism.test.rs]
