// [tests/mirror/libs/domain/alignment/alignment_proportional.test.rs]
/**
 * =================================================================
 * APARATO: PROPORTIONAL ALIGNMENT TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-ALIGNMENT)
 * RESPONSABILIDAD: CERTIFICACIÓN DEL REPARTO POR DURACIÓN
 * =================================================================
 */

use lexia_domain_alignment::align_transcript_with_segments;
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
 * CERTIFICACIÓN: Reparto canónico ⌊(dur/D)·N⌋ con sobrantes al último.
 * A (1s de 3s) recibe ⌊0.25·4⌋ = 1 token; B absorbe el resto.
 */
#[test]
fn certify_canonical_proportional_split() {
    println!("\n🧪 [PROVING_GROUNDS]: Auditing proportional split strata...");

    let segments = vec![segment("A", 0, 1000), segment("B", 1000, 3000)];
    let utterances =
        align_transcript_with_segments("un deux trois quatre", &[], &segments);

    assert_eq!(utterances.len(), 2);
    assert_eq!(utterances[0].speaker, "A");
    assert_eq!(utterances[0].text, "un", "L2_ALIGNMENT_FAULT: Floor share drift on A.");
    assert_eq!(utterances[1].speaker, "B");
    assert_eq!(
        utterances[1].text, "deux trois quatre",
        "L2_ALIGNMENT_FAULT: Leftover tokens not appended to the last utterance."
    );
}

/**
 * CERTIFICACIÓN: Conservación de palabras. La concatenación de todos
 * los enunciados contiene exactamente los tokens del texto.
 */
#[test]
fn certify_token_conservation() {
    let transcript = "alpha beta gamma delta epsilon zeta eta";
    let segments = vec![
        segment("A", 0, 500),
        segment("B", 500, 900),
        segment("A", 900, 2000),
    ];

    let utterances = align_transcript_with_segments(transcript, &[], &segments);

    let emitted_tokens: usize = utterances
        .iter()
        .map(|utterance| utterance.text.split_whitespace().count())
        .sum();
    assert_eq!(
        emitted_tokens,
        transcript.split_whitespace().count(),
        "L2_ALIGNMENT_FAULT: Token conservation violated."
    );
}

/**
 * CERTIFICACIÓN: El camino con lista de palabras vacía produce
 * exactamente |S| enunciados; cada segmento recibe al menos un token
 * mientras queden.
 */
#[test]
fn certify_empty_word_path_emits_one_utterance_per_segment() {
    let segments = vec![
        segment("A", 0, 10),
        segment("B", 10, 20),
        segment("C", 20, 5000),
    ];

    let utterances = align_transcript_with_segments("uno dos tres", &[], &segments);

    assert_eq!(utterances.len(), segments.len(), "L2_ALIGNMENT_FAULT: |U| != |S|.");
    assert_eq!(utterances[0].text, "uno");
    assert_eq!(utterances[1].text, "dos");
    assert_eq!(utterances[2].text, "tres");
}

/**
 * CERTIFICACIÓN: Duración total cero o texto vacío emiten enunciados
 * vacíos preservando el timing de los segmentos.
 */
#[test]
fn certify_degenerate_inputs_preserve_timing() {
    let zero_duration_segments = vec![segment("A", 100, 100), segment("B", 200, 200)];
    let utterances = align_transcript_with_segments("palabras aqui", &[], &zero_duration_segments);

    assert_eq!(utterances.len(), 2);
    assert!(utterances.iter().all(|utterance| utterance.text.is_empty()));
    assert_eq!(utterances[0].start, 100);
    assert_eq!(utterances[1].end, 200);

    let segments = vec![segment("A", 0, 1000)];
    let empty_text_utterances = align_transcript_with_segments("", &[], &segments);
    assert_eq!(empty_text_utterances.len(), 1);
    assert!(empty_text_utterances[0].text.is_empty());
}
// FIN DEL ARCHIVO [tests/mirror/libs/domain/alignment/alignment_proportional.test.rs]
