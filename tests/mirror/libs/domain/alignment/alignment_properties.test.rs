// [tests/mirror/libs/domain/alignment/alignment_properties.test.rs]
/**
 * =================================================================
 * APARATO: ALIGNMENT PROPERTY TEST (PROPTEST)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-ALIGNMENT)
 * RESPONSABILIDAD: INVARIANTES CUANTIFICADOS SOBRE ENTRADAS ALEATORIAS
 * =================================================================
 */

use proptest::prelude::*;

use lexia_domain_alignment::{align_transcript_with_segments, relabel_speakers};
use lexia_domain_models::SpeakerSegment;

/// Generador de segmentos con etiquetas nativas y duraciones acotadas.
fn arbitrary_segments() -> impl Strategy<Value = Vec<SpeakerSegment>> {
    prop::collection::vec(
        (0u8..6, 0i64..50_000, 1i64..10_000, 0u8..=100),
        1..20,
    )
    .prop_map(|raw_tuples| {
        raw_tuples
            .into_iter()
            .map(|(label_index, start, duration, confidence)| SpeakerSegment {
                speaker: format!("SPEAKER_{:02}", label_index),
                start,
                end: start + duration,
                confidence: confidence as f64 / 100.0,
            })
            .collect()
    })
}

/// Generador de textos de transcripción (tokens alfanuméricos).
fn arbitrary_transcript() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,8}", 0..40).prop_map(|tokens| tokens.join(" "))
}

proptest! {
    /**
     * PROPIEDAD: Conservación de tokens en el camino proporcional y
     * paridad |U| = |S| con presupuesto temporal exacto.
     */
    #[test]
    fn property_proportional_conservation(
        segments in arbitrary_segments(),
        transcript in arbitrary_transcript(),
    ) {
        let utterances = align_transcript_with_segments(&transcript, &[], &segments);

        prop_assert_eq!(utterances.len(), segments.len());

        let segment_span: i64 = segments.iter().map(|s| s.end - s.start).sum();
        let utterance_span: i64 = utterances.iter().map(|u| u.end - u.start).sum();
        prop_assert_eq!(utterance_span, segment_span);

        let total_tokens = transcript.split_whitespace().count();
        if total_tokens > 0 && segment_span > 0 {
            let emitted_tokens: usize = utterances
                .iter()
                .map(|u| u.text.split_whitespace().count())
                .sum();
            prop_assert_eq!(emitted_tokens, total_tokens);
        }
    }

    /**
     * PROPIEDAD: Estabilidad del reetiquetado y pertenencia de cada
     * enunciado al conjunto de hablantes derivado de los segmentos.
     */
    #[test]
    fn property_relabel_stability_and_membership(segments in arbitrary_segments()) {
        let (first_pass, first_order) = relabel_speakers(&segments);
        let (second_pass, second_order) = relabel_speakers(&segments);

        prop_assert_eq!(&first_pass, &second_pass);
        prop_assert_eq!(&first_order, &second_order);

        let utterances = align_transcript_with_segments("uno dos tres", &[], &first_pass);
        for utterance in &utterances {
            prop_assert!(first_order.contains(&utterance.speaker));
            prop_assert!(utterance.start <= utterance.end);
        }
    }
}
// FIN DEL ARCHIVO [tests/mirror/libs/domain/alignment/alignment_properties.test.rs]
