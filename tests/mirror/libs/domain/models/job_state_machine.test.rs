// [tests/mirror/libs/domain/models/job_state_machine.test.rs]
/**
 * =================================================================
 * APARATO: JOB STATE MACHINE TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-MODELS)
 * RESPONSABILIDAD: CERTIFICACIÓN DEL DAG DE TRANSICIONES
 * =================================================================
 */

use lexia_domain_models::job::JobStatus;

/**
 * CERTIFICACIÓN: Tabla exhaustiva de transiciones legales.
 */
#[test]
fn certify_legal_transition_table() {
    println!("\n🧪 [PROVING_GROUNDS]: Auditing lifecycle DAG strata...");
    use JobStatus::*;

    let legal_transitions = [
        (Pending, Queued),
        (Pending, Cancelled),
        (Queued, Processing),
        (Queued, Cancelled),
        (Processing, Completed),
        (Processing, Failed),
    ];

    for (source, target) in legal_transitions {
        assert!(source.can_transition_to(target),
            "L2_DAG_FAULT: {:?} -> {:?} must be legal.", source, target);
    }
}

/**
 * CERTIFICACIÓN: Todo estado terminal es inmutable; processing no
 * admite cancelación; ningún estado transita hacia sí mismo.
 */
#[test]
fn certify_terminal_immutability_and_forbidden_edges() {
    use JobStatus::*;
    let all_states = [Pending, Queued, Processing, Completed, Failed, Cancelled];

    for terminal in [Completed, Failed, Cancelled] {
        assert!(terminal.is_terminal());
        for target in all_states {
            assert!(!terminal.can_transition_to(target),
                "L2_DAG_FAULT: Terminal {:?} escaped to {:?}.", terminal, target);
        }
    }

    assert!(!Processing.can_transition_to(Cancelled),
        "L2_DAG_FAULT: Running jobs must not be cancellable.");
    assert!(!Processing.is_cancellable());
    assert!(Pending.is_cancellable());
    assert!(Queued.is_cancellable());

    for state in all_states {
        assert!(!state.can_transition_to(state));
    }
}

/**
 * CERTIFICACIÓN: Paridad de serialización textual con el Ledger.
 */
#[test]
fn certify_status_string_parity() {
    use JobStatus::*;
    for state in [Pending, Queued, Processing, Completed, Failed, Cancelled] {
        assert_eq!(JobStatus::parse(state.as_str()), Some(state),
            "L2_CODEC_FAULT: String roundtrip drift on {:?}.", state);
    }
    assert_eq!(JobStatus::parse("unknown"), None);
}
// FIN DEL ARCHIVO [tests/mirror/libs/domain/models/job_state_machine.test.rs]
