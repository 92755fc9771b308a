// [libs/domain/models/src/tests_serialization.rs]
/**
 * =================================================================
 * APARATO: DOMAIN SERIALIZATION TEST
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-MODELS)
 * RESPONSABILIDAD: CERTIFICACIÓN DE PARIDAD JSON DE DESCRIPTORES
 *
 * El descriptor de tarea viaja serializado por la cola durable; una
 * deriva de esquema entre API y worker rompería la entrega
 * at-least-once. Este test sella el contrato de transporte.
 * =================================================================
 */

// FIN DEL ARCHIVO [libs/domain/models/src/tests_serialization.rs]
