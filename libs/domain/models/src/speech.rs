// [libs/domain/models/src/speech.rs]
/*!
 * =================================================================
 * APARATO: SPEECH DOMAIN MODELS
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATOS DE PALABRAS Y SEGMENTOS DE TRANSCRIPCIÓN
 *
 * # Invariante (Temporal Units):
 * Todos los tiempos públicos son milisegundos enteros. Los motores de
 * cómputo operan internamente en segundos flotantes; la conversión
 * ocurre en la frontera del worker, nunca aquí.
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Palabra individual con marcas temporales de precisión de palabra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    /// Inicio en milisegundos (≥ 0).
    pub start: i64,
    /// Fin en milisegundos (≥ start).
    pub end: i64,
    /// Confianza del motor STT en el rango [0.0, 1.0].
    pub confidence: f64,
    /// Etiqueta de hablante asignada tras la diarización, si procede.
    pub speaker: Option<String>,
}

/// Segmento contiguo de transcripción emitido por el motor STT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub id: u32,
    pub text: String,
    pub start: i64,
    pub end: i64,
    pub confidence: f64,
}
// FIN DEL ARCHIVO [libs/domain/models/src/speech.rs]
