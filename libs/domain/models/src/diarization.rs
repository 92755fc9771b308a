// [libs/domain/models/src/diarization.rs]
/*!
 * =================================================================
 * APARATO: DIARIZATION DOMAIN MODELS
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATOS DE SEGMENTOS, ENUNCIADOS Y ESTADÍSTICAS
 *
 * # Invariante (Deterministic Labels):
 * Las etiquetas públicas de hablante se asignan en orden de primera
 * aparición (A, B, C, ...) de forma determinista; el mismo listado de
 * segmentos produce siempre el mismo mapeo.
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Intervalo contiguo atribuido a un único hablante.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerSegment {
    /// Etiqueta pública en letras (A, B, C, ...).
    pub speaker: String,
    /// Inicio en milisegundos.
    pub start: i64,
    /// Fin en milisegundos (≥ start).
    pub end: i64,
    pub confidence: f64,
}

impl SpeakerSegment {
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

/// Segmento emparejado con el texto pronunciado en su intervalo.
/// Producido exclusivamente por el motor de alineamiento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub start: i64,
    pub end: i64,
    pub text: String,
    pub confidence: f64,
}

/// Intervalo de habla simultánea entre dos o más hablantes distintos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapSegment {
    /// Etiquetas distintas y ordenadas de los hablantes implicados (≥ 2).
    pub speakers: Vec<String>,
    pub start: i64,
    pub end: i64,
    /// Duración recortada del solape (end − start).
    pub duration: i64,
}

/// Estadísticas agregadas por hablante sobre el audio completo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    /// Etiqueta pública (A, B, C, ...).
    pub id: String,
    /// Suma de duraciones de segmento en milisegundos.
    pub total_duration: i64,
    pub num_segments: u32,
    /// total_duration / num_segments, en milisegundos.
    pub avg_segment_duration: i64,
    /// Porcentaje del habla total, redondeado a 2 decimales.
    pub percentage: f64,
}

/// Resumen global del resultado de diarización.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarizationStats {
    pub num_speakers: u32,
    pub num_segments: u32,
    /// Duración del audio analizado en milisegundos.
    pub audio_duration: i64,
    pub num_overlaps: u32,
    /// Suma de duraciones de solape en milisegundos.
    pub overlap_duration: i64,
    /// Tiempo de cómputo del backend en milisegundos, si se conoce.
    pub processing_time_ms: Option<i64>,
}
// FIN DEL ARCHIVO [libs/domain/models/src/diarization.rs]
