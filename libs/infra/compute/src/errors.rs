// [libs/infra/compute/src/errors.rs]
/*!
 * =================================================================
 * APARATO: COMPUTE ERROR CATALOG
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE INFERENCIA
 *
 * Cada variante mapea uno-a-uno a un código de la taxonomía pública
 * (`stt_service_error`, `diarization_service_error`), lo que permite
 * al worker sellar el trabajo con el código correcto sin heurísticas.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComputeError {
    /// El servicio de transcripción rechazó o colapsó la petición.
    #[error("[L3_STT_FAULT]: STT_SERVICE_ERROR -> {0}")]
    SttServiceError(String),

    /// El servicio de diarización rechazó o colapsó la petición.
    #[error("[L3_DIARIZATION_FAULT]: DIARIZATION_SERVICE_ERROR -> {0}")]
    DiarizationServiceError(String),

    /// Fallo de red o de protocolo hacia el servicio de inferencia.
    #[error("[L3_COMPUTE_NET_FAULT]: INFERENCE_UPLINK_SEVERED -> {0}")]
    TransportError(#[from] reqwest::Error),

    /// Fallo de lectura del audio materializado en disco.
    #[error("[L3_COMPUTE_IO_FAULT]: AUDIO_READ_FAULT -> {0}")]
    AudioReadError(#[from] std::io::Error),

    /// Configuración de entorno incompleta para el backend seleccionado.
    #[error("[L3_COMPUTE_CONFIG_FAULT]: ENVIRONMENT_VOID -> {0}")]
    ConfigurationError(String),
}

impl ComputeError {
    /// Código público de la taxonomía de errores de la plataforma.
    pub fn public_code(&self) -> &'static str {
        match self {
            ComputeError::DiarizationServiceError(_) => "diarization_service_error",
            ComputeError::SttServiceError(_) => "stt_service_error",
            _ => "internal_error",
        }
    }
}
// FIN DEL ARCHIVO [libs/infra/compute/src/errors.rs]
