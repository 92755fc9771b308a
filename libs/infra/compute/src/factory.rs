// [libs/infra/compute/src/factory.rs]
/*!
 * =================================================================
 * APARATO: COMPUTE BACKEND FACTORY
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: SELECCIÓN DE VARIANTE POR CONFIGURACIÓN
 *
 * La fábrica se invoca una única vez por proceso en el arranque (o
 * por tarea en el worker); no existen singletons perezosos.
 * =================================================================
 */

use tracing::info;

use crate::diarization::{DiarizationBackend, HttpDiarizationBackend, MockDiarizationBackend};
use crate::errors::ComputeError;
use crate::stt::{HttpSttBackend, MockSttBackend, SttBackend};

/**
 * Construye el backend STT según la clase configurada (`http` | `mock`).
 *
 * # Errors:
 * - `ComputeError::ConfigurationError`: Clase desconocida o URL ausente.
 */
pub fn build_stt_backend(
    backend_kind: &str,
    service_url: Option<String>,
    model: Option<String>,
) -> Result<SttBackend, ComputeError> {
    match backend_kind {
        "http" => {
            let url = service_url.ok_or_else(|| {
                ComputeError::ConfigurationError("STT_SERVICE_URL required for http backend".into())
            })?;
            info!("🧩 [COMPUTE_FACTORY]: STT backend = http [{}].", url);
            Ok(SttBackend::Http(HttpSttBackend::new(url, model)?))
        }
        "mock" => {
            info!("🧩 [COMPUTE_FACTORY]: STT backend = mock (deterministic script).");
            Ok(SttBackend::Mock(MockSttBackend::new()))
        }
        unknown => Err(ComputeError::ConfigurationError(format!(
            "UNKNOWN_STT_BACKEND_KIND: {}",
            unknown
        ))),
    }
}

/**
 * Construye el backend de diarización según la clase configurada.
 *
 * # Errors:
 * - `ComputeError::ConfigurationError`: Clase desconocida o URL ausente.
 */
pub fn build_diarization_backend(
    backend_kind: &str,
    service_url: Option<String>,
    model: Option<String>,
) -> Result<DiarizationBackend, ComputeError> {
    match backend_kind {
        "http" => {
            let url = service_url.ok_or_else(|| {
                ComputeError::ConfigurationError(
                    "DIARIZATION_SERVICE_URL required for http backend".into(),
                )
            })?;
            info!("🧩 [COMPUTE_FACTORY]: Diarization backend = http [{}].", url);
            Ok(DiarizationBackend::Http(HttpDiarizationBackend::new(url, model)?))
        }
        "mock" => {
            info!("🧩 [COMPUTE_FACTORY]: Diarization backend = mock (alternating speakers).");
            Ok(DiarizationBackend::Mock(MockDiarizationBackend::new()))
        }
        unknown => Err(ComputeError::ConfigurationError(format!(
            "UNKNOWN_DIARIZATION_BACKEND_KIND: {}",
            unknown
        ))),
    }
}
// FIN DEL ARCHIVO [libs/infra/compute/src/factory.rs]
