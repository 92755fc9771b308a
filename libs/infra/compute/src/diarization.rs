// [libs/infra/compute/src/diarization.rs]
/*!
 * =================================================================
 * APARATO: SPEAKER DIARIZATION BACKEND
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: INTERFAZ UNIFORME SOBRE EL MOTOR DE DIARIZACIÓN
 *
 * # Invariante (Raw Labels Out):
 * El backend devuelve las etiquetas nativas del motor (SPEAKER_00,
 * SPEAKER_01, ...) sin reetiquetar; el mapeo determinista a letras es
 * responsabilidad del estrato de alineamiento.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

use crate::errors::ComputeError;

/// Timeout generoso por llamada de inferencia.
const INFERENCE_TIMEOUT_SECONDS: u64 = 600;

/// Duración nominal del guion del mock, en segundos.
const MOCK_AUDIO_DURATION_SECONDS: f64 = 5.2;

/// Turno de habla bruto con la etiqueta nativa del motor (segundos).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSpeakerTurn {
    pub raw_label: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub confidence: f64,
}

/// Resultado bruto del motor de diarización.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiarizationOutput {
    pub turns: Vec<RawSpeakerTurn>,
    pub audio_duration_seconds: f64,
    /// Tiempo de cómputo reportado por el servicio, si lo expone.
    pub processing_time_ms: Option<i64>,
}

/// Variante HTTP: delega en el servicio de diarización remoto.
#[derive(Clone)]
pub struct HttpDiarizationBackend {
    inference_client: reqwest::Client,
    service_url: String,
    model: Option<String>,
}

impl HttpDiarizationBackend {
    pub fn new(service_url: String, model: Option<String>) -> Result<Self, ComputeError> {
        if service_url.is_empty() {
            return Err(ComputeError::ConfigurationError(
                "DIARIZATION_SERVICE_URL_UNDEFINED".into(),
            ));
        }

        let inference_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(INFERENCE_TIMEOUT_SECONDS))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .user_agent("Lexia-Diarization-Uplink/0.2")
            .build()?;

        Ok(Self {
            inference_client,
            service_url: service_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    #[instrument(skip(self, audio_path))]
    async fn diarize(
        &self,
        audio_path: &Path,
        num_speakers: Option<u8>,
        min_speakers: Option<u8>,
        max_speakers: Option<u8>,
    ) -> Result<DiarizationOutput, ComputeError> {
        let audio_bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let audio_part = reqwest::multipart::Part::bytes(audio_bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|fault| ComputeError::DiarizationServiceError(fault.to_string()))?;

        let mut inference_form = reqwest::multipart::Form::new().part("audio", audio_part);

        if let Some(exact) = num_speakers {
            inference_form = inference_form.text("num_speakers", exact.to_string());
        }
        if let Some(minimum) = min_speakers {
            inference_form = inference_form.text("min_speakers", minimum.to_string());
        }
        if let Some(maximum) = max_speakers {
            inference_form = inference_form.text("max_speakers", maximum.to_string());
        }
        if let Some(model) = &self.model {
            inference_form = inference_form.text("model", model.clone());
        }

        let response = self
            .inference_client
            .post(format!("{}/v1/diarize", self.service_url))
            .multipart(inference_form)
            .send()
            .await
            .map_err(|fault| ComputeError::DiarizationServiceError(format!("uplink: {}", fault)))?;

        if !response.status().is_success() {
            return Err(ComputeError::DiarizationServiceError(format!(
                "inference service replied {}",
                response.status()
            )));
        }

        let diarization_output: DiarizationOutput = response.json().await.map_err(|fault| {
            ComputeError::DiarizationServiceError(format!("response decode: {}", fault))
        })?;

        info!("🎙️ [DIARIZATION_UPLINK]: {} raw turns received.", diarization_output.turns.len());
        Ok(diarization_output)
    }

    async fn health_check(&self) -> bool {
        self.inference_client
            .get(format!("{}/health", self.service_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }
}

/// Variante Mock: dos hablantes alternados sobre la duración nominal.
#[derive(Clone, Default)]
pub struct MockDiarizationBackend {
    pub response_delay_ms: u64,
    pub scripted_output: Option<DiarizationOutput>,
}

impl MockDiarizationBackend {
    pub fn new() -> Self {
        Self { response_delay_ms: 0, scripted_output: None }
    }

    pub fn with_script(scripted_output: DiarizationOutput) -> Self {
        Self { response_delay_ms: 0, scripted_output: Some(scripted_output) }
    }

    async fn diarize(&self, num_speakers: Option<u8>) -> Result<DiarizationOutput, ComputeError> {
        if self.response_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.response_delay_ms)).await;
        }

        if let Some(scripted) = &self.scripted_output {
            return Ok(scripted.clone());
        }

        let speaker_count = num_speakers.unwrap_or(2).max(1) as usize;
        let slot_duration = MOCK_AUDIO_DURATION_SECONDS / speaker_count as f64;

        let turns = (0..speaker_count)
            .map(|slot_index| RawSpeakerTurn {
                raw_label: format!("SPEAKER_{:02}", slot_index),
                start_seconds: slot_index as f64 * slot_duration,
                end_seconds: (slot_index + 1) as f64 * slot_duration,
                confidence: 0.9,
            })
            .collect();

        Ok(DiarizationOutput {
            turns,
            audio_duration_seconds: MOCK_AUDIO_DURATION_SECONDS,
            processing_time_ms: Some(1),
        })
    }
}

/**
 * Abstracción cerrada del motor de diarización.
 */
#[derive(Clone)]
pub enum DiarizationBackend {
    Http(HttpDiarizationBackend),
    Mock(MockDiarizationBackend),
}

impl DiarizationBackend {
    /**
     * Diariza el audio materializado en disco.
     *
     * # Errors:
     * - `ComputeError::DiarizationServiceError`: Rechazo o colapso del servicio.
     * - `ComputeError::AudioReadError`: El audio no pudo leerse.
     */
    pub async fn diarize(
        &self,
        audio_path: &Path,
        num_speakers: Option<u8>,
        min_speakers: Option<u8>,
        max_speakers: Option<u8>,
    ) -> Result<DiarizationOutput, ComputeError> {
        match self {
            DiarizationBackend::Http(backend) => {
                backend.diarize(audio_path, num_speakers, min_speakers, max_speakers).await
            }
            DiarizationBackend::Mock(backend) => backend.diarize(num_speakers).await,
        }
    }

    /// Sonda de salud del backend para el endpoint /health.
    pub async fn health_check(&self) -> bool {
        match self {
            DiarizationBackend::Http(backend) => backend.health_check().await,
            DiarizationBackend::Mock(_) => true,
        }
    }
}
// FIN DEL ARCHIVO [libs/infra/compute/src/diarization.rs]
