// [libs/infra/compute/src/stt.rs]
/*!
 * =================================================================
 * APARATO: SPEECH-TO-TEXT BACKEND
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: INTERFAZ UNIFORME SOBRE EL MOTOR DE TRANSCRIPCIÓN
 *
 * La abstracción es un enum cerrado con un conjunto fijo de
 * operaciones: la variante HTTP habla con el servicio de inferencia
 * remoto y la variante Mock genera resultados deterministas para
 * desarrollo y Proving Grounds, compartiendo el mismo contrato.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

use crate::errors::ComputeError;

/// Timeout generoso por llamada: la inferencia tarda de segundos a minutos.
const INFERENCE_TIMEOUT_SECONDS: u64 = 600;

/// Duración nominal del guion del mock, en segundos.
const MOCK_AUDIO_DURATION_SECONDS: f64 = 5.2;

/// Guion determinista del mock (paridad con el entorno de desarrollo).
const MOCK_TRANSCRIPT_TEXT: &str =
    "Bonjour, bienvenue dans cette réunion. Nous allons discuter des projets en cours.";

/// Palabra con marcas temporales internas del motor (segundos flotantes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttWordOutput {
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub confidence: f64,
}

/// Segmento de transcripción interno del motor (segundos flotantes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttSegmentOutput {
    pub id: u32,
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub confidence: f64,
}

/// Resultado bruto del motor de transcripción.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttOutput {
    pub text: String,
    pub words: Vec<SttWordOutput>,
    pub segments: Vec<SttSegmentOutput>,
    pub language: Option<String>,
    pub language_confidence: Option<f64>,
    pub audio_duration_seconds: f64,
}

/// Variante HTTP: delega en el servicio de inferencia remoto.
#[derive(Clone)]
pub struct HttpSttBackend {
    inference_client: reqwest::Client,
    service_url: String,
    model: Option<String>,
}

impl HttpSttBackend {
    pub fn new(service_url: String, model: Option<String>) -> Result<Self, ComputeError> {
        if service_url.is_empty() {
            return Err(ComputeError::ConfigurationError("STT_SERVICE_URL_UNDEFINED".into()));
        }

        let inference_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(INFERENCE_TIMEOUT_SECONDS))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .user_agent("Lexia-STT-Uplink/0.2")
            .build()?;

        Ok(Self {
            inference_client,
            service_url: service_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    #[instrument(skip(self, audio_path), fields(language = ?requested_language))]
    async fn transcribe(
        &self,
        audio_path: &Path,
        requested_language: Option<&str>,
        word_timestamps: bool,
    ) -> Result<SttOutput, ComputeError> {
        let audio_bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let audio_part = reqwest::multipart::Part::bytes(audio_bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|fault| ComputeError::SttServiceError(fault.to_string()))?;

        let mut inference_form = reqwest::multipart::Form::new()
            .part("audio", audio_part)
            .text("word_timestamps", word_timestamps.to_string());

        if let Some(language) = requested_language {
            inference_form = inference_form.text("language", language.to_string());
        }
        if let Some(model) = &self.model {
            inference_form = inference_form.text("model", model.clone());
        }

        let response = self
            .inference_client
            .post(format!("{}/v1/transcribe", self.service_url))
            .multipart(inference_form)
            .send()
            .await
            .map_err(|fault| ComputeError::SttServiceError(format!("uplink: {}", fault)))?;

        if !response.status().is_success() {
            return Err(ComputeError::SttServiceError(format!(
                "inference service replied {}",
                response.status()
            )));
        }

        let transcription_output: SttOutput = response
            .json()
            .await
            .map_err(|fault| ComputeError::SttServiceError(format!("response decode: {}", fault)))?;

        info!("🗣️ [STT_UPLINK]: Transcription received ({} words).", transcription_output.words.len());
        Ok(transcription_output)
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

/// Variante Mock: resultados deterministas sin procesamiento real.
#[derive(Clone, Default)]
pub struct MockSttBackend {
    /// Retardo simulado de inferencia en milisegundos.
    pub response_delay_ms: u64,
    /// Guion inyectado por las pruebas; nulo usa el guion nominal.
    pub scripted_output: Option<SttOutput>,
}

impl MockSttBackend {
    pub fn new() -> Self {
        Self { response_delay_ms: 0, scripted_output: None }
    }

    pub fn with_script(scripted_output: SttOutput) -> Self {
        Self { response_delay_ms: 0, scripted_output: Some(scripted_output) }
    }

    async fn transcribe(
        &self,
        requested_language: Option<&str>,
        word_timestamps: bool,
    ) -> Result<SttOutput, ComputeError> {
        if self.response_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.response_delay_ms)).await;
        }

        if let Some(scripted) = &self.scripted_output {
            return Ok(scripted.clone());
        }

        // Guion nominal: palabras repartidas uniformemente en la duración.
        let tokens: Vec<&str> = MOCK_TRANSCRIPT_TEXT.split_whitespace().collect();
        let seconds_per_word = MOCK_AUDIO_DURATION_SECONDS / tokens.len() as f64;

        let words: Vec<SttWordOutput> = if word_timestamps {
            tokens
                .iter()
                .enumerate()
                .map(|(word_index, token)| {
                    let start = word_index as f64 * seconds_per_word;
                    SttWordOutput {
                        text: token.to_string(),
                        start_seconds: start,
                        end_seconds: start + seconds_per_word * 0.9,
                        confidence: 0.95,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(SttOutput {
            text: MOCK_TRANSCRIPT_TEXT.to_string(),
            segments: vec![SttSegmentOutput {
                id: 0,
                text: MOCK_TRANSCRIPT_TEXT.to_string(),
                start_seconds: 0.0,
                end_seconds: MOCK_AUDIO_DURATION_SECONDS,
                confidence: 0.95,
            }],
            words,
            language: Some(requested_language.unwrap_or("fr").to_string()),
            language_confidence: Some(0.98),
            audio_duration_seconds: MOCK_AUDIO_DURATION_SECONDS,
        })
    }
}

/**
 * Abstracción cerrada del motor de transcripción.
 * Inyectada en el arranque por la fábrica de configuración.
 */
#[derive(Clone)]
pub enum SttBackend {
    Http(HttpSttBackend),
    Mock(MockSttBackend),
}

impl SttBackend {
    /**
     * Transcribe el audio materializado en disco.
     *
     * # Errors:
     * - `ComputeError::SttServiceError`: Rechazo o colapso del servicio.
     * - `ComputeError::AudioReadError`: El audio no pudo leerse.
     */
    pub async fn transcribe(
        &self,
        audio_path: &Path,
        requested_language: Option<&str>,
        word_timestamps: bool,
    ) -> Result<SttOutput, ComputeError> {
        match self {
            SttBackend::Http(backend) => {
                backend.transcribe(audio_path, requested_language, word_timestamps).await
            }
            SttBackend::Mock(backend) => {
                backend.transcribe(requested_language, word_timestamps).await
            }
        }
    }

    /// Sonda de salud del backend para el endpoint /health.
    pub async fn health_check(&self) -> bool {
        match self {
            SttBackend::Http(backend) => backend.health_check().await,
            SttBackend::Mock(_) => true,
        }
    }
}
// FIN DEL ARCHIVO [libs/infra/compute/src/stt.rs]
