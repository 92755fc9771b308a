// [apps/api-gateway/src/errors.rs]
/*!
 * =================================================================
 * APARATO: API ERROR ENVELOPE
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TAXONOMÍA PÚBLICA Y SOBRE DE ERROR UNIFORME
 *
 * # Invariante (Uniform Envelope):
 * Todo fallo de la superficie se serializa como
 * `{"error": {"message", "type", "param", "code"}}` con
 * type ∈ {invalid_request_error, authentication_error,
 * rate_limit_error, server_error, api_error}.
 *
 * # Invariante (Existence Hiding):
 * El acceso a un recurso ajeno produce exactamente el mismo cuerpo
 * 404 que un identificador inexistente.
 * =================================================================
 */

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Catálogo de fallos de la superficie pública.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Petición sintácticamente o semánticamente inválida (4xx).
    #[error("{message}")]
    Validation {
        message: String,
        param: Option<String>,
        code: Option<&'static str>,
    },

    /// Fallo de autenticación del portador (401).
    #[error("{message}")]
    Authentication { message: String, code: &'static str },

    /// Credencial válida sin el permiso requerido (403).
    #[error("Insufficient permissions for this operation.")]
    InsufficientPermissions,

    /// Cuota por minuto agotada (429 con pista de reintento).
    #[error("Rate limit exceeded. Retry in {retry_after_seconds}s.")]
    RateLimitExceeded {
        retry_after_seconds: u64,
        limit_per_minute: u32,
    },

    /// Recurso inexistente o ajeno al principal (404, cuerpo idéntico).
    #[error("{message}")]
    NotFound { message: String, code: &'static str },

    /// El trabajo ya no admite cancelación (400).
    #[error("Job cannot be cancelled in its current state.")]
    CannotCancel,

    /// Carga que supera el tamaño máximo configurado (413).
    #[error("File of {actual_mb:.2} MB exceeds the {max_mb} MB limit.")]
    FileTooLarge { actual_mb: f64, max_mb: u64 },

    /// Colapso de un servicio de cómputo en un endpoint síncrono (502).
    #[error("{message}")]
    ComputeService { message: String, code: &'static str },

    /// Fallo interno no clasificado (500, mensaje opaco al exterior).
    #[error("An internal server error occurred.")]
    Internal { detail: String },
}

impl ApiError {
    /// Constructor de validación con parámetro y código nominales.
    pub fn validation(
        message: impl Into<String>,
        param: Option<&str>,
        code: Option<&'static str>,
    ) -> Self {
        ApiError::Validation {
            message: message.into(),
            param: param.map(str::to_string),
            code,
        }
    }

    /// 404 canónico de trabajo (idéntico para ajeno e inexistente).
    pub fn job_not_found(job_identifier: &str) -> Self {
        ApiError::NotFound {
            message: format!("Job not found: {}", job_identifier),
            code: "job_not_found",
        }
    }

    /// 404 canónico de transcripción.
    pub fn transcription_not_found(transcription_identifier: &str) -> Self {
        ApiError::NotFound {
            message: format!("Transcription not found: {}", transcription_identifier),
            code: "transcription_not_found",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::InsufficientPermissions => StatusCode::FORBIDDEN,
            ApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::CannotCancel => StatusCode::BAD_REQUEST,
            ApiError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ComputeService { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. }
            | ApiError::NotFound { .. }
            | ApiError::CannotCancel
            | ApiError::FileTooLarge { .. } => "invalid_request_error",
            ApiError::Authentication { .. } | ApiError::InsufficientPermissions => {
                "authentication_error"
            }
            ApiError::RateLimitExceeded { .. } => "rate_limit_error",
            ApiError::ComputeService { .. } | ApiError::Internal { .. } => "server_error",
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            ApiError::Validation { code, .. } => *code,
            ApiError::Authentication { code, .. } => Some(code),
            ApiError::InsufficientPermissions => Some("insufficient_permissions"),
            ApiError::RateLimitExceeded { .. } => Some("rate_limit_exceeded"),
            ApiError::NotFound { code, .. } => Some(code),
            ApiError::CannotCancel => Some("job_not_cancellable"),
            ApiError::FileTooLarge { .. } => Some("file_too_large"),
            ApiError::ComputeService { code, .. } => Some(code),
            ApiError::Internal { .. } => Some("internal_error"),
        }
    }

    fn error_param(&self) -> Option<String> {
        match self {
            ApiError::Validation { param, .. } => param.clone(),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { detail } = &self {
            // El detalle interno va al log, jamás al cuerpo de respuesta.
            error!("❌ [API_FAULT]: Internal collapse: {}", detail);
        }

        let envelope = json!({
            "error": {
                "message": self.to_string(),
                "type": self.error_type(),
                "param": self.error_param(),
                "code": self.error_code(),
            }
        });

        let mut response = (self.status_code(), Json(envelope)).into_response();

        // Pista de reintento de cuota: cabeceras estándar sobre el 429.
        if let ApiError::RateLimitExceeded { retry_after_seconds, limit_per_minute } = &self {
            let headers = response.headers_mut();
            if let Ok(retry_value) = HeaderValue::from_str(&retry_after_seconds.to_string()) {
                headers.insert(header::RETRY_AFTER, retry_value);
            }
            if let Ok(limit_value) = HeaderValue::from_str(&limit_per_minute.to_string()) {
                headers.insert("x-ratelimit-limit", limit_value);
            }
            headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        }

        response
    }
}

// --- PROMOCIÓN DE FALLOS DE INFRAESTRUCTURA (OPACOS AL EXTERIOR) ---

impl From<lexia_infra_db::DbError> for ApiError {
    fn from(fault: lexia_infra_db::DbError) -> Self {
        ApiError::Internal { detail: fault.to_string() }
    }
}

impl From<lexia_infra_blob::BlobError> for ApiError {
    fn from(fault: lexia_infra_blob::BlobError) -> Self {
        ApiError::Internal { detail: fault.to_string() }
    }
}

impl From<lexia_infra_queue::QueueError> for ApiError {
    fn from(fault: lexia_infra_queue::QueueError) -> Self {
        ApiError::Internal { detail: fault.to_string() }
    }
}

impl From<lexia_infra_compute::ComputeError> for ApiError {
    fn from(fault: lexia_infra_compute::ComputeError) -> Self {
        ApiError::ComputeService {
            message: "Compute backend rejected the request.".to_string(),
            code: match fault.public_code() {
                "diarization_service_error" => "diarization_service_error",
                "stt_service_error" => "stt_service_error",
                _ => "internal_error",
            },
        }
    }
}
// FIN DEL ARCHIVO [apps/api-gateway/src/errors.rs]
