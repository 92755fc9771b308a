// [apps/api-gateway/src/handlers/ingestion.rs]
/*!
 * =================================================================
 * APARATO: AUDIO INGESTION UTILITIES
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PARSEO MULTIPART Y VALIDACIÓN DE FUENTE DE AUDIO
 *
 * # Invariante (Source Exclusivity):
 * Exactamente una fuente de audio por sumisión: carga multipart O
 * URL http(s). Su ausencia falla con param=`audio` y código
 * `missing_audio_source`.
 * =================================================================
 */

use axum::extract::Multipart;
use std::collections::HashMap;
use std::path::Path;

use crate::errors::ApiError;

/// Formatos de audio soportados, resueltos por sufijo de fichero.
pub const SUPPORTED_AUDIO_FORMATS: &[&str] = &["wav", "mp3", "m4a", "flac", "ogg", "webm"];

/// Carga de audio recibida en el campo multipart `audio`.
pub struct AudioUpload {
    pub file_name: String,
    pub audio_bytes: Vec<u8>,
    /// Sufijo normalizado (wav, mp3, ...), ya validado.
    pub audio_format: String,
}

/// Sumisión multipart descompuesta: carga opcional + campos de texto.
pub struct MultipartSubmission {
    pub upload: Option<AudioUpload>,
    pub text_fields: HashMap<String, String>,
}

impl MultipartSubmission {
    pub fn text_field(&self, field_name: &str) -> Option<&str> {
        self.text_fields.get(field_name).map(String::as_str)
    }

    pub fn bool_field(&self, field_name: &str) -> bool {
        self.text_field(field_name)
            .map(|raw_value| matches!(raw_value, "true" | "1" | "yes"))
            .unwrap_or(false)
    }

    pub fn numeric_field<T: std::str::FromStr>(
        &self,
        field_name: &str,
    ) -> Result<Option<T>, ApiError> {
        match self.text_field(field_name) {
            None => Ok(None),
            Some(raw_value) => raw_value.parse::<T>().map(Some).map_err(|_| {
                ApiError::validation(
                    format!("Invalid value for '{}'.", field_name),
                    Some(field_name),
                    None,
                )
            }),
        }
    }
}

/// Valida y devuelve el formato de audio a partir del nombre de fichero.
pub fn validate_audio_format(file_name: &str) -> Result<String, ApiError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if SUPPORTED_AUDIO_FORMATS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(ApiError::validation(
            format!(
                "Unsupported audio format '{}'. Supported: {}.",
                extension,
                SUPPORTED_AUDIO_FORMATS.join(", ")
            ),
            Some("audio"),
            Some("invalid_audio_format"),
        ))
    }
}

/**
 * Descompone la sumisión multipart: el campo `audio` se captura como
 * carga binaria (con formato validado), el resto como texto.
 */
pub async fn parse_multipart_submission(
    mut multipart: Multipart,
) -> Result<MultipartSubmission, ApiError> {
    let mut upload: Option<AudioUpload> = None;
    let mut text_fields: HashMap<String, String> = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(|fault| {
        ApiError::validation(format!("Malformed multipart body: {}.", fault), None, None)
    })? {
        let field_name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        if field_name == "audio" {
            let file_name = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| "audio.wav".to_string());
            let audio_format = validate_audio_format(&file_name)?;

            let audio_bytes = field
                .bytes()
                .await
                .map_err(|fault| {
                    ApiError::validation(
                        format!("Unreadable audio upload: {}.", fault),
                        Some("audio"),
                        None,
                    )
                })?
                .to_vec();

            upload = Some(AudioUpload { file_name, audio_bytes, audio_format });
        } else {
            let field_value = field.text().await.map_err(|fault| {
                ApiError::validation(
                    format!("Unreadable field '{}': {}.", field_name, fault),
                    Some(field_name.as_str()),
                    None,
                )
            })?;
            text_fields.insert(field_name, field_value);
        }
    }

    Ok(MultipartSubmission { upload, text_fields })
}

/**
 * Aplica la exclusividad de fuente y las guardias de URL y tamaño.
 * Devuelve `(upload?, audio_url?)` con exactamente una presente.
 */
pub fn resolve_audio_source(
    submission: &MultipartSubmission,
    max_upload_bytes: u64,
    max_upload_mb: u64,
) -> Result<(Option<&AudioUpload>, Option<String>), ApiError> {
    let audio_url = submission
        .text_field("audio_url")
        .map(str::to_string)
        .filter(|url| !url.is_empty());

    match (&submission.upload, &audio_url) {
        (None, None) => Err(ApiError::validation(
            "Either 'audio' file or 'audio_url' must be provided.",
            Some("audio"),
            Some("missing_audio_source"),
        )),
        (Some(upload), _) => {
            if upload.audio_bytes.len() as u64 > max_upload_bytes {
                return Err(ApiError::FileTooLarge {
                    actual_mb: upload.audio_bytes.len() as f64 / (1024.0 * 1024.0),
                    max_mb: max_upload_mb,
                });
            }
            Ok((Some(upload), None))
        }
        (None, Some(url)) => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ApiError::validation(
                    "audio_url must be a valid HTTP(S) URL.",
                    Some("audio_url"),
                    Some("invalid_url_format"),
                ));
            }
            Ok((None, Some(url.clone())))
        }
    }
}
// FIN DEL ARCHIVO [apps/api-gateway/src/handlers/ingestion.rs]
