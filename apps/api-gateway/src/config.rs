// [apps/api-gateway/src/config.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY CONFIGURATION CAPTURE
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: CAPTURA TIPADA DEL ENTORNO EN EL ARRANQUE
 *
 * # Invariante (Startup-Only Environment):
 * La totalidad del entorno se lee una única vez en la ignición; el
 * resto del proceso consume exclusivamente este objeto explícito.
 * =================================================================
 */

use anyhow::{bail, Context, Result};
use std::env;

/// Configuración completa del gateway, capturada del entorno.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listening_port: u16,
    pub database_url: String,
    pub database_auth_token: Option<String>,
    pub queue_url: String,
    pub queue_auth_token: Option<String>,
    /// Sal de proceso para el hash de tokens. Obligatoria.
    pub api_key_salt: String,
    /// Prefijo imprimible de los tokens emitidos.
    pub api_key_prefix: String,
    pub blob_endpoint: Option<String>,
    pub blob_bucket: String,
    pub blob_access_token: Option<String>,
    pub blob_local_root: Option<String>,
    pub stt_backend_kind: String,
    pub stt_service_url: Option<String>,
    pub stt_model: Option<String>,
    pub diarization_backend_kind: String,
    pub diarization_service_url: Option<String>,
    pub diarization_model: Option<String>,
    /// Tope de carga de los endpoints síncronos, en megabytes.
    pub max_sync_file_size_mb: u64,
    /// Tope de carga de los endpoints asíncronos, en megabytes.
    pub max_upload_file_size_mb: u64,
    /// Cuota por defecto de credenciales nuevas (peticiones/minuto).
    pub default_rate_limit_per_minute: u32,
    /// Orígenes CORS permitidos; `*` habilita cualquier origen.
    pub cors_origins: Vec<String>,
}

impl GatewayConfig {
    /**
     * Captura y valida el entorno del proceso.
     *
     * # Errors:
     * Variables obligatorias ausentes (`DATABASE_URL`, `API_KEY_SALT`)
     * o valores numéricos imposibles de interpretar.
     */
    pub fn from_environment() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .context("CRITICAL_FAULT: DATABASE_URL not defined in runtime environment.")?;

        let api_key_salt = env::var("API_KEY_SALT")
            .context("CRITICAL_FAULT: API_KEY_SALT not defined in runtime environment.")?;
        if api_key_salt.is_empty() {
            bail!("CRITICAL_FAULT: API_KEY_SALT must not be empty.");
        }

        let queue_url = optional_var("TASK_QUEUE_URL").unwrap_or_else(|| database_url.clone());

        Ok(Self {
            listening_port: parsed_var("PORT", 3000)?,
            database_auth_token: optional_var("DATABASE_AUTH_TOKEN"),
            queue_auth_token: optional_var("TASK_QUEUE_AUTH_TOKEN"),
            api_key_prefix: optional_var("API_KEY_PREFIX").unwrap_or_else(|| "lx_".to_string()),
            blob_endpoint: optional_var("BLOB_STORE_ENDPOINT"),
            blob_bucket: optional_var("BLOB_STORE_BUCKET").unwrap_or_else(|| "lexia-audio".to_string()),
            blob_access_token: optional_var("BLOB_STORE_ACCESS_TOKEN"),
            blob_local_root: optional_var("BLOB_STORE_LOCAL_ROOT"),
            stt_backend_kind: optional_var("STT_BACKEND").unwrap_or_else(|| "http".to_string()),
            stt_service_url: optional_var("STT_SERVICE_URL"),
            stt_model: optional_var("STT_MODEL"),
            diarization_backend_kind: optional_var("DIARIZATION_BACKEND")
                .unwrap_or_else(|| "http".to_string()),
            diarization_service_url: optional_var("DIARIZATION_SERVICE_URL"),
            diarization_model: optional_var("DIARIZATION_MODEL"),
            max_sync_file_size_mb: parsed_var("MAX_SYNC_FILE_SIZE_MB", 50)?,
            max_upload_file_size_mb: parsed_var("MAX_UPLOAD_FILE_SIZE_MB", 200)?,
            default_rate_limit_per_minute: parsed_var("DEFAULT_RATE_LIMIT_PER_MINUTE", 60)?,
            cors_origins: optional_var("CORS_ORIGINS")
                .map(|raw_origins| {
                    raw_origins
                        .split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["*".to_string()]),
            database_url,
            queue_url,
            api_key_salt,
        })
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_file_size_mb * 1024 * 1024
    }

    pub fn max_sync_bytes(&self) -> u64 {
        self.max_sync_file_size_mb * 1024 * 1024
    }
}

fn optional_var(variable_name: &str) -> Option<String> {
    env::var(variable_name).ok().filter(|value| !value.is_empty())
}

fn parsed_var<T: std::str::FromStr>(variable_name: &str, default_value: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match optional_var(variable_name) {
        None => Ok(default_value),
        Some(raw_value) => raw_value.parse::<T>().map_err(|fault| {
            anyhow::anyhow!("CONFIG_FAULT: {} unparsable: {}", variable_name, fault)
        }),
    }
}
// FIN DEL ARCHIVO [apps/api-gateway/src/config.rs]
