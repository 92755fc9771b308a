// [libs/infra/db/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY ACCESS MATRIX
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE SUBSISTEMAS DE PERSISTENCIA
 *
 * El barrel actúa como interfaz galvánica: los sub-módulos permanecen
 * aislados y sólo las estructuras de autoridad (Repositories) son
 * expuestas al exterior.
 * =================================================================
 */

/// Almacén de credenciales portadoras (hash salado, cuota, permisos).
pub mod credential;
/// Ledger de trabajos asíncronos y su máquina de estados.
pub mod job;
/// Contador de ventana fija por credencial y minuto.
pub mod rate_limit;
/// Registros hijos de transcripción con columnas JSON de resultado.
pub mod transcription;

pub use credential::{CredentialRepository, RevocationOutcome};
pub use job::JobRepository;
pub use rate_limit::RateLimitRepository;
pub use transcription::TranscriptionRepository;

use crate::errors::DbError;
use chrono::{DateTime, Utc};
use libsql::{Row, Value};
use serde::de::DeserializeOwned;

// --- UTILIDADES DE MAPEO FILA -> DOMINIO ---

/// Extrae una columna de texto obligatoria.
pub(crate) fn required_text(row: &Row, column_index: i32) -> Result<String, DbError> {
    Ok(row.get::<String>(column_index)?)
}

/// Extrae una columna de texto anulable.
pub(crate) fn optional_text(row: &Row, column_index: i32) -> Result<Option<String>, DbError> {
    Ok(row.get::<Option<String>>(column_index)?)
}

/// Extrae una columna entera obligatoria.
pub(crate) fn required_integer(row: &Row, column_index: i32) -> Result<i64, DbError> {
    Ok(row.get::<i64>(column_index)?)
}

/// Extrae una columna flotante anulable.
pub(crate) fn optional_real(row: &Row, column_index: i32) -> Result<Option<f64>, DbError> {
    Ok(row.get::<Option<f64>>(column_index)?)
}

/// Reconstruye una marca temporal RFC-3339 obligatoria.
pub(crate) fn required_timestamp(row: &Row, column_index: i32) -> Result<DateTime<Utc>, DbError> {
    let raw_timestamp = required_text(row, column_index)?;
    parse_rfc3339(&raw_timestamp)
}

/// Reconstruye una marca temporal RFC-3339 anulable.
pub(crate) fn optional_timestamp(
    row: &Row,
    column_index: i32,
) -> Result<Option<DateTime<Utc>>, DbError> {
    optional_text(row, column_index)?
        .map(|raw_timestamp| parse_rfc3339(&raw_timestamp))
        .transpose()
}

pub(crate) fn parse_rfc3339(raw_timestamp: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw_timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|fault| DbError::MappingError(format!("TIMESTAMP_PARSE_FAULT: {}", fault)))
}

/// Deserializa una columna JSON anulable hacia el tipo de dominio.
pub(crate) fn optional_json<T: DeserializeOwned>(
    row: &Row,
    column_index: i32,
) -> Result<Option<T>, DbError> {
    optional_text(row, column_index)?
        .map(|raw_json| {
            serde_json::from_str(&raw_json)
                .map_err(|fault| DbError::MappingError(format!("JSON_DECODE_FAULT: {}", fault)))
        })
        .transpose()
}

/// Serializa un valor de dominio anulable hacia su columna JSON.
pub(crate) fn json_or_null<T: serde::Serialize>(value: &Option<T>) -> Result<Value, DbError> {
    match value {
        None => Ok(Value::Null),
        Some(inner) => serde_json::to_string(inner)
            .map(Value::Text)
            .map_err(|fault| DbError::MappingError(format!("JSON_ENCODE_FAULT: {}", fault))),
    }
}

/// Transforma una opción de texto en su valor SQL anulable.
pub(crate) fn text_or_null(value: &Option<String>) -> Value {
    match value {
        None => Value::Null,
        Some(text) => Value::Text(text.clone()),
    }
}

/// Transforma una marca temporal opcional en su valor SQL anulable.
pub(crate) fn timestamp_or_null(value: &Option<DateTime<Utc>>) -> Value {
    match value {
        None => Value::Null,
        Some(instant) => Value::Text(instant.to_rfc3339()),
    }
}
// FIN DEL ARCHIVO [libs/infra/db/src/repositories/mod.rs]
