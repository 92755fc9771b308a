// [libs/infra/db/src/repositories/transcription.rs]
/*!
 * =================================================================
 * APARATO: TRANSCRIPTION REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CUSTODIA DE RESULTADOS DE TRANSCRIPCIÓN
 *
 * # Invariante (Index Resolution):
 * La fila referencia a su trabajo por `job_id`; la resolución inversa
 * "transcripción por trabajo" usa el índice idx_transcriptions_job_id,
 * jamás un puntero almacenado en la fila del trabajo.
 * =================================================================
 */

use chrono::Utc;
use libsql::params;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::client::DatabaseClient;
use crate::errors::DbError;
use lexia_domain_models::{
    DiarizationStats, SpeakerSegment, TranscriptSegment, Transcription, Utterance, Word,
};

use super::{
    json_or_null, optional_json, optional_real, optional_text, optional_timestamp,
    required_integer, required_text, required_timestamp, text_or_null, timestamp_or_null,
};

// --- REGISTRO DE SENTENCIAS SQL ---

const SELECT_COLUMNS: &str = r#"
    SELECT id, job_id, audio_url, audio_blob_key, language_code,
           speaker_labels, word_timestamps, text, words, segments,
           language_detected, language_confidence, confidence,
           speakers, utterances, diarization_segments, diarization_stats,
           error_message, principal_id, created_at, completed_at
    FROM transcriptions
"#;

const SET_STT_RESULT: &str = r#"
    UPDATE transcriptions
    SET text = ?2, words = ?3, segments = ?4,
        language_detected = ?5, language_confidence = ?6, confidence = ?7,
        completed_at = ?8
    WHERE id = ?1
"#;

const SET_DIARIZATION_RESULT: &str = r#"
    UPDATE transcriptions
    SET speakers = ?2, utterances = ?3,
        diarization_segments = ?4, diarization_stats = ?5
    WHERE id = ?1
"#;

const SET_ERROR: &str = "UPDATE transcriptions SET error_message = ?2 WHERE id = ?1";

const DELETE_TRANSCRIPTION: &str = "DELETE FROM transcriptions WHERE id = ?1";

/**
 * Repositorio de autoridad única sobre los registros de transcripción.
 */
pub struct TranscriptionRepository {
    database_client: DatabaseClient,
}

impl TranscriptionRepository {
    pub(crate) const INSERT_TRANSCRIPTION: &'static str = r#"
        INSERT INTO transcriptions (
            id, job_id, audio_url, audio_blob_key, language_code,
            speaker_labels, word_timestamps, text, words, segments,
            language_detected, language_confidence, confidence,
            speakers, utterances, diarization_segments, diarization_stats,
            error_message, principal_id, created_at, completed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                  ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)
    "#;

    pub fn new(database_client: DatabaseClient) -> Self {
        Self { database_client }
    }

    #[instrument(skip(self, transcription), fields(transcription = %transcription.id))]
    pub async fn create(&self, transcription: &Transcription) -> Result<(), DbError> {
        let connection = self.database_client.connection()?;
        connection
            .execute(Self::INSERT_TRANSCRIPTION, Self::insert_params(transcription)?)
            .await?;
        info!("📝 [TRANSCRIPTION_STORE]: Record {} registered.", transcription.id);
        Ok(())
    }

    pub async fn find_by_id(&self, transcription_id: Uuid) -> Result<Option<Transcription>, DbError> {
        let connection = self.database_client.connection()?;
        let mut rows = connection
            .query(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![transcription_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row_to_transcription(&row)?)),
            None => Ok(None),
        }
    }

    /// Resolución inversa por trabajo, vía índice.
    pub async fn find_by_job_id(&self, job_id: Uuid) -> Result<Option<Transcription>, DbError> {
        let connection = self.database_client.connection()?;
        let mut rows = connection
            .query(
                &format!("{} WHERE job_id = ?1", SELECT_COLUMNS),
                params![job_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row_to_transcription(&row)?)),
            None => Ok(None),
        }
    }

    /// Persiste el resultado del motor STT (tiempos ya en milisegundos).
    #[instrument(skip_all, fields(transcription = %transcription_id))]
    pub async fn set_stt_result(
        &self,
        transcription_id: Uuid,
        text: &str,
        words: &Option<Vec<Word>>,
        segments: &Option<Vec<TranscriptSegment>>,
        language_detected: Option<&str>,
        language_confidence: Option<f64>,
        overall_confidence: Option<f64>,
    ) -> Result<(), DbError> {
        let connection = self.database_client.connection()?;
        connection
            .execute(
                SET_STT_RESULT,
                params![
                    transcription_id.to_string(),
                    text,
                    json_or_null(words)?,
                    json_or_null(segments)?,
                    match language_detected {
                        Some(language) => libsql::Value::Text(language.to_string()),
                        None => libsql::Value::Null,
                    },
                    match language_confidence {
                        Some(value) => libsql::Value::Real(value),
                        None => libsql::Value::Null,
                    },
                    match overall_confidence {
                        Some(value) => libsql::Value::Real(value),
                        None => libsql::Value::Null,
                    },
                    Utc::now().to_rfc3339(),
                ],
            )
            .await?;
        Ok(())
    }

    /// Persiste el resultado consolidado de diarización y alineamiento.
    #[instrument(skip_all, fields(transcription = %transcription_id))]
    pub async fn set_diarization_result(
        &self,
        transcription_id: Uuid,
        speakers: &Option<Vec<String>>,
        utterances: &Option<Vec<Utterance>>,
        diarization_segments: &Option<Vec<SpeakerSegment>>,
        diarization_stats: &Option<DiarizationStats>,
    ) -> Result<(), DbError> {
        let connection = self.database_client.connection()?;
        connection
            .execute(
                SET_DIARIZATION_RESULT,
                params![
                    transcription_id.to_string(),
                    json_or_null(speakers)?,
                    json_or_null(utterances)?,
                    json_or_null(diarization_segments)?,
                    json_or_null(diarization_stats)?,
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn set_error(&self, transcription_id: Uuid, error_message: &str) -> Result<(), DbError> {
        let connection = self.database_client.connection()?;
        connection
            .execute(SET_ERROR, params![transcription_id.to_string(), error_message])
            .await?;
        Ok(())
    }

    pub async fn delete(&self, transcription_id: Uuid) -> Result<bool, DbError> {
        let connection = self.database_client.connection()?;
        let rows_affected = connection
            .execute(DELETE_TRANSCRIPTION, params![transcription_id.to_string()])
            .await?;
        Ok(rows_affected > 0)
    }

    // --- MAPEO FILA <-> DOMINIO ---

    pub(crate) fn insert_params(
        transcription: &Transcription,
    ) -> Result<impl libsql::params::IntoParams, DbError> {
        Ok(params![
            transcription.id.to_string(),
            transcription.job_id.to_string(),
            text_or_null(&transcription.audio_url),
            text_or_null(&transcription.audio_blob_key),
            text_or_null(&transcription.language_code),
            transcription.speaker_labels as i64,
            transcription.word_timestamps as i64,
            text_or_null(&transcription.text),
            json_or_null(&transcription.words)?,
            json_or_null(&transcription.segments)?,
            text_or_null(&transcription.language_detected),
            match transcription.language_confidence {
                Some(value) => libsql::Value::Real(value),
                None => libsql::Value::Null,
            },
            match transcription.confidence {
                Some(value) => libsql::Value::Real(value),
                None => libsql::Value::Null,
            },
            json_or_null(&transcription.speakers)?,
            json_or_null(&transcription.utterances)?,
            json_or_null(&transcription.diarization_segments)?,
            json_or_null(&transcription.diarization_stats)?,
            text_or_null(&transcription.error_message),
            transcription.principal_id.clone(),
            transcription.created_at.to_rfc3339(),
            timestamp_or_null(&transcription.completed_at),
        ])
    }

    fn map_row_to_transcription(row: &libsql::Row) -> Result<Transcription, DbError> {
        let raw_identifier = required_text(row, 0)?;
        let raw_job_identifier = required_text(row, 1)?;

        Ok(Transcription {
            id: Uuid::parse_str(&raw_identifier)
                .map_err(|fault| DbError::MappingError(format!("UUID_PARSE_FAULT: {}", fault)))?,
            job_id: Uuid::parse_str(&raw_job_identifier)
                .map_err(|fault| DbError::MappingError(format!("UUID_PARSE_FAULT: {}", fault)))?,
            audio_url: optional_text(row, 2)?,
            audio_blob_key: optional_text(row, 3)?,
            language_code: optional_text(row, 4)?,
            speaker_labels: required_integer(row, 5)? != 0,
            word_timestamps: required_integer(row, 6)? != 0,
            text: optional_text(row, 7)?,
            words: optional_json(row, 8)?,
            segments: optional_json(row, 9)?,
            language_detected: optional_text(row, 10)?,
            language_confidence: optional_real(row, 11)?,
            confidence: optional_real(row, 12)?,
            speakers: optional_json(row, 13)?,
            utterances: optional_json(row, 14)?,
            diarization_segments: optional_json(row, 15)?,
            diarization_stats: optional_json(row, 16)?,
            error_message: optional_text(row, 17)?,
            principal_id: required_text(row, 18)?,
            created_at: required_timestamp(row, 19)?,
            completed_at: optional_timestamp(row, 20)?,
        })
    }
}
// FIN DEL ARCHIVO [libs/infra/db/src/repositories/transcription.rs]
