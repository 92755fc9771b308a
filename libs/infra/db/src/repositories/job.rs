// [libs/infra/db/src/repositories/job.rs]
/*!
 * =================================================================
 * APARATO: JOB REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DEL CICLO DE VIDA DE TRABAJOS ASÍNCRONOS
 *
 * # Invariante (Guarded Transitions):
 * Toda transición de estado lleva una guardia WHERE sobre el estado
 * origen; la base de datos es el árbitro final del DAG y un estado
 * terminal es inalcanzable desde sí mismo. El progreso sólo avanza
 * (guardia `progress_percent <= ?`) mientras el trabajo procesa.
 * =================================================================
 */

use chrono::Utc;
use libsql::{params, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::client::DatabaseClient;
use crate::errors::DbError;
use lexia_domain_models::{Job, JobStatus, JobType, Transcription, WebhookStatus};

use super::transcription::TranscriptionRepository;
use super::{
    json_or_null, optional_text, optional_timestamp, required_integer, required_text,
    required_timestamp, text_or_null, timestamp_or_null,
};

// --- REGISTRO DE SENTENCIAS SQL ---

const INSERT_JOB: &str = r#"
    INSERT INTO jobs (
        id, job_type, status, params, principal_id, credential_id,
        webhook_url, queue_handle, progress_percent, progress_message,
        result, result_url, error_code, error_message,
        created_at, started_at, completed_at, webhook_status
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
"#;

const SELECT_COLUMNS: &str = r#"
    SELECT id, job_type, status, params, principal_id, credential_id,
           webhook_url, queue_handle, progress_percent, progress_message,
           result, result_url, error_code, error_message,
           created_at, started_at, completed_at, webhook_status
    FROM jobs
"#;

/// Registra el handle de cola y promueve pending -> queued.
const MARK_QUEUED: &str = r#"
    UPDATE jobs
    SET queue_handle = ?2, status = 'queued'
    WHERE id = ?1 AND status = 'pending'
"#;

/// Toma de propiedad por el worker: queued -> processing.
const MARK_PROCESSING: &str = r#"
    UPDATE jobs
    SET status = 'processing', started_at = ?2
    WHERE id = ?1 AND status = 'queued'
"#;

/// Publicación de hito de progreso con guardia de monotonicidad.
const UPDATE_PROGRESS: &str = r#"
    UPDATE jobs
    SET progress_percent = ?2, progress_message = ?3
    WHERE id = ?1 AND status = 'processing' AND progress_percent <= ?2
"#;

/// Sellado exitoso: processing -> completed con resultado presente.
const MARK_COMPLETED: &str = r#"
    UPDATE jobs
    SET status = 'completed', progress_percent = 100, progress_message = 'Completed',
        result = ?2, result_url = ?3, completed_at = ?4
    WHERE id = ?1 AND status = 'processing'
"#;

/// Sellado de fallo tras agotar reintentos: processing -> failed.
const MARK_FAILED: &str = r#"
    UPDATE jobs
    SET status = 'failed', error_code = ?2, error_message = ?3, completed_at = ?4
    WHERE id = ?1 AND status = 'processing'
"#;

/// Cancelación cooperativa: sólo desde pending/queued.
const MARK_CANCELLED: &str = r#"
    UPDATE jobs
    SET status = 'cancelled', completed_at = ?2
    WHERE id = ?1 AND status IN ('pending', 'queued')
"#;

/// Outbox de notificaciones: terminales con webhook sin entregar.
const FETCH_PENDING_WEBHOOKS: &str = r#"
    SELECT id, job_type, status, params, principal_id, credential_id,
           webhook_url, queue_handle, progress_percent, progress_message,
           result, result_url, error_code, error_message,
           created_at, started_at, completed_at, webhook_status
    FROM jobs
    WHERE webhook_url IS NOT NULL
      AND status IN ('completed', 'failed')
      AND webhook_status = 'pending'
    ORDER BY completed_at ASC
    LIMIT ?1
"#;

const SET_WEBHOOK_STATUS: &str = "UPDATE jobs SET webhook_status = ?2 WHERE id = ?1";

/**
 * Repositorio de autoridad única sobre el Ledger de trabajos.
 */
pub struct JobRepository {
    database_client: DatabaseClient,
}

impl JobRepository {
    pub fn new(database_client: DatabaseClient) -> Self {
        Self { database_client }
    }

    /// Inserta la fila del trabajo en estado pending.
    #[instrument(skip(self, job), fields(job = %job.id))]
    pub async fn create(&self, job: &Job) -> Result<(), DbError> {
        let connection = self.database_client.connection()?;
        connection.execute(INSERT_JOB, Self::insert_params(job)?).await?;
        info!("📋 [JOB_LEDGER]: Job {} ({}) registered.", job.id, job.job_type.as_str());
        Ok(())
    }

    /**
     * Inserta trabajo y transcripción hija en una única transacción.
     * Ningún estado parcial sobrevive a un fallo de commit.
     */
    #[instrument(skip(self, job, transcription), fields(job = %job.id))]
    pub async fn create_with_transcription(
        &self,
        job: &Job,
        transcription: &Transcription,
    ) -> Result<(), DbError> {
        let connection = self.database_client.connection()?;
        let transaction = connection
            .transaction()
            .await
            .map_err(|_| DbError::TransactionError)?;

        transaction.execute(INSERT_JOB, Self::insert_params(job)?).await?;
        transaction
            .execute(
                TranscriptionRepository::INSERT_TRANSCRIPTION,
                TranscriptionRepository::insert_params(transcription)?,
            )
            .await?;

        transaction.commit().await.map_err(|_| DbError::TransactionError)?;
        info!("📋 [JOB_LEDGER]: Job {} + transcription {} sealed atomically.",
            job.id, transcription.id);
        Ok(())
    }

    pub async fn find_by_id(&self, job_id: Uuid) -> Result<Option<Job>, DbError> {
        let connection = self.database_client.connection()?;
        let mut rows = connection
            .query(&format!("{} WHERE id = ?1", SELECT_COLUMNS), params![job_id.to_string()])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row_to_job(&row)?)),
            None => Ok(None),
        }
    }

    /**
     * Lista paginada de trabajos del principal, más recientes primero,
     * con filtros opcionales de estado y tipo.
     */
    pub async fn list_by_principal(
        &self,
        principal_id: &str,
        status_filter: Option<JobStatus>,
        type_filter: Option<JobType>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Job>, DbError> {
        // Filtros opcionales resueltos con guardias de nulidad en el SQL,
        // manteniendo una única sentencia preparada para todas las combinaciones.
        let sql = format!(
            "{} WHERE principal_id = ?1 \
             AND (?2 IS NULL OR status = ?2) \
             AND (?3 IS NULL OR job_type = ?3) \
             ORDER BY created_at DESC LIMIT ?4 OFFSET ?5",
            SELECT_COLUMNS
        );

        let status_value = match status_filter {
            Some(status) => Value::Text(status.as_str().to_string()),
            None => Value::Null,
        };
        let type_value = match type_filter {
            Some(job_type) => Value::Text(job_type.as_str().to_string()),
            None => Value::Null,
        };

        let connection = self.database_client.connection()?;
        let mut rows = connection
            .query(
                &sql,
                params![
                    principal_id,
                    status_value,
                    type_value,
                    limit as i64,
                    offset as i64,
                ],
            )
            .await?;

        let mut jobs = Vec::new();
        while let Some(row) = rows.next().await? {
            jobs.push(Self::map_row_to_job(&row)?);
        }
        Ok(jobs)
    }

    /// Registra el handle devuelto por la cola y promueve a queued.
    pub async fn mark_queued(&self, job_id: Uuid, queue_handle: &str) -> Result<(), DbError> {
        let connection = self.database_client.connection()?;
        let rows_affected = connection
            .execute(MARK_QUEUED, params![job_id.to_string(), queue_handle])
            .await?;

        if rows_affected == 0 {
            return Err(DbError::InvalidStateTransition);
        }
        Ok(())
    }

    /// Toma de propiedad del worker. Falso si el trabajo ya no está queued.
    pub async fn mark_processing(&self, job_id: Uuid) -> Result<bool, DbError> {
        let connection = self.database_client.connection()?;
        let rows_affected = connection
            .execute(MARK_PROCESSING, params![job_id.to_string(), Utc::now().to_rfc3339()])
            .await?;
        Ok(rows_affected > 0)
    }

    /**
     * Publica un hito de progreso. La guardia de monotonicidad descarta
     * en silencio cualquier retroceso.
     */
    pub async fn update_progress(
        &self,
        job_id: Uuid,
        percentage: u8,
        message: &str,
    ) -> Result<(), DbError> {
        let connection = self.database_client.connection()?;
        let rows_affected = connection
            .execute(UPDATE_PROGRESS, params![job_id.to_string(), percentage as i64, message])
            .await?;

        if rows_affected == 0 {
            warn!("⚠️ [JOB_LEDGER]: Progress milestone {}% dropped for {} (stale or terminal).",
                percentage, job_id);
        }
        Ok(())
    }

    /// Sella el trabajo como completado con su payload de resultado.
    #[instrument(skip(self, result_payload))]
    pub async fn complete_with_result(
        &self,
        job_id: Uuid,
        result_payload: &serde_json::Value,
        result_url: Option<&str>,
    ) -> Result<(), DbError> {
        let serialized_result = serde_json::to_string(result_payload)
            .map_err(|fault| DbError::MappingError(format!("RESULT_ENCODE_FAULT: {}", fault)))?;

        let connection = self.database_client.connection()?;
        let rows_affected = connection
            .execute(
                MARK_COMPLETED,
                params![
                    job_id.to_string(),
                    serialized_result,
                    match result_url {
                        Some(url) => Value::Text(url.to_string()),
                        None => Value::Null,
                    },
                    Utc::now().to_rfc3339(),
                ],
            )
            .await?;

        if rows_affected == 0 {
            return Err(DbError::InvalidStateTransition);
        }
        info!("✅ [JOB_LEDGER]: Job {} sealed as completed.", job_id);
        Ok(())
    }

    /// Sella el trabajo como fallido tras agotar el presupuesto de reintentos.
    #[instrument(skip(self, error_message))]
    pub async fn mark_failed(
        &self,
        job_id: Uuid,
        error_code: &str,
        error_message: &str,
    ) -> Result<(), DbError> {
        let connection = self.database_client.connection()?;
        let rows_affected = connection
            .execute(
                MARK_FAILED,
                params![job_id.to_string(), error_code, error_message, Utc::now().to_rfc3339()],
            )
            .await?;

        if rows_affected == 0 {
            return Err(DbError::InvalidStateTransition);
        }
        warn!("💀 [JOB_LEDGER]: Job {} sealed as failed ({}).", job_id, error_code);
        Ok(())
    }

    /**
     * Cancelación cooperativa. Verdadero sólo si la fila transitó desde
     * pending/queued; cualquier otro estado deja el Ledger intacto.
     */
    pub async fn cancel(&self, job_id: Uuid) -> Result<bool, DbError> {
        let connection = self.database_client.connection()?;
        let rows_affected = connection
            .execute(MARK_CANCELLED, params![job_id.to_string(), Utc::now().to_rfc3339()])
            .await?;
        Ok(rows_affected > 0)
    }

    /// Lote acotado del outbox: terminales con webhook aún sin encolar.
    pub async fn fetch_pending_webhook_outbox(&self, batch_limit: u32) -> Result<Vec<Job>, DbError> {
        let connection = self.database_client.connection()?;
        let mut rows = connection
            .query(FETCH_PENDING_WEBHOOKS, params![batch_limit as i64])
            .await?;

        let mut jobs = Vec::new();
        while let Some(row) = rows.next().await? {
            jobs.push(Self::map_row_to_job(&row)?);
        }
        Ok(jobs)
    }

    pub async fn set_webhook_status(
        &self,
        job_id: Uuid,
        webhook_status: WebhookStatus,
    ) -> Result<(), DbError> {
        let connection = self.database_client.connection()?;
        connection
            .execute(SET_WEBHOOK_STATUS, params![job_id.to_string(), webhook_status.as_str()])
            .await?;
        Ok(())
    }

    // --- MAPEO FILA <-> DOMINIO ---

    fn insert_params(job: &Job) -> Result<impl libsql::params::IntoParams, DbError> {
        let serialized_params = serde_json::to_string(&job.params)
            .map_err(|fault| DbError::MappingError(format!("PARAMS_ENCODE_FAULT: {}", fault)))?;

        Ok(params![
            job.id.to_string(),
            job.job_type.as_str(),
            job.status.as_str(),
            serialized_params,
            job.principal_id.clone(),
            job.credential_id.to_string(),
            text_or_null(&job.webhook_url),
            text_or_null(&job.queue_handle),
            job.progress_percent as i64,
            text_or_null(&job.progress_message),
            json_or_null(&job.result)?,
            text_or_null(&job.result_url),
            text_or_null(&job.error_code),
            text_or_null(&job.error_message),
            job.created_at.to_rfc3339(),
            timestamp_or_null(&job.started_at),
            timestamp_or_null(&job.completed_at),
            job.webhook_status.as_str(),
        ])
    }

    fn map_row_to_job(row: &libsql::Row) -> Result<Job, DbError> {
        let raw_identifier = required_text(row, 0)?;
        let raw_job_type = required_text(row, 1)?;
        let raw_status = required_text(row, 2)?;
        let raw_params = required_text(row, 3)?;
        let raw_credential = required_text(row, 5)?;
        let raw_webhook_status = required_text(row, 17)?;

        Ok(Job {
            id: Uuid::parse_str(&raw_identifier)
                .map_err(|fault| DbError::MappingError(format!("UUID_PARSE_FAULT: {}", fault)))?,
            job_type: JobType::parse(&raw_job_type)
                .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_JOB_TYPE: {}", raw_job_type)))?,
            status: JobStatus::parse(&raw_status)
                .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_JOB_STATUS: {}", raw_status)))?,
            params: serde_json::from_str(&raw_params)
                .map_err(|fault| DbError::MappingError(format!("PARAMS_DECODE_FAULT: {}", fault)))?,
            principal_id: required_text(row, 4)?,
            credential_id: Uuid::parse_str(&raw_credential)
                .map_err(|fault| DbError::MappingError(format!("UUID_PARSE_FAULT: {}", fault)))?,
            webhook_url: optional_text(row, 6)?,
            queue_handle: optional_text(row, 7)?,
            progress_percent: required_integer(row, 8)? as u8,
            progress_message: optional_text(row, 9)?,
            result: super::optional_json(row, 10)?,
            result_url: optional_text(row, 11)?,
            error_code: optional_text(row, 12)?,
            error_message: optional_text(row, 13)?,
            created_at: required_timestamp(row, 14)?,
            started_at: optional_timestamp(row, 15)?,
            completed_at: optional_timestamp(row, 16)?,
            webhook_status: WebhookStatus::parse(&raw_webhook_status).ok_or_else(|| {
                DbError::MappingError(format!("UNKNOWN_WEBHOOK_STATUS: {}", raw_webhook_status))
            })?,
        })
    }
}
// FIN DEL ARCHIVO [libs/infra/db/src/repositories/job.rs]
