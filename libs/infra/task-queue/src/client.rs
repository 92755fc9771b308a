// [libs/infra/task-queue/src/client.rs]
/*!
 * =================================================================
 * APARATO: DURABLE TASK QUEUE CLIENT
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ENCOLADO, RECLAMO EXCLUSIVO Y REVOCACIÓN
 *
 * # Invariante (Exclusive Claim):
 * El reclamo encapsula SELECT + UPDATE en una transacción con guardia
 * `status = 'queued'`; dos workers jamás obtienen la misma tarea. La
 * revocación sólo procede mientras la tarea sigue encolada.
 *
 * # Invariante (Opaque Handle):
 * El handle devuelto al encolar es un uuid v4 sin semántica; el
 * despachante lo registra sobre la fila del trabajo para correlación
 * y revocación posteriores.
 * =================================================================
 */

use chrono::Utc;
use libsql::{params, Builder, Connection, Database};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::errors::QueueError;
use lexia_domain_models::TaskDescriptor;

// --- ESQUEMA DE LA COLA (IDEMPOTENTE) ---

const QUEUE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS task_queue (
        id TEXT PRIMARY KEY,
        queue_name TEXT NOT NULL,
        payload TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'queued',
        enqueued_at TEXT NOT NULL,
        claimed_at TEXT,
        claimed_by TEXT,
        sealed_at TEXT
    );
"#;

const QUEUE_DISPATCH_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_task_queue_dispatch
    ON task_queue (queue_name, status, enqueued_at);
"#;

// --- REGISTRO DE SENTENCIAS SQL ---

const ENQUEUE_TASK: &str = r#"
    INSERT INTO task_queue (id, queue_name, payload, status, enqueued_at)
    VALUES (?1, ?2, ?3, 'queued', ?4)
"#;

const FIND_NEXT_QUEUED: &str = r#"
    SELECT id, payload
    FROM task_queue
    WHERE queue_name = ?1 AND status = 'queued'
    ORDER BY enqueued_at ASC, id ASC
    LIMIT 1
"#;

const CLAIM_TASK: &str = r#"
    UPDATE task_queue
    SET status = 'claimed', claimed_at = ?2, claimed_by = ?3
    WHERE id = ?1 AND status = 'queued'
"#;

const REVOKE_TASK: &str = r#"
    UPDATE task_queue SET status = 'revoked', sealed_at = ?2
    WHERE id = ?1 AND status = 'queued'
"#;

const COMPLETE_TASK: &str = r#"
    UPDATE task_queue SET status = 'completed', sealed_at = ?2
    WHERE id = ?1 AND status = 'claimed'
"#;

const FAIL_TASK: &str = r#"
    UPDATE task_queue SET status = 'failed', sealed_at = ?2
    WHERE id = ?1 AND status = 'claimed'
"#;

const COUNT_QUEUED: &str = r#"
    SELECT COUNT(*) FROM task_queue WHERE queue_name = ?1 AND status = 'queued'
"#;

/// Tarea reclamada con propiedad exclusiva del worker llamante.
#[derive(Debug)]
pub struct ClaimedTask {
    /// Handle opaco de la fila de cola.
    pub handle: String,
    /// Descriptor reconstruido del payload transportado.
    pub descriptor: TaskDescriptor,
}

/**
 * Cliente de la cola durable. Comparte sustrato libSQL con el Ledger o
 * usa uno propio según `TASK_QUEUE_URL`.
 */
#[derive(Clone)]
pub struct TaskQueueClient {
    internal_queue_driver: Arc<Database>,
    /// Ancla de memoria compartida para los entornos de prueba.
    _memory_persistence_anchor: Option<Arc<Connection>>,
}

impl TaskQueueClient {
    /**
     * Establece el enlace con el sustrato de la cola y aplica su esquema.
     *
     * # Errors:
     * - `QueueError::ConfigurationError`: URL vacía o token remoto ausente.
     * - `QueueError::ConnectionError`: Fallo de ignición del driver.
     */
    pub async fn connect(
        queue_connection_url: &str,
        queue_access_token: Option<String>,
    ) -> Result<Self, QueueError> {
        if queue_connection_url.is_empty() {
            return Err(QueueError::ConfigurationError("TASK_QUEUE_URL_UNDEFINED".into()));
        }

        info!("🔌 [TASK_QUEUE]: Initiating queue link to [{}]", queue_connection_url);

        let is_remote = queue_connection_url.starts_with("libsql://")
            || queue_connection_url.starts_with("https://");
        let is_memory = queue_connection_url.contains(":memory:")
            || queue_connection_url.contains("mode=memory");

        let queue_driver = if is_remote {
            let token = queue_access_token.ok_or_else(|| {
                QueueError::ConfigurationError("REMOTE_ACCESS_TOKEN_MISSING".into())
            })?;
            Builder::new_remote(queue_connection_url.to_string(), token).build().await
        } else {
            Builder::new_local(queue_connection_url).build().await
        }
        .map_err(|fault| QueueError::ConnectionError(format!("DRIVER_IGNITION_FAILURE: {}", fault)))?;

        let shared_driver = Arc::new(queue_driver);

        let bootstrap_connection = shared_driver
            .connect()
            .map_err(|fault| QueueError::ConnectionError(format!("BOOTSTRAP_LINK_FAULT: {}", fault)))?;
        bootstrap_connection.execute(QUEUE_TABLE, ()).await?;
        bootstrap_connection.execute(QUEUE_DISPATCH_INDEX, ()).await?;

        let anchor = if is_memory {
            Some(Arc::new(bootstrap_connection))
        } else {
            None
        };

        Ok(Self {
            internal_queue_driver: shared_driver,
            _memory_persistence_anchor: anchor,
        })
    }

    fn connection(&self) -> Result<Connection, QueueError> {
        self.internal_queue_driver
            .connect()
            .map_err(|fault| QueueError::ConnectionError(fault.to_string()))
    }

    /**
     * Deposita un descriptor en su cola nominal y devuelve el handle opaco.
     */
    #[instrument(skip(self, descriptor), fields(queue = descriptor.queue_name(), job = %descriptor.job_id()))]
    pub async fn enqueue(&self, descriptor: &TaskDescriptor) -> Result<String, QueueError> {
        let task_handle = Uuid::new_v4().to_string();
        let serialized_payload = serde_json::to_string(descriptor)
            .map_err(|fault| QueueError::CodecError(fault.to_string()))?;

        let connection = self.connection()?;
        connection
            .execute(
                ENQUEUE_TASK,
                params![
                    task_handle.clone(),
                    descriptor.queue_name(),
                    serialized_payload,
                    Utc::now().to_rfc3339(),
                ],
            )
            .await?;

        info!("📨 [TASK_QUEUE]: Task {} accepted on queue {}.", task_handle, descriptor.queue_name());
        Ok(task_handle)
    }

    /**
     * Reclama la tarea encolada más antigua de la cola nominal, si existe.
     * El reclamo es exclusivo: la guardia de estado dentro de la
     * transacción descarta la fila si otro worker llegó primero.
     */
    #[instrument(skip(self), fields(queue = %queue_name, worker = %worker_identifier))]
    pub async fn claim_next(
        &self,
        queue_name: &str,
        worker_identifier: &str,
    ) -> Result<Option<ClaimedTask>, QueueError> {
        let connection = self.connection()?;
        let claim_transaction = connection
            .transaction()
            .await
            .map_err(|_| QueueError::TransactionError)?;

        let mut candidate_rows = claim_transaction
            .query(FIND_NEXT_QUEUED, params![queue_name])
            .await?;

        let candidate_row = match candidate_rows.next().await? {
            Some(row) => row,
            None => return Ok(None),
        };

        let task_handle: String = candidate_row.get(0)?;
        let serialized_payload: String = candidate_row.get(1)?;

        let claimed_count = claim_transaction
            .execute(
                CLAIM_TASK,
                params![task_handle.clone(), Utc::now().to_rfc3339(), worker_identifier],
            )
            .await?;

        claim_transaction.commit().await.map_err(|_| QueueError::TransactionError)?;

        if claimed_count == 0 {
            // Otro worker selló el reclamo entre el SELECT y el UPDATE.
            debug!("⚪ [TASK_QUEUE]: Claim race lost on task {}.", task_handle);
            return Ok(None);
        }

        let descriptor: TaskDescriptor = serde_json::from_str(&serialized_payload)
            .map_err(|fault| QueueError::CodecError(fault.to_string()))?;

        debug!("🎯 [TASK_QUEUE]: Task {} claimed by {}.", task_handle, worker_identifier);
        Ok(Some(ClaimedTask { handle: task_handle, descriptor }))
    }

    /// Revoca una tarea aún encolada. Falso si ya fue reclamada o sellada.
    pub async fn revoke(&self, task_handle: &str) -> Result<bool, QueueError> {
        let connection = self.connection()?;
        let revoked_count = connection
            .execute(REVOKE_TASK, params![task_handle, Utc::now().to_rfc3339()])
            .await?;
        Ok(revoked_count > 0)
    }

    /// Sella la tarea reclamada como completada.
    pub async fn complete(&self, task_handle: &str) -> Result<(), QueueError> {
        let connection = self.connection()?;
        connection
            .execute(COMPLETE_TASK, params![task_handle, Utc::now().to_rfc3339()])
            .await?;
        Ok(())
    }

    /// Sella la tarea reclamada como fallida (presupuesto agotado).
    pub async fn seal_failed(&self, task_handle: &str) -> Result<(), QueueError> {
        let connection = self.connection()?;
        connection
            .execute(FAIL_TASK, params![task_handle, Utc::now().to_rfc3339()])
            .await?;
        Ok(())
    }

    /// Profundidad actual de la cola nominal (tareas pendientes de reclamo).
    pub async fn queue_depth(&self, queue_name: &str) -> Result<u64, QueueError> {
        let connection = self.connection()?;
        let mut rows = connection.query(COUNT_QUEUED, params![queue_name]).await?;
        let depth_row = rows
            .next()
            .await?
            .ok_or_else(|| QueueError::CodecError("COUNT_RETURNING_VOID".into()))?;
        let queued_count: i64 = depth_row.get(0)?;
        Ok(queued_count as u64)
    }
}
// FIN DEL ARCHIVO [libs/infra/task-queue/src/client.rs]
