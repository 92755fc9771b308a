// [apps/media-worker/src/engine.rs]
/*!
 * =================================================================
 * APARATO: WORKER EXECUTION ENGINE
 * CLASIFICACIÓN: WORKER EXECUTION LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: BUCLE DE ADQUISICIÓN, REINTENTOS Y SELLADO
 *
 * # Invariante (Per-Task Resource Binding):
 * Todo recurso de red o base de datos usado por una etapa del
 * pipeline se construye DENTRO de la frontera de la tarea (el
 * Workbench), jamás en el arranque del proceso: el worker puede ser
 * clonado por un padre con sockets ligados a otro contexto de
 * scheduler.
 *
 * # Invariante (Retry Budget):
 * Las tareas de pipeline reintentan hasta 3 veces con 60s de espera
 * fija; el trabajo sólo alcanza `failed` con el presupuesto agotado.
 * =================================================================
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use lexia_domain_models::{TaskDescriptor, MEDIA_PIPELINE_QUEUE, WEBHOOK_DELIVERY_QUEUE};
use lexia_infra_queue::{ClaimedTask, TaskQueueClient};

use crate::pipeline::{PipelineFault, TaskOutcome, TaskWorkbench};
use crate::webhook::WebhookCourier;

/// Pausa del bucle cuando ambas colas están vacías.
const IDLE_POLL_INTERVAL_MS: u64 = 1000;

/// Configuración completa del worker, capturada del entorno en el shell.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub worker_identifier: String,
    pub database_url: String,
    pub database_auth_token: Option<String>,
    pub queue_url: String,
    pub queue_auth_token: Option<String>,
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
    pub task_retry_limit: u32,
    pub task_retry_delay_seconds: u64,
    pub webhook_retry_limit: u32,
    pub webhook_retry_delay_seconds: u64,
    pub webhook_timeout_seconds: u64,
}

/**
 * Motor del worker: reclama tareas de las colas nominales y las
 * ejecuta en serie, sellando cada handle en la cola al terminar.
 */
pub struct WorkerEngine {
    task_queue: TaskQueueClient,
    worker_settings: WorkerSettings,
    is_operational_signal: Arc<AtomicBool>,
}

impl WorkerEngine {
    pub fn new(
        task_queue: TaskQueueClient,
        worker_settings: WorkerSettings,
        operational_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            task_queue,
            worker_settings,
            is_operational_signal: operational_signal,
        }
    }

    /**
     * Bucle principal de adquisición. Bloquea hasta la señal de
     * terminación; la adquisición de tareas no tiene deadline.
     */
    #[instrument(skip(self), fields(worker = %self.worker_settings.worker_identifier))]
    pub async fn run_acquisition_loop(&self) {
        info!("🚀 [ENGINE]: Acquisition loop engaged for worker {}.",
            self.worker_settings.worker_identifier);

        while self.is_operational_signal.load(Ordering::SeqCst) {
            let claimed_task = match self.claim_from_any_queue().await {
                Ok(task) => task,
                Err(queue_fault) => {
                    error!("❌ [ENGINE]: Queue claim collapsed: {}. Backing off.", queue_fault);
                    sleep(Duration::from_millis(IDLE_POLL_INTERVAL_MS * 5)).await;
                    continue;
                }
            };

            match claimed_task {
                Some(task) => self.execute_claimed_task(task).await,
                None => sleep(Duration::from_millis(IDLE_POLL_INTERVAL_MS)).await,
            }
        }

        info!("🛑 [ENGINE]: Termination signal honored. Acquisition loop sealed.");
    }

    /// Sondea primero el pipeline de medios, después las entregas de webhook.
    async fn claim_from_any_queue(&self) -> Result<Option<ClaimedTask>, lexia_infra_queue::QueueError> {
        let worker_identifier = &self.worker_settings.worker_identifier;

        if let Some(task) = self.task_queue.claim_next(MEDIA_PIPELINE_QUEUE, worker_identifier).await? {
            return Ok(Some(task));
        }
        self.task_queue.claim_next(WEBHOOK_DELIVERY_QUEUE, worker_identifier).await
    }

    /// Ejecuta la tarea reclamada y sella su handle en la cola.
    async fn execute_claimed_task(&self, claimed_task: ClaimedTask) {
        let task_handle = claimed_task.handle.clone();

        let execution_result = match &claimed_task.descriptor {
            TaskDescriptor::Transcription { .. } | TaskDescriptor::Diarization { .. } => {
                self.execute_pipeline_with_retries(&claimed_task.descriptor).await
            }
            TaskDescriptor::WebhookDelivery { job_id, webhook_url, payload } => {
                self.execute_webhook_delivery(*job_id, webhook_url, payload).await
            }
        };

        match execution_result {
            Ok(outcome) => {
                if let Err(seal_fault) = self.task_queue.complete(&task_handle).await {
                    warn!("⚠️ [ENGINE]: Task {} finished but seal failed: {}.", task_handle, seal_fault);
                }
                info!("✅ [ENGINE]: Task {} sealed ({:?}).", task_handle, outcome);
            }
            Err(pipeline_fault) => {
                if let Err(seal_fault) = self.task_queue.seal_failed(&task_handle).await {
                    warn!("⚠️ [ENGINE]: Failed task {} could not be sealed: {}.", task_handle, seal_fault);
                }
                error!("💀 [ENGINE]: Task {} exhausted its budget: {}.", task_handle, pipeline_fault);
            }
        }
    }

    /**
     * Ejecuta una etapa de pipeline con el presupuesto de reintentos.
     * Cada intento ensambla un Workbench fresco (recursos por tarea).
     */
    async fn execute_pipeline_with_retries(
        &self,
        descriptor: &TaskDescriptor,
    ) -> Result<TaskOutcome, PipelineFault> {
        let retry_limit = self.worker_settings.task_retry_limit.max(1);
        let mut last_fault: Option<PipelineFault> = None;

        for attempt_number in 1..=retry_limit {
            let workbench = match TaskWorkbench::assemble(&self.worker_settings).await {
                Ok(workbench) => workbench,
                Err(assembly_fault) => {
                    warn!("⚠️ [ENGINE]: Workbench assembly failed (attempt {}/{}): {}.",
                        attempt_number, retry_limit, assembly_fault);
                    last_fault = Some(assembly_fault);
                    self.sleep_before_retry(attempt_number, retry_limit).await;
                    continue;
                }
            };

            match workbench.execute(descriptor).await {
                Ok(outcome) => return Ok(outcome),
                Err(execution_fault) if execution_fault.is_retryable() => {
                    warn!("⚠️ [ENGINE]: Attempt {}/{} failed: {}.",
                        attempt_number, retry_limit, execution_fault);
                    last_fault = Some(execution_fault);
                    self.sleep_before_retry(attempt_number, retry_limit).await;
                }
                Err(terminal_fault) => {
                    // Fallo no transitorio: sellado inmediato sin reintentos.
                    workbench.seal_job_failure(descriptor, &terminal_fault).await;
                    return Err(terminal_fault);
                }
            }
        }

        // Presupuesto agotado: sellar el trabajo como fallido en el Ledger.
        let exhausted_fault =
            last_fault.unwrap_or_else(|| PipelineFault::Internal("retry budget void".into()));

        if let Ok(workbench) = TaskWorkbench::assemble(&self.worker_settings).await {
            workbench.seal_job_failure(descriptor, &exhausted_fault).await;
        } else {
            error!("❌ [ENGINE]: Unable to seal failure for job {} (workbench void).",
                descriptor.job_id());
        }

        Err(exhausted_fault)
    }

    async fn sleep_before_retry(&self, attempt_number: u32, retry_limit: u32) {
        if attempt_number < retry_limit {
            sleep(Duration::from_secs(self.worker_settings.task_retry_delay_seconds)).await;
        }
    }

    /// Entrega de webhook: el courier gobierna su propio presupuesto.
    async fn execute_webhook_delivery(
        &self,
        job_id: uuid::Uuid,
        webhook_url: &str,
        payload: &lexia_domain_models::WebhookEvent,
    ) -> Result<TaskOutcome, PipelineFault> {
        let workbench = TaskWorkbench::assemble(&self.worker_settings).await?;
        let courier = WebhookCourier::new(
            self.worker_settings.webhook_retry_limit,
            Duration::from_secs(self.worker_settings.webhook_retry_delay_seconds),
            Duration::from_secs(self.worker_settings.webhook_timeout_seconds),
        )
        .map_err(|fault| PipelineFault::Internal(fault.to_string()))?;

        workbench.deliver_webhook(&courier, job_id, webhook_url, payload).await;
        Ok(TaskOutcome::WebhookHandled)
    }
}
// FIN DEL ARCHIVO [apps/media-worker/src/engine.rs]
