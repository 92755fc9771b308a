// [apps/api-gateway/src/services/webhook_sweeper.rs]
/*!
 * =================================================================
 * APARATO: WEBHOOK OUTBOX SWEEPER
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE SERVICE (ESTRATO L4)
 * RESPONSABILIDAD: REENCOLADO DE NOTIFICACIONES HUÉRFANAS
 *
 * # Invariante (Crash Coverage):
 * Cubre la ventana entre "resultado sellado" y "entrega encolada": un
 * trabajo terminal con webhook_url y webhook_status='pending' será
 * recogido por el barrido siguiente y reencolado, preservando la
 * semántica at-least-once de la entrega.
 * =================================================================
 */

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

use lexia_domain_models::{TaskDescriptor, WebhookEvent, WebhookStatus};
use lexia_infra_db::repositories::JobRepository;

use crate::state::AppState;

/// Ciclo de barrido del outbox.
const SWEEP_INTERVAL_SECONDS: u64 = 30;
/// Tamaño de ráfaga acotado por barrido.
const SWEEP_BATCH_MAX_SIZE: u32 = 50;

/**
 * Daemon de relevo del outbox de webhooks.
 */
pub struct WebhookSweeperService {
    application_shared_state: AppState,
}

impl WebhookSweeperService {
    pub fn new(application_shared_state: AppState) -> Self {
        Self { application_shared_state }
    }

    /// Bucle perpetuo del barrido; se engancha al reactor en el kernel.
    pub async fn spawn_sweeper_loop(self) {
        info!("🧹 [WEBHOOK_SWEEPER]: Outbox relay online (every {}s).", SWEEP_INTERVAL_SECONDS);

        loop {
            sleep(Duration::from_secs(SWEEP_INTERVAL_SECONDS)).await;

            if let Err(sweep_fault) = self.execute_sweep_cycle().await {
                error!("❌ [WEBHOOK_SWEEPER]: Sweep cycle failed: {}.", sweep_fault);
            }
        }
    }

    /// Un ciclo de barrido acotado. Expuesto para el Proving Grounds.
    #[instrument(skip(self))]
    pub async fn execute_sweep_cycle(&self) -> Result<u32, lexia_infra_db::DbError> {
        let job_repository = JobRepository::new(self.application_shared_state.database_client.clone());
        let orphaned_jobs = job_repository
            .fetch_pending_webhook_outbox(SWEEP_BATCH_MAX_SIZE)
            .await?;

        if orphaned_jobs.is_empty() {
            debug!("⚪ [WEBHOOK_SWEEPER]: Outbox clean.");
            return Ok(0);
        }

        let mut requeued_count: u32 = 0;
        for orphaned_job in orphaned_jobs {
            let webhook_url = match &orphaned_job.webhook_url {
                Some(url) => url.clone(),
                None => continue,
            };

            let delivery_descriptor = TaskDescriptor::WebhookDelivery {
                job_id: orphaned_job.id,
                webhook_url,
                payload: WebhookEvent::from_terminal_job(&orphaned_job),
            };

            match self.application_shared_state.task_queue.enqueue(&delivery_descriptor).await {
                Ok(_) => {
                    job_repository
                        .set_webhook_status(orphaned_job.id, WebhookStatus::Queued)
                        .await?;
                    requeued_count += 1;
                }
                Err(enqueue_fault) => {
                    // La fila sigue en 'pending'; el ciclo siguiente reintenta.
                    error!("⚠️ [WEBHOOK_SWEEPER]: Requeue failed for job {}: {}.",
                        orphaned_job.id, enqueue_fault);
                }
            }
        }

        info!("📤 [WEBHOOK_SWEEPER]: {} orphaned notification(s) requeued.", requeued_count);
        Ok(requeued_count)
    }
}
// FIN DEL ARCHIVO [apps/api-gateway/src/services/webhook_sweeper.rs]
