// [apps/media-worker/src/webhook.rs]
/*!
 * =================================================================
 * APARATO: WEBHOOK DELIVERY COURIER
 * CLASIFICACIÓN: WORKER EXECUTION LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: ENTREGA AT-LEAST-ONCE DE EVENTOS TERMINALES
 *
 * # Invariante (Bounded Budget):
 * Hasta 5 intentos con 30s de espera fija y timeout de 30s por POST.
 * El agotamiento del presupuesto se registra en el log; el estado del
 * trabajo jamás se ve afectado por un webhook imposible de entregar.
 * =================================================================
 */

use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use lexia_domain_models::WebhookEvent;

#[derive(Error, Debug)]
pub enum CourierFault {
    #[error("[L1_WEBHOOK_FAULT]: CLIENT_IGNITION -> {0}")]
    ClientIgnition(#[from] reqwest::Error),

    #[error("[L1_WEBHOOK_FAULT]: DELIVERY_BUDGET_EXHAUSTED after {attempts} attempts: {last_failure}")]
    BudgetExhausted { attempts: u32, last_failure: String },
}

/**
 * Courier de notificaciones con presupuesto de reintentos acotado.
 */
pub struct WebhookCourier {
    delivery_client: reqwest::Client,
    retry_limit: u32,
    retry_delay: Duration,
}

impl WebhookCourier {
    pub fn new(
        retry_limit: u32,
        retry_delay: Duration,
        delivery_timeout: Duration,
    ) -> Result<Self, CourierFault> {
        let delivery_client = reqwest::Client::builder()
            .timeout(delivery_timeout)
            .user_agent("Lexia-Webhook-Courier/0.3")
            .build()?;

        Ok(Self {
            delivery_client,
            retry_limit: retry_limit.max(1),
            retry_delay,
        })
    }

    /**
     * Entrega el evento por POST JSON. Reintenta ante error de red o
     * respuesta no-2xx hasta agotar el presupuesto.
     *
     * Devuelve el número de intentos consumidos en el éxito.
     *
     * # Errors:
     * - `CourierFault::BudgetExhausted`: Ningún intento obtuvo 2xx.
     */
    #[instrument(skip(self, payload), fields(url = %webhook_url, event = %payload.event))]
    pub async fn deliver(
        &self,
        webhook_url: &str,
        payload: &WebhookEvent,
    ) -> Result<u32, CourierFault> {
        let mut last_failure = String::new();

        for attempt_number in 1..=self.retry_limit {
            match self.delivery_client.post(webhook_url).json(payload).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("📬 [COURIER]: Event {} delivered (attempt {}).",
                        payload.event, attempt_number);
                    return Ok(attempt_number);
                }
                Ok(response) => {
                    last_failure = format!("receiver replied {}", response.status());
                    warn!("⚠️ [COURIER]: Attempt {}/{} rejected: {}.",
                        attempt_number, self.retry_limit, last_failure);
                }
                Err(network_fault) => {
                    last_failure = network_fault.to_string();
                    warn!("⚠️ [COURIER]: Attempt {}/{} network fault: {}.",
                        attempt_number, self.retry_limit, last_failure);
                }
            }

            if attempt_number < self.retry_limit {
                sleep(self.retry_delay).await;
            }
        }

        Err(CourierFault::BudgetExhausted {
            attempts: self.retry_limit,
            last_failure,
        })
    }
}
// FIN DEL ARCHIVO [apps/media-worker/src/webhook.rs]
