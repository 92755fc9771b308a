// [apps/api-gateway/src/services/rate_limit_janitor.rs]
/*!
 * =================================================================
 * APARATO: RATE LIMIT WINDOW JANITOR
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE SERVICE (ESTRATO L4)
 * RESPONSABILIDAD: PURGA DE VENTANAS DE CUOTA CADUCADAS
 *
 * Equivalente funcional a un TTL de 60s sobre el contador: las
 * ventanas anteriores al minuto previo ya no participan en ninguna
 * decisión y se eliminan por lotes.
 * =================================================================
 */

use chrono::Utc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

use lexia_infra_db::repositories::RateLimitRepository;

use crate::state::AppState;

/// Ciclo de limpieza del contador.
const PURGE_INTERVAL_SECONDS: u64 = 120;

pub struct RateLimitJanitorService {
    application_shared_state: AppState,
}

impl RateLimitJanitorService {
    pub fn new(application_shared_state: AppState) -> Self {
        Self { application_shared_state }
    }

    pub async fn spawn_janitor_loop(self) {
        info!("🧼 [RATE_JANITOR]: Window purge online (every {}s).", PURGE_INTERVAL_SECONDS);

        loop {
            sleep(Duration::from_secs(PURGE_INTERVAL_SECONDS)).await;

            let rate_limit_repository =
                RateLimitRepository::new(self.application_shared_state.database_client.clone());
            let stale_threshold_minute = Utc::now().timestamp() / 60 - 1;

            match rate_limit_repository.purge_stale_windows(stale_threshold_minute).await {
                Ok(purged_count) if purged_count > 0 => {
                    debug!("🧼 [RATE_JANITOR]: {} stale window(s) purged.", purged_count);
                }
                Ok(_) => {}
                Err(purge_fault) => {
                    error!("❌ [RATE_JANITOR]: Purge cycle failed: {}.", purge_fault);
                }
            }
        }
    }
}
// FIN DEL ARCHIVO [apps/api-gateway/src/services/rate_limit_janitor.rs]
