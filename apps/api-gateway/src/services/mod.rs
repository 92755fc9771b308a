// [apps/api-gateway/src/services/mod.rs]
/*!
 * =================================================================
 * APARATO: BACKGROUND SERVICES MATRIX
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: ORQUESTACIÓN DE DAEMONS DE MANTENIMIENTO
 * =================================================================
 */

/// Janitor del contador de cuota: purga de ventanas caducadas.
pub mod rate_limit_janitor;
/// Sweeper del outbox de webhooks: reencola entregas huérfanas.
pub mod webhook_sweeper;

pub use rate_limit_janitor::RateLimitJanitorService;
pub use webhook_sweeper::WebhookSweeperService;
// FIN DEL ARCHIVO [apps/api-gateway/src/services/mod.rs]
