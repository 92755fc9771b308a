// [apps/api-gateway/src/lib.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY LIBRARY BARREL
 * CLASIFICACIÓN: APPLICATION LIB (ESTRATO L1-APP)
 * RESPONSABILIDAD: EXPOSICIÓN PÚBLICA DE LA SUPERFICIE Y EL KERNEL
 * =================================================================
 */

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod kernel;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

/// Re-exportaciones nominales para binarios y Proving Grounds.
pub mod prelude {
    pub use crate::auth::TokenForge;
    pub use crate::config::GatewayConfig;
    pub use crate::errors::ApiError;
    pub use crate::kernel::GatewayKernel;
    pub use crate::routes::create_gateway_router;
    pub use crate::state::AppState;
}
// FIN DEL ARCHIVO [apps/api-gateway/src/lib.rs]
