// [apps/api-gateway/src/main.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY MAIN ENTRY POINT
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 * =================================================================
 */

use anyhow::Result;
use tracing::info;

use lexia_api_gateway::prelude::*;
use lexia_shared_telemetry::init_tracing;

/**
 * Punto de ignición del binario del gateway.
 */
#[tokio::main]
async fn main() -> Result<()> {
    // 1. CARGA DE ENTORNO Y OBSERVABILIDAD
    dotenvy::dotenv().ok();
    init_tracing("lexia_api_gateway");

    info!("🛰️ [GATEWAY]: Global ignition sequence starting...");

    // 2. CAPTURA TIPADA DEL ENTORNO
    let gateway_config = GatewayConfig::from_environment()?;

    // 3. IGNICIÓN DEL KERNEL Y LANZAMIENTO DE OPERACIONES
    let kernel_instance = GatewayKernel::ignite(gateway_config).await?;

    info!("🚀 [GATEWAY]: System operational on port {}.", kernel_instance.server_network_port);
    kernel_instance.launch_operations().await
}
