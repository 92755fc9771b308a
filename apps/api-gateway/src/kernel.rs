// [apps/api-gateway/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY KERNEL
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * Placa base donde se conectan todos los clientes: la ignición
 * construye cada recurso una única vez y el lanzamiento engancha los
 * daemons de fondo antes de abrir el socket TCP.
 * =================================================================
 */

use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::info;

use lexia_infra_blob::BlobStoreClient;
use lexia_infra_compute::{build_diarization_backend, build_stt_backend};
use lexia_infra_db::DatabaseClient;
use lexia_infra_queue::TaskQueueClient;

use crate::config::GatewayConfig;
use crate::routes::create_gateway_router;
use crate::services::{RateLimitJanitorService, WebhookSweeperService};
use crate::state::AppState;

pub struct GatewayKernel {
    pub server_network_port: u16,
    pub application_shared_state: AppState,
}

impl GatewayKernel {
    /**
     * Ignición: establece los enlaces con base de datos, cola, blob
     * store y backends de cómputo, y construye el estado compartido.
     *
     * # Errors:
     * Cualquier enlace imposible de establecer aborta la ignición.
     */
    pub async fn ignite(config: GatewayConfig) -> Result<Self> {
        let database_client =
            DatabaseClient::connect(&config.database_url, config.database_auth_token.clone())
                .await
                .context("FATAL: Database link collapse. Ignition aborted.")?;

        let task_queue = TaskQueueClient::connect(&config.queue_url, config.queue_auth_token.clone())
            .await
            .context("FATAL: Task queue link collapse. Ignition aborted.")?;

        let blob_store = match &config.blob_endpoint {
            Some(endpoint) => BlobStoreClient::new_http(
                endpoint.clone(),
                config.blob_bucket.clone(),
                config.blob_access_token.clone(),
            )
            .context("FATAL: Blob store client ignition failed.")?,
            None => {
                let local_root = config
                    .blob_local_root
                    .clone()
                    .unwrap_or_else(|| "./blob-store".to_string());
                BlobStoreClient::new_local(local_root.into())
                    .context("FATAL: Local blob store ignition failed.")?
            }
        };

        let stt_backend = build_stt_backend(
            &config.stt_backend_kind,
            config.stt_service_url.clone(),
            config.stt_model.clone(),
        )
        .context("FATAL: STT backend ignition failed.")?;

        let diarization_backend = build_diarization_backend(
            &config.diarization_backend_kind,
            config.diarization_service_url.clone(),
            config.diarization_model.clone(),
        )
        .context("FATAL: Diarization backend ignition failed.")?;

        let listening_port = config.listening_port;
        let application_shared_state = AppState::new(
            database_client,
            task_queue,
            blob_store,
            stt_backend,
            diarization_backend,
            config,
        );

        Ok(Self {
            server_network_port: listening_port,
            application_shared_state,
        })
    }

    /**
     * Lanza los daemons de mantenimiento y el servidor HTTP principal.
     * Bloquea hasta el apagado del socket.
     */
    pub async fn launch_operations(self) -> Result<()> {
        // 1. SWEEPER DEL OUTBOX DE WEBHOOKS
        let sweeper_state = self.application_shared_state.clone();
        tokio::spawn(async move {
            WebhookSweeperService::new(sweeper_state).spawn_sweeper_loop().await;
        });

        // 2. JANITOR DEL CONTADOR DE CUOTA
        let janitor_state = self.application_shared_state.clone();
        tokio::spawn(async move {
            RateLimitJanitorService::new(janitor_state).spawn_janitor_loop().await;
        });

        // 3. SERVIDOR HTTP PRINCIPAL
        let gateway_router = create_gateway_router(self.application_shared_state);
        let bind_address = SocketAddr::new(
            IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            self.server_network_port,
        );

        let tcp_listener = tokio::net::TcpListener::bind(bind_address)
            .await
            .context("FATAL: TCP socket binding rejected.")?;

        info!("🛰️ [GATEWAY_ONLINE]: Serving on {}.", bind_address);
        axum::serve(tcp_listener, gateway_router)
            .await
            .context("FATAL: HTTP server collapsed.")?;

        Ok(())
    }
}
// FIN DEL ARCHIVO [apps/api-gateway/src/kernel.rs]
