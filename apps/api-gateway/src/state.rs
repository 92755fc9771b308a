// [apps/api-gateway/src/state.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY STATE HUB
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ORQUESTACIÓN DE CLIENTES Y CONFIGURACIÓN
 *
 * Placa base del gateway: todo cliente se construye una vez en la
 * ignición y se comparte por clonación barata (Arc). Los repositorios
 * se instancian por petición a partir del cliente de base de datos.
 * =================================================================
 */

use std::sync::Arc;

use lexia_infra_blob::BlobStoreClient;
use lexia_infra_compute::{DiarizationBackend, SttBackend};
use lexia_infra_db::DatabaseClient;
use lexia_infra_queue::TaskQueueClient;

use crate::auth::TokenForge;
use crate::config::GatewayConfig;

/**
 * Contenedor de estado compartido (thread-safe) del gateway.
 */
#[derive(Clone)]
pub struct AppState {
    /// Cliente del Ledger (fuente única de verdad de los trabajos).
    pub database_client: DatabaseClient,
    /// Cliente de la cola durable de tareas.
    pub task_queue: TaskQueueClient,
    /// Adaptador del almacén de blobs de audio.
    pub blob_store: Arc<BlobStoreClient>,
    /// Backend de transcripción (sync endpoints y sonda de salud).
    pub stt_backend: Arc<SttBackend>,
    /// Backend de diarización (sync endpoints y sonda de salud).
    pub diarization_backend: Arc<DiarizationBackend>,
    /// Forja de tokens con la sal de proceso.
    pub token_forge: Arc<TokenForge>,
    /// Configuración capturada en el arranque.
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(
        database_client: DatabaseClient,
        task_queue: TaskQueueClient,
        blob_store: BlobStoreClient,
        stt_backend: SttBackend,
        diarization_backend: DiarizationBackend,
        config: GatewayConfig,
    ) -> Self {
        let token_forge = TokenForge::new(config.api_key_salt.clone(), config.api_key_prefix.clone());

        Self {
            database_client,
            task_queue,
            blob_store: Arc::new(blob_store),
            stt_backend: Arc::new(stt_backend),
            diarization_backend: Arc::new(diarization_backend),
            token_forge: Arc::new(token_forge),
            config: Arc::new(config),
        }
    }
}
// FIN DEL ARCHIVO [apps/api-gateway/src/state.rs]
