// [apps/media-worker/src/main.rs]
/*!
 * =================================================================
 * APARATO: MEDIA WORKER SHELL
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO E IGNICIÓN DEL MOTOR
 *
 * El shell actúa como un switchboard puro de configuración y señales:
 * la totalidad de la operación se delega en el WorkerEngine.
 * =================================================================
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

use lexia_infra_queue::TaskQueueClient;
use lexia_media_worker::engine::{WorkerEngine, WorkerSettings};
use lexia_shared_telemetry::init_tracing;

/**
 * Directivas de mando del worker de medios.
 * Configuración inyectada vía CLI o variables de entorno.
 */
#[derive(Parser, Debug)]
#[command(
    author = "Lexia Platform Team",
    version,
    about = "Lexia Media Worker // Transcription & Diarization Pipeline Node"
)]
struct MediaWorkerDirectives {
    /// Identificador unívoco del nodo en la flota de workers.
    #[arg(long, env = "WORKER_ID", default_value = "media-worker-alpha")]
    worker_identifier: String,

    /// Enlace al Ledger de trabajos (fuente única de verdad).
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Token de acceso al Ledger remoto, si procede.
    #[arg(long, env = "DATABASE_AUTH_TOKEN")]
    database_auth_token: Option<String>,

    /// Enlace a la cola durable; por defecto comparte el Ledger.
    #[arg(long, env = "TASK_QUEUE_URL")]
    queue_url: Option<String>,

    #[arg(long, env = "TASK_QUEUE_AUTH_TOKEN")]
    queue_auth_token: Option<String>,

    /// Endpoint del bucket de objetos; su ausencia activa el modo local.
    #[arg(long, env = "BLOB_STORE_ENDPOINT")]
    blob_endpoint: Option<String>,

    #[arg(long, env = "BLOB_STORE_BUCKET", default_value = "lexia-audio")]
    blob_bucket: String,

    #[arg(long, env = "BLOB_STORE_ACCESS_TOKEN")]
    blob_access_token: Option<String>,

    #[arg(long, env = "BLOB_STORE_LOCAL_ROOT")]
    blob_local_root: Option<String>,

    /// Clase del backend STT: `http` o `mock`.
    #[arg(long, env = "STT_BACKEND", default_value = "http")]
    stt_backend_kind: String,

    #[arg(long, env = "STT_SERVICE_URL")]
    stt_service_url: Option<String>,

    #[arg(long, env = "STT_MODEL")]
    stt_model: Option<String>,

    /// Clase del backend de diarización: `http` o `mock`.
    #[arg(long, env = "DIARIZATION_BACKEND", default_value = "http")]
    diarization_backend_kind: String,

    #[arg(long, env = "DIARIZATION_SERVICE_URL")]
    diarization_service_url: Option<String>,

    #[arg(long, env = "DIARIZATION_MODEL")]
    diarization_model: Option<String>,

    /// Presupuesto de reintentos por tarea de pipeline.
    #[arg(long, env = "TASK_RETRY_LIMIT", default_value_t = 3)]
    task_retry_limit: u32,

    /// Espera fija entre reintentos de pipeline, en segundos.
    #[arg(long, env = "TASK_RETRY_DELAY_SECONDS", default_value_t = 60)]
    task_retry_delay_seconds: u64,

    /// Presupuesto de reintentos de entrega de webhook.
    #[arg(long, env = "WEBHOOK_RETRY_LIMIT", default_value_t = 5)]
    webhook_retry_limit: u32,

    /// Espera fija entre reintentos de webhook, en segundos.
    #[arg(long, env = "WEBHOOK_RETRY_DELAY_SECONDS", default_value_t = 30)]
    webhook_retry_delay_seconds: u64,

    /// Timeout del POST de webhook, en segundos.
    #[arg(long, env = "WEBHOOK_TIMEOUT_SECONDS", default_value_t = 30)]
    webhook_timeout_seconds: u64,
}

/**
 * Punto de ignición del binario del worker.
 *
 * # Errors:
 * - Configuración de red sintácticamente inválida o cola inaccesible.
 */
#[tokio::main]
async fn main() -> Result<()> {
    // 1. CARGA DE ENTORNO Y OBSERVABILIDAD
    dotenvy::dotenv().ok();
    init_tracing("lexia_media_worker");

    info!("💠 [SHELL]: Media worker ignition sequence starting...");

    // 2. PARSEO DE DIRECTIVAS
    let directives = MediaWorkerDirectives::parse();

    // 3. PROTOCOLO DE SEÑALES (TERMINACIÓN ORDENADA)
    let operational_signal = Arc::new(AtomicBool::new(true));
    let signal_reference = Arc::clone(&operational_signal);

    tokio::spawn(async move {
        if (tokio::signal::ctrl_c().await).is_ok() {
            warn!("⚠️ [SIGNAL]: Termination requested by host. Sealing current task...");
            signal_reference.store(false, std::sync::atomic::Ordering::SeqCst);
        }
    });

    // 4. ENLACE CON LA COLA DURABLE
    let queue_url = directives
        .queue_url
        .clone()
        .unwrap_or_else(|| directives.database_url.clone());

    let task_queue = TaskQueueClient::connect(&queue_url, directives.queue_auth_token.clone())
        .await
        .context("QUEUE_FAULT: Unable to establish the task queue link.")?;

    // 5. CONSTRUCCIÓN DE LA CONFIGURACIÓN DEL MOTOR
    let worker_settings = WorkerSettings {
        worker_identifier: directives.worker_identifier,
        database_url: directives.database_url,
        database_auth_token: directives.database_auth_token,
        queue_url,
        queue_auth_token: directives.queue_auth_token,
        blob_endpoint: directives.blob_endpoint,
        blob_bucket: directives.blob_bucket,
        blob_access_token: directives.blob_access_token,
        blob_local_root: directives.blob_local_root,
        stt_backend_kind: directives.stt_backend_kind,
        stt_service_url: directives.stt_service_url,
        stt_model: directives.stt_model,
        diarization_backend_kind: directives.diarization_backend_kind,
        diarization_service_url: directives.diarization_service_url,
        diarization_model: directives.diarization_model,
        task_retry_limit: directives.task_retry_limit,
        task_retry_delay_seconds: directives.task_retry_delay_seconds,
        webhook_retry_limit: directives.webhook_retry_limit,
        webhook_retry_delay_seconds: directives.webhook_retry_delay_seconds,
        webhook_timeout_seconds: directives.webhook_timeout_seconds,
    };

    // 6. IGNICIÓN DEL MOTOR
    let engine = WorkerEngine::new(task_queue, worker_settings, operational_signal);
    engine.run_acquisition_loop().await;

    info!("🛑 [SHELL]: Media worker terminated cleanly.");
    Ok(())
}
