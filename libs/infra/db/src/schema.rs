// [libs/infra/db/src/schema.rs]
/**
 * =================================================================
 * APARATO: LEXIA DATABASE SCHEMA
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * # Invariante (Textual Timestamps):
 * Todas las marcas temporales se escriben desde Rust en RFC-3339;
 * ninguna columna depende de CURRENT_TIMESTAMP para evitar derivas
 * de formato entre el motor y el dominio.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info};

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 * Define las entidades base del ecosistema Lexia.
 */
const PLATFORM_TABLES: &[(&str, &str)] = &[
    ("TABLE_CREDENTIALS", r#"
        CREATE TABLE IF NOT EXISTS credentials (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            key_hash TEXT NOT NULL UNIQUE,
            principal_id TEXT NOT NULL,
            group_id TEXT,
            permissions TEXT NOT NULL DEFAULT '["*"]',
            rate_limit_per_minute INTEGER NOT NULL DEFAULT 60,
            is_revoked INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            last_used_at TEXT,
            expires_at TEXT
        );
    "#),
    ("TABLE_JOBS", r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            job_type TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            params TEXT NOT NULL DEFAULT '{}',
            principal_id TEXT NOT NULL,
            credential_id TEXT NOT NULL,
            webhook_url TEXT,
            queue_handle TEXT,
            progress_percent INTEGER NOT NULL DEFAULT 0,
            progress_message TEXT,
            result TEXT,
            result_url TEXT,
            error_code TEXT,
            error_message TEXT,
            created_at TEXT NOT NULL,
            started_at TEXT,
            completed_at TEXT,
            webhook_status TEXT NOT NULL DEFAULT 'pending'
        );
    "#),
    ("TABLE_TRANSCRIPTIONS", r#"
        CREATE TABLE IF NOT EXISTS transcriptions (
            id TEXT PRIMARY KEY,
            job_id TEXT NOT NULL,
            audio_url TEXT,
            audio_blob_key TEXT,
            language_code TEXT,
            speaker_labels INTEGER NOT NULL DEFAULT 0,
            word_timestamps INTEGER NOT NULL DEFAULT 1,
            text TEXT,
            words TEXT,
            segments TEXT,
            language_detected TEXT,
            language_confidence REAL,
            confidence REAL,
            speakers TEXT,
            utterances TEXT,
            diarization_segments TEXT,
            diarization_stats TEXT,
            error_message TEXT,
            principal_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            completed_at TEXT
        );
    "#),
    ("TABLE_RATE_LIMIT_COUNTERS", r#"
        CREATE TABLE IF NOT EXISTS rate_limit_counters (
            credential_id TEXT NOT NULL,
            window_minute INTEGER NOT NULL,
            request_count INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (credential_id, window_minute)
        );
    "#),
];

/**
 * ESTRATO 2: ACELERACIÓN (Índices de Despacho)
 * Índices requeridos por los patrones de acceso del gateway y el sweeper.
 */
const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("INDEX_CREDENTIALS_KEY_HASH", r#"
        CREATE INDEX IF NOT EXISTS idx_credentials_key_hash
        ON credentials (key_hash);
    "#),
    ("INDEX_JOBS_PRINCIPAL_CREATED", r#"
        CREATE INDEX IF NOT EXISTS idx_jobs_principal_created
        ON jobs (principal_id, created_at DESC);
    "#),
    ("INDEX_JOBS_STATUS", r#"
        CREATE INDEX IF NOT EXISTS idx_jobs_status
        ON jobs (status);
    "#),
    ("INDEX_JOBS_WEBHOOK_OUTBOX", r#"
        CREATE INDEX IF NOT EXISTS idx_jobs_webhook_outbox
        ON jobs (webhook_status, status);
    "#),
    ("INDEX_TRANSCRIPTIONS_JOB", r#"
        CREATE INDEX IF NOT EXISTS idx_transcriptions_job_id
        ON transcriptions (job_id);
    "#),
];

/**
 * Aplica la totalidad del esquema de forma idempotente.
 * Segura para migraciones en caliente: toda sentencia es IF NOT EXISTS.
 */
pub async fn apply_full_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization...");

    solidify_base_strata(database_connection).await?;
    harden_access_layer(database_connection).await?;

    info!("✅ [SCHEMA_ENGINE]: Platform ledger level and certified.");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in PLATFORM_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(*sql, ()).await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {}", identifier))?;
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(*sql, ()).await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {}", identifier))?;
    }
    Ok(())
}
// FIN DEL ARCHIVO [libs/infra/db/src/schema.rs]
