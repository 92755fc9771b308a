// [libs/infra/blob-store/src/client.rs]
/*!
 * =================================================================
 * APARATO: BLOB STORE CLIENT
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TRANSFERENCIA DE BLOBS DE AUDIO POR CLAVE
 *
 * # Invariante (Key Uniqueness):
 * Las claves se generan con un uuid v4 por trabajo; lectores y
 * escritores de la misma clave no compiten jamás. El contrato es
 * exactamente put(key, bytes) / get(key) / delete(key) /
 * generate_key(name, prefix).
 * =================================================================
 */

use chrono::Utc;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::errors::BlobError;

/// Timeout generoso para transferencias de audio de varios minutos.
const TRANSFER_TIMEOUT_SECONDS: u64 = 120;

/**
 * Genera una clave única con la forma `<prefix>/<yyyy>/<mm>/<dd>/<uuid>.<ext>`.
 * La extensión se deriva del nombre original; `bin` si no la hay.
 */
pub fn generate_blob_key(original_filename: &str, prefix: &str) -> String {
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string());

    let today = Utc::now();
    format!(
        "{}/{}/{}.{}",
        prefix,
        today.format("%Y/%m/%d"),
        Uuid::new_v4(),
        extension
    )
}

/**
 * Variantes concretas del almacén de objetos.
 * Seleccionadas por configuración en el arranque; las pruebas usan la
 * variante de directorio local sin tocar la red.
 */
#[derive(Clone)]
pub enum BlobStoreClient {
    /// Bucket remoto direccionado por HTTP: `{endpoint}/{bucket}/{key}`.
    Http {
        transfer_client: reqwest::Client,
        endpoint: String,
        bucket: String,
        access_token: Option<String>,
    },
    /// Directorio local raíz para desarrollo y Proving Grounds.
    Local { root_directory: PathBuf },
}

impl BlobStoreClient {
    /// Construye la variante HTTP con el cliente de transferencia endurecido.
    pub fn new_http(
        endpoint: String,
        bucket: String,
        access_token: Option<String>,
    ) -> Result<Self, BlobError> {
        if endpoint.is_empty() || bucket.is_empty() {
            return Err(BlobError::ConfigurationError(
                "BLOB_STORE_ENDPOINT_OR_BUCKET_UNDEFINED".into(),
            ));
        }

        let transfer_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TRANSFER_TIMEOUT_SECONDS))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .user_agent("Lexia-Blob-Transfer/0.2")
            .build()
            .map_err(BlobError::TransportError)?;

        Ok(Self::Http {
            transfer_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket,
            access_token,
        })
    }

    /// Construye la variante de directorio local, materializando la raíz.
    pub fn new_local(root_directory: PathBuf) -> Result<Self, BlobError> {
        std::fs::create_dir_all(&root_directory)?;
        Ok(Self::Local { root_directory })
    }

    /**
     * Sube los bytes del blob bajo la clave indicada.
     */
    #[instrument(skip(self, payload_bytes), fields(key = %blob_key, size = payload_bytes.len()))]
    pub async fn put(
        &self,
        blob_key: &str,
        payload_bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError> {
        match self {
            BlobStoreClient::Http { transfer_client, endpoint, bucket, access_token } => {
                let object_url = format!("{}/{}/{}", endpoint, bucket, blob_key);
                let mut request = transfer_client
                    .put(&object_url)
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(payload_bytes);

                if let Some(token) = access_token {
                    request = request.bearer_auth(token);
                }

                let response = request.send().await?;
                if !response.status().is_success() {
                    return Err(BlobError::RemoteRejection(response.status().as_u16()));
                }

                info!("📦 [BLOB_STORE]: Object {} crystallized in bucket {}.", blob_key, bucket);
                Ok(())
            }
            BlobStoreClient::Local { root_directory } => {
                let object_path = root_directory.join(blob_key);
                if let Some(parent_directory) = object_path.parent() {
                    tokio::fs::create_dir_all(parent_directory).await?;
                }
                tokio::fs::write(&object_path, payload_bytes).await?;
                debug!("📦 [BLOB_STORE]: Object {} written to local strata.", blob_key);
                Ok(())
            }
        }
    }

    /**
     * Descarga los bytes del blob por clave.
     *
     * # Errors:
     * - `BlobError::KeyNotFound`: La clave no existe (404 o ruta ausente).
     */
    #[instrument(skip(self), fields(key = %blob_key))]
    pub async fn get(&self, blob_key: &str) -> Result<Vec<u8>, BlobError> {
        match self {
            BlobStoreClient::Http { transfer_client, endpoint, bucket, access_token } => {
                let object_url = format!("{}/{}/{}", endpoint, bucket, blob_key);
                let mut request = transfer_client.get(&object_url);

                if let Some(token) = access_token {
                    request = request.bearer_auth(token);
                }

                let response = request.send().await?;
                match response.status() {
                    StatusCode::NOT_FOUND => Err(BlobError::KeyNotFound(blob_key.to_string())),
                    status if !status.is_success() => {
                        Err(BlobError::RemoteRejection(status.as_u16()))
                    }
                    _ => Ok(response.bytes().await?.to_vec()),
                }
            }
            BlobStoreClient::Local { root_directory } => {
                let object_path = root_directory.join(blob_key);
                match tokio::fs::read(&object_path).await {
                    Ok(bytes) => Ok(bytes),
                    Err(fault) if fault.kind() == std::io::ErrorKind::NotFound => {
                        Err(BlobError::KeyNotFound(blob_key.to_string()))
                    }
                    Err(fault) => Err(BlobError::LocalIo(fault)),
                }
            }
        }
    }

    /**
     * Elimina el blob. La ausencia de la clave se trata como éxito:
     * la intención del usuario (objeto inexistente) ya se cumple.
     */
    #[instrument(skip(self), fields(key = %blob_key))]
    pub async fn delete(&self, blob_key: &str) -> Result<(), BlobError> {
        match self {
            BlobStoreClient::Http { transfer_client, endpoint, bucket, access_token } => {
                let object_url = format!("{}/{}/{}", endpoint, bucket, blob_key);
                let mut request = transfer_client.delete(&object_url);

                if let Some(token) = access_token {
                    request = request.bearer_auth(token);
                }

                let response = request.send().await?;
                if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
                    return Err(BlobError::RemoteRejection(response.status().as_u16()));
                }
                Ok(())
            }
            BlobStoreClient::Local { root_directory } => {
                let object_path = root_directory.join(blob_key);
                match tokio::fs::remove_file(&object_path).await {
                    Ok(()) => Ok(()),
                    Err(fault) if fault.kind() == std::io::ErrorKind::NotFound => {
                        warn!("⚪ [BLOB_STORE]: Delete on absent key {} (noop).", blob_key);
                        Ok(())
                    }
                    Err(fault) => Err(BlobError::LocalIo(fault)),
                }
            }
        }
    }
}
// FIN DEL ARCHIVO [libs/infra/blob-store/src/client.rs]
