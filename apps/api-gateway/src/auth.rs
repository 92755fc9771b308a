// [apps/api-gateway/src/auth.rs]
/*!
 * =================================================================
 * APARATO: TOKEN FORGE
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: GENERACIÓN, HASHING Y VALIDACIÓN DE TOKENS
 *
 * # Invariante (One-Way Custody):
 * El token en claro se entrega exactamente una vez en la emisión y
 * es irrecuperable después: el almacén guarda sólo el hex minúsculo
 * de SHA-256(salt ∥ cuerpo). La comparación de hashes es de tiempo
 * constante.
 *
 * # Invariante (Shape Gate):
 * Formato: prefijo fijo imprimible + ≥32 bytes de aleatoriedad
 * criptográfica en base64 URL-safe. La verificación exige el prefijo
 * y un cuerpo de al menos 20 caracteres.
 * =================================================================
 */

use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::errors::ApiError;

/// Entropía del cuerpo del token: 32 bytes (256 bits).
const TOKEN_ENTROPY_BYTES: usize = 32;

/// Longitud mínima del cuerpo aceptada en verificación.
const MINIMUM_TOKEN_BODY_LENGTH: usize = 20;

/**
 * Forja de tokens portadores con sal de proceso.
 */
#[derive(Clone)]
pub struct TokenForge {
    process_salt: String,
    token_prefix: String,
}

impl TokenForge {
    pub fn new(process_salt: String, token_prefix: String) -> Self {
        Self { process_salt, token_prefix }
    }

    pub fn token_prefix(&self) -> &str {
        &self.token_prefix
    }

    /// Genera un token nuevo: `<prefijo><base64url(32 bytes aleatorios)>`.
    pub fn generate_token(&self) -> String {
        let mut entropy_buffer = [0u8; TOKEN_ENTROPY_BYTES];
        OsRng.fill_bytes(&mut entropy_buffer);
        format!("{}{}", self.token_prefix, BASE64_URL.encode(entropy_buffer))
    }

    /// Hex minúsculo de SHA-256(salt ∥ cuerpo), con el prefijo despojado.
    pub fn hash_token(&self, presented_token: &str) -> String {
        let token_body = presented_token
            .strip_prefix(self.token_prefix.as_str())
            .unwrap_or(presented_token);

        let mut hasher = Sha256::new();
        hasher.update(self.process_salt.as_bytes());
        hasher.update(token_body.as_bytes());
        hex::encode(hasher.finalize())
    }

    /**
     * Valida la forma del token antes de tocar el almacén.
     *
     * # Errors:
     * - `ApiError::Authentication` (invalid_api_key): prefijo ausente o
     *   cuerpo más corto que el mínimo.
     */
    pub fn validate_shape(&self, presented_token: &str) -> Result<(), ApiError> {
        if !presented_token.starts_with(self.token_prefix.as_str()) {
            return Err(ApiError::Authentication {
                message: format!("API key must start with '{}'.", self.token_prefix),
                code: "invalid_api_key",
            });
        }

        let token_body_length = presented_token.len() - self.token_prefix.len();
        if token_body_length < MINIMUM_TOKEN_BODY_LENGTH {
            return Err(ApiError::Authentication {
                message: "API key is too short.".to_string(),
                code: "invalid_api_key",
            });
        }

        Ok(())
    }
}

/**
 * Extrae el valor portador de la cabecera Authorization.
 * Acepta tanto `Bearer <token>` como `<token>` desnudo.
 *
 * # Errors:
 * - `missing_authorization`: cabecera ausente.
 * - `invalid_api_key`: forma de cabecera irreconocible.
 */
pub fn extract_bearer_value(authorization_header: Option<&str>) -> Result<&str, ApiError> {
    let header_content = authorization_header.ok_or_else(|| ApiError::Authentication {
        message: "Missing Authorization header.".to_string(),
        code: "missing_authorization",
    })?;

    let parts: Vec<&str> = header_content.split_whitespace().collect();
    match parts.as_slice() {
        [bare_token] => Ok(bare_token),
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(ApiError::Authentication {
            message: "Invalid Authorization header format. Expected 'Bearer <api_key>'.".to_string(),
            code: "invalid_api_key",
        }),
    }
}

/// Comparación de tiempo constante sobre los resúmenes hex.
pub fn constant_time_eq(first_digest: &str, second_digest: &str) -> bool {
    if first_digest.len() != second_digest.len() {
        return false;
    }

    let mut accumulated_difference: u8 = 0;
    for (first_byte, second_byte) in first_digest.bytes().zip(second_digest.bytes()) {
        accumulated_difference |= first_byte ^ second_byte;
    }
    accumulated_difference == 0
}
// FIN DEL ARCHIVO [apps/api-gateway/src/auth.rs]
