// [libs/domain/models/src/credential.rs]
/*!
 * =================================================================
 * APARATO: CREDENTIAL DOMAIN MODEL
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO SOBERANO DE IDENTIDAD Y CUOTA
 *
 * # Invariante (Hash Custody):
 * El token en claro jamás se persiste. La entidad transporta
 * únicamente el hex minúsculo de SHA-256(salt ∥ cuerpo), y la
 * verificación se realiza con comparación de tiempo constante.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permiso comodín: concede la totalidad del conjunto de operaciones.
pub const WILDCARD_PERMISSION: &str = "*";

/// Credencial portadora registrada en el almacén de identidad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Identificador unívoco de la credencial.
    pub id: Uuid,
    /// Nombre legible asignado al emitir la llave.
    pub name: String,
    /// Hex minúsculo de SHA-256(salt ∥ cuerpo del token).
    pub key_hash: String,
    /// Principal propietario (identidad opaca del dueño).
    pub principal_id: String,
    /// Grupo u organización opcional del principal.
    pub group_id: Option<String>,
    /// Conjunto de permisos. `*` equivale a la totalidad.
    pub permissions: Vec<String>,
    /// Cuota de peticiones por ventana de minuto.
    pub rate_limit_per_minute: u32,
    /// Bandera de revocación administrativa.
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
    /// Última verificación exitosa (actualización best-effort).
    pub last_used_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Determina si la credencial posee el permiso solicitado.
    pub fn has_permission(&self, requested_permission: &str) -> bool {
        self.permissions.iter().any(|granted| {
            granted == WILDCARD_PERMISSION || granted == requested_permission
        })
    }

    /// Determina si la credencial ha superado su fecha de expiración.
    pub fn is_expired(&self, observation_instant: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|expiry| expiry < observation_instant)
            .unwrap_or(false)
    }
}
// FIN DEL ARCHIVO [libs/domain/models/src/credential.rs]
