// [apps/api-gateway/src/middleware.rs]
/*!
 * =================================================================
 * APARATO: PERIMETER GUARDS
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: AUTENTICACIÓN PORTADORA Y CUOTA POR MINUTO
 *
 * # Invariante (Extension Injection):
 * El guardia de autenticación inyecta `AuthenticatedPrincipal` como
 * extensión de la petición; todo handler protegido la consume sin
 * estado ambiental.
 *
 * # Invariante (Metering Exclusions):
 * La cuota se aplica a los endpoints mutantes e iniciadores de
 * cómputo. Quedan exentos: salud, sondeo (GET) y cancelación.
 * =================================================================
 */

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{debug, warn};

use lexia_domain_models::Credential;
use lexia_infra_db::repositories::{CredentialRepository, RateLimitRepository};

use crate::auth::{constant_time_eq, extract_bearer_value};
use crate::errors::ApiError;
use crate::state::AppState;

/// Identidad verificada que viaja como extensión de la petición.
#[derive(Clone)]
pub struct AuthenticatedPrincipal {
    pub credential: Credential,
}

impl AuthenticatedPrincipal {
    pub fn principal_id(&self) -> &str {
        &self.credential.principal_id
    }

    /// Exige el permiso nominal (o el comodín).
    pub fn require_permission(&self, required_permission: &str) -> Result<(), ApiError> {
        if self.credential.has_permission(required_permission) {
            Ok(())
        } else {
            Err(ApiError::InsufficientPermissions)
        }
    }
}

/**
 * Guardia de autenticación: valida el token portador contra el
 * almacén de credenciales e inyecta la identidad verificada.
 *
 * # Logic:
 * 1. Extracción del valor portador (Bearer o desnudo).
 * 2. Validación de forma (prefijo + longitud mínima del cuerpo).
 * 3. Resolución por hash salado + comparación de tiempo constante.
 * 4. Guardias de revocación y expiración.
 * 5. Actualización best-effort de last_used_at.
 */
pub async fn auth_guard(
    State(application_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let presented_token = extract_bearer_value(authorization_header)?;
    application_state.token_forge.validate_shape(presented_token)?;

    let computed_hash = application_state.token_forge.hash_token(presented_token);
    let credential_repository = CredentialRepository::new(application_state.database_client.clone());

    let credential = credential_repository
        .find_by_hash(&computed_hash)
        .await?
        .ok_or_else(|| ApiError::Authentication {
            message: "Invalid API key.".to_string(),
            code: "invalid_api_key",
        })?;

    // Doble candado: la resolución ya usó el índice; la comparación
    // final del hash es de tiempo constante.
    if !constant_time_eq(&credential.key_hash, &computed_hash) {
        return Err(ApiError::Authentication {
            message: "Invalid API key.".to_string(),
            code: "invalid_api_key",
        });
    }

    if credential.is_revoked {
        warn!("⛔ [AUTH_GUARD]: Revoked credential {} presented.", credential.id);
        return Err(ApiError::Authentication {
            message: "API key has been revoked.".to_string(),
            code: "auth_revoked",
        });
    }

    if credential.is_expired(Utc::now()) {
        return Err(ApiError::Authentication {
            message: "API key has expired.".to_string(),
            code: "auth_expired",
        });
    }

    credential_repository.touch_last_used(credential.id).await;

    debug!("🔓 [AUTH_GUARD]: Principal {} authenticated.", credential.principal_id);
    request
        .extensions_mut()
        .insert(AuthenticatedPrincipal { credential });

    Ok(next.run(request).await)
}

/**
 * Guardia de cuota de ventana fija (credencial, minuto unix).
 *
 * El contador vive en el almacén compartido entre instancias; el
 * incremento es una única sentencia atómica. El 429 lleva la pista
 * de reintento en segundos hasta la próxima ventana.
 */
pub async fn rate_limit_guard(
    State(application_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_exempt_from_metering(request.method(), request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let principal = request
        .extensions()
        .get::<AuthenticatedPrincipal>()
        .cloned()
        .ok_or_else(|| ApiError::Internal {
            detail: "rate limit guard reached without authenticated principal".into(),
        })?;

    let current_unix_seconds = Utc::now().timestamp();
    let window_minute = current_unix_seconds / 60;

    let rate_limit_repository = RateLimitRepository::new(application_state.database_client.clone());
    let accumulated_count = rate_limit_repository
        .increment_and_read(&principal.credential.id.to_string(), window_minute)
        .await?;

    let quota = principal.credential.rate_limit_per_minute;
    if accumulated_count > quota {
        let seconds_until_next_window = 60 - (current_unix_seconds % 60) as u64;
        warn!("🚦 [RATE_LIMIT]: Credential {} over quota ({}/{}).",
            principal.credential.id, accumulated_count, quota);
        return Err(ApiError::RateLimitExceeded {
            retry_after_seconds: seconds_until_next_window,
            limit_per_minute: quota,
        });
    }

    Ok(next.run(request).await)
}

/// Exenciones de cuota: sondeos GET y cancelación de trabajos.
fn is_exempt_from_metering(method: &Method, path: &str) -> bool {
    if method == Method::GET {
        return true;
    }
    // Cancelación cooperativa: DELETE /v1/jobs/{id}.
    method == Method::DELETE && path.starts_with("/v1/jobs/")
}
// FIN DEL ARCHIVO [apps/api-gateway/src/middleware.rs]
