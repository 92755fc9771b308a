// [libs/shared/telemetry/src/lib.rs]
/*!
 * =================================================================
 * APARATO: LEXIA TELEMETRY OBSERVER
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4/L6)
 * RESPONSABILIDAD: GESTIÓN DE TELEMETRÍA, TRAZADO Y CAPTURA DE PÁNICOS
 *
 * # Invariante (Observability Integrity):
 * La arquitectura de registro no bloqueante garantiza que el rastro
 * de ejecución se preserve incluso ante una terminación abrupta de
 * un worker de inferencia de larga duración.
 * =================================================================
 */

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as formatting_layer, EnvFilter};
use tracing::{error, info};
use std::panic;

/// Inicializa el sistema de trazas Lexia con blindaje de pánicos.
///
/// # Comportamiento:
/// - Desarrollo: Logs interactivos compactos con marcas de tiempo locales.
/// - Producción: Estructura JSON plana optimizada para ingesta externa.
///
/// La variable `LOG_LEVEL` (o `RUST_LOG` estándar) gobierna el filtro.
///
/// # Errors:
/// Retorna pánico si otro suscriptor global ya ha sido inicializado.
pub fn init_tracing(service_nominal_identifier: &str) {
    // 1. CONFIGURACIÓN DEL FILTRO DINÁMICO
    // Priorizamos los logs de nuestro dominio y silenciamos ruidos de
    // infraestructura (Tower, Hyper, libSQL).
    let configured_level = std::env::var("LOG_LEVEL")
        .ok()
        .filter(|level| !level.is_empty());

    let environmental_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let effective_level = configured_level.unwrap_or_else(|| {
                if cfg!(debug_assertions) { "debug".into() } else { "info".into() }
            });
            format!(
                "{service}={level},lexia={level},tower_http=warn,hyper=warn,libsql=error",
                service = service_nominal_identifier,
                level = effective_level
            ).into()
        });

    let is_production_strata = !cfg!(debug_assertions);

    // 2. CONSTRUCCIÓN DE LA ARQUITECTURA DE SUSCRIPCIÓN (Dual Mode)
    if is_production_strata {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().json().flatten_event(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().compact().with_target(false))
            .init();
    }

    // 3. GLOBAL PANIC HOOK
    // Garantiza que cualquier colapso en tareas secundarias (pipeline de
    // inferencia, courier de webhooks) sea registrado antes de la
    // defunción del hilo.
    let service_id_snapshot = service_nominal_identifier.to_string();

    panic::set_hook(Box::new(move |panic_metadata| {
        let panic_location = panic_metadata.location()
            .map(|location| format!("{}:{}:{}", location.file(), location.line(), location.column()))
            .unwrap_or_else(|| "UNKNOWN_LOCATION".to_string());

        let panic_payload_message = panic_metadata.payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_metadata.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("UNDEFINED_PANIC_PAYLOAD");

        error!(
            target: "panic_monitor",
            service = %service_id_snapshot,
            location = %panic_location,
            "🔥 [CRITICAL_PANIC]: Thread terminated abruptly. Analysis: {}",
            panic_payload_message
        );
    }));

    info!(
        "👁️  [TELEMETRY_ONLINE]: Observability strata levelized for [{}].",
        service_nominal_identifier
    );
}
// FIN DEL ARCHIVO [libs/shared/telemetry/src/lib.rs]
