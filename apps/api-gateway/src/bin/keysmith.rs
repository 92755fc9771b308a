// [apps/api-gateway/src/bin/keysmith.rs]
/*!
 * =================================================================
 * APARATO: KEYSMITH BOOTSTRAP CLI
 * CLASIFICACIÓN: OPERATIONS TOOLING (ESTRATO L3)
 * RESPONSABILIDAD: EMISIÓN FUERA DE BANDA DE LA PRIMERA CREDENCIAL
 *
 * La superficie HTTP de gestión de llaves exige una credencial con
 * `keys:manage`; este binario rompe el círculo emitiendo la primera
 * llave directamente contra el Ledger. El token en claro se imprime
 * una única vez.
 * =================================================================
 */

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use uuid::Uuid;

use lexia_api_gateway::auth::TokenForge;
use lexia_domain_models::Credential;
use lexia_infra_db::repositories::CredentialRepository;
use lexia_infra_db::DatabaseClient;
use lexia_shared_telemetry::init_tracing;

/**
 * Directivas de la forja de llaves.
 */
#[derive(Parser, Debug)]
#[command(
    author = "Lexia Platform Team",
    version,
    about = "Lexia Keysmith // Out-of-band credential bootstrap"
)]
struct KeysmithDirectives {
    /// Nombre legible de la credencial.
    #[arg(long)]
    name: String,

    /// Principal propietario de la credencial.
    #[arg(long)]
    principal: String,

    /// Permisos separados por coma; `*` concede la totalidad.
    #[arg(long, default_value = "*")]
    permissions: String,

    /// Cuota de peticiones por minuto.
    #[arg(long, default_value_t = 60)]
    quota: u32,

    /// Grupo u organización opcional.
    #[arg(long)]
    group: Option<String>,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long, env = "DATABASE_AUTH_TOKEN")]
    database_auth_token: Option<String>,

    #[arg(long, env = "API_KEY_SALT")]
    api_key_salt: String,

    #[arg(long, env = "API_KEY_PREFIX", default_value = "lx_")]
    api_key_prefix: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("lexia_keysmith");

    let directives = KeysmithDirectives::parse();

    // 1. ENLACE CON EL LEDGER
    let database_client =
        DatabaseClient::connect(&directives.database_url, directives.database_auth_token.clone())
            .await
            .context("KEYSMITH_FAULT: Database link collapse.")?;

    // 2. FORJA Y SELLADO DE LA CREDENCIAL
    let token_forge = TokenForge::new(directives.api_key_salt.clone(), directives.api_key_prefix.clone());
    let plaintext_token = token_forge.generate_token();

    let credential = Credential {
        id: Uuid::new_v4(),
        name: directives.name.clone(),
        key_hash: token_forge.hash_token(&plaintext_token),
        principal_id: directives.principal.clone(),
        group_id: directives.group.clone(),
        permissions: directives
            .permissions
            .split(',')
            .map(|permission| permission.trim().to_string())
            .filter(|permission| !permission.is_empty())
            .collect(),
        rate_limit_per_minute: directives.quota,
        is_revoked: false,
        created_at: Utc::now(),
        last_used_at: None,
        expires_at: None,
    };

    let credential_repository = CredentialRepository::new(database_client);
    credential_repository
        .insert(&credential)
        .await
        .context("KEYSMITH_FAULT: Credential insert rejected.")?;

    // 3. ENTREGA ÚNICA DEL TOKEN EN CLARO
    println!("Credential id : {}", credential.id);
    println!("Principal     : {}", credential.principal_id);
    println!("API key       : {}", plaintext_token);
    println!("Save this token now. It will not be shown again.");

    Ok(())
}
