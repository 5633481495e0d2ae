//! Backend entry-point: loads settings, wires services and serves HTTP.

mod server;

use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use postnest::inbound::http::session_config::{BuildMode, SessionInputs, session_settings};
use postnest::settings::AppSettings;
use server::{ServerConfig, ServiceSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let config = server_config(&settings)?;

    create_server(config)
        .wrap_err("failed to start HTTP server")?
        .await
        .wrap_err("HTTP server stopped with an error")
}

fn server_config(settings: &AppSettings) -> Result<ServerConfig> {
    let session = session_settings(
        &SessionInputs {
            key_file: settings.session_key_file.as_deref(),
            cookie_secure: settings.cookie_secure,
            same_site: settings.cookie_same_site(),
        },
        BuildMode::from_debug_assertions(),
    )?;
    let services = ServiceSettings::new(
        settings.uploads_dir().to_path_buf(),
        settings.page_size()?,
        settings.session_ttl()?,
        settings.reset_link_base()?,
    )
    .with_reset_token_ttl(settings.reset_token_ttl()?)
    .with_hash_cost(settings.hash_cost());

    Ok(ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr()?,
        services,
    ))
}
