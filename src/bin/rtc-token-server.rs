use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rtc_token_server::config::proc_loader;
use rtc_token_server::server;
use rtc_token_server::utils::logging::LogLevel;
use rtc_token_server::AccessTokenSigner;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional YAML settings file
    #[arg(short, long, env = "CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Application id embedded in every token
    #[arg(long, env = "APP_ID")]
    app_id: Option<String>,
    /// Application certificate used as the signing key
    #[arg(long, env = "APP_CERTIFICATE", hide_env_values = true)]
    app_certificate: Option<String>,
    /// Overrides settings.server.port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -------------------------------
    // 1. Load settings and logging
    // -------------------------------

    let mut service_config =
        proc_loader::load_and_init_logging(args.config.as_deref(), args.log_level).await?;
    if let Some(port) = args.port {
        service_config.settings.server.port = port.to_string();
    }

    // -------------------------------
    // 2. Check credentials, then serve token routes
    // -------------------------------

    server::server::run(
        &service_config.settings,
        args.app_id,
        args.app_certificate,
        Arc::new(AccessTokenSigner::new()),
    )
    .await
}
