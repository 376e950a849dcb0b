use anyhow::Context;
use clap::Parser;
use conversion_import::config::cli::Command;
use conversion_import::server::{self, handler};
use conversion_import::utils::{logger, validation::Validate};
use conversion_import::{AppConfig, AppState, CliConfig, ImportError};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting conversion-import");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AppConfig::from_env().context("failed to read configuration from environment")?,
    };

    if let Command::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let state = Arc::new(AppState::from_config(&config));

    match cli.command {
        Command::Serve { .. } => {
            server::serve(state, &config.socket_addr())
                .await
                .context("HTTP server stopped")?;
        }
        Command::Run { payload } => {
            let body = std::fs::read(&payload)
                .with_context(|| format!("failed to read payload {}", payload.display()))?;

            match handler::run_import(&state, &body).await {
                Ok(response) => {
                    println!("{}", serde_json::to_string(&response)?);
                }
                Err(ImportError::BadRequest {
                    message,
                    payload_keys,
                    expected_keys,
                }) => {
                    let response = handler::FailedResponse {
                        status: "FAILED".to_string(),
                        message,
                        payload_keys,
                        expected_keys,
                    };
                    println!("{}", serde_json::to_string(&response)?);
                    std::process::exit(1);
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Conversion import failed: {} (Category: {:?})",
                        e,
                        e.category()
                    );
                    eprintln!("❌ {}", e);
                    std::process::exit(2);
                }
            }
        }
    }

    Ok(())
}
