//! Calendly MCP stdio server binary.
//!
//! Stdout is reserved for the MCP wire protocol, so all logging goes to
//! stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use calendly_api::{CalendlyClient, CredentialStore};
use calendly_mailer::Mailer;
use calendly_mcp_server::{CalendlyServer, ServerConfig};
use clap::Parser;
use rmcp::{service::ServiceExt, transport::stdio};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "calendly-mcp-server",
    version,
    about = "MCP stdio server exposing Calendly scheduling and invitation tools"
)]
struct Cli {
    /// Print the advertised tool catalogue as JSON and exit.
    #[arg(long)]
    list_tools: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_env().context("invalid configuration")?;

    let store = Arc::new(
        CredentialStore::new(config.credentials).context("failed to build credential store")?,
    );
    let gateway = Arc::new(
        CalendlyClient::new(Arc::clone(&store), config.defaults, None)
            .context("failed to build Calendly client")?,
    );
    let mailer = match config.mailer {
        Some(mailer_config) => Some(Arc::new(
            Mailer::new(mailer_config, config.from_email)
                .context("failed to build email provider")?,
        )),
        None => {
            info!("no EMAIL_PROVIDER configured; email tools disabled");
            None
        }
    };

    let server = CalendlyServer::new(store, gateway, mailer);

    if cli.list_tools {
        println!("{}", serde_json::to_string_pretty(server.tools())?);
        return Ok(());
    }

    info!(tools = server.tools().len(), "starting MCP stdio server");
    let (stdin, stdout) = stdio();
    let running = server
        .serve((stdin, stdout))
        .await
        .context("failed to start MCP stdio server")?;

    let cancel = running.cancellation_token();
    let mut waiting = Box::pin(running.waiting());

    tokio::select! {
        result = &mut waiting => {
            result.context("mcp stdio server exited")?;
        }
        signo = wait_for_signal() => {
            info!(signal = signo, "received shutdown signal");
            cancel.cancel();
            let _ = waiting.await;
            // Conventional exit status for death-by-signal.
            std::process::exit(128 + signo);
        }
    }

    info!("MCP stdio server stopped");
    Ok(())
}

async fn wait_for_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal as unix_signal};
        let Ok(mut sigterm) = unix_signal(SignalKind::terminate()) else {
            let _ = signal::ctrl_c().await;
            return 2;
        };
        tokio::select! {
            _ = signal::ctrl_c() => 2,
            _ = sigterm.recv() => 15,
        }
    }
    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
        2
    }
}
