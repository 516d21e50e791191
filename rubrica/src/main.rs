use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rubrica::api::{create_router, AppState};
use rubrica::cli::{Wizard, WizardNotify};
use rubrica::client::ProxyClient;
use rubrica::config::Config;
use rubrica::models::UserProfile;

#[derive(Parser)]
#[command(name = "rubrica")]
#[command(about = "Rubric authoring assistant backed by an LLM prompt proxy")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the prompt proxy and usage notifier
    Serve,
    /// Build a rubric interactively against a running proxy
    Wizard {
        /// Root URL of the proxy
        #[arg(long, default_value = "http://localhost:3000")]
        api_url: String,
        /// Directory the exported rubric is written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// School name reported in usage notifications
        #[arg(long)]
        school: Option<String>,
        /// Your name, reported in usage notifications
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rubrica=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::Serve => serve().await,
        Command::Wizard {
            api_url,
            out_dir,
            school,
            name,
            email,
        } => {
            let client = ProxyClient::new(api_url)?;
            let profile = match (school, name, email) {
                (None, None, None) => None,
                (school, name, email) => Some(UserProfile {
                    school: school.unwrap_or_default(),
                    name: name.unwrap_or_default(),
                    email: email.unwrap_or_default(),
                }),
            };

            let mut wizard = Wizard::new(
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
                &client,
                out_dir,
            );
            if let Some(profile) = profile {
                wizard = wizard.with_notify(WizardNotify {
                    client: client.clone(),
                    profile,
                });
            }

            wizard.run().await?;
            Ok(())
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = Config::from_env();

    tracing::info!(
        "Initializing LLM provider: {} ({})...",
        config.provider.kind,
        config.provider.model
    );
    if config.provider.api_key.is_none() {
        tracing::warn!(
            "{} is not set - /api/generate will answer 500 until it is configured",
            config.provider.kind.api_key_var()
        );
    }
    if config.notify.webhook_url.is_none() {
        tracing::warn!("SLACK_WEBHOOK_URL is not set - usage notifications will be skipped");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config)?;
    let app = create_router(state);

    tracing::info!("Rubrica starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/health", addr);
    tracing::info!("  API docs:     http://{}/api/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
