use blogd::{Application, Config, config::Args, telemetry};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

/// Resolves on Ctrl+C, or on SIGTERM under Unix.
///
/// A listener that cannot be installed is logged and never fires; the other one still does.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        "SIGINT"
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };
    info!(signal = received, "Shutting down, letting in-flight requests finish");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;

    if args.validate {
        println!(
            "Configuration in {} is valid; blogd would listen on {}.",
            args.config,
            config.bind_address()
        );
        return Ok(());
    }

    telemetry::init_telemetry()?;
    info!(config_file = %args.config, bind = %config.bind_address(), "Starting blogd");

    Application::new(config).await?.serve(shutdown_signal()).await
}
