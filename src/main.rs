use anyhow::Result;
use clap::Parser;
use crash_escalator::{
    app,
    cli::{
        handle_config_command, handle_recording_command, handle_transcript_command, Cli, CliCommand,
    },
    config::Config,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Some(CliCommand::Version) = cli.command {
        println!("crash-escalator {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Some(CliCommand::Recording(args)) => handle_recording_command(args, &config).await,
        Some(CliCommand::Transcript(args)) => handle_transcript_command(args, &config).await,
        Some(CliCommand::Config) => handle_config_command(&config),
        Some(CliCommand::Serve(args)) => {
            if let Some(port) = args.port {
                config.server.port = port;
            }
            app::run_service(config).await
        }
        Some(CliCommand::Version) | None => app::run_service(config).await,
    }
}
