use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crash-escalator")]
#[command(about = "Escalate recorded calls that match the System Crash model", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ~/.config/crash-escalator/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the webhook server (default)
    Serve(ServeCliArgs),
    /// Run the recording gate once against a JSON recording callback
    Recording(EventCliArgs),
    /// Run the transcript evaluator once against a JSON transcript event
    Transcript(EventCliArgs),
    /// Print the effective configuration with secrets masked
    Config,
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug, Default)]
pub struct ServeCliArgs {
    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug)]
pub struct EventCliArgs {
    /// Path to the event JSON, or `-` for stdin
    pub event: PathBuf,
}
