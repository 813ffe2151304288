pub mod args;
pub mod invoke;

pub use args::{Cli, CliCommand};
pub use invoke::{handle_recording_command, handle_transcript_command};

use crate::config::Config;
use anyhow::Result;

pub fn handle_config_command(config: &Config) -> Result<()> {
    print!("{}", toml::to_string_pretty(&config.redacted())?);

    if let Err(err) = config.validate() {
        println!("\n# not ready to serve: {err}");
    }
    Ok(())
}
