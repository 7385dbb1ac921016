//! Settings command implementation

use crate::cli::args::{OutputFormat, SettingsArgs, SettingsCommands};
use crate::cli::output::{print_output, Message, SettingsList};
use crate::config::Config;
use crate::error::Result;
use crate::services::Settings;

/// Execute settings commands
pub fn run_settings(args: &SettingsArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let mut settings = Settings::load(&config.home_dir()?)?;

    match &args.command {
        SettingsCommands::Get { name } => {
            let mut entries = settings.entries();
            if let Some(name) = name {
                settings.get(name)?;
                entries.retain(|e| &e.name == name);
            }
            print_output(&SettingsList { settings: entries }, format)?;
        }
        SettingsCommands::Set { name, value } => {
            let parsed = settings.set(name, value)?;
            let msg = Message {
                message: format!("The new value for the setting '{}' has been set: {}", name, parsed),
                success: true,
            };
            print_output(&msg, format)?;
        }
        SettingsCommands::Reset => {
            settings.reset()?;
            let msg = Message {
                message: "The settings have been reset".to_string(),
                success: true,
            };
            print_output(&msg, format)?;
        }
    }

    Ok(())
}
