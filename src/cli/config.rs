use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::error::{PainelError, Result};
use crate::settings::{load_settings, read_settings, save_settings, settings_path};

pub fn run(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&load_settings())
                .map_err(|e| PainelError::Settings(e.to_string()))?;
            println!("{json}");
        }
        ConfigCommands::Path => println!("{}", settings_path().display()),
        ConfigCommands::Set { key, value } => {
            let mut settings = read_settings()?;
            settings.set_key(&key, &value)?;
            save_settings(&settings)?;
            println!("{} {key} = {value}", "Saved".green());
        }
    }
    Ok(())
}
