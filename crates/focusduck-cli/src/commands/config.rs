use clap::Subcommand;
use focusduck_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write the default configuration if no file exists
    Init,
    /// Print the configuration file location
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Init => {
            let path = Config::path()?;
            if path.exists() {
                println!("config already exists: {}", path.display());
            } else {
                Config::default().save_to(&path)?;
                println!("wrote defaults to {}", path.display());
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
    }
    Ok(())
}
