use anyhow::{bail, Result};

use scenestage_core::AppConfig;

/// Print the effective configuration, or write the defaults to disk
pub fn run(config: &AppConfig, init: bool, force: bool) -> Result<()> {
    let path = AppConfig::config_path();

    if !init {
        println!("# {}", path.display());
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    AppConfig::default().save()?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
