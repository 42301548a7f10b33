use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{get_config_path, AppConfig};
use crate::regime::{Regime, RegimeWeights};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Starter config: default rubric plus an editable regime mixture.
fn starter_config() -> AppConfig {
    AppConfig {
        regime_mixture: Some(
            RegimeWeights::new()
                .with(Regime::PowerConstrainedBoom, 0.35)
                .with(Regime::SecurityArmsRace, 0.35)
                .with(Regime::TrustCollapse, 0.15)
                .with(Regime::HyperCompetition, 0.15),
        ),
        ..AppConfig::default()
    }
}

/// Write the starter config to `path` atomically, creating parent
/// directories as needed.
pub fn write_default_config(path: &Path) -> Result<()> {
    let yaml = serde_saphyr::to_string(&starter_config())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit().context("Failed to save config")?;

    info!(path = %path.display(), "wrote default config");
    Ok(())
}

/// `init` subcommand. Asks before overwriting unless `force` is set.
pub fn run_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if config_path.exists() && !force {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    write_default_config(&config_path)?;
    println!("Config written to {}", config_path.display());
    println!("Edit the regime mixture to match your view, then run `regime-rubric score`.");
    Ok(())
}
