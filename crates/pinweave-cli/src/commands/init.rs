//! Initialize a new pinweave project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{Config, CONFIG_FILE};

pub const SAMPLE_BLUEPRINT: &str = "circuit.toml";

const SAMPLE: &str = r#"# A relay feeding a state cell.
name = "sample"

[[nodes]]
name = "input"
kind = "relay"

[[nodes]]
name = "memory"
kind = "state"
initial = 0

[[wires]]
from = "input.out"
to = "memory.value"
"#;

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing pinweave project...", "→".blue());
    scaffold(&base_path)?;

    println!();
    println!("{} Pinweave project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} pinweave inspect {}", "1.".blue(), SAMPLE_BLUEPRINT);
    println!(
        "  {} pinweave run {} --send input.in=42",
        "2.".blue(),
        SAMPLE_BLUEPRINT
    );

    Ok(())
}

/// Write the default config and a sample blueprint, keeping existing files.
pub fn scaffold(base_path: &Path) -> Result<()> {
    debug!(path = %base_path.display(), "scaffolding project");
    std::fs::create_dir_all(base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config_path = base_path.join(CONFIG_FILE);
    if !config_path.exists() {
        Config::default().save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    let blueprint_path = base_path.join(SAMPLE_BLUEPRINT);
    if !blueprint_path.exists() {
        std::fs::write(&blueprint_path, SAMPLE)
            .with_context(|| format!("Failed to write {}", blueprint_path.display()))?;
        println!("  {} Created {}", "✓".green(), blueprint_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), blueprint_path.display());
    }

    Ok(())
}
