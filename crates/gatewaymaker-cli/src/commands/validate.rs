//! The `gatewaymaker validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gatewaymaker_core::config::{load_config_from, validate_resolved, ValidationWarning};

fn print_warnings(warnings: &[ValidationWarning]) {
    for w in warnings {
        let prefix = w
            .set
            .as_ref()
            .map(|name| format!("  [{name}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }
}

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let (file_config, base_dir) = load_config_from(config_path.as_deref())?;

    let mut warnings = file_config.validate();
    let config = file_config
        .resolve(&base_dir)
        .context("failed to load question files")?;
    warnings.extend(validate_resolved(&config));

    for set in &config.sets {
        println!(
            "Set: {} ({} files, {} questions, draws {})",
            set.name,
            set.files.len(),
            set.available(),
            set.draw_count
        );
    }
    print_warnings(&warnings);

    let short = config
        .sets
        .iter()
        .filter(|s| s.draw_count > s.available())
        .count();
    anyhow::ensure!(
        short == 0,
        "{short} set(s) have fewer questions than they draw"
    );

    if warnings.is_empty() {
        println!("Configuration valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
