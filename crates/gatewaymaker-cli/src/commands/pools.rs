//! The `gatewaymaker pools` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use gatewaymaker_core::config::load_config_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let (file_config, base_dir) = load_config_from(config_path.as_deref())?;
    let config = file_config
        .resolve(&base_dir)
        .context("failed to load question files")?;

    let mut table = Table::new();
    table.set_header(vec!["Set", "File", "Questions", "Answered", "Draws"]);

    for set in &config.sets {
        for (i, file) in set.files.iter().enumerate() {
            let answered = file.questions.iter().filter(|q| q.answer.is_some()).count();
            let (name, draws) = if i == 0 {
                (set.name.clone(), format!("{}/{}", set.draw_count, set.available()))
            } else {
                (String::new(), String::new())
            };
            table.add_row(vec![
                Cell::new(name),
                Cell::new(file.path.display()),
                Cell::new(file.questions.len()),
                Cell::new(answered),
                Cell::new(draws),
            ]);
        }
    }

    println!("{table}");

    let total: usize = config.sets.iter().map(|s| s.draw_count).sum();
    println!("{total} question(s) per test");

    Ok(())
}
