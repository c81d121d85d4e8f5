//! The `gatewaymaker generate` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use gatewaymaker_core::config::load_config_from;
use gatewaymaker_core::model::{DrawSummary, GeneratedDocument, OutputFormat};
use gatewaymaker_core::{EngineOptions, ExamEngine};

/// Sidecar written next to each generated test.
#[derive(Debug, Serialize)]
struct RunManifest<'a> {
    id: Uuid,
    created_at: DateTime<Utc>,
    version: usize,
    seed: u64,
    format: OutputFormat,
    question_count: usize,
    test_file: String,
    answer_key_file: String,
    draws: &'a [DrawSummary],
}

fn test_path(dir: &Path, number: usize, ext: &str) -> PathBuf {
    dir.join(format!("test_{number}.{ext}"))
}

fn answer_key_path(dir: &Path, number: usize, ext: &str) -> PathBuf {
    dir.join(format!("test_{number}_answers.{ext}"))
}

/// The first test number for which neither the test nor its key exists.
fn next_test_number(dir: &Path, ext: &str) -> usize {
    (1..)
        .find(|&n| !test_path(dir, n, ext).exists() && !answer_key_path(dir, n, ext).exists())
        .unwrap_or(1)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Write the test, its key and the manifest. A failed write removes
/// whatever this call already wrote, so no number is left half used.
fn write_outputs(
    dir: &Path,
    number: usize,
    format: OutputFormat,
    doc: &GeneratedDocument,
) -> Result<(PathBuf, PathBuf)> {
    let ext = format.extension();
    let test = test_path(dir, number, ext);
    let key = answer_key_path(dir, number, ext);
    let manifest_path = dir.join(format!("test_{number}.json"));

    let manifest = RunManifest {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        version: number,
        seed: doc.seed,
        format,
        question_count: doc.question_count,
        test_file: file_name(&test),
        answer_key_file: file_name(&key),
        draws: &doc.draws,
    };
    let json = serde_json::to_string_pretty(&manifest).context("failed to serialize manifest")?;

    let files = [
        (&test, doc.test_text.as_str(), "test"),
        (&key, doc.answer_key_text.as_str(), "answer key"),
        (&manifest_path, json.as_str(), "manifest"),
    ];
    for (i, (path, content, what)) in files.iter().enumerate() {
        if let Err(e) = std::fs::write(path, content) {
            for (written, _, _) in &files[..i] {
                if let Err(cleanup) = std::fs::remove_file(written) {
                    tracing::warn!("could not remove {}: {cleanup}", written.display());
                }
            }
            return Err(e).with_context(|| format!("failed to write {what} to {}", path.display()));
        }
    }

    Ok((test, key))
}

pub fn execute(
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    count: usize,
    output: Option<PathBuf>,
    format: Option<String>,
) -> Result<()> {
    anyhow::ensure!(count >= 1, "count must be at least 1");

    let (mut file_config, base_dir) = load_config_from(config_path.as_deref())?;
    if let Some(f) = &format {
        file_config.format = f.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
    }
    let config = file_config
        .resolve(&base_dir)
        .context("failed to load question files")?;

    let output_dir = output.unwrap_or_else(|| base_dir.join(&file_config.output_dir));
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "problem with the output directory at {}; check permissions or that there \
             isn't a file with the same name",
            output_dir.display()
        )
    })?;

    for i in 0..count {
        let number = next_test_number(&output_dir, config.format.extension());
        let engine = ExamEngine::new(EngineOptions {
            seed: seed.map(|s| s.wrapping_add(i as u64)),
            version: Some(number.to_string()),
        });
        let doc = engine
            .generate(&config)
            .with_context(|| format!("failed to generate test {number}"))?;

        let (test, key) = write_outputs(&output_dir, number, config.format, &doc)?;
        tracing::info!("test {number}: seed {}", doc.seed);
        println!(
            "Created {} and {} ({} questions, seed {})",
            test.display(),
            key.display(),
            doc.question_count,
            doc.seed
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_number_skips_existing_tests_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(next_test_number(dir.path(), "tex"), 1);

        std::fs::write(dir.path().join("test_1.tex"), "").unwrap();
        std::fs::write(dir.path().join("test_2_answers.tex"), "").unwrap();
        assert_eq!(next_test_number(dir.path(), "tex"), 3);
        assert_eq!(next_test_number(dir.path(), "txt"), 1);
    }

    fn document() -> GeneratedDocument {
        GeneratedDocument {
            test_text: "1. 2+2=?\n".into(),
            answer_key_text: "1: 4\n".into(),
            seed: 7,
            question_count: 1,
            draws: vec![],
        }
    }

    #[test]
    fn write_outputs_creates_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let (test, key) = write_outputs(dir.path(), 1, OutputFormat::Plain, &document()).unwrap();
        assert_eq!(std::fs::read_to_string(test).unwrap(), "1. 2+2=?\n");
        assert_eq!(std::fs::read_to_string(key).unwrap(), "1: 4\n");
        assert!(dir.path().join("test_1.json").exists());
    }

    #[test]
    fn failed_manifest_write_removes_test_and_key() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the manifest's place makes its write fail.
        std::fs::create_dir(dir.path().join("test_1.json")).unwrap();

        let err = write_outputs(dir.path(), 1, OutputFormat::Plain, &document()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to write manifest"));
        assert!(!dir.path().join("test_1.txt").exists());
        assert!(!dir.path().join("test_1_answers.txt").exists());
        assert_eq!(next_test_number(dir.path(), "txt"), 1);
    }
}
