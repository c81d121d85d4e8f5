//! Configuration file loading and resolution.
//!
//! The configuration file names the sets, their fragment files and draw
//! counts, the template files and the page-break policy. It can be TOML or
//! JSON; the JSON keys written by earlier gatewaymaker releases
//! (`"question sets"`, `"number of questions"`, ...) are still accepted.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::AssemblyError;
use crate::model::{
    Configuration, OutputFormat, PageBreakPolicy, ParseMode, QuestionSet, Template,
};
use crate::parser::{load_fragment, read_source};

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamConfig {
    /// File whose contents open every test (e.g. the LaTeX header).
    #[serde(default, alias = "test header file path")]
    pub preamble_file: Option<PathBuf>,
    /// File whose contents close every test.
    #[serde(default)]
    pub postamble_file: Option<PathBuf>,
    /// Question sets in the order they appear in the test.
    #[serde(default, alias = "question sets")]
    pub question_sets: Vec<SetConfig>,
    #[serde(default)]
    pub page_breaks: Option<PageBreakPolicy>,
    /// Legacy form of an `after_questions` page-break policy.
    #[serde(default, alias = "page breaks after questions")]
    pub page_breaks_after_questions: Vec<usize>,
    #[serde(default)]
    pub parse_mode: ParseMode,
    #[serde(default)]
    pub format: OutputFormat,
    /// Directory generated tests are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// One question set in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetConfig {
    /// Defaults to `set <n>` (1-based position).
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "number of questions")]
    pub draw_count: usize,
    #[serde(default, alias = "question files")]
    pub files: Vec<FileConfig>,
    #[serde(default)]
    pub page_breaks: Option<PageBreakPolicy>,
}

/// One fragment file reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(alias = "file path")]
    pub path: PathBuf,
    #[serde(default, alias = "instructions")]
    pub instruction: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tests")
}

const LATEX_PREAMBLE: &str = "\\documentclass{exam}\n\\begin{document}\n";
const LATEX_POSTAMBLE: &str = "\\end{document}\n";

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            preamble_file: None,
            postamble_file: None,
            question_sets: Vec::new(),
            page_breaks: None,
            page_breaks_after_questions: Vec::new(),
            parse_mode: ParseMode::default(),
            format: OutputFormat::default(),
            output_dir: default_output_dir(),
        }
    }
}

/// A warning from configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The set name (if applicable).
    pub set: Option<String>,
    /// Warning message.
    pub message: String,
}

impl SetConfig {
    fn display_name(&self, position: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("set {}", position + 1))
    }
}

impl ExamConfig {
    /// The effective global page-break policy.
    pub fn page_break_policy(&self) -> Option<PageBreakPolicy> {
        match &self.page_breaks {
            Some(policy) => Some(policy.clone()),
            None if !self.page_breaks_after_questions.is_empty() => Some(
                PageBreakPolicy::after_questions(self.page_breaks_after_questions.clone()),
            ),
            None => None,
        }
    }

    /// Set names in declaration order, defaults filled in.
    pub fn set_names(&self) -> Vec<String> {
        self.question_sets
            .iter()
            .enumerate()
            .map(|(i, s)| s.display_name(i))
            .collect()
    }

    /// Read templates and fragment files into a resolved [`Configuration`].
    ///
    /// Relative paths are resolved against `base_dir`.
    pub fn resolve(&self, base_dir: &Path) -> Result<Configuration, AssemblyError> {
        let read_optional = |path: &Option<PathBuf>| -> Result<Option<String>, AssemblyError> {
            path.as_ref()
                .map(|p| read_source(&base_dir.join(p)))
                .transpose()
        };

        let template = Template {
            preamble: read_optional(&self.preamble_file)?
                .unwrap_or_else(|| default_preamble(self.format).to_string()),
            postamble: read_optional(&self.postamble_file)?
                .unwrap_or_else(|| default_postamble(self.format).to_string()),
        };

        let sets = self
            .question_sets
            .iter()
            .enumerate()
            .map(|(i, set)| {
                let files = set
                    .files
                    .iter()
                    .map(|f| load_fragment(&base_dir.join(&f.path), &f.instruction, self.parse_mode))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(QuestionSet {
                    name: set.display_name(i),
                    files,
                    draw_count: set.draw_count,
                    page_breaks: set.page_breaks.clone(),
                })
            })
            .collect::<Result<Vec<_>, AssemblyError>>()?;

        Ok(Configuration {
            sets,
            page_breaks: self.page_break_policy(),
            template,
            parse_mode: self.parse_mode,
            format: self.format,
        })
    }

    /// Check the configuration for common issues before touching any file.
    pub fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        // Check for duplicate set names
        let mut seen = HashSet::new();
        for name in self.set_names() {
            if !seen.insert(name.clone()) {
                warnings.push(ValidationWarning {
                    message: format!("duplicate set name: {name}"),
                    set: Some(name),
                });
            }
        }

        for (i, set) in self.question_sets.iter().enumerate() {
            let name = set.display_name(i);
            if set.files.is_empty() {
                warnings.push(ValidationWarning {
                    set: Some(name.clone()),
                    message: "set has no question files".into(),
                });
            }
            if set.draw_count == 0 {
                warnings.push(ValidationWarning {
                    set: Some(name.clone()),
                    message: "draw count is 0, set will be skipped".into(),
                });
            }
            for file in &set.files {
                if file.instruction.trim().is_empty() {
                    warnings.push(ValidationWarning {
                        set: Some(name.clone()),
                        message: format!("no instruction for {}", file.path.display()),
                    });
                }
            }
        }

        if self.page_breaks.is_some() && !self.page_breaks_after_questions.is_empty() {
            warnings.push(ValidationWarning {
                set: None,
                message: "both page_breaks and page_breaks_after_questions are set; \
                          page_breaks_after_questions is ignored"
                    .into(),
            });
        }

        warnings
    }
}

/// Check a resolved configuration against the parsed question pools.
pub fn validate_resolved(config: &Configuration) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for set in &config.sets {
        let available = set.available();
        if set.draw_count > available {
            warnings.push(ValidationWarning {
                set: Some(set.name.clone()),
                message: format!(
                    "draws {} question(s) but only {available} are available",
                    set.draw_count
                ),
            });
        }
        for file in &set.files {
            if file.questions.is_empty() {
                warnings.push(ValidationWarning {
                    set: Some(set.name.clone()),
                    message: format!("{} contains no questions", file.path.display()),
                });
            } else if file
                .questions
                .iter()
                .all(|q| q.answer.is_none() && q.body.len() > 1)
            {
                warnings.push(ValidationWarning {
                    set: Some(set.name.clone()),
                    message: format!(
                        "{}: every question spans several lines and none has an answer; \
                         separate one-line questions with blank lines",
                        file.path.display()
                    ),
                });
            }
        }
    }

    let policies = config
        .page_breaks
        .iter()
        .chain(config.sets.iter().filter_map(|s| s.page_breaks.as_ref()));
    for policy in policies {
        if let Err(e) = policy.validate() {
            warnings.push(ValidationWarning {
                set: None,
                message: e.to_string(),
            });
        }
    }

    warnings
}

fn default_preamble(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Latex => LATEX_PREAMBLE,
        OutputFormat::Plain => "",
    }
}

fn default_postamble(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Latex => LATEX_POSTAMBLE,
        OutputFormat::Plain => "",
    }
}

/// Parse configuration text; JSON when `path` ends in `.json`, TOML otherwise.
pub fn parse_config_str(content: &str, path: &Path) -> Result<ExamConfig> {
    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON config: {}", path.display()))
    } else {
        toml::from_str(content)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))
    }
}

/// Load a configuration file.
pub fn load_config(path: &Path) -> Result<ExamConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_config_str(&content, path)
}

/// Candidate config locations, searched in order.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "gatewaymaker.toml",
    "gatewaymaker.json",
    "configuration/configuration.json",
];

/// Locate the config file: an explicit path, or the first default that exists.
pub fn find_config(path: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = path {
        if p.exists() {
            return Ok(p.to_path_buf());
        }
        anyhow::bail!("config file not found: {}", p.display());
    }

    DEFAULT_CONFIG_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no config file found (looked for {}). Run `gatewaymaker init` to create one.",
                DEFAULT_CONFIG_PATHS.join(", ")
            )
        })
}

/// The directory a config file's relative paths resolve against.
///
/// Usually the file's own directory. In the `configuration/configuration.json`
/// project layout paths are written relative to the project root instead.
pub fn base_dir_for(config_path: &Path) -> PathBuf {
    let dir = config_path.parent().unwrap_or(Path::new(""));
    let legacy_layout = config_path.file_name().is_some_and(|n| n == "configuration.json")
        && dir.file_name().is_some_and(|n| n == "configuration");
    let base = if legacy_layout {
        dir.parent().unwrap_or(Path::new(""))
    } else {
        dir
    };
    base.to_path_buf()
}

/// Load config from an explicit path, or search the default locations.
///
/// Returns the config and the directory its relative paths resolve against.
pub fn load_config_from(path: Option<&Path>) -> Result<(ExamConfig, PathBuf)> {
    let config_path = find_config(path)?;
    let config = load_config(&config_path)?;
    let base_dir = base_dir_for(&config_path);
    tracing::debug!(
        "loaded config {} ({} set(s))",
        config_path.display(),
        config.question_sets.len()
    );
    Ok((config, base_dir))
}
