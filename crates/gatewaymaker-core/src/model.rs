//! Core data model types for gatewaymaker.
//!
//! These are the resolved, read-only inputs of a generation run (questions,
//! fragment files, sets, templates) and its final output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AssemblyError;

/// A single question parsed from a fragment file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Body lines in source order. Never empty.
    pub body: Vec<String>,
    /// Answer text taken from the `%%` marker line, if one followed the body.
    #[serde(default)]
    pub answer: Option<String>,
    /// The fragment file this question came from.
    pub origin_file: PathBuf,
}

impl Question {
    /// The body joined into a single newline-separated string.
    pub fn text(&self) -> String {
        self.body.join("\n")
    }
}

/// A parsed fragment file: its questions share one instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentFile {
    pub path: PathBuf,
    /// Rendered once above every contiguous run of questions from this file.
    pub instruction: String,
    /// Questions in order of appearance in the source.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A named group of fragment files drawn from together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub name: String,
    /// Member files in declaration order.
    pub files: Vec<FragmentFile>,
    /// How many questions to draw from the union of the member files.
    pub draw_count: usize,
    /// Replaces the global page-break policy for this set's questions.
    #[serde(default)]
    pub page_breaks: Option<PageBreakPolicy>,
}

impl QuestionSet {
    /// Total questions across all member files.
    pub fn available(&self) -> usize {
        self.files.iter().map(|f| f.questions.len()).sum()
    }
}

/// Text wrapped around the rendered questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub preamble: String,
    #[serde(default)]
    pub postamble: String,
}

/// How the fragment parser treats suspicious input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Malformed markers become body text; orphan markers are ignored.
    #[default]
    Permissive,
    /// Malformed markers fail with `MalformedFragment`.
    Strict,
}

/// Output document flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// LaTeX `exam`-style document with answer boxes.
    #[default]
    Latex,
    /// Numbered plain text with a `<n>: <answer>` key.
    Plain,
}

impl OutputFormat {
    /// File extension used for generated documents.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Latex => "tex",
            OutputFormat::Plain => "txt",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Latex => write!(f, "latex"),
            OutputFormat::Plain => write!(f, "plain"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latex" | "tex" => Ok(OutputFormat::Latex),
            "plain" | "text" | "txt" => Ok(OutputFormat::Plain),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Where page breaks land in the rendered output.
///
/// Positions are counted in final output order, never from source spacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBreakPolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub rule: PageBreakRule,
}

fn default_true() -> bool {
    true
}

/// The counting rule of a [`PageBreakPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageBreakRule {
    /// Break after every `interval`-th question.
    EveryQuestions { interval: usize },
    /// Break after every `interval`-th instruction block.
    EveryBlocks { interval: usize },
    /// Break after each listed question number (1-based).
    AfterQuestions { positions: Vec<usize> },
}

impl PageBreakPolicy {
    pub fn every_questions(interval: usize) -> Self {
        Self {
            enabled: true,
            rule: PageBreakRule::EveryQuestions { interval },
        }
    }

    pub fn every_blocks(interval: usize) -> Self {
        Self {
            enabled: true,
            rule: PageBreakRule::EveryBlocks { interval },
        }
    }

    pub fn after_questions(positions: Vec<usize>) -> Self {
        Self {
            enabled: true,
            rule: PageBreakRule::AfterQuestions { positions },
        }
    }

    /// Reject intervals of zero.
    pub fn validate(&self) -> Result<(), AssemblyError> {
        match &self.rule {
            PageBreakRule::EveryQuestions { interval: 0 }
            | PageBreakRule::EveryBlocks { interval: 0 } => {
                Err(AssemblyError::InvalidPageBreakPolicy {
                    reason: "interval must be at least 1".into(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether a break follows the `count`-th question (1-based) in scope.
    pub fn breaks_after_question(&self, count: usize) -> bool {
        if !self.enabled {
            return false;
        }
        match &self.rule {
            PageBreakRule::EveryQuestions { interval } => *interval > 0 && count % interval == 0,
            PageBreakRule::AfterQuestions { positions } => positions.contains(&count),
            PageBreakRule::EveryBlocks { .. } => false,
        }
    }

    /// Whether a break follows the `count`-th block (1-based) in scope.
    pub fn breaks_after_block(&self, count: usize) -> bool {
        if !self.enabled {
            return false;
        }
        match &self.rule {
            PageBreakRule::EveryBlocks { interval } => *interval > 0 && count % interval == 0,
            _ => false,
        }
    }
}

/// A fully resolved generation input. The engine never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Sets in declaration order.
    pub sets: Vec<QuestionSet>,
    #[serde(default)]
    pub page_breaks: Option<PageBreakPolicy>,
    #[serde(default)]
    pub template: Template,
    #[serde(default)]
    pub parse_mode: ParseMode,
    #[serde(default)]
    pub format: OutputFormat,
}

/// What one set contributed to a generated test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawSummary {
    pub set: String,
    pub drawn: usize,
    pub available: usize,
    /// Question numbers assigned to this set's draw, in document order.
    pub numbers: Vec<usize>,
}

/// The two rendered outputs of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub test_text: String,
    pub answer_key_text: String,
    /// Seed of the random stream; reusing it reproduces both documents.
    pub seed: u64,
    pub question_count: usize,
    pub draws: Vec<DrawSummary>,
}
