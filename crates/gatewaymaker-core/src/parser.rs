//! Fragment file parser.
//!
//! A fragment file is a sequence of question blocks. A block is one or more
//! consecutive non-blank lines and ends at a blank line or at an answer
//! marker line (`%%` after optional leading whitespace), which must directly
//! follow the block's last body line to be attached as its answer. Comment
//! lines (`%`) are dropped; a comment between a body line and a marker
//! detaches the marker from the question.

use std::path::Path;

use crate::error::AssemblyError;
use crate::model::{FragmentFile, ParseMode, Question};

const ANSWER_MARKER: &str = "%%";

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Answer(&'a str),
    Comment,
    Body(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() {
        Line::Blank
    } else if let Some(rest) = line.strip_prefix(ANSWER_MARKER) {
        Line::Answer(rest.trim())
    } else if line.starts_with('%') {
        Line::Comment
    } else {
        Line::Body(line)
    }
}

/// Read a source file, mapping any I/O failure to `SourceUnavailable`.
pub fn read_source(path: &Path) -> Result<String, AssemblyError> {
    std::fs::read_to_string(path).map_err(|source| AssemblyError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a single fragment file.
pub fn load_fragment(
    path: &Path,
    instruction: &str,
    mode: ParseMode,
) -> Result<FragmentFile, AssemblyError> {
    let content = read_source(path)?;
    let questions = parse_fragment_str(&content, path, mode)?;
    tracing::debug!(
        "parsed {} question(s) from {}",
        questions.len(),
        path.display()
    );

    Ok(FragmentFile {
        path: path.to_path_buf(),
        instruction: instruction.to_string(),
        questions,
    })
}

/// Parse fragment text into questions (useful for testing).
///
/// `source_path` becomes each question's `origin_file` and is used in
/// error messages.
pub fn parse_fragment_str(
    content: &str,
    source_path: &Path,
    mode: ParseMode,
) -> Result<Vec<Question>, AssemblyError> {
    let malformed = |line: usize, reason: &str| AssemblyError::MalformedFragment {
        path: source_path.to_path_buf(),
        line,
        reason: reason.to_string(),
    };

    let mut questions = Vec::new();
    let mut body: Vec<String> = Vec::new();
    // A comment seen since the last body line; the next marker is an orphan.
    let mut detached = false;

    let finish = |body: &mut Vec<String>, answer: Option<String>, out: &mut Vec<Question>| {
        if !body.is_empty() {
            out.push(Question {
                body: std::mem::take(body),
                answer,
                origin_file: source_path.to_path_buf(),
            });
        }
    };

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        match classify(raw) {
            Line::Blank => {
                detached = false;
                finish(&mut body, None, &mut questions);
            }
            Line::Comment => detached = !body.is_empty(),
            Line::Answer(text) => {
                if body.is_empty() || detached {
                    if mode == ParseMode::Strict {
                        let reason = if detached {
                            "answer marker is separated from its question by a comment"
                        } else {
                            "answer marker does not follow a question"
                        };
                        return Err(malformed(line_no, reason));
                    }
                    tracing::debug!(
                        "{}:{line_no}: ignoring orphan answer marker",
                        source_path.display()
                    );
                    continue;
                }
                if text.is_empty() && mode == ParseMode::Strict {
                    return Err(malformed(line_no, "answer marker has no answer text"));
                }
                let answer = (!text.is_empty()).then(|| text.to_string());
                finish(&mut body, answer, &mut questions);
            }
            Line::Body(text) => {
                if mode == ParseMode::Strict && text.contains(ANSWER_MARKER) {
                    return Err(malformed(
                        line_no,
                        "answer marker must start its own line",
                    ));
                }
                detached = false;
                body.push(text.to_string());
            }
        }
    }
    finish(&mut body, None, &mut questions);

    Ok(questions)
}
