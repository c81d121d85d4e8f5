//! Test and answer-key renderers.
//!
//! Both documents are produced from the same [`AssembledDocument`], so
//! question `n` of the key is always question `n` of the test.

use crate::assembler::{AssembledBlock, AssembledDocument, DocumentItem, NumberedQuestion};
use crate::model::{OutputFormat, Template};

/// Replaced in the preamble and postamble by the version label.
pub const VERSION_PLACEHOLDER: &str = "%%VERSION_NUMBER%%";

/// Serializes an assembled document body. Templates are applied by [`render`].
pub trait DocumentRenderer {
    fn render_test(&self, doc: &AssembledDocument<'_>) -> String;
    fn render_answer_key(&self, doc: &AssembledDocument<'_>) -> String;
}

/// The renderer for an output format.
pub fn renderer_for(format: OutputFormat) -> Box<dyn DocumentRenderer> {
    match format {
        OutputFormat::Latex => Box::new(LatexRenderer::default()),
        OutputFormat::Plain => Box::new(PlainRenderer::default()),
    }
}

/// Render both documents and wrap them in the template.
///
/// Returns `(test_text, answer_key_text)`.
pub fn render(
    renderer: &dyn DocumentRenderer,
    doc: &AssembledDocument<'_>,
    template: &Template,
    version: Option<&str>,
) -> (String, String) {
    let test_label = version.map(str::to_string);
    let key_label = version.map(|v| format!("{v} ANSWER KEY"));

    let test = wrap(template, &renderer.render_test(doc), test_label.as_deref());
    let key = wrap(
        template,
        &renderer.render_answer_key(doc),
        key_label.as_deref(),
    );
    (test, key)
}

fn wrap(template: &Template, body: &str, label: Option<&str>) -> String {
    let fill = |text: &str| match label {
        Some(label) => text.replace(VERSION_PLACEHOLDER, label),
        None => text.to_string(),
    };

    let mut out = String::new();
    let preamble = fill(&template.preamble);
    out.push_str(&preamble);
    if !preamble.is_empty() && !preamble.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(body);
    out.push_str(&fill(&template.postamble));
    out
}

// ---------------------------------------------------------------------------
// Plain text
// ---------------------------------------------------------------------------

/// Numbered plain text. The key lists `<n>: <answer>` for answered
/// questions only.
#[derive(Debug, Clone)]
pub struct PlainRenderer {
    pub page_break: String,
}

impl Default for PlainRenderer {
    fn default() -> Self {
        Self {
            page_break: "\u{c}".to_string(),
        }
    }
}

impl PlainRenderer {
    fn push_question(&self, out: &mut String, q: &NumberedQuestion<'_>) {
        let prefix = format!("{}. ", q.number);
        let indent = " ".repeat(prefix.len());
        for (i, line) in q.question.body.iter().enumerate() {
            out.push_str(if i == 0 { &prefix } else { &indent });
            out.push_str(line);
            out.push('\n');
        }
        if q.page_break_after {
            out.push_str(&self.page_break);
            out.push('\n');
        }
    }
}

impl DocumentRenderer for PlainRenderer {
    fn render_test(&self, doc: &AssembledDocument<'_>) -> String {
        let mut out = String::new();
        for item in &doc.items {
            match item {
                DocumentItem::Block(block) => {
                    out.push_str(block.instruction);
                    out.push('\n');
                    for q in &block.questions {
                        self.push_question(&mut out, q);
                    }
                    out.push('\n');
                }
                DocumentItem::PageBreak => {
                    out.push_str(&self.page_break);
                    out.push('\n');
                }
            }
        }
        out
    }

    fn render_answer_key(&self, doc: &AssembledDocument<'_>) -> String {
        let mut out = String::new();
        for q in doc.questions() {
            if let Some(answer) = &q.question.answer {
                out.push_str(&format!("{}: {}\n", q.number, answer));
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// LaTeX
// ---------------------------------------------------------------------------

const INDENT: &str = "    ";

/// `exam`-class LaTeX: one `questions` environment per block, each question
/// followed by an answer box. The key is the same document with the boxes
/// filled in, so both stay page-aligned; unanswered questions keep an empty
/// box. `\item` numbering continues across environments.
#[derive(Debug, Clone)]
pub struct LatexRenderer {
    pub answer_box_height: String,
    pub answer_box_width: String,
}

impl Default for LatexRenderer {
    fn default() -> Self {
        Self {
            answer_box_height: "1.6cm".to_string(),
            answer_box_width: "3cm".to_string(),
        }
    }
}

impl LatexRenderer {
    fn empty_box(&self) -> String {
        format!(
            "\\begin{{flushright}} \\fbox{{\\rule[0cm]{{0cm}}{{{}}} \\hspace{{{}}} }} \\end{{flushright}}",
            self.answer_box_height, self.answer_box_width
        )
    }

    fn filled_box(&self, answer: &str) -> String {
        format!(
            "\\begin{{flushright}} \\fbox{{\\rule[0cm]{{0cm}}{{0cm}} \\begin{{minipage}}[0pt][{}][c]{{{}}} \\begin{{center}}\n{INDENT}{INDENT}{answer}\n{INDENT}\\end{{center}} \\end{{minipage}}}} \\end{{flushright}}",
            self.answer_box_height, self.answer_box_width
        )
    }

    fn render(&self, doc: &AssembledDocument<'_>, with_answers: bool) -> String {
        let mut out = String::new();
        for item in &doc.items {
            match item {
                DocumentItem::Block(block) => self.push_block(&mut out, block, with_answers),
                DocumentItem::PageBreak => {
                    out.push_str("\\newpage\n\n");
                }
            }
        }
        out
    }

    fn push_block(&self, out: &mut String, block: &AssembledBlock<'_>, with_answers: bool) {
        out.push_str(&format!("\\noindent \\bf{{{}}}\n", block.instruction));
        out.push_str("\\begin{questions}\n");
        for q in &block.questions {
            for (i, line) in q.question.body.iter().enumerate() {
                out.push_str(INDENT);
                if i == 0 {
                    out.push_str("\\item ");
                }
                out.push_str(line);
                out.push('\n');
            }
            out.push_str(INDENT);
            match (&q.question.answer, with_answers) {
                (Some(answer), true) => out.push_str(&self.filled_box(answer)),
                _ => out.push_str(&self.empty_box()),
            }
            out.push('\n');
            if q.page_break_after {
                out.push_str(INDENT);
                out.push_str("\\newpage\n");
            }
        }
        out.push_str("\\end{questions}\n\n");
    }
}

impl DocumentRenderer for LatexRenderer {
    fn render_test(&self, doc: &AssembledDocument<'_>) -> String {
        self.render(doc, false)
    }

    fn render_answer_key(&self, doc: &AssembledDocument<'_>) -> String {
        self.render(doc, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{assemble, SetDraw};
    use crate::model::{PageBreakPolicy, QuestionSet};
    use crate::pool::fixtures::*;
    use crate::sampler::SampledQuestion;

    fn example_set() -> QuestionSet {
        set(
            "S",
            vec![
                file("F1", "Compute.", &[("2+2=?", Some("4")), ("3+3=?", Some("6"))]),
                file("F2", "Factor.", &[("Factor x²-1", None)]),
            ],
            2,
        )
    }

    fn doc_for<'a>(s: &'a QuestionSet, picks: &[(usize, usize)], policy: Option<&PageBreakPolicy>) -> AssembledDocument<'a> {
        let samples = picks
            .iter()
            .map(|&(f, q)| SampledQuestion {
                question: &s.files[f].questions[q],
                set_index: 0,
                file_index: f,
            })
            .collect();
        assemble(&[SetDraw { set: s, samples }], policy)
    }

    #[test]
    fn plain_test_and_key() {
        let s = example_set();
        let doc = doc_for(&s, &[(0, 0), (1, 0)], None);
        let renderer = PlainRenderer::default();

        assert_eq!(
            renderer.render_test(&doc),
            "Compute.\n1. 2+2=?\n\nFactor.\n2. Factor x²-1\n\n"
        );
        assert_eq!(renderer.render_answer_key(&doc), "1: 4\n");
    }

    #[test]
    fn plain_multiline_body_is_aligned() {
        let mut s = example_set();
        s.files[0].questions[0].body = vec!["Add:".into(), "2+2".into()];
        let doc = doc_for(&s, &[(0, 0)], None);
        let text = PlainRenderer::default().render_test(&doc);
        assert!(text.contains("1. Add:\n   2+2\n"));
    }

    #[test]
    fn plain_page_breaks() {
        let s = example_set();
        let policy = PageBreakPolicy::every_blocks(1);
        let doc = doc_for(&s, &[(0, 0), (1, 0)], Some(&policy));
        let text = PlainRenderer::default().render_test(&doc);
        assert_eq!(text.matches('\u{c}').count(), 1);
        assert!(text.find('\u{c}').unwrap() < text.find("Factor.").unwrap());
    }

    #[test]
    fn latex_test_has_empty_boxes_and_key_has_answers() {
        let s = example_set();
        let doc = doc_for(&s, &[(0, 1), (1, 0)], None);
        let renderer = LatexRenderer::default();

        let test = renderer.render_test(&doc);
        assert_eq!(test.matches("\\begin{questions}").count(), 2);
        assert!(test.contains("\\noindent \\bf{Compute.}"));
        assert!(test.contains("\\item 3+3=?"));
        assert!(!test.contains("minipage"));

        let key = renderer.render_answer_key(&doc);
        assert_eq!(key.matches("\\item").count(), 2);
        assert!(key.contains("        6\n"));
        // The unanswered question keeps an empty box.
        assert_eq!(key.matches("\\hspace{3cm}").count(), 1);
    }

    #[test]
    fn latex_inner_page_break_stays_in_environment() {
        let s = example_set();
        let policy = PageBreakPolicy::every_questions(1);
        let doc = doc_for(&s, &[(0, 0), (0, 1)], Some(&policy));
        let test = LatexRenderer::default().render_test(&doc);
        assert_eq!(test.matches("\\newpage").count(), 1);
        let brk = test.find("\\newpage").unwrap();
        assert!(brk < test.find("\\end{questions}").unwrap());
    }

    #[test]
    fn template_wraps_and_fills_version() {
        let s = example_set();
        let doc = doc_for(&s, &[(0, 0)], None);
        let template = Template {
            preamble: "Gateway Exam v%%VERSION_NUMBER%%".into(),
            postamble: "END".into(),
        };
        let (test, key) = render(&PlainRenderer::default(), &doc, &template, Some("3"));
        assert!(test.starts_with("Gateway Exam v3\nCompute.\n"));
        assert!(test.ends_with("END"));
        assert!(key.starts_with("Gateway Exam v3 ANSWER KEY\n1: 4\n"));
    }

    #[test]
    fn template_without_version_is_left_alone() {
        let s = example_set();
        let doc = doc_for(&s, &[(0, 0)], None);
        let template = Template {
            preamble: "v%%VERSION_NUMBER%%\n".into(),
            postamble: String::new(),
        };
        let (test, _) = render(&PlainRenderer::default(), &doc, &template, None);
        assert!(test.starts_with("v%%VERSION_NUMBER%%\n"));
    }
}
