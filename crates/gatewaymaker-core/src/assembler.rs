//! Document assembly.
//!
//! Merges every set's draw into final document order, groups same-origin
//! questions under one instruction block, numbers questions 1..=total and
//! places page-break markers by output position.

use std::path::Path;

use crate::model::{DrawSummary, PageBreakPolicy, Question, QuestionSet};
use crate::sampler::SampledQuestion;

/// A set together with the questions drawn from it, in draw order.
#[derive(Debug, Clone)]
pub struct SetDraw<'a> {
    pub set: &'a QuestionSet,
    pub samples: Vec<SampledQuestion<'a>>,
}

/// A question with its document-wide number.
#[derive(Debug, Clone, Copy)]
pub struct NumberedQuestion<'a> {
    /// 1-based; the join key between the test and its answer key.
    pub number: usize,
    pub question: &'a Question,
    /// A page break follows this question inside its block.
    pub page_break_after: bool,
}

/// A contiguous run of questions from one fragment file.
#[derive(Debug, Clone)]
pub struct AssembledBlock<'a> {
    pub set_index: usize,
    pub set_name: &'a str,
    pub origin_file: &'a Path,
    pub instruction: &'a str,
    pub questions: Vec<NumberedQuestion<'a>>,
}

#[derive(Debug, Clone)]
pub enum DocumentItem<'a> {
    Block(AssembledBlock<'a>),
    PageBreak,
}

/// The assembled, numbered document, ready for rendering.
#[derive(Debug, Clone, Default)]
pub struct AssembledDocument<'a> {
    pub items: Vec<DocumentItem<'a>>,
    pub question_count: usize,
    pub draws: Vec<DrawSummary>,
}

impl<'a> AssembledDocument<'a> {
    pub fn blocks(&self) -> impl Iterator<Item = &AssembledBlock<'a>> {
        self.items.iter().filter_map(|item| match item {
            DocumentItem::Block(block) => Some(block),
            DocumentItem::PageBreak => None,
        })
    }

    /// Every numbered question in document order.
    pub fn questions(&self) -> impl Iterator<Item = &NumberedQuestion<'a>> {
        self.blocks().flat_map(|block| block.questions.iter())
    }
}

/// Group one set's draw by origin file, ordered by first occurrence.
fn group_by_origin<'a>(
    samples: &[SampledQuestion<'a>],
) -> Vec<(usize, Vec<SampledQuestion<'a>>)> {
    let mut groups: Vec<(usize, Vec<SampledQuestion<'a>>)> = Vec::new();
    for sample in samples {
        match groups.iter_mut().find(|(file, _)| *file == sample.file_index) {
            Some((_, members)) => members.push(*sample),
            None => groups.push((sample.file_index, vec![*sample])),
        }
    }
    groups
}

/// Build the document from every set's draw.
///
/// `page_breaks` is the global policy, counted across the whole document.
/// A set with its own policy counts questions and blocks from its own
/// start instead.
pub fn assemble<'a>(
    draws: &[SetDraw<'a>],
    page_breaks: Option<&PageBreakPolicy>,
) -> AssembledDocument<'a> {
    let mut doc = AssembledDocument::default();
    let mut block_count = 0usize;

    for (set_index, draw) in draws.iter().enumerate() {
        let set = draw.set;
        let (policy, set_relative) = match &set.page_breaks {
            Some(own) => (Some(own), true),
            None => (page_breaks, false),
        };

        let mut set_questions = 0usize;
        let mut set_blocks = 0usize;
        let mut numbers = Vec::with_capacity(draw.samples.len());

        for (file_index, members) in group_by_origin(&draw.samples) {
            let file = &set.files[file_index];
            block_count += 1;
            set_blocks += 1;

            let mut questions = Vec::with_capacity(members.len());
            for sample in members {
                doc.question_count += 1;
                set_questions += 1;
                let count = if set_relative {
                    set_questions
                } else {
                    doc.question_count
                };
                numbers.push(doc.question_count);
                questions.push(NumberedQuestion {
                    number: doc.question_count,
                    question: sample.question,
                    page_break_after: policy.is_some_and(|p| p.breaks_after_question(count)),
                });
            }

            // A break after the block's last question belongs between blocks.
            let mut break_after = questions
                .last_mut()
                .map(|q| std::mem::take(&mut q.page_break_after))
                .unwrap_or(false);
            let blocks = if set_relative { set_blocks } else { block_count };
            break_after |= policy.is_some_and(|p| p.breaks_after_block(blocks));

            doc.items.push(DocumentItem::Block(AssembledBlock {
                set_index,
                set_name: &set.name,
                origin_file: &file.path,
                instruction: &file.instruction,
                questions,
            }));
            if break_after {
                doc.items.push(DocumentItem::PageBreak);
            }
        }

        tracing::debug!(
            "set '{}': {} question(s) in {} block(s)",
            set.name,
            set_questions,
            set_blocks
        );
        doc.draws.push(DrawSummary {
            set: set.name.clone(),
            drawn: set_questions,
            available: set.available(),
            numbers,
        });
    }

    // Never end the document on a blank page.
    while matches!(doc.items.last(), Some(DocumentItem::PageBreak)) {
        doc.items.pop();
    }

    doc
}
