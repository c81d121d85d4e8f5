//! Per-set question pools.

use crate::model::{Question, QuestionSet};

/// One draw candidate: a question plus the index of its file in the set.
#[derive(Debug, Clone, Copy)]
pub struct PoolEntry<'a> {
    pub question: &'a Question,
    pub file_index: usize,
}

/// The combined questions of every file in one set.
///
/// Pool order is file declaration order, then source order within a file.
/// Identical question text in two files yields two distinct entries.
#[derive(Debug, Clone)]
pub struct SetPool<'a> {
    pub set: &'a QuestionSet,
    pub entries: Vec<PoolEntry<'a>>,
}

impl<'a> SetPool<'a> {
    pub fn build(set: &'a QuestionSet) -> Self {
        let entries = set
            .files
            .iter()
            .enumerate()
            .flat_map(|(file_index, file)| {
                file.questions
                    .iter()
                    .map(move |question| PoolEntry {
                        question,
                        file_index,
                    })
            })
            .collect();

        Self { set, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.set.name
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::PathBuf;

    use crate::model::{FragmentFile, Question, QuestionSet};

    pub fn question(origin: &str, text: &str, answer: Option<&str>) -> Question {
        Question {
            body: vec![text.to_string()],
            answer: answer.map(str::to_string),
            origin_file: PathBuf::from(origin),
        }
    }

    pub fn file(path: &str, instruction: &str, questions: &[(&str, Option<&str>)]) -> FragmentFile {
        FragmentFile {
            path: PathBuf::from(path),
            instruction: instruction.to_string(),
            questions: questions
                .iter()
                .map(|(text, answer)| question(path, text, *answer))
                .collect(),
        }
    }

    pub fn set(name: &str, files: Vec<FragmentFile>, draw_count: usize) -> QuestionSet {
        QuestionSet {
            name: name.to_string(),
            files,
            draw_count,
            page_breaks: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn pool_concatenates_files_in_declaration_order() {
        let s = set(
            "arithmetic",
            vec![
                file("f1.tex", "Compute.", &[("2+2=?", Some("4")), ("3+3=?", Some("6"))]),
                file("f2.tex", "Factor.", &[("Factor x^2-1", None)]),
            ],
            2,
        );
        let pool = SetPool::build(&s);

        assert_eq!(pool.len(), 3);
        let texts: Vec<String> = pool.entries.iter().map(|e| e.question.text()).collect();
        assert_eq!(texts, vec!["2+2=?", "3+3=?", "Factor x^2-1"]);
        assert_eq!(pool.entries[2].file_index, 1);
    }

    #[test]
    fn duplicate_text_is_not_deduplicated() {
        let s = set(
            "dupes",
            vec![
                file("a.tex", "A", &[("same", None)]),
                file("b.tex", "B", &[("same", None)]),
            ],
            2,
        );
        let pool = SetPool::build(&s);
        assert_eq!(pool.len(), 2);
        assert_ne!(
            pool.entries[0].question.origin_file,
            pool.entries[1].question.origin_file
        );
    }

    #[test]
    fn empty_files_contribute_nothing() {
        let s = set("empty", vec![file("e.tex", "E", &[])], 0);
        assert!(SetPool::build(&s).is_empty());
    }
}
