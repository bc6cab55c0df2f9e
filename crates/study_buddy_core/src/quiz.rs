//! crates/study_buddy_core/src/quiz.rs
//!
//! Quiz generation: a random sample of the document's chunks goes to the
//! model, and the reply is parsed and validated against the `Quiz` schema
//! before anyone sees it.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::domain::Quiz;
use crate::error::{CoreError, CoreResult};
use crate::ports::{IndexStore, LanguageModelService, StudyStore};
use crate::prompts::QUIZ_INSTRUCTIONS;

/// How many chunks (in storage order) are eligible for sampling.
const SAMPLE_CHUNKS: usize = 100;
/// How many of those are actually sent to the model.
const QUIZ_CHUNKS: usize = 20;
/// Every quiz has exactly this many questions.
const QUESTIONS_PER_QUIZ: usize = 5;

pub struct QuizGenerator {
    store: Arc<dyn StudyStore>,
    model: Arc<dyn LanguageModelService>,
    index_store: Arc<dyn IndexStore>,
}

impl QuizGenerator {
    pub fn new(
        store: Arc<dyn StudyStore>,
        model: Arc<dyn LanguageModelService>,
        index_store: Arc<dyn IndexStore>,
    ) -> Self {
        Self {
            store,
            model,
            index_store,
        }
    }

    /// Generates a validated five-question quiz for a document.
    ///
    /// The source material is a uniform-random subset of up to twenty of the
    /// document's first hundred chunks. Passing a `seed` makes the sampling
    /// reproducible; `None` draws from entropy.
    pub async fn generate(&self, document_id: i64, seed: Option<u64>) -> CoreResult<Quiz> {
        let document = self.store.get_document(document_id).await?;
        let index = self.index_store.load(document.id).await?;

        let mut chunks = index.chunks(SAMPLE_CHUNKS);
        if chunks.is_empty() {
            return Err(CoreError::NoContent);
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        chunks.shuffle(&mut rng);
        chunks.truncate(QUIZ_CHUNKS);
        let source = chunks.join(" ");

        let reply = self.model.complete(QUIZ_INSTRUCTIONS, &source).await?;
        let quiz = parse_quiz(&reply)?;

        info!(
            "Generated quiz for document {} from {} chunks",
            document.id,
            chunks.len()
        );
        Ok(quiz)
    }
}

/// Parses and validates a model reply into a `Quiz`. Markdown code fences
/// around the JSON are tolerated; everything else about the schema is strict.
pub fn parse_quiz(reply: &str) -> CoreResult<Quiz> {
    let cleaned = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let quiz: Quiz = serde_json::from_str(cleaned)
        .map_err(|e| CoreError::GenerationFormat(format!("quiz reply was not valid JSON: {}", e)))?;

    if quiz.questions.len() != QUESTIONS_PER_QUIZ {
        return Err(CoreError::GenerationFormat(format!(
            "expected {} questions, got {}",
            QUESTIONS_PER_QUIZ,
            quiz.questions.len()
        )));
    }

    for (i, question) in quiz.questions.iter().enumerate() {
        if question.options.is_empty() {
            return Err(CoreError::GenerationFormat(format!(
                "question {} has no options",
                i + 1
            )));
        }
        if !question.options.contains(&question.correct_answer) {
            return Err(CoreError::GenerationFormat(format!(
                "question {} has a correct_answer that is not one of its options",
                i + 1
            )));
        }
    }

    Ok(quiz)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz_json(correct: &str) -> String {
        let question = format!(
            r#"{{"question": "Q?", "options": ["a", "b", "c", "d"], "correct_answer": "{}", "explanation": "because"}}"#,
            correct
        );
        format!(
            r#"{{"questions": [{q}, {q}, {q}, {q}, {q}]}}"#,
            q = question
        )
    }

    #[test]
    fn accepts_a_valid_quiz() {
        let quiz = parse_quiz(&quiz_json("b")).unwrap();
        assert_eq!(quiz.questions.len(), 5);
        assert_eq!(quiz.questions[0].correct_answer, "b");
    }

    #[test]
    fn accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", quiz_json("a"));
        assert!(parse_quiz(&fenced).is_ok());
    }

    #[test]
    fn rejects_unparseable_replies() {
        let err = parse_quiz("Sure! Here is your quiz:").unwrap_err();
        assert!(matches!(err, CoreError::GenerationFormat(_)));
    }

    #[test]
    fn rejects_wrong_question_count() {
        let err = parse_quiz(r#"{"questions": []}"#).unwrap_err();
        assert!(matches!(err, CoreError::GenerationFormat(_)));
    }

    #[test]
    fn rejects_correct_answer_outside_options() {
        let err = parse_quiz(&quiz_json("not an option")).unwrap_err();
        assert!(matches!(err, CoreError::GenerationFormat(_)));
    }
}
