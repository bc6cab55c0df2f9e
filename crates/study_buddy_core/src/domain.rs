//! crates/study_buddy_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework; the only
//! serde derives here are on the generated-output schemas that cross the
//! language model boundary as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a study document uploaded by a user.
///
/// A document owns its chat history, quiz attempts, flashcard sets and the
/// on-disk vector index; deleting it removes all of them.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// The speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    Human,
    Ai,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::Human => "human",
            ChatRole::Ai => "ai",
        }
    }

    pub fn parse(s: &str) -> Option<ChatRole> {
        match s {
            "human" => Some(ChatRole::Human),
            "ai" => Some(ChatRole::Ai),
            _ => None,
        }
    }
}

/// A single stored message in a document's conversation.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: i64,
    pub document_id: i64,
    pub role: ChatRole,
    pub content: String,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// An in-flight conversation turn supplied by the client with a question.
/// Unlike `ChatMessage` it has no identity; it is context, not a record.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

//=========================================================================================
// Generated-Output Schemas (LLM JSON contracts)
//=========================================================================================

/// One multiple-choice question as produced by the model.
/// `correct_answer` must match one of `options` exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

/// A validated, generated quiz. Always exactly five questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

/// One term/definition pair as produced by the model, before it is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDraft {
    pub term: String,
    pub definition: String,
}

/// The model's full flashcard reply. Always exactly ten cards once validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardDrafts {
    pub flashcards: Vec<CardDraft>,
}

//=========================================================================================
// Stored Study Aids
//=========================================================================================

/// A stored flashcard set together with its cards.
#[derive(Debug, Clone)]
pub struct FlashcardSet {
    pub id: i64,
    pub document_id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub cards: Vec<Flashcard>,
}

#[derive(Debug, Clone)]
pub struct Flashcard {
    pub id: i64,
    pub set_id: i64,
    pub term: String,
    pub definition: String,
}

/// A graded quiz attempt submitted by a user, with its per-question answers.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    pub id: i64,
    pub document_id: i64,
    pub user_id: i64,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub answers: Vec<QuizAnswer>,
}

#[derive(Debug, Clone)]
pub struct QuizAnswer {
    pub id: i64,
    pub question_text: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

// The answer payload as submitted, before the database assigns IDs.
#[derive(Debug, Clone)]
pub struct NewQuizAnswer {
    pub question_text: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Aggregated quiz performance for one user on one document.
#[derive(Debug, Clone)]
pub struct ProgressReport {
    pub total_quizzes_taken: i64,
    pub average_score: Option<f64>,
    pub highest_score: Option<f64>,
    pub scores_over_time: Vec<ScorePoint>,
}

#[derive(Debug, Clone)]
pub struct ScorePoint {
    pub taken_at: DateTime<Utc>,
    pub score: f64,
}

//=========================================================================================
// Users and Auth
//=========================================================================================

// Represents a logged-in user - used throughout the app
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}
