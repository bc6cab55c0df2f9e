//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `StudyStore` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, SqlitePool};
use std::collections::HashSet;

use study_buddy_core::domain::{
    CardDraft, ChatMessage, ChatRole, Document, Flashcard, FlashcardSet, NewQuizAnswer,
    ProgressReport, QuizAnswer, QuizAttempt, ScorePoint, User, UserCredentials,
};
use study_buddy_core::ports::{CoreError, CoreResult, StudyStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StudyStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn store_err(e: sqlx::Error) -> CoreError {
    CoreError::Store(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: i64,
    email: String,
    password_hash: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct SessionUserRecord {
    id: i64,
    email: String,
    expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct DocumentRecord {
    id: i64,
    filename: String,
    owner_id: Option<i64>,
    created_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            filename: self.filename,
            owner_id: self.owner_id,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ChatMessageRecord {
    id: i64,
    document_id: i64,
    role: String,
    content: String,
    user_id: Option<i64>,
    created_at: DateTime<Utc>,
}
impl ChatMessageRecord {
    /// The `role` column is constrained to 'human'/'ai'; anything else means
    /// the row was written outside this adapter.
    fn to_domain(self) -> CoreResult<ChatMessage> {
        let role = ChatRole::parse(&self.role).ok_or_else(|| {
            CoreError::Store(format!(
                "chat message {} has invalid role '{}'",
                self.id, self.role
            ))
        })?;
        Ok(ChatMessage {
            id: self.id,
            document_id: self.document_id,
            role,
            content: self.content,
            user_id: self.user_id,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct AttemptRecord {
    id: i64,
    document_id: i64,
    user_id: i64,
    score: f64,
    created_at: DateTime<Utc>,
}
impl AttemptRecord {
    fn to_domain(self, answers: Vec<QuizAnswer>) -> QuizAttempt {
        QuizAttempt {
            id: self.id,
            document_id: self.document_id,
            user_id: self.user_id,
            score: self.score,
            created_at: self.created_at,
            answers,
        }
    }
}

#[derive(FromRow)]
struct AnswerRecord {
    id: i64,
    question_text: String,
    selected_answer: String,
    correct_answer: String,
    is_correct: bool,
}
impl AnswerRecord {
    fn to_domain(self) -> QuizAnswer {
        QuizAnswer {
            id: self.id,
            question_text: self.question_text,
            selected_answer: self.selected_answer,
            correct_answer: self.correct_answer,
            is_correct: self.is_correct,
        }
    }
}

#[derive(FromRow)]
struct SetRecord {
    id: i64,
    document_id: i64,
    user_id: i64,
    title: String,
    created_at: DateTime<Utc>,
}
impl SetRecord {
    fn to_domain(self, cards: Vec<Flashcard>) -> FlashcardSet {
        FlashcardSet {
            id: self.id,
            document_id: self.document_id,
            user_id: self.user_id,
            title: self.title,
            created_at: self.created_at,
            cards,
        }
    }
}

#[derive(FromRow)]
struct CardRecord {
    id: i64,
    set_id: i64,
    term: String,
    definition: String,
}
impl CardRecord {
    fn to_domain(self) -> Flashcard {
        Flashcard {
            id: self.id,
            set_id: self.set_id,
            term: self.term,
            definition: self.definition,
        }
    }
}

#[derive(FromRow)]
struct ReportRecord {
    total_quizzes_taken: i64,
    average_score: Option<f64>,
    highest_score: Option<f64>,
}

#[derive(FromRow)]
struct ScoreRecord {
    taken_at: DateTime<Utc>,
    score: f64,
}

//=========================================================================================
// `StudyStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudyStore for DbAdapter {
    // --- Auth ---

    async fn create_user(&self, email: &str, password_hash: &str) -> CoreResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?) \
             RETURNING id, email",
        )
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(record.to_domain())
    }

    async fn get_user_credentials(&self, email: &str) -> CoreResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => CoreError::NotFound(format!("user {}", email)),
            _ => store_err(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO auth_sessions (id, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> CoreResult<User> {
        let record = sqlx::query_as::<_, SessionUserRecord>(
            "SELECT u.id, u.email, s.expires_at \
             FROM auth_sessions s JOIN users u ON u.id = s.user_id \
             WHERE s.id = ?",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => CoreError::AuthenticationRequired,
            _ => store_err(e),
        })?;

        if record.expires_at < Utc::now() {
            return Err(CoreError::AuthenticationRequired);
        }
        Ok(User {
            id: record.id,
            email: record.email,
        })
    }

    async fn delete_auth_session(&self, session_id: &str) -> CoreResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    // --- Documents ---

    async fn create_document(
        &self,
        filename: &str,
        owner_id: Option<i64>,
    ) -> CoreResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "INSERT INTO documents (filename, owner_id, created_at) VALUES (?, ?, ?) \
             RETURNING id, filename, owner_id, created_at",
        )
        .bind(filename)
        .bind(owner_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(record.to_domain())
    }

    async fn get_document(&self, document_id: i64) -> CoreResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, filename, owner_id, created_at FROM documents WHERE id = ?",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => CoreError::DocumentNotFound(document_id),
            _ => store_err(e),
        })?;
        Ok(record.to_domain())
    }

    async fn list_documents(&self, owner_id: i64) -> CoreResult<Vec<Document>> {
        let records = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, filename, owner_id, created_at FROM documents \
             WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_document(&self, document_id: i64) -> CoreResult<()> {
        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    // --- Chat History ---

    async fn append_chat_message(
        &self,
        document_id: i64,
        role: ChatRole,
        content: &str,
        user_id: Option<i64>,
    ) -> CoreResult<ChatMessage> {
        let record = sqlx::query_as::<_, ChatMessageRecord>(
            "INSERT INTO chat_messages (document_id, role, content, user_id, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING id, document_id, role, content, user_id, created_at",
        )
        .bind(document_id)
        .bind(role.as_str())
        .bind(content)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        record.to_domain()
    }

    async fn chat_history(&self, document_id: i64) -> CoreResult<Vec<ChatMessage>> {
        let records = sqlx::query_as::<_, ChatMessageRecord>(
            "SELECT id, document_id, role, content, user_id, created_at \
             FROM chat_messages WHERE document_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn delete_chat_history(&self, document_id: i64) -> CoreResult<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE document_id = ?")
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected())
    }

    // --- Quiz Attempts ---

    async fn create_quiz_attempt(
        &self,
        document_id: i64,
        user_id: i64,
        score: f64,
        answers: &[NewQuizAnswer],
    ) -> CoreResult<QuizAttempt> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let attempt = sqlx::query_as::<_, AttemptRecord>(
            "INSERT INTO quiz_attempts (document_id, user_id, score, created_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING id, document_id, user_id, score, created_at",
        )
        .bind(document_id)
        .bind(user_id)
        .bind(score)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        let mut stored_answers = Vec::with_capacity(answers.len());
        for answer in answers {
            let record = sqlx::query_as::<_, AnswerRecord>(
                "INSERT INTO quiz_answers \
                 (attempt_id, question_text, selected_answer, correct_answer, is_correct) \
                 VALUES (?, ?, ?, ?, ?) \
                 RETURNING id, question_text, selected_answer, correct_answer, is_correct",
            )
            .bind(attempt.id)
            .bind(&answer.question_text)
            .bind(&answer.selected_answer)
            .bind(&answer.correct_answer)
            .bind(answer.is_correct)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_err)?;
            stored_answers.push(record.to_domain());
        }

        tx.commit().await.map_err(store_err)?;
        Ok(attempt.to_domain(stored_answers))
    }

    async fn quiz_history(&self, document_id: i64, user_id: i64) -> CoreResult<Vec<QuizAttempt>> {
        let attempts = sqlx::query_as::<_, AttemptRecord>(
            "SELECT id, document_id, user_id, score, created_at FROM quiz_attempts \
             WHERE document_id = ? AND user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(document_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        let mut history = Vec::with_capacity(attempts.len());
        for attempt in attempts {
            let answers = sqlx::query_as::<_, AnswerRecord>(
                "SELECT id, question_text, selected_answer, correct_answer, is_correct \
                 FROM quiz_answers WHERE attempt_id = ? ORDER BY id ASC",
            )
            .bind(attempt.id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
            history.push(attempt.to_domain(answers.into_iter().map(|r| r.to_domain()).collect()));
        }
        Ok(history)
    }

    async fn delete_quiz_attempt(&self, attempt_id: i64, user_id: i64) -> CoreResult<()> {
        let owner = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM quiz_attempts WHERE id = ?",
        )
        .bind(attempt_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                CoreError::NotFound(format!("quiz attempt {}", attempt_id))
            }
            _ => store_err(e),
        })?;

        if owner != user_id {
            return Err(CoreError::AccessDenied);
        }

        sqlx::query("DELETE FROM quiz_attempts WHERE id = ?")
            .bind(attempt_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn delete_quiz_attempts(&self, attempt_ids: &[i64], user_id: i64) -> CoreResult<u64> {
        let unique: HashSet<i64> = attempt_ids.iter().copied().collect();
        if unique.is_empty() {
            return Ok(0);
        }

        // All-or-nothing: every requested attempt must exist and belong to
        // the caller, or nothing is deleted.
        let mut count_query =
            QueryBuilder::new("SELECT COUNT(*) FROM quiz_attempts WHERE user_id = ");
        count_query.push_bind(user_id).push(" AND id IN (");
        let mut ids = count_query.separated(", ");
        for id in &unique {
            ids.push_bind(*id);
        }
        count_query.push(")");
        let owned: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        if owned as usize != unique.len() {
            return Err(CoreError::AccessDenied);
        }

        let mut delete_query = QueryBuilder::new("DELETE FROM quiz_attempts WHERE user_id = ");
        delete_query.push_bind(user_id).push(" AND id IN (");
        let mut ids = delete_query.separated(", ");
        for id in &unique {
            ids.push_bind(*id);
        }
        delete_query.push(")");
        let result = delete_query
            .build()
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected())
    }

    async fn delete_quiz_history(&self, document_id: i64, user_id: i64) -> CoreResult<u64> {
        let result =
            sqlx::query("DELETE FROM quiz_attempts WHERE document_id = ? AND user_id = ?")
                .bind(document_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(store_err)?;
        Ok(result.rows_affected())
    }

    async fn progress_report(
        &self,
        document_id: i64,
        user_id: i64,
    ) -> CoreResult<ProgressReport> {
        let aggregates = sqlx::query_as::<_, ReportRecord>(
            "SELECT COUNT(*) AS total_quizzes_taken, \
                    AVG(score) AS average_score, \
                    MAX(score) AS highest_score \
             FROM quiz_attempts WHERE document_id = ? AND user_id = ?",
        )
        .bind(document_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        let scores = sqlx::query_as::<_, ScoreRecord>(
            "SELECT created_at AS taken_at, score FROM quiz_attempts \
             WHERE document_id = ? AND user_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(document_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(ProgressReport {
            total_quizzes_taken: aggregates.total_quizzes_taken,
            average_score: aggregates.average_score,
            highest_score: aggregates.highest_score,
            scores_over_time: scores
                .into_iter()
                .map(|r| ScorePoint {
                    taken_at: r.taken_at,
                    score: r.score,
                })
                .collect(),
        })
    }

    // --- Flashcards ---

    async fn create_flashcard_set(
        &self,
        document_id: i64,
        user_id: i64,
        title: &str,
        cards: &[CardDraft],
    ) -> CoreResult<FlashcardSet> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let set = sqlx::query_as::<_, SetRecord>(
            "INSERT INTO flashcard_sets (document_id, user_id, title, created_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING id, document_id, user_id, title, created_at",
        )
        .bind(document_id)
        .bind(user_id)
        .bind(title)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        let mut stored_cards = Vec::with_capacity(cards.len());
        for card in cards {
            let record = sqlx::query_as::<_, CardRecord>(
                "INSERT INTO flashcards (set_id, term, definition) VALUES (?, ?, ?) \
                 RETURNING id, set_id, term, definition",
            )
            .bind(set.id)
            .bind(&card.term)
            .bind(&card.definition)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_err)?;
            stored_cards.push(record.to_domain());
        }

        tx.commit().await.map_err(store_err)?;
        Ok(set.to_domain(stored_cards))
    }

    async fn flashcard_sets(
        &self,
        document_id: i64,
        user_id: i64,
    ) -> CoreResult<Vec<FlashcardSet>> {
        let sets = sqlx::query_as::<_, SetRecord>(
            "SELECT id, document_id, user_id, title, created_at FROM flashcard_sets \
             WHERE document_id = ? AND user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(document_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        let mut result = Vec::with_capacity(sets.len());
        for set in sets {
            let cards = sqlx::query_as::<_, CardRecord>(
                "SELECT id, set_id, term, definition FROM flashcards \
                 WHERE set_id = ? ORDER BY id ASC",
            )
            .bind(set.id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
            result.push(set.to_domain(cards.into_iter().map(|r| r.to_domain()).collect()));
        }
        Ok(result)
    }

    async fn delete_flashcard_set(&self, set_id: i64, user_id: i64) -> CoreResult<()> {
        let owner =
            sqlx::query_scalar::<_, i64>("SELECT user_id FROM flashcard_sets WHERE id = ?")
                .bind(set_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match e {
                    sqlx::Error::RowNotFound => {
                        CoreError::NotFound(format!("flashcard set {}", set_id))
                    }
                    _ => store_err(e),
                })?;

        if owner != user_id {
            return Err(CoreError::AccessDenied);
        }

        sqlx::query("DELETE FROM flashcard_sets WHERE id = ?")
            .bind(set_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn delete_flashcard_sets(&self, set_ids: &[i64], user_id: i64) -> CoreResult<u64> {
        let unique: HashSet<i64> = set_ids.iter().copied().collect();
        if unique.is_empty() {
            return Ok(0);
        }

        let mut count_query =
            QueryBuilder::new("SELECT COUNT(*) FROM flashcard_sets WHERE user_id = ");
        count_query.push_bind(user_id).push(" AND id IN (");
        let mut ids = count_query.separated(", ");
        for id in &unique {
            ids.push_bind(*id);
        }
        count_query.push(")");
        let owned: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        if owned as usize != unique.len() {
            return Err(CoreError::AccessDenied);
        }

        let mut delete_query = QueryBuilder::new("DELETE FROM flashcard_sets WHERE user_id = ");
        delete_query.push_bind(user_id).push(" AND id IN (");
        let mut ids = delete_query.separated(", ");
        for id in &unique {
            ids.push_bind(*id);
        }
        delete_query.push(")");
        let result = delete_query
            .build()
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected())
    }

    async fn delete_all_flashcard_sets(&self, document_id: i64, user_id: i64) -> CoreResult<u64> {
        let result =
            sqlx::query("DELETE FROM flashcard_sets WHERE document_id = ? AND user_id = ?")
                .bind(document_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(store_err)?;
        Ok(result.rows_affected())
    }
}

//=========================================================================================
// Tests (in-memory SQLite)
//=========================================================================================
