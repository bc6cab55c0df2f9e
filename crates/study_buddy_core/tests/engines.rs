//! Engine behavior tests over in-memory doubles of every port.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use study_buddy_core::chunker::TextSplitter;
use study_buddy_core::domain::{
    CardDraft, ChatMessage, ChatRole, ChatTurn, Document, Flashcard, FlashcardSet, NewQuizAnswer,
    ProgressReport, QuizAttempt, User, UserCredentials,
};
use study_buddy_core::error::{CoreError, CoreResult};
use study_buddy_core::flashcards::FlashcardGenerator;
use study_buddy_core::index::VectorIndex;
use study_buddy_core::ingest::DocumentIngestor;
use study_buddy_core::ports::{EmbeddingService, IndexStore, LanguageModelService, StudyStore};
use study_buddy_core::prompts::REFORMULATE_INSTRUCTIONS;
use study_buddy_core::qa::QaEngine;
use study_buddy_core::quiz::QuizGenerator;
use study_buddy_core::summarize::Summarizer;

//=========================================================================================
// Port Doubles
//=========================================================================================

#[derive(Default)]
struct MemoryStore {
    documents: Mutex<Vec<Document>>,
    messages: Mutex<Vec<ChatMessage>>,
    sets: Mutex<Vec<FlashcardSet>>,
    next_id: Mutex<i64>,
}

impl MemoryStore {
    fn alloc(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }

    fn documents(&self) -> Vec<Document> {
        self.documents.lock().unwrap().clone()
    }

    fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }

    fn sets(&self) -> Vec<FlashcardSet> {
        self.sets.lock().unwrap().clone()
    }
}

#[async_trait]
impl StudyStore for MemoryStore {
    async fn create_user(&self, _email: &str, _password_hash: &str) -> CoreResult<User> {
        unimplemented!("not exercised by engine tests")
    }

    async fn get_user_credentials(&self, _email: &str) -> CoreResult<UserCredentials> {
        unimplemented!("not exercised by engine tests")
    }

    async fn create_auth_session(
        &self,
        _session_id: &str,
        _user_id: i64,
        _expires_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        unimplemented!("not exercised by engine tests")
    }

    async fn validate_auth_session(&self, _session_id: &str) -> CoreResult<User> {
        unimplemented!("not exercised by engine tests")
    }

    async fn delete_auth_session(&self, _session_id: &str) -> CoreResult<()> {
        unimplemented!("not exercised by engine tests")
    }

    async fn create_document(
        &self,
        filename: &str,
        owner_id: Option<i64>,
    ) -> CoreResult<Document> {
        let document = Document {
            id: self.alloc(),
            filename: filename.to_string(),
            owner_id,
            created_at: Utc::now(),
        };
        self.documents.lock().unwrap().push(document.clone());
        Ok(document)
    }

    async fn get_document(&self, document_id: i64) -> CoreResult<Document> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == document_id)
            .cloned()
            .ok_or(CoreError::DocumentNotFound(document_id))
    }

    async fn list_documents(&self, owner_id: i64) -> CoreResult<Vec<Document>> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.owner_id == Some(owner_id))
            .cloned()
            .collect())
    }

    async fn delete_document(&self, document_id: i64) -> CoreResult<()> {
        self.documents.lock().unwrap().retain(|d| d.id != document_id);
        self.messages
            .lock()
            .unwrap()
            .retain(|m| m.document_id != document_id);
        self.sets
            .lock()
            .unwrap()
            .retain(|s| s.document_id != document_id);
        Ok(())
    }

    async fn append_chat_message(
        &self,
        document_id: i64,
        role: ChatRole,
        content: &str,
        user_id: Option<i64>,
    ) -> CoreResult<ChatMessage> {
        let message = ChatMessage {
            id: self.alloc(),
            document_id,
            role,
            content: content.to_string(),
            user_id,
            created_at: Utc::now(),
        };
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn chat_history(&self, document_id: i64) -> CoreResult<Vec<ChatMessage>> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn delete_chat_history(&self, document_id: i64) -> CoreResult<u64> {
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| m.document_id != document_id);
        Ok((before - messages.len()) as u64)
    }

    async fn create_quiz_attempt(
        &self,
        _document_id: i64,
        _user_id: i64,
        _score: f64,
        _answers: &[NewQuizAnswer],
    ) -> CoreResult<QuizAttempt> {
        unimplemented!("not exercised by engine tests")
    }

    async fn quiz_history(&self, _document_id: i64, _user_id: i64) -> CoreResult<Vec<QuizAttempt>> {
        unimplemented!("not exercised by engine tests")
    }

    async fn delete_quiz_attempt(&self, _attempt_id: i64, _user_id: i64) -> CoreResult<()> {
        unimplemented!("not exercised by engine tests")
    }

    async fn delete_quiz_attempts(&self, _attempt_ids: &[i64], _user_id: i64) -> CoreResult<u64> {
        unimplemented!("not exercised by engine tests")
    }

    async fn delete_quiz_history(&self, _document_id: i64, _user_id: i64) -> CoreResult<u64> {
        unimplemented!("not exercised by engine tests")
    }

    async fn progress_report(
        &self,
        _document_id: i64,
        _user_id: i64,
    ) -> CoreResult<ProgressReport> {
        unimplemented!("not exercised by engine tests")
    }

    async fn create_flashcard_set(
        &self,
        document_id: i64,
        user_id: i64,
        title: &str,
        cards: &[CardDraft],
    ) -> CoreResult<FlashcardSet> {
        let set_id = self.alloc();
        let cards = cards
            .iter()
            .map(|card| Flashcard {
                id: self.alloc(),
                set_id,
                term: card.term.clone(),
                definition: card.definition.clone(),
            })
            .collect();
        let set = FlashcardSet {
            id: set_id,
            document_id,
            user_id,
            title: title.to_string(),
            created_at: Utc::now(),
            cards,
        };
        self.sets.lock().unwrap().push(set.clone());
        Ok(set)
    }

    async fn flashcard_sets(
        &self,
        document_id: i64,
        user_id: i64,
    ) -> CoreResult<Vec<FlashcardSet>> {
        Ok(self
            .sets
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.document_id == document_id && s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_flashcard_set(&self, _set_id: i64, _user_id: i64) -> CoreResult<()> {
        unimplemented!("not exercised by engine tests")
    }

    async fn delete_flashcard_sets(&self, _set_ids: &[i64], _user_id: i64) -> CoreResult<u64> {
        unimplemented!("not exercised by engine tests")
    }

    async fn delete_all_flashcard_sets(&self, _document_id: i64, _user_id: i64) -> CoreResult<u64> {
        unimplemented!("not exercised by engine tests")
    }
}

/// Looks embeddings up in a fixed table; unknown text gets an all-ones
/// vector so every unmapped chunk ties.
struct MockEmbedder {
    table: HashMap<String, Vec<f32>>,
    dimension: usize,
}

impl MockEmbedder {
    fn uniform(dimension: usize) -> Arc<Self> {
        Arc::new(Self {
            table: HashMap::new(),
            dimension,
        })
    }

    fn with_table(dimension: usize, entries: &[(&str, &[f32])]) -> Arc<Self> {
        let table = entries
            .iter()
            .map(|(text, vector)| (text.to_string(), vector.to_vec()))
            .collect();
        Arc::new(Self { table, dimension })
    }

    fn lookup(&self, text: &str) -> Vec<f32> {
        self.table
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![1.0; self.dimension])
    }
}

#[async_trait]
impl EmbeddingService for MockEmbedder {
    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>> {
        Ok(self.lookup(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.lookup(t)).collect())
    }
}

#[derive(Clone)]
struct ModelCall {
    system: String,
    user: String,
    history_len: usize,
}

/// Replays scripted replies in order and records every call it sees.
#[derive(Default)]
struct MockModel {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<ModelCall>>,
}

impl MockModel {
    fn scripted(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, system: &str, user: &str, history_len: usize) -> CoreResult<String> {
        self.calls.lock().unwrap().push(ModelCall {
            system: system.to_string(),
            user: user.to_string(),
            history_len,
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CoreError::Model("no scripted reply left".to_string()))
    }
}

#[async_trait]
impl LanguageModelService for MockModel {
    async fn complete(&self, system: &str, user: &str) -> CoreResult<String> {
        self.record(system, user, 0)
    }

    async fn complete_chat(
        &self,
        system: &str,
        history: &[ChatTurn],
        user: &str,
    ) -> CoreResult<String> {
        self.record(system, user, history.len())
    }
}

#[derive(Default)]
struct MockIndexStore {
    indexes: Mutex<HashMap<i64, VectorIndex>>,
    fail_next_save: AtomicBool,
}

impl MockIndexStore {
    fn with_index(document_id: i64, index: VectorIndex) -> Arc<Self> {
        let store = Self::default();
        store.indexes.lock().unwrap().insert(document_id, index);
        Arc::new(store)
    }

    fn contains(&self, document_id: i64) -> bool {
        self.indexes.lock().unwrap().contains_key(&document_id)
    }
}

#[async_trait]
impl IndexStore for MockIndexStore {
    async fn save(&self, document_id: i64, index: &VectorIndex) -> CoreResult<()> {
        if self.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(CoreError::Store("index disk is full".to_string()));
        }
        self.indexes
            .lock()
            .unwrap()
            .insert(document_id, index.clone());
        Ok(())
    }

    async fn load(&self, document_id: i64) -> CoreResult<VectorIndex> {
        self.indexes
            .lock()
            .unwrap()
            .get(&document_id)
            .cloned()
            .ok_or(CoreError::IndexNotFound(document_id))
    }

    async fn delete(&self, document_id: i64) -> CoreResult<()> {
        self.indexes.lock().unwrap().remove(&document_id);
        Ok(())
    }
}

fn index_of_chunks(chunks: &[&str]) -> VectorIndex {
    let mut index = VectorIndex::new(3);
    for chunk in chunks {
        index.push(vec![1.0, 1.0, 1.0], chunk.to_string());
    }
    index
}

//=========================================================================================
// Ingestion
//=========================================================================================

#[tokio::test]
async fn ingest_rejects_empty_text_without_persisting_anything() {
    let store = Arc::new(MemoryStore::default());
    let index_store = Arc::new(MockIndexStore::default());
    let ingestor = DocumentIngestor::new(
        store.clone(),
        MockEmbedder::uniform(3),
        index_store.clone(),
        TextSplitter::default(),
    );

    let err = ingestor.ingest("blank.pdf", "   \n\n  ", None).await.unwrap_err();
    assert!(matches!(err, CoreError::EmptyDocument));
    assert!(store.documents().is_empty());
    assert!(!index_store.contains(1));
}

#[tokio::test]
async fn ingest_creates_a_document_with_a_loadable_index() {
    let store = Arc::new(MemoryStore::default());
    let index_store = Arc::new(MockIndexStore::default());
    let ingestor = DocumentIngestor::new(
        store.clone(),
        MockEmbedder::uniform(3),
        index_store.clone(),
        TextSplitter::new(40, 0),
    );

    let text = "Cells are the basic unit of life.\n\nMitochondria produce energy.";
    let document = ingestor.ingest("bio.pdf", text, Some(9)).await.unwrap();

    assert_eq!(document.filename, "bio.pdf");
    assert_eq!(document.owner_id, Some(9));
    let index = index_store.load(document.id).await.unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.chunks(1), vec!["Cells are the basic unit of life."]);
}

#[tokio::test]
async fn ingest_rolls_back_the_row_when_index_save_fails() {
    let store = Arc::new(MemoryStore::default());
    let index_store = Arc::new(MockIndexStore::default());
    index_store.fail_next_save.store(true, Ordering::SeqCst);
    let ingestor = DocumentIngestor::new(
        store.clone(),
        MockEmbedder::uniform(3),
        index_store.clone(),
        TextSplitter::default(),
    );

    let err = ingestor.ingest("doc.pdf", "some real text", None).await.unwrap_err();
    assert!(matches!(err, CoreError::Store(_)));
    assert!(store.documents().is_empty());
}

#[tokio::test]
async fn delete_checks_ownership_and_removes_the_index() {
    let store = Arc::new(MemoryStore::default());
    let document = store.create_document("owned.pdf", Some(1)).await.unwrap();
    let index_store = MockIndexStore::with_index(document.id, index_of_chunks(&["c"]));
    let ingestor = DocumentIngestor::new(
        store.clone(),
        MockEmbedder::uniform(3),
        index_store.clone(),
        TextSplitter::default(),
    );

    let err = ingestor.delete(document.id, 2).await.unwrap_err();
    assert!(matches!(err, CoreError::AccessDenied));
    assert_eq!(store.documents().len(), 1);

    ingestor.delete(document.id, 1).await.unwrap();
    assert!(store.documents().is_empty());
    assert!(matches!(
        index_store.load(document.id).await.unwrap_err(),
        CoreError::IndexNotFound(_)
    ));

    let err = ingestor.delete(document.id, 1).await.unwrap_err();
    assert!(matches!(err, CoreError::DocumentNotFound(_)));
}

//=========================================================================================
// Conversational QA
//=========================================================================================

#[tokio::test]
async fn ask_with_empty_history_calls_the_model_once_and_records_the_exchange() {
    let store = Arc::new(MemoryStore::default());
    let document = store.create_document("bio.pdf", None).await.unwrap();
    let index_store = MockIndexStore::with_index(document.id, index_of_chunks(&["chunk"]));
    let model = MockModel::scripted(&["Photosynthesis converts light to energy."]);
    let engine = QaEngine::new(
        store.clone(),
        MockEmbedder::uniform(3),
        model.clone(),
        index_store,
    );

    let answer = engine
        .ask(document.id, "What is photosynthesis?", &[], Some(4))
        .await
        .unwrap();

    assert_eq!(answer, "Photosynthesis converts light to energy.");
    let calls = model.calls();
    assert_eq!(calls.len(), 1, "no reformulation call without history");
    assert!(calls[0].system.contains("AI Study Buddy"));

    let messages = store.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::Human);
    assert_eq!(messages[0].content, "What is photosynthesis?");
    assert_eq!(messages[0].user_id, Some(4));
    assert_eq!(messages[1].role, ChatRole::Ai);
    assert_eq!(messages[1].content, answer);
}

#[tokio::test]
async fn ask_with_history_reformulates_and_retrieves_with_the_standalone_question() {
    let store = Arc::new(MemoryStore::default());
    let document = store.create_document("bio.pdf", None).await.unwrap();

    let mut index = VectorIndex::new(2);
    index.push(vec![1.0, 0.0], "chunk about cells".to_string());
    index.push(vec![0.0, 1.0], "chunk about mitochondria".to_string());
    let index_store = MockIndexStore::with_index(document.id, index);

    let embedder = MockEmbedder::with_table(
        2,
        &[("What do mitochondria produce?", &[0.0, 1.0])],
    );
    let model = MockModel::scripted(&[
        "What do mitochondria produce?",
        "They produce ATP.",
    ]);
    let engine = QaEngine::new(store.clone(), embedder, model.clone(), index_store);

    let history = vec![
        ChatTurn {
            role: ChatRole::Human,
            content: "Tell me about mitochondria.".to_string(),
        },
        ChatTurn {
            role: ChatRole::Ai,
            content: "They are organelles.".to_string(),
        },
    ];
    engine
        .ask(document.id, "What do they produce?", &history, None)
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].system, REFORMULATE_INSTRUCTIONS);
    assert_eq!(calls[0].history_len, 2);

    // Retrieval ran on the reformulated question, so the mitochondria chunk
    // ranks first in the answer prompt's context.
    let context_pos = calls[1].system.find("chunk about mitochondria").unwrap();
    let other_pos = calls[1].system.find("chunk about cells").unwrap();
    assert!(context_pos < other_pos);

    // The stored question is the user's original phrasing.
    let messages = store.messages();
    assert_eq!(messages[0].content, "What do they produce?");
    assert_eq!(messages[0].user_id, None);
}

#[tokio::test]
async fn ask_fails_cleanly_when_document_or_index_is_missing() {
    let store = Arc::new(MemoryStore::default());
    let engine = QaEngine::new(
        store.clone(),
        MockEmbedder::uniform(3),
        MockModel::scripted(&[]),
        Arc::new(MockIndexStore::default()),
    );

    let err = engine.ask(42, "hi", &[], None).await.unwrap_err();
    assert!(matches!(err, CoreError::DocumentNotFound(42)));

    let document = store.create_document("d.pdf", None).await.unwrap();
    let err = engine.ask(document.id, "hi", &[], None).await.unwrap_err();
    assert!(matches!(err, CoreError::IndexNotFound(_)));
}

//=========================================================================================
// Summarizer
//=========================================================================================

#[tokio::test]
async fn summarize_feeds_at_most_fifty_chunks_joined_by_spaces() {
    let store = Arc::new(MemoryStore::default());
    let document = store.create_document("long.pdf", None).await.unwrap();

    let chunk_names: Vec<String> = (0..60).map(|i| format!("chunk{}", i)).collect();
    let chunk_refs: Vec<&str> = chunk_names.iter().map(|s| s.as_str()).collect();
    let index_store = MockIndexStore::with_index(document.id, index_of_chunks(&chunk_refs));

    let model = MockModel::scripted(&["A tidy three paragraph summary."]);
    let summarizer = Summarizer::new(store, model.clone(), index_store);

    let summary = summarizer.summarize(document.id).await.unwrap();
    assert_eq!(summary, "A tidy three paragraph summary.");

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    let expected = chunk_names[..50].join(" ");
    assert_eq!(calls[0].user, expected);
    assert!(calls[0].system.contains("3-paragraph"));
}

#[tokio::test]
async fn summarize_reports_no_content_without_calling_the_model() {
    let store = Arc::new(MemoryStore::default());
    let document = store.create_document("empty.pdf", None).await.unwrap();
    let index_store = MockIndexStore::with_index(document.id, VectorIndex::new(3));
    let model = MockModel::scripted(&["should never be used"]);
    let summarizer = Summarizer::new(store, model.clone(), index_store);

    let err = summarizer.summarize(document.id).await.unwrap_err();
    assert!(matches!(err, CoreError::NoContent));
    assert!(model.calls().is_empty());
}

//=========================================================================================
// Quiz Generation
//=========================================================================================

const VALID_QUIZ: &str = r#"{"questions": [
    {"question": "Q1?", "options": ["a", "b", "c", "d"], "correct_answer": "a", "explanation": "e"},
    {"question": "Q2?", "options": ["a", "b", "c", "d"], "correct_answer": "b", "explanation": "e"},
    {"question": "Q3?", "options": ["a", "b", "c", "d"], "correct_answer": "c", "explanation": "e"},
    {"question": "Q4?", "options": ["a", "b", "c", "d"], "correct_answer": "d", "explanation": "e"},
    {"question": "Q5?", "options": ["a", "b", "c", "d"], "correct_answer": "a", "explanation": "e"}
]}"#;

#[tokio::test]
async fn quiz_sampling_is_deterministic_for_a_fixed_seed() {
    let store = Arc::new(MemoryStore::default());
    let document = store.create_document("book.pdf", None).await.unwrap();

    let chunk_names: Vec<String> = (0..30).map(|i| format!("piece{}", i)).collect();
    let chunk_refs: Vec<&str> = chunk_names.iter().map(|s| s.as_str()).collect();
    let index_store = MockIndexStore::with_index(document.id, index_of_chunks(&chunk_refs));

    let model = MockModel::scripted(&[VALID_QUIZ, VALID_QUIZ]);
    let generator = QuizGenerator::new(store, model.clone(), index_store);

    let quiz = generator.generate(document.id, Some(7)).await.unwrap();
    assert_eq!(quiz.questions.len(), 5);
    generator.generate(document.id, Some(7)).await.unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].user, calls[1].user, "same seed, same sampled source");
}

#[tokio::test]
async fn quiz_rejects_replies_that_fail_validation() {
    let store = Arc::new(MemoryStore::default());
    let document = store.create_document("book.pdf", None).await.unwrap();
    let index_store = MockIndexStore::with_index(document.id, index_of_chunks(&["only chunk"]));

    let bad = r#"{"questions": [
        {"question": "Q?", "options": ["a", "b"], "correct_answer": "z", "explanation": "e"}
    ]}"#;
    let model = MockModel::scripted(&[bad]);
    let generator = QuizGenerator::new(store, model, index_store);

    let err = generator.generate(document.id, Some(1)).await.unwrap_err();
    assert!(matches!(err, CoreError::GenerationFormat(_)));
}

#[tokio::test]
async fn quiz_reports_no_content_for_an_empty_index() {
    let store = Arc::new(MemoryStore::default());
    let document = store.create_document("empty.pdf", None).await.unwrap();
    let index_store = MockIndexStore::with_index(document.id, VectorIndex::new(3));
    let model = MockModel::scripted(&["unused"]);
    let generator = QuizGenerator::new(store, model.clone(), index_store);

    let err = generator.generate(document.id, None).await.unwrap_err();
    assert!(matches!(err, CoreError::NoContent));
    assert!(model.calls().is_empty());
}

//=========================================================================================
// Flashcards
//=========================================================================================

fn flashcard_reply(count: usize) -> String {
    let cards: Vec<String> = (0..count)
        .map(|i| format!(r#"{{"term": "t{}", "definition": "d{}"}}"#, i, i))
        .collect();
    format!(r#"{{"flashcards": [{}]}}"#, cards.join(", "))
}

#[tokio::test]
async fn flashcards_are_persisted_with_filename_title_and_ten_cards() {
    let store = Arc::new(MemoryStore::default());
    let document = store.create_document("notes.pdf", Some(3)).await.unwrap();
    let index_store = MockIndexStore::with_index(document.id, index_of_chunks(&["a", "b"]));
    let reply = flashcard_reply(10);
    let model = MockModel::scripted(&[reply.as_str()]);
    let generator = FlashcardGenerator::new(store.clone(), model.clone(), index_store);

    let set = generator.generate(document.id, 3).await.unwrap();
    assert_eq!(set.title, "Flashcards for notes.pdf");
    assert_eq!(set.cards.len(), 10);
    assert_eq!(set.user_id, 3);

    let stored = store.sets();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].cards.len(), 10);

    // The model saw both chunks joined with a single space.
    assert_eq!(model.calls()[0].user, "a b");
}

#[tokio::test]
async fn flashcards_reject_wrong_card_counts_without_persisting() {
    let store = Arc::new(MemoryStore::default());
    let document = store.create_document("notes.pdf", Some(3)).await.unwrap();
    let index_store = MockIndexStore::with_index(document.id, index_of_chunks(&["a"]));
    let reply = flashcard_reply(7);
    let model = MockModel::scripted(&[reply.as_str()]);
    let generator = FlashcardGenerator::new(store.clone(), model, index_store);

    let err = generator.generate(document.id, 3).await.unwrap_err();
    assert!(matches!(err, CoreError::GenerationFormat(_)));
    assert!(store.sets().is_empty());
}
