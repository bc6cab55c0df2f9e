//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, FsIndexStore, OpenAiChatAdapter, OpenAiEmbeddingAdapter},
    config::Config,
    error::ApiError,
    web::{auth, documents, flashcards, interactions, middleware, state::AppState, ApiDoc,
        MessageResponse},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post},
    Json, Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use tower_http::cors::CorsLayer;

use study_buddy_core::{
    chunker::TextSplitter,
    flashcards::FlashcardGenerator,
    ingest::DocumentIngestor,
    ports::{EmbeddingService, IndexStore, LanguageModelService, StudyStore},
    qa::QaEngine,
    quiz::QuizGenerator,
    summarize::Summarizer,
};

async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to the AI Study Buddy API!"))
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;
    let db_adapter = DbAdapter::new(db_pool);
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");
    let store: Arc<dyn StudyStore> = Arc::new(db_adapter);

    // --- 3. Initialize Service Adapters ---
    let mut openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    if let Some(api_base) = &config.openai_api_base {
        openai_config = openai_config.with_api_base(api_base.clone());
    }
    let openai_client = Client::with_config(openai_config);

    let embedder: Arc<dyn EmbeddingService> = Arc::new(OpenAiEmbeddingAdapter::new(
        openai_client.clone(),
        config.embedding_model.clone(),
    ));
    let model: Arc<dyn LanguageModelService> = Arc::new(OpenAiChatAdapter::new(
        openai_client.clone(),
        config.chat_model.clone(),
    ));
    let index_store: Arc<dyn IndexStore> =
        Arc::new(FsIndexStore::new(config.index_dir.clone()));

    // --- 4. Wire Up the Core Engines ---
    let ingestor = Arc::new(DocumentIngestor::new(
        store.clone(),
        embedder.clone(),
        index_store.clone(),
        TextSplitter::default(),
    ));
    let qa = Arc::new(QaEngine::new(
        store.clone(),
        embedder.clone(),
        model.clone(),
        index_store.clone(),
    ));
    let summarizer = Arc::new(Summarizer::new(
        store.clone(),
        model.clone(),
        index_store.clone(),
    ));
    let quiz = Arc::new(QuizGenerator::new(
        store.clone(),
        model.clone(),
        index_store.clone(),
    ));
    let flashcards = Arc::new(FlashcardGenerator::new(
        store.clone(),
        model.clone(),
        index_store.clone(),
    ));

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        ingestor,
        qa,
        summarizer,
        quiz,
        flashcards,
        config: config.clone(),
    });

    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|_| {
        ApiError::Internal(format!("Invalid CORS origin '{}'", config.cors_origin))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(root_handler))
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/summarize", post(interactions::summarize_handler));

    // Guest-friendly routes: the session cookie is honored when present but
    // requests without one still go through.
    let optional_auth_routes = Router::new()
        .route("/documents/upload", post(documents::upload_handler))
        .route(
            "/documents/{document_id}/history",
            get(documents::history_handler),
        )
        .route("/ask", post(interactions::ask_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::resolve_user,
        ));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/documents", get(documents::list_documents_handler))
        .route(
            "/documents/{document_id}",
            delete(documents::delete_document_handler),
        )
        .route(
            "/documents/{document_id}/progress-report",
            get(documents::progress_report_handler),
        )
        .route("/generate-quiz", post(interactions::generate_quiz_handler))
        .route("/submit-quiz", post(interactions::submit_quiz_handler))
        .route(
            "/documents/{document_id}/quiz-history",
            get(interactions::quiz_history_handler),
        )
        .route(
            "/documents/{document_id}/chat",
            delete(interactions::delete_chat_handler),
        )
        .route(
            "/documents/{document_id}/quizzes",
            delete(interactions::delete_quiz_history_handler),
        )
        .route(
            "/quiz-attempts/{attempt_id}",
            delete(interactions::delete_quiz_attempt_handler),
        )
        .route(
            "/quiz-attempts/delete-multiple",
            post(interactions::delete_multiple_attempts_handler),
        )
        .route(
            "/flashcards/generate",
            post(flashcards::generate_flashcards_handler),
        )
        .route(
            "/flashcards/document/{document_id}",
            get(flashcards::list_flashcard_sets_handler),
        )
        .route(
            "/flashcards/set/{set_id}",
            delete(flashcards::delete_flashcard_set_handler),
        )
        .route(
            "/flashcards/delete-multiple",
            post(flashcards::delete_multiple_flashcard_sets_handler),
        )
        .route(
            "/flashcards/document/{document_id}/all",
            delete(flashcards::delete_all_flashcard_sets_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(optional_auth_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
