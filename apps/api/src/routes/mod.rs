pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::cover_letter::handlers as cover_letter;
use crate::resume::handlers as resume;
use crate::skills::handlers as skills;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route(
            "/api/v1/resumes/customize",
            post(resume::handle_customize_resume),
        )
        // Cover Letter API
        .route(
            "/api/v1/cover-letters",
            post(cover_letter::handle_generate_cover_letter),
        )
        .route(
            "/api/v1/cover-letters/docx",
            post(cover_letter::handle_cover_letter_docx),
        )
        .route(
            "/api/v1/cover-letters/pdf",
            post(cover_letter::handle_cover_letter_pdf),
        )
        // Skills API
        .route("/api/v1/skills/extract", post(skills::handle_extract_skills))
        .layer(body_limit)
        .with_state(state)
}
