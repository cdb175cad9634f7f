//! Reorder recommendation handler

use axum::extract::State;
use chrono::Utc;
use serde::Serialize;

use crate::response::ApiResponse;
use crate::services::RecommendationService;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Suggestion {
    pub suggestion: String,
}

/// Always answers with a suggestion. Load failures are logged and reported
/// inside the suggestion text.
pub async fn reorder_recommendation(State(state): State<AppState>) -> ApiResponse<Suggestion> {
    let service = RecommendationService::new(state.store);

    let suggestion = match service.reorder_suggestion(Utc::now()).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Reorder recommendation failed: {}", e);
            format!(
                "❌ Error generating recommendations: {}\n\n\
                 Please ensure your database is connected and contains product data. \
                 If the problem persists, check your server logs for more details.",
                e
            )
        }
    };

    ApiResponse::ok(Suggestion { suggestion })
}
