use axum::extract::State;

use crate::application::errors::ApiError;
use crate::application::state::AppState;

#[tracing::instrument(skip(state))]
pub(crate) async fn get_suggestion(State(state): State<AppState>) -> Result<String, ApiError> {
    let suggestion = state.suggestion_service.suggest().await?;
    Ok(suggestion)
}
