//! Category listing endpoint
//!
//! Public: clients need the category set to render the menu before
//! anyone logs in.

use axum::{Json, Router, routing::get};
use shared::Category;

use crate::core::ServerState;
use crate::utils::{AppResponse, ok};

async fn list() -> Json<AppResponse<&'static [Category]>> {
    ok(Category::ALL)
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/categories", get(list))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_every_category() {
        let response = list().await;
        let categories = response.0.data.unwrap();
        assert_eq!(categories.len(), 6);
        assert!(categories.contains(&Category::Breakfast));
        assert!(categories.contains(&Category::Snack));
    }
}
