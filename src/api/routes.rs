//! API route definitions
//!
//! - /api/defaults - Form defaults
//! - /api/search - Run a search
//! - /api/export/:search_id/projects.csv - Project rows of a retained search
//! - /api/export/:search_id/summary.csv - Applicant summary of a retained search

use axum::{routing::get, Router};

use super::handlers::{self, FinderState};

/// Routes nested under `/api`
pub fn api_routes(state: FinderState) -> Router {
    Router::new()
        .route("/defaults", get(handlers::get_defaults))
        .route("/search", get(handlers::search))
        .route("/export/:search_id/projects.csv", get(handlers::export_projects))
        .route("/export/:search_id/summary.csv", get(handlers::export_summary))
        .with_state(state)
}

/// Liveness endpoint at root level
pub fn health_routes(state: FinderState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FinderConfig;
    use crate::fetcher::SnapshotSource;
    use crate::types::{GrantRecord, Money};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> FinderState {
        let records = vec![GrantRecord {
            state: "CA".to_string(),
            applicant_id: "X".to_string(),
            applicant_name: "Paradise Irrigation District".to_string(),
            federal_share_obligated: Money::from_cents(10_000),
            damage_category_code: "F".to_string(),
            ..Default::default()
        }];
        FinderState::new(
            Arc::new(SnapshotSource::new(records)),
            FinderConfig::default(),
        )
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = health_routes(create_test_state());
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_defaults_route() {
        let app = api_routes(create_test_state());
        let response = app.oneshot(get("/defaults")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_export_of_unknown_search_is_not_found() {
        let state = create_test_state();
        for uri in [
            "/export/00000000-0000-4000-8000-000000000000/summary.csv",
            "/export/not-an-id/projects.csv",
        ] {
            let response = api_routes(state.clone()).oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
        }
    }

    #[tokio::test]
    async fn test_search_then_export() {
        let state = create_test_state();

        let response = api_routes(state.clone())
            .oneshot(get("/search?states=CA"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let search_id = body["data"]["search_id"].as_str().unwrap().to_string();

        let response = api_routes(state)
            .oneshot(get(&format!("/export/{search_id}/projects.csv")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"fema_water_pa_fire_detailed.csv\""
        );
    }
}
