use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::error::AppError;
use crate::quality::AuditReport;
use crate::service::{
    AdjustRequest, AdjustResponse, AuditRequest, CompareRequest, EstimateRequest,
    ValuationService,
};
use crate::valuation::{AdjustmentPreset, ComparisonSummary, MarketEstimate};

/// Router builder exposing the valuation and comp-audit endpoints.
pub fn valuation_router(service: Arc<ValuationService>) -> Router {
    Router::new()
        .route("/api/v1/valuation/presets", get(presets_handler))
        .route("/api/v1/valuation/adjust", post(adjust_handler))
        .route("/api/v1/valuation/compare", post(compare_handler))
        .route("/api/v1/valuation/estimate", post(estimate_handler))
        .route("/api/v1/quality/audit", post(audit_handler))
        .with_state(service)
}

pub(crate) async fn presets_handler(
    State(service): State<Arc<ValuationService>>,
) -> Json<Vec<AdjustmentPreset>> {
    Json(service.presets().to_vec())
}

pub(crate) async fn adjust_handler(
    State(service): State<Arc<ValuationService>>,
    Json(request): Json<AdjustRequest>,
) -> Result<Json<AdjustResponse>, AppError> {
    Ok(Json(service.adjust(request)?))
}

pub(crate) async fn compare_handler(
    State(service): State<Arc<ValuationService>>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<ComparisonSummary>, AppError> {
    Ok(Json(service.compare(request)?))
}

pub(crate) async fn estimate_handler(
    State(service): State<Arc<ValuationService>>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<MarketEstimate>, AppError> {
    Ok(Json(service.estimate(request)?))
}

pub(crate) async fn audit_handler(
    State(service): State<Arc<ValuationService>>,
    Json(request): Json<AuditRequest>,
) -> Result<Json<AuditReport>, AppError> {
    Ok(Json(service.audit(request)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        valuation_router(Arc::new(ValuationService::default()))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn post_json(uri: &str, payload: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn presets_route_lists_standard_table() {
        let response = router()
            .oneshot(
                Request::get("/api/v1/valuation/presets")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let presets = body.as_array().expect("array of presets");
        assert_eq!(presets.len(), 18);
        assert_eq!(presets[0]["name"], "Pool");
    }

    #[tokio::test]
    async fn adjust_route_applies_percent_before_currency() {
        let response = router()
            .oneshot(post_json(
                "/api/v1/valuation/adjust",
                json!({
                    "base_price": 100000,
                    "adjustments": [
                        { "kind": "custom", "label": "Roof", "amount": -5000 },
                        { "kind": "preset", "name": "Superior Condition (+10%)" }
                    ]
                }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["adjusted_value"], 105000);
    }

    #[tokio::test]
    async fn adjust_route_rejects_abbreviated_preset_names() {
        let response = router()
            .oneshot(post_json(
                "/api/v1/valuation/adjust",
                json!({
                    "base_price": 100000,
                    "adjustments": [{ "kind": "preset", "name": "Superior Condition" }]
                }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn compare_route_rejects_empty_comp_sets() {
        let response = router()
            .oneshot(post_json(
                "/api/v1/valuation/compare",
                json!({
                    "subject": {
                        "address": "25217 Mathew St",
                        "bedrooms": 3,
                        "bathrooms": 2.0,
                        "living_area_sqft": 1800,
                        "year_built": 1998
                    },
                    "comparables": []
                }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("at least one comparable"));
    }

    #[tokio::test]
    async fn compare_route_returns_range_for_flattened_comps() {
        let response = router()
            .oneshot(post_json(
                "/api/v1/valuation/compare",
                json!({
                    "subject": {
                        "address": "25217 Mathew St",
                        "estimated_value": 100000,
                        "bedrooms": 3,
                        "bathrooms": 2.0,
                        "living_area_sqft": 1800,
                        "year_built": 1998
                    },
                    "comparables": [
                        {
                            "address": "3820 Colonial Dr",
                            "sale_date": "2026-01-08",
                            "sale_price": 100000,
                            "living_area_sqft": 2000,
                            "bedrooms": 3,
                            "bathrooms": 2.0,
                            "distance_miles": 0.4
                        },
                        {
                            "address": "4609 Pine Ave",
                            "sale_date": "2025-12-12",
                            "sale_price": 120000,
                            "living_area_sqft": 1900,
                            "bedrooms": 3,
                            "bathrooms": 2.0,
                            "distance_miles": 0.8
                        }
                    ]
                }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["average_adjusted_value"], 110000);
        assert_eq!(body["value_range"]["min"], 100000);
        assert_eq!(body["value_range"]["max"], 120000);
    }

    #[tokio::test]
    async fn audit_route_reports_bad_csv_as_client_error() {
        let response = router()
            .oneshot(post_json(
                "/api/v1/quality/audit",
                json!({ "csv": "address,sale_date\n7705 Park Ave,11/25/25\n" }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn audit_route_flags_zero_distance_sets() {
        let response = router()
            .oneshot(post_json(
                "/api/v1/quality/audit",
                json!({
                    "properties": [{
                        "id": "1",
                        "address": "25217 MATHEW ST",
                        "comps": [{
                            "address": "7102 Kirkwood Cir",
                            "sale_date": "2025-11-26",
                            "sale_price": 96000,
                            "living_area_sqft": 1800,
                            "bedrooms": 3,
                            "bathrooms": 2.0,
                            "distance_miles": 0.0
                        }]
                    }]
                }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["issues"][0]["category"], "zero-distance");
        assert_eq!(body["issues"][0]["severity"], "critical");
        assert_eq!(body["statistics"]["health_score"], 0);
    }
}
