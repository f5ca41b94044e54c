//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use super::AppState;
use super::types::{ApiError, ParameterSetDetail, SimulationRequest};
use crate::sim::report::run_simulation;
use crate::store::{
    ParameterId, ParameterStore, ResultId, StoredParameters, StoredResult, find_or_insert,
};

/// Runs a simulation, deduplicating its parameters, and stores the result.
///
/// `POST /simulations` → 200 + `StoredResult` JSON
/// invalid parameters → 400 + `ErrorResponse`
pub async fn post_simulation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimulationRequest>,
) -> Result<Json<StoredResult>, ApiError> {
    req.parameters.validate()?;

    let (parameter_id, created) = {
        let mut store = state.store()?;
        find_or_insert(&mut *store, &req.parameters)
    };

    let params = req.parameters;
    let seed = req.seed;
    let result = tokio::task::spawn_blocking(move || match seed {
        Some(seed) => run_simulation(&params, &mut StdRng::seed_from_u64(seed)),
        None => run_simulation(&params, &mut rand::rng()),
    })
    .await
    .map_err(|e| ApiError::Internal(format!("simulation task failed: {e}")))??;

    let stored = state.store()?.save_result(parameter_id, result);
    info!(
        result_id = stored.id,
        parameter_id,
        new_parameters = created,
        "stored simulation result"
    );
    Ok(Json(stored))
}

/// Returns every stored parameter set with its id.
///
/// `GET /parameters` → 200 + `Vec<StoredParameters>` JSON
pub async fn get_parameters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoredParameters>>, ApiError> {
    let store = state.store()?;
    Ok(Json(store.parameters()))
}

/// Returns one parameter set with every result stored under it.
///
/// `GET /parameters/{id}` → 200 + `ParameterSetDetail` JSON, or 404
pub async fn get_parameter_set(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ParameterId>,
) -> Result<Json<ParameterSetDetail>, ApiError> {
    let store = state.store()?;
    let parameter_set = store
        .parameter_set(id)
        .ok_or_else(|| ApiError::NotFound(format!("no parameter set with id {id}")))?;
    Ok(Json(ParameterSetDetail {
        results: store.results_for(id),
        parameter_set,
    }))
}

/// Returns one stored result.
///
/// `GET /results/{id}` → 200 + `StoredResult` JSON, or 404
pub async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ResultId>,
) -> Result<Json<StoredResult>, ApiError> {
    let store = state.store()?;
    store
        .result(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no result with id {id}")))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;

    fn simulation_body(count: u32, days: u32, seed: u64) -> String {
        serde_json::json!({
            "parameters": {
                "chargepoints": [{ "count": count, "powerKw": 11.0 }],
                "consumptionKwhPer100km": 18.0,
                "days": days,
                "intervalMinutes": 15,
                "arrivalProbabilityMultiplier": 100.0
            },
            "seed": seed
        })
        .to_string()
    }

    fn post(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/simulations")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn post_simulation_returns_stored_result() {
        let app = router(Arc::new(AppState::new()));

        let resp = app.oneshot(post(simulation_body(2, 1, 7))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json_body(resp).await;
        assert_eq!(json["id"], 1);
        assert_eq!(json["simulationParameterId"], 1);
        assert_eq!(json["result"]["maxTheoreticalPowerKw"], 22.0);
    }

    #[tokio::test]
    async fn invalid_parameters_return_400() {
        let app = router(Arc::new(AppState::new()));

        let resp = app.oneshot(post(simulation_body(2, 0, 7))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json = json_body(resp).await;
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn oversized_horizon_returns_400() {
        let state = Arc::new(AppState::new());
        let body = serde_json::json!({
            "parameters": {
                "chargepoints": [{ "count": 1, "powerKw": 11.0 }],
                "consumptionKwhPer100km": 18.0,
                "days": u32::MAX,
                "intervalMinutes": 1,
                "arrivalProbabilityMultiplier": 100.0
            },
            "seed": 1
        })
        .to_string();

        let resp = router(state.clone()).oneshot(post(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = json_body(resp).await;
        assert!(json["error"].as_str().unwrap().contains("intervals"));

        // Rejected before anything was stored.
        let req = Request::builder()
            .uri("/parameters")
            .body(Body::empty())
            .unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        assert_eq!(json_body(resp).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn repeated_parameters_share_an_id() {
        let state = Arc::new(AppState::new());

        let first = router(state.clone())
            .oneshot(post(simulation_body(1, 1, 1)))
            .await
            .unwrap();
        let second = router(state.clone())
            .oneshot(post(simulation_body(1, 1, 2)))
            .await
            .unwrap();
        let second = json_body(second).await;
        assert_eq!(json_body(first).await["simulationParameterId"], 1);
        assert_eq!(second["simulationParameterId"], 1);
        assert_eq!(second["id"], 2);

        let req = Request::builder()
            .uri("/parameters")
            .body(Body::empty())
            .unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        let json = json_body(resp).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn parameter_set_lists_its_results() {
        let state = Arc::new(AppState::new());
        for (count, seed) in [(1, 1), (2, 2), (1, 3)] {
            router(state.clone())
                .oneshot(post(simulation_body(count, 1, seed)))
                .await
                .unwrap();
        }

        let req = Request::builder()
            .uri("/parameters/1")
            .body(Body::empty())
            .unwrap();
        let resp = router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = json_body(resp).await;
        assert_eq!(json["id"], 1);
        assert_eq!(json["parameters"]["chargepoints"][0]["count"], 1);
        let result_ids: Vec<u64> = json["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_u64().unwrap())
            .collect();
        assert_eq!(result_ids, vec![1, 3]);

        let missing = Request::builder()
            .uri("/parameters/42")
            .body(Body::empty())
            .unwrap();
        let resp = router(state).oneshot(missing).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn result_lookup() {
        let state = Arc::new(AppState::new());
        router(state.clone())
            .oneshot(post(simulation_body(1, 1, 3)))
            .await
            .unwrap();

        let found = Request::builder()
            .uri("/results/1")
            .body(Body::empty())
            .unwrap();
        let resp = router(state.clone()).oneshot(found).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let missing = Request::builder()
            .uri("/results/99")
            .body(Body::empty())
            .unwrap();
        let resp = router(state).oneshot(missing).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
