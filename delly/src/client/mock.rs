//! In-process stand-in for the Dell warranty API, used by tests.
//!
//! Serves the token endpoint and the four data endpoints on an ephemeral
//! local port. Known tags: `ABC123` (full record), `NODATE1` (no ship
//! date, no model). Unknown tags are omitted from responses, like the
//! real API does.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{ApiEndpoints, Connector, Credentials, WarrantyClient};

pub const GOOD_ID: &str = "test-client-id";
pub const GOOD_SECRET: &str = "test-client-secret";
const TOKEN: &str = "test-token";

#[derive(Default)]
struct MockState {
    token_requests: AtomicUsize,
    header_requests: Mutex<Vec<String>>,
    /// Non-zero: every data request answers with this status
    fail_status: AtomicU16,
}

pub struct MockApi {
    endpoints: ApiEndpoints,
    state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/auth/oauth/v2/token", post(token))
            .route("/v5/assets", get(assets))
            .route("/v5/asset-entitlements", get(entitlements))
            .route("/v5/asset-components", get(components))
            .route("/v5/asset-entitlement-components", get(summary))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoints: ApiEndpoints {
                auth_url: format!("http://{}/auth/oauth/v2/token", addr),
                base_url: format!("http://{}/v5", addr),
            },
            state,
        }
    }

    pub fn endpoints(&self) -> ApiEndpoints {
        self.endpoints.clone()
    }

    pub fn connector(&self) -> Connector {
        Connector::new(Credentials::new(GOOD_ID, GOOD_SECRET)).with_endpoints(self.endpoints())
    }

    pub async fn client(&self) -> WarrantyClient {
        self.connector().connect().await.unwrap()
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    /// `servicetags` parameter of every asset header request so far
    pub fn header_requests(&self) -> Vec<String> {
        self.state.header_requests.lock().unwrap().clone()
    }

    pub fn fail_data_requests(&self, status: u16) {
        self.state.fail_status.store(status, Ordering::SeqCst);
    }
}

fn header_record(tag: &str) -> Option<Value> {
    match tag {
        "ABC123" => Some(json!({
            "id": 1001,
            "serviceTag": "ABC123",
            "orderBuid": 11,
            "shipDate": "2021-03-15T00:00:00Z",
            "productCode": "XE",
            "localChannel": "ENTP",
            "productId": "latitude-14-5420-laptop",
            "productLineDescription": "Latitude 5420",
            "productFamily": "all-products/laptops",
            "systemDescription": "Latitude 5420",
            "productLobDescription": "Latitude",
            "countryCode": "US",
            "duplicated": false,
            "invalid": false
        })),
        "NODATE1" => Some(json!({
            "id": 1002,
            "serviceTag": "NODATE1",
            "shipDate": null,
            "productLineDescription": null,
            "invalid": false
        })),
        _ => None,
    }
}

fn entitlement_records(tag: &str) -> Value {
    match tag {
        "ABC123" => json!([
            {
                "itemNumber": "709-16183",
                "startDate": "2021-03-15T00:00:00Z",
                "endDate": "2022-03-15T23:59:59.000001Z",
                "entitlementType": "INITIAL",
                "serviceLevelCode": "CB",
                "serviceLevelDescription": "Collect and Return Support",
                "serviceLevelGroup": 5
            },
            {
                "itemNumber": "709-16184",
                "startDate": "2022-03-16T00:00:00Z",
                "endDate": "2024-03-15T23:59:59.000001Z",
                "entitlementType": "EXTENDED",
                "serviceLevelCode": "ND",
                "serviceLevelDescription": "Onsite Service After Remote Diagnosis",
                "serviceLevelGroup": 5
            }
        ]),
        _ => json!([]),
    }
}

fn authorized(state: &MockState, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let status = state.fail_status.load(Ordering::SeqCst);
    if status != 0 {
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Err((code, Json(json!({ "error": "unavailable" }))));
    }

    let expected = format!("Bearer {}", TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_token" })))),
    }
}

fn requested_tags(params: &HashMap<String, String>, key: &str) -> Vec<String> {
    params
        .get(key)
        .map(|v| v.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

async fn token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.token_requests.fetch_add(1, Ordering::SeqCst);

    let grant = form.get("grant_type").map(String::as_str);
    let id = form.get("client_id").map(String::as_str);
    let secret = form.get("client_secret").map(String::as_str);

    match (grant, id, secret) {
        (Some("client_credentials"), Some(GOOD_ID), Some(GOOD_SECRET)) => (
            StatusCode::OK,
            Json(json!({ "access_token": TOKEN, "token_type": "Bearer", "expires_in": 3600 })),
        ),
        (Some("client_credentials"), Some("no-token"), _) => {
            (StatusCode::OK, Json(json!({ "token_type": "Bearer" })))
        }
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_client" }))),
    }
}

async fn assets(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&state, &headers)?;

    if let Some(raw) = params.get("servicetags") {
        state.header_requests.lock().unwrap().push(raw.clone());
    }

    let records: Vec<Value> = requested_tags(&params, "servicetags")
        .iter()
        .filter_map(|tag| header_record(tag))
        .collect();
    Ok(Json(Value::Array(records)))
}

async fn entitlements(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&state, &headers)?;

    let records: Vec<Value> = requested_tags(&params, "servicetags")
        .iter()
        .filter_map(|tag| {
            let mut record = header_record(tag)?;
            record["entitlements"] = entitlement_records(tag);
            Some(record)
        })
        .collect();
    Ok(Json(Value::Array(records)))
}

async fn components(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&state, &headers)?;

    let tag = params.get("servicetag").cloned().unwrap_or_default();
    Ok(Json(json!({ "serviceTag": tag, "components": [] })))
}

async fn summary(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&state, &headers)?;

    let tag = params.get("servicetag").cloned().unwrap_or_default();
    Ok(Json(json!({
        "serviceTag": tag,
        "entitlements": entitlement_records(&tag),
        "components": []
    })))
}
