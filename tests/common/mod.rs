//! In-process stand-in for the admin backend.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Food item the backend refuses to delete.
pub const LOCKED_FOOD_ID: &str = "1";

#[derive(Default)]
pub struct Backend {
    pub food: Mutex<Vec<Value>>,
    pub list_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub payment_calls: AtomicUsize,
    pub searches: Mutex<Vec<String>>,
    pub auth_headers: Mutex<Vec<Option<String>>>,
    pub request_ids: Mutex<Vec<String>>,
}

impl Backend {
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// POST and PATCH requests against `/food-items`.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn payment_calls(&self) -> usize {
        self.payment_calls.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().unwrap().clone()
    }

    pub fn request_ids(&self) -> Vec<String> {
        self.request_ids.lock().unwrap().clone()
    }

    fn record_headers(&self, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().push(auth);

        if let Some(id) = headers.get("x-request-id").and_then(|value| value.to_str().ok()) {
            self.request_ids.lock().unwrap().push(id.to_string());
        }
    }
}

/// Starts the backend on an ephemeral port and returns its base URL.
pub async fn spawn_backend() -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    *backend.food.lock().unwrap() = vec![
        json!({"id": 1, "name": "Masala Dosa", "price": 4.5}),
        json!({"id": 2, "name": "Idli", "price": 2.0}),
        json!({"id": 3, "name": "Fried Rice", "price": 6.0}),
    ];

    let app = Router::new()
        .route("/food-items", get(list_food).post(create_food))
        .route("/food-items/:id", patch(patch_food).delete(delete_food))
        .route("/roles", post(create_role))
        .route("/roles/:id", get(get_role))
        .route("/purchase-orders/:id/payment-status", patch(update_payment))
        .with_state(Arc::clone(&backend));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), backend)
}

async fn list_food(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    backend.record_headers(&headers);
    backend.list_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let food = backend.food.lock().unwrap().clone();
    let items: Vec<Value> = match params.get("search") {
        Some(query) => {
            backend.searches.lock().unwrap().push(query.clone());
            let needle = query.to_lowercase();
            food.into_iter()
                .filter(|item| {
                    item["name"]
                        .as_str()
                        .is_some_and(|name| name.to_lowercase().contains(&needle))
                })
                .collect()
        }
        None => food,
    };

    Json(json!({ "items": items }))
}

async fn create_food(
    State(backend): State<Arc<Backend>>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.write_calls.fetch_add(1, Ordering::SeqCst);
    let mut food = backend.food.lock().unwrap();
    let id = 100 + food.len() as i64;
    body["id"] = json!(id);
    food.push(body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn patch_food(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    backend.write_calls.fetch_add(1, Ordering::SeqCst);
    let mut food = backend.food.lock().unwrap();
    let item = food
        .iter_mut()
        .find(|item| item["id"].to_string() == id)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"detail": "Food item not found"})),
            )
        })?;

    if let (Some(fields), Some(changes)) = (item.as_object_mut(), patch.as_object()) {
        for (key, value) in changes {
            fields.insert(key.clone(), value.clone());
        }
    }
    Ok(Json(item.clone()))
}

async fn delete_food(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    if id == LOCKED_FOOD_ID {
        return Err((
            StatusCode::CONFLICT,
            Json(json!({"detail": "Food item is used by a recipe"})),
        ));
    }
    backend
        .food
        .lock()
        .unwrap()
        .retain(|item| item["id"].to_string() != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn create_role(Json(_body): Json<Value>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"detail": [
            {"loc": ["body", "name"], "msg": "field required"},
            {"loc": ["body", "permissions"], "msg": "value is not a valid list"}
        ]})),
    )
}

async fn get_role(Path(_id): Path<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": "Role not found"})),
    )
}

async fn update_payment(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    backend.payment_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "id": id,
        "order_number": format!("PO-{id}"),
        "total_amount": 500.0,
        "amount_paid": body.get("amount_paid").cloned().unwrap_or(json!(0.0)),
        "payment_status": body["payment_status"],
    }))
}
