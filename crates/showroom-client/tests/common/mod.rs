//! Shared fixtures for the HTTP-level tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use showroom_client::{AppContext, ClientConfig, MemoryStorage, SessionStorage, ShowroomApi};
use std::sync::Arc;
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub ctx: AppContext,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with(Arc::new(MemoryStorage::new())).await
    }

    /// Starts against a session storage that may already hold a session.
    pub async fn start_with(storage: Arc<dyn SessionStorage>) -> Self {
        let server = MockServer::start().await;
        let config = ClientConfig::for_base_url(format!("{}/api/v1", server.uri()));
        let ctx = AppContext::with_storage(config, storage).unwrap();
        Harness { server, ctx }
    }

    pub fn api(&self) -> &ShowroomApi {
        &self.ctx.api
    }
}

pub fn api_path(rest: &str) -> String {
    format!("/api/v1/{}", rest)
}

pub fn tokens(access: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": format!("{}-refresh", access),
        "token_type": "bearer"
    })
}

pub fn profile(role: &str) -> Value {
    json!({
        "id": 1,
        "email": "staff@example.com",
        "username": "staff",
        "user_role": role,
        "is_active": true,
        "full_name": "Showroom Staff"
    })
}

pub fn branch(id: i64, name: &str, city: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "city": city,
        "code": format!("BR{}", id),
        "created_at": "2024-01-01T00:00:00",
        "updated_at": "2024-01-01T00:00:00"
    })
}

pub fn stock(id: i64, quantity: i64, reserved: i64, branch: &str) -> Value {
    json!({
        "id": id,
        "model_name": format!("Model {}", id),
        "variant": "VX",
        "color": "White",
        "quantity": quantity,
        "reserved": reserved,
        "branch_name": branch,
        "created_at": "2024-01-01T00:00:00",
        "updated_at": "2024-01-01T00:00:00"
    })
}

pub fn sale(id: i64, amount: &str, received: bool, created_at: &str) -> Value {
    json!({
        "id": id,
        "customer_id": 1,
        "vehicle_stock_id": 1,
        "vehicle_name": "City",
        "variant": "VX",
        "color": "White",
        "payment_mode": "CASH",
        "amount_received": amount,
        "is_payment_received": received,
        "branch_name": "Andheri",
        "created_at": created_at,
        "updated_at": created_at
    })
}

pub fn customer(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "phone": "9800000000",
        "created_at": "2024-01-01T00:00:00",
        "updated_at": "2024-01-01T00:00:00"
    })
}

pub fn import_job(id: i64, file: &str) -> Value {
    json!({
        "id": id,
        "source_filename": file,
        "status": "queued",
        "summary": { "processed_rows": 0, "total_rows": 40 },
        "created_at": "2024-01-01T00:00:00",
        "updated_at": "2024-01-01T00:00:00"
    })
}
