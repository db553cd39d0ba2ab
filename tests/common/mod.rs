#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use fc_inventory_admin::prelude::*;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ANON_KEY: &str = "test-anon-key";
pub const SERVICE_KEY: &str = "test-service-key";
pub const APP_URL: &str = "http://localhost:3000";
pub const TIMESTAMP: &str = "2025-08-21T15:30:00+00:00";

pub fn config(server: &MockServer) -> AppConfig {
    AppConfig::new(&server.uri(), ANON_KEY, SERVICE_KEY, APP_URL).unwrap()
}

/// Service plus the admin paths its revalidate hook was told about
pub fn service(server: &MockServer) -> (AdminService, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let service = AdminService::new(config(server))
        .unwrap()
        .with_revalidate(move |path: &str| sink.lock().unwrap().push(path.to_string()));
    (service, seen)
}

pub fn no_rows() -> ResponseTemplate {
    ResponseTemplate::new(406).set_body_json(json!({
        "code": "PGRST116",
        "details": "The result contains 0 rows",
        "hint": null,
        "message": "JSON object requested, multiple (or no) rows returned"
    }))
}

pub fn unique_violation(constraint: &str) -> ResponseTemplate {
    ResponseTemplate::new(409).set_body_json(json!({
        "code": "23505",
        "details": null,
        "hint": null,
        "message": format!("duplicate key value violates unique constraint \"{}\"", constraint)
    }))
}

pub fn user_json(id: Uuid, email: &str) -> Value {
    json!({
        "id": id,
        "aud": "authenticated",
        "role": "authenticated",
        "email": email,
        "app_metadata": { "provider": "email" },
        "user_metadata": {},
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP
    })
}

pub fn store_json(id: Uuid, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "max_skus": 1000,
        "max_brands": 50,
        "max_inventory": 10000,
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP
    })
}

pub fn product_json(id: Uuid, sku: &str, variants: &[(&str, &str)]) -> Value {
    let variants: Vec<Value> = variants
        .iter()
        .map(|(sku_child, size)| {
            json!({
                "id": Uuid::new_v4(),
                "product_id": id,
                "sku_child": sku_child,
                "size": size,
                "created_at": TIMESTAMP,
                "updated_at": TIMESTAMP
            })
        })
        .collect();
    json!({
        "id": id,
        "sku_parent": sku,
        "brand": "Basement",
        "style": "Camisa Oxford",
        "price": 150000.99,
        "cost": 80000,
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP,
        "variants": variants
    })
}

pub fn profile_json(id: Uuid, email: &str, role: &str, store: Option<(Uuid, &str)>) -> Value {
    json!({
        "id": id,
        "email": email,
        "role": role,
        "store_id": store.map(|(id, _)| id),
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP,
        "stores": store.map(|(id, name)| json!({ "id": id, "name": name }))
    })
}

/// Register a caller: the auth API accepts `token` as `user_id`, whose
/// profile has `role` (no profile row when `None`).
pub async fn mount_caller(server: &MockServer, token: &str, user_id: Uuid, role: Option<&str>) {
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(user_id, "caller@example.com")))
        .mount(server)
        .await;

    let response = match role {
        Some(role) => ResponseTemplate::new(200).set_body_json(json!({ "role": role })),
        None => no_rows(),
    };
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("select", "role"))
        .and(query_param("id", format!("eq.{}", user_id).as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn admin_caller(server: &MockServer) -> (Caller, Uuid) {
    let id = Uuid::new_v4();
    mount_caller(server, "admin-token", id, Some("admin")).await;
    (Caller::bearer("admin-token"), id)
}

pub async fn promotora_caller(server: &MockServer) -> (Caller, Uuid) {
    let id = Uuid::new_v4();
    mount_caller(server, "promotora-token", id, Some("promotora")).await;
    (Caller::bearer("promotora-token"), id)
}

/// Fail the test if any `verb` request reaches `route`
pub async fn forbid_writes(server: &MockServer, verb: &str, route: &str) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}
