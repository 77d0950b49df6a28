//! In-process mock storefront for integration tests
//!
//! Implements the subset of the storefront API the harness exercises, with
//! cookie sessions, admin gating, a per-user cart and orders. Knobs in
//! [`MockOptions`] make it misbehave in specific ways.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// (id, email, password, role)
const ACCOUNTS: [(i64, &str, &str, &str); 2] = [
    (1, "admin@hyperpure.com", "admin123", "admin"),
    (2, "customer@example.com", "customer123", "customer"),
];

/// Ways the mock can deviate from a conforming server
#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// Answer a valid login with 200 but no `user` field
    pub login_omits_user: bool,
    /// Serve an empty product list
    pub empty_catalog: bool,
    /// Mix elements without a usable id into the catalog lists
    pub irregular_catalog: bool,
    /// Answer `/auth/me` with 200 but no `user` for this role
    pub me_omits_user_for: Option<&'static str>,
    /// Refuse logins of this role with 401
    pub reject_login_for: Option<&'static str>,
}

#[derive(Default)]
struct StoreState {
    options: MockOptions,
    /// session id -> index into ACCOUNTS
    sessions: HashMap<String, usize>,
    next_session: u64,
    /// user id -> cart lines
    carts: HashMap<i64, Vec<Value>>,
    next_cart_item: i64,
    /// (user id, order)
    orders: Vec<(i64, Value)>,
    /// "METHOD /path" of every request, in arrival order
    log: Vec<String>,
}

type Shared = Arc<Mutex<StoreState>>;

/// A running mock server
pub struct MockStorefront {
    pub base_url: String,
    state: Shared,
}

impl MockStorefront {
    pub async fn start() -> Self {
        Self::start_with(MockOptions::default()).await
    }

    pub async fn start_with(options: MockOptions) -> Self {
        let state: Shared = Arc::new(Mutex::new(StoreState {
            options,
            ..StoreState::default()
        }));

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .route("/api/auth/logout", post(logout))
            .route("/api/admin/stats", get(admin_stats))
            .route("/api/admin/orders", get(admin_orders))
            .route("/api/categories", get(categories))
            .route("/api/products", get(products))
            .route("/api/cart", get(cart).post(add_to_cart).delete(clear_cart))
            .route("/api/orders", get(orders).post(checkout))
            .route("/api/orders/:id", get(order))
            .route("/api/health", get(health))
            .route("/api/ping", get(ping))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock storefront");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock storefront crashed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Requests received so far, as "METHOD /path"
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn active_sessions(&self) -> usize {
        self.state.lock().unwrap().sessions.len()
    }
}

fn user_json(idx: usize) -> Value {
    let (id, email, _, role) = ACCOUNTS[idx];
    json!({
        "id": id,
        "email": email,
        "firstName": "Test",
        "lastName": role,
        "businessName": "HyperPure Test",
        "role": role,
    })
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    let cookie = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("sid="))
        .map(str::to_string)
        .next()
}

impl StoreState {
    fn account(&self, headers: &HeaderMap) -> Option<usize> {
        session_id(headers).and_then(|sid| self.sessions.get(&sid).copied())
    }

    fn user_id(&self, headers: &HeaderMap) -> Option<i64> {
        self.account(headers).map(|idx| ACCOUNTS[idx].0)
    }

    fn is_admin(&self, headers: &HeaderMap) -> bool {
        self.account(headers)
            .map(|idx| ACCOUNTS[idx].3 == "admin")
            .unwrap_or(false)
    }
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("POST /api/auth/login".to_string());

    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let Some(idx) = ACCOUNTS
        .iter()
        .position(|(_, e, p, _)| *e == email && *p == password)
    else {
        return message(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };
    if s.options.reject_login_for == Some(ACCOUNTS[idx].3) {
        return message(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    s.next_session += 1;
    let sid = format!("s{}", s.next_session);
    s.sessions.insert(sid.clone(), idx);

    let body = if s.options.login_omits_user {
        json!({ "message": "Logged in" })
    } else {
        json!({ "user": user_json(idx) })
    };
    (
        [(header::SET_COOKIE, format!("sid={}; Path=/; HttpOnly", sid))],
        Json(body),
    )
        .into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("GET /api/auth/me".to_string());
    match s.account(&headers) {
        Some(idx) if s.options.me_omits_user_for == Some(ACCOUNTS[idx].3) => {
            Json(json!({ "message": "ok" })).into_response()
        }
        Some(idx) => Json(json!({ "user": user_json(idx) })).into_response(),
        None => message(StatusCode::UNAUTHORIZED, "Authentication required"),
    }
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("POST /api/auth/logout".to_string());
    if let Some(sid) = session_id(&headers) {
        s.sessions.remove(&sid);
    }
    (
        [(header::SET_COOKIE, "sid=; Path=/; Max-Age=0".to_string())],
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response()
}

async fn admin_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("GET /api/admin/stats".to_string());
    if !s.is_admin(&headers) {
        return message(StatusCode::FORBIDDEN, "Admin access required");
    }
    Json(json!({
        "totalOrders": s.orders.len(),
        "totalProducts": 2,
        "totalCustomers": 1,
    }))
    .into_response()
}

async fn admin_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("GET /api/admin/orders".to_string());
    if !s.is_admin(&headers) {
        return message(StatusCode::FORBIDDEN, "Admin access required");
    }
    let all: Vec<Value> = s.orders.iter().map(|(_, o)| o.clone()).collect();
    Json(Value::Array(all)).into_response()
}

async fn categories(State(state): State<Shared>) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("GET /api/categories".to_string());
    if s.options.irregular_catalog {
        return Json(json!([{ "id": 1.5 }, { "id": 2, "name": "Fruits" }])).into_response();
    }
    Json(json!([
        { "id": 1, "name": "Vegetables", "icon": "carrot", "isActive": true },
        { "id": 2, "name": "Fruits", "icon": "apple", "isActive": true },
    ]))
    .into_response()
}

async fn products(State(state): State<Shared>) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("GET /api/products".to_string());
    if s.options.empty_catalog {
        return Json(json!([])).into_response();
    }
    if s.options.irregular_catalog {
        return Json(json!([
            { "name": "no id" },
            { "id": 1, "name": "Tomato" },
            "not an object",
        ]))
        .into_response();
    }
    Json(json!([
        { "id": 1, "name": "Tomato", "categoryId": 1, "price": "40.00", "unit": "kg" },
        { "id": 2, "name": "Banana", "categoryId": 2, "price": "60.00", "unit": "dozen" },
    ]))
    .into_response()
}

async fn cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("GET /api/cart".to_string());
    let Some(user) = s.user_id(&headers) else {
        return message(StatusCode::UNAUTHORIZED, "Authentication required");
    };
    let items = s.carts.get(&user).cloned().unwrap_or_default();
    Json(Value::Array(items)).into_response()
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("POST /api/cart".to_string());
    let Some(user) = s.user_id(&headers) else {
        return message(StatusCode::UNAUTHORIZED, "Authentication required");
    };
    if body.get("productId").is_none() {
        return message(StatusCode::BAD_REQUEST, "productId is required");
    }

    s.next_cart_item += 1;
    let item = json!({
        "id": s.next_cart_item,
        "userId": user,
        "productId": body["productId"],
        "quantity": body.get("quantity").cloned().unwrap_or(json!(1)),
    });
    s.carts.entry(user).or_default().push(item.clone());
    Json(item).into_response()
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("DELETE /api/cart".to_string());
    let Some(user) = s.user_id(&headers) else {
        return message(StatusCode::UNAUTHORIZED, "Authentication required");
    };
    s.carts.remove(&user);
    message(StatusCode::OK, "Cart cleared")
}

async fn checkout(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("POST /api/orders".to_string());
    let Some(user) = s.user_id(&headers) else {
        return message(StatusCode::UNAUTHORIZED, "Authentication required");
    };
    if s.carts.get(&user).map(Vec::is_empty).unwrap_or(true) {
        return message(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    let seq = 1001 + s.orders.len();
    let order = json!({
        "id": format!("ORD-{}", seq),
        "userId": user,
        "orderNumber": format!("HP{}", seq),
        "status": "pending",
        "totalAmount": "40",
        "deliveryAddress": body["deliveryAddress"],
        "notes": body["notes"],
    });
    s.orders.push((user, order.clone()));
    s.carts.remove(&user);
    Json(order).into_response()
}

async fn orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push("GET /api/orders".to_string());
    let Some(user) = s.user_id(&headers) else {
        return message(StatusCode::UNAUTHORIZED, "Authentication required");
    };
    let mine: Vec<Value> = s
        .orders
        .iter()
        .filter(|(owner, _)| *owner == user)
        .map(|(_, o)| o.clone())
        .collect();
    Json(Value::Array(mine)).into_response()
}

async fn order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.log.push(format!("GET /api/orders/{}", id));
    let Some(user) = s.user_id(&headers) else {
        return message(StatusCode::UNAUTHORIZED, "Authentication required");
    };
    match s.orders.iter().find(|(_, o)| o["id"] == json!(id)) {
        Some((owner, order)) if *owner == user => Json(order.clone()).into_response(),
        Some(_) => message(StatusCode::FORBIDDEN, "Access denied"),
        None => message(StatusCode::NOT_FOUND, "Order not found"),
    }
}

/// Plain-text body, not JSON
async fn health(State(state): State<Shared>) -> Response {
    state.lock().unwrap().log.push("GET /api/health".to_string());
    "ok".into_response()
}

/// Success with no body at all
async fn ping(State(state): State<Shared>) -> Response {
    state.lock().unwrap().log.push("GET /api/ping".to_string());
    StatusCode::OK.into_response()
}
