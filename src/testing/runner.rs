//! Test runner implementation
//!
//! [`TestRunner::execute`] is the single place a request is issued, checked
//! against its expected status and counted. The storefront flows (login,
//! catalog, cart, checkout, ...) are built on top of it.

use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::api::types::{
    AddToCartRequest, CartItem, Category, CheckoutRequest, Credentials, EntityId, Identity,
    LoginRequest, Method, Order, Product, User, UserEnvelope,
};
use crate::api::{ApiClient, Session};
use crate::common::config::{Config, CredentialSet};
use crate::common::Result;

use super::body::DecodedBody;

/// Status every storefront endpoint answers with on success
pub const OK: u16 = 200;

/// Quantity used when a scenario doesn't name one
pub const DEFAULT_QUANTITY: u32 = 1;

/// Outcome of one request
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub name: String,
    pub method: Method,
    pub endpoint: String,
    pub expected_status: u16,
    /// None when the request never completed
    pub actual_status: Option<u16>,
    pub passed: bool,
    pub body: DecodedBody,
    /// Transport error, if any
    pub error: Option<String>,
}

/// What `execute` hands back to the caller
#[derive(Debug, Clone)]
pub struct Execution {
    pub passed: bool,
    pub body: DecodedBody,
}

impl Execution {
    /// Decoded body of a passing call; `{}` otherwise
    pub fn json(&self) -> Value {
        if self.passed {
            self.body.value()
        } else {
            json!({})
        }
    }

    /// Typed body of a passing call
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        if self.passed {
            self.body.parse()
        } else {
            None
        }
    }
}

/// A collection response
///
/// `len` is the number of elements the server sent; `items` holds the ones
/// that decoded, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub len: usize,
    pub items: Vec<T>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            len: 0,
            items: Vec::new(),
        }
    }
}

impl<T: DeserializeOwned> Listing<T> {
    /// Decode element by element; anything but an array is an empty listing
    pub fn from_value(value: &Value) -> Self {
        let elements = value.as_array().map(Vec::as_slice).unwrap_or_default();
        Self {
            len: elements.len(),
            items: elements
                .iter()
                .filter_map(|e| T::deserialize(e).ok())
                .collect(),
        }
    }
}

fn payload<T: Serialize>(body: &T) -> Value {
    serde_json::to_value(body).unwrap_or_else(|_| json!({}))
}

/// Issues requests against one storefront and keeps score
pub struct TestRunner {
    client: ApiClient,
    credentials: CredentialSet,
    tests_run: usize,
    tests_passed: usize,
    results: Vec<StepResult>,
}

impl TestRunner {
    pub fn new(client: ApiClient, credentials: CredentialSet) -> Self {
        Self {
            client,
            credentials,
            tests_run: 0,
            tests_passed: 0,
            results: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ApiClient::new(&config.target)?;
        Ok(Self::new(client, config.credentials.clone()))
    }

    pub fn tests_run(&self) -> usize {
        self.tests_run
    }

    pub fn tests_passed(&self) -> usize {
        self.tests_passed
    }

    /// Every request result so far, in issue order
    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub fn all_passed(&self) -> bool {
        self.tests_passed == self.tests_run
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }

    /// Run a single API test
    ///
    /// Never fails: transport errors are recorded as a failed result.
    pub async fn execute(
        &mut self,
        name: &str,
        method: Method,
        endpoint: &str,
        expected_status: u16,
        payload: Option<Value>,
    ) -> Execution {
        self.tests_run += 1;
        println!("  {} Testing {}...", "→".cyan(), name);

        let result = match self.client.send(method, endpoint, payload.as_ref()).await {
            Ok(response) => {
                let body = DecodedBody::from_text(&response.body);
                let passed = response.status == expected_status;
                if passed {
                    self.tests_passed += 1;
                    println!("    {} Passed - Status: {}", "✓".green(), response.status);
                    if !body.is_json() {
                        debug!(step = name, endpoint, "passing response has no JSON body");
                    }
                } else {
                    println!(
                        "    {} Failed - Expected {}, got {}",
                        "✗".red(),
                        expected_status,
                        response.status
                    );
                    println!("    Response: {}", body.diagnostic().dimmed());
                }
                StepResult {
                    name: name.to_string(),
                    method,
                    endpoint: endpoint.to_string(),
                    expected_status,
                    actual_status: Some(response.status),
                    passed,
                    body,
                    error: None,
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(step = name, %method, endpoint, error = %message, "request failed");
                println!("    {} Failed - Error: {}", "✗".red(), message);
                StepResult {
                    name: name.to_string(),
                    method,
                    endpoint: endpoint.to_string(),
                    expected_status,
                    actual_status: None,
                    passed: false,
                    body: DecodedBody::Empty,
                    error: Some(message),
                }
            }
        };

        let execution = Execution {
            passed: result.passed,
            body: result.body.clone(),
        };
        self.results.push(result);
        execution
    }

    // === Auth ===

    /// Log in as one of the configured identities
    pub async fn login(&mut self, identity: Identity) -> Option<User> {
        let credentials = self.credentials.get(identity).clone();
        self.login_with(&credentials).await
    }

    /// Log in; succeeds only if the response carries a user
    pub async fn login_with(&mut self, credentials: &Credentials) -> Option<User> {
        let body = payload(&LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
        });
        let execution = self
            .execute("Login", Method::Post, "auth/login", OK, Some(body))
            .await;

        match execution.parse::<UserEnvelope>().and_then(|env| env.user) {
            Some(user) => {
                println!(
                    "    Logged in as {} with role {}",
                    user.email.bold(),
                    user.role_or_unknown()
                );
                self.client.session_mut().sign_in(&user);
                Some(user)
            }
            None => {
                if execution.passed {
                    println!("    {} Login response carried no user", "✗".red());
                }
                None
            }
        }
    }

    /// The user the session is authenticated as, if the server says so
    pub async fn current_user(&mut self) -> Option<User> {
        let execution = self
            .execute("Get Current User", Method::Get, "auth/me", OK, None)
            .await;
        let user = execution.parse::<UserEnvelope>().and_then(|env| env.user)?;
        println!("    Current user: {}", user.email.bold());
        Some(user)
    }

    pub async fn logout(&mut self) -> bool {
        let execution = self
            .execute("Logout", Method::Post, "auth/logout", OK, None)
            .await;
        if execution.passed {
            if let Some(previous) = self.client.session_mut().sign_out() {
                debug!(email = %previous.email, "signed out");
            }
        }
        execution.passed
    }

    /// Check that the server no longer recognises the session
    pub async fn expect_signed_out(&mut self) -> bool {
        self.execute("Session Invalidated", Method::Get, "auth/me", 401, None)
            .await
            .passed
    }

    // === Admin ===

    /// Hit the admin-only endpoints, stopping at the first failure
    pub async fn admin_access_check(&mut self) -> bool {
        if !self
            .execute("Admin Stats", Method::Get, "admin/stats", OK, None)
            .await
            .passed
        {
            return false;
        }
        self.execute("Admin Orders", Method::Get, "admin/orders", OK, None)
            .await
            .passed
    }

    // === Catalog ===

    pub async fn categories(&mut self) -> Option<Listing<Category>> {
        self.fetch_list("Get Categories", "categories").await
    }

    pub async fn products(&mut self) -> Option<Listing<Product>> {
        self.fetch_list("Get Products", "products").await
    }

    /// GET a collection; None if the call failed
    async fn fetch_list<T: DeserializeOwned>(
        &mut self,
        name: &str,
        endpoint: &str,
    ) -> Option<Listing<T>> {
        let execution = self.execute(name, Method::Get, endpoint, OK, None).await;
        if !execution.passed {
            return None;
        }
        let body = execution.json();
        if !body.is_array() {
            warn!(endpoint, "response is not a list");
        }
        let listing = Listing::from_value(&body);
        if listing.items.len() < listing.len {
            warn!(
                endpoint,
                len = listing.len,
                decoded = listing.items.len(),
                "some elements did not match the expected shape"
            );
        }
        Some(listing)
    }

    // === Cart ===

    pub async fn add_to_cart(&mut self, product_id: &EntityId, quantity: u32) -> Option<CartItem> {
        let body = payload(&AddToCartRequest {
            product_id,
            quantity,
        });
        let execution = self
            .execute("Add to Cart", Method::Post, "cart", OK, Some(body))
            .await;
        execution
            .passed
            .then(|| execution.parse().unwrap_or_default())
    }

    pub async fn cart(&mut self) -> Option<Listing<CartItem>> {
        self.fetch_list("Get Cart", "cart").await
    }

    pub async fn clear_cart(&mut self) -> bool {
        self.execute("Clear Cart", Method::Delete, "cart", OK, None)
            .await
            .passed
    }

    // === Orders ===

    /// Place an order from the current cart
    pub async fn checkout(&mut self, delivery_address: &str, notes: &str) -> Option<Order> {
        let body = payload(&CheckoutRequest {
            delivery_address,
            notes,
        });
        let execution = self
            .execute("Checkout", Method::Post, "orders", OK, Some(body))
            .await;
        execution
            .passed
            .then(|| execution.parse().unwrap_or_default())
    }

    pub async fn orders(&mut self) -> Option<Listing<Order>> {
        self.fetch_list("Get Orders", "orders").await
    }

    pub async fn order(&mut self, id: &EntityId) -> Option<Order> {
        let endpoint = format!("orders/{}", id);
        let execution = self
            .execute("Get Order", Method::Get, &endpoint, OK, None)
            .await;
        execution
            .passed
            .then(|| execution.parse().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::TargetConfig;

    fn unreachable_runner() -> TestRunner {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let target = TargetConfig {
            base_url: format!("http://127.0.0.1:{}", port),
            api_prefix: "api".to_string(),
            timeout_secs: Some(5),
        };
        TestRunner::new(ApiClient::new(&target).unwrap(), CredentialSet::default())
    }

    #[test]
    fn test_execution_json_hides_failed_bodies() {
        let failed = Execution {
            passed: false,
            body: DecodedBody::from_text(r#"{"message":"Invalid credentials"}"#),
        };
        assert_eq!(failed.json(), json!({}));
        assert!(failed.parse::<Value>().is_none());

        let passed = Execution {
            passed: true,
            body: DecodedBody::from_text("not json"),
        };
        assert_eq!(passed.json(), json!({}));
    }

    #[test]
    fn test_listing_counts_every_element() {
        let products: Listing<Product> =
            Listing::from_value(&json!([{"id": 1}, {"name": "no id"}, {"id": 3}]));
        assert_eq!(products.len, 3);
        let ids: Vec<EntityId> = products.items.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![EntityId::Number(1), EntityId::Number(3)]);

        let categories: Listing<Category> = Listing::from_value(&json!([{"id": 1.5}, {"id": 2}]));
        assert_eq!(categories.len, 2);
        assert_eq!(categories.items.len(), 1);

        let not_a_list: Listing<Order> = Listing::from_value(&json!({"message": "ok"}));
        assert_eq!(not_a_list, Listing::default());
    }

    #[tokio::test]
    async fn test_transport_error_is_a_failed_result() {
        let mut runner = unreachable_runner();
        let execution = runner
            .execute("Get Products", Method::Get, "products", OK, None)
            .await;

        assert!(!execution.passed);
        assert_eq!(execution.json(), json!({}));
        assert_eq!(runner.tests_run(), 1);
        assert_eq!(runner.tests_passed(), 0);

        let result = &runner.results()[0];
        assert!(result.actual_status.is_none());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_login_failure_without_server() {
        let mut runner = unreachable_runner();
        assert!(runner.login(Identity::Admin).await.is_none());
        assert!(runner.session().identity().is_none());
        assert!(!runner.all_passed());
    }
}
