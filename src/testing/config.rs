//! Scenario definitions
//!
//! A scenario is an ordered list of named steps. The built-in storefront run
//! is one; others can be loaded from YAML files.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::api::types::{EntityId, Identity, Method};
use crate::common::{Error, Result};

use super::runner::{DEFAULT_QUANTITY, OK};

/// A complete scenario, either built in or loaded from a YAML file
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Name of the scenario
    pub name: String,
    /// Optional description of what the scenario verifies
    #[serde(default)]
    pub description: Option<String>,
    /// Steps, run in order
    pub steps: Vec<ScenarioStep>,
}

/// One named step
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ScenarioStep {
    /// Heading printed in the transcript
    pub title: String,
    #[serde(flatten)]
    pub action: StepAction,
    /// What a failure of this step does to the rest of the run
    #[serde(default)]
    pub on_failure: OnFailure,
}

impl ScenarioStep {
    pub fn new(title: &str, action: StepAction) -> Self {
        Self {
            title: title.to_string(),
            action,
            on_failure: OnFailure::Continue,
        }
    }

    /// Make this step an abort gate
    pub fn gate(mut self) -> Self {
        self.on_failure = OnFailure::Abort;
        self
    }

    pub fn is_gate(&self) -> bool {
        self.on_failure == OnFailure::Abort
    }
}

/// Failure policy of a step
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnFailure {
    /// Record the failure and keep going
    #[default]
    Continue,
    /// Stop the whole run
    Abort,
}

/// What a step does
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    /// Log in; requires a user object in the response
    Login { identity: Identity },
    /// Fetch the session's user; fails if none is returned
    CurrentUser,
    /// Admin stats then admin orders, short-circuiting
    AdminAccess,
    Categories,
    /// Fetch products and keep them for later steps
    Products,
    /// Add a product to the cart
    AddToCart {
        /// Product to add; the first fetched product when omitted
        #[serde(default)]
        product_id: Option<EntityId>,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
    GetCart,
    ClearCart,
    /// Place an order; the created order is kept for later steps
    Checkout {
        #[serde(default = "default_delivery_address")]
        delivery_address: String,
        #[serde(default = "default_notes")]
        notes: String,
    },
    Orders,
    /// Fetch the order created by the last checkout
    OrderDetail,
    Logout,
    /// `auth/me` must be rejected with 401
    ExpectSignedOut,
    /// Any request with an explicit expected status
    Request {
        method: Method,
        endpoint: String,
        #[serde(default = "default_expected_status")]
        expected_status: u16,
        #[serde(default)]
        payload: Option<Value>,
    },
}

fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

fn default_delivery_address() -> String {
    "Test Delivery Address".to_string()
}

fn default_notes() -> String {
    "Test order".to_string()
}

fn default_expected_status() -> u16 {
    OK
}

/// Every key a step may carry, across all actions
///
/// Steps are flattened, so serde can't reject a misspelled key on its own.
const STEP_KEYS: &[&str] = &[
    "title",
    "on_failure",
    "action",
    "identity",
    "product_id",
    "quantity",
    "delivery_address",
    "notes",
    "method",
    "endpoint",
    "expected_status",
    "payload",
];

/// Parse scenario YAML, refusing step keys no action knows about
fn parse_yaml(content: &str) -> std::result::Result<Scenario, String> {
    let doc: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;

    let steps = doc
        .get("steps")
        .and_then(serde_yaml::Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for (i, step) in steps.iter().enumerate() {
        let Some(map) = step.as_mapping() else {
            continue;
        };
        for key in map.keys() {
            let known = key.as_str().is_some_and(|k| STEP_KEYS.contains(&k));
            if !known {
                return Err(format!(
                    "step {} has unknown key {}",
                    i + 1,
                    serde_yaml::to_string(key)
                        .map(|k| k.trim().to_string())
                        .unwrap_or_else(|_| "?".to_string())
                ));
            }
        }
    }

    serde_yaml::from_value(doc).map_err(|e| e.to_string())
}

impl Scenario {
    /// The full storefront run: admin checks, catalog, then a customer order
    pub fn storefront() -> Self {
        use StepAction::*;

        Self {
            name: "Storefront API".to_string(),
            description: Some(
                "Admin and customer sessions across catalog, cart, checkout and orders"
                    .to_string(),
            ),
            steps: vec![
                ScenarioStep::new(
                    "Admin Login",
                    Login {
                        identity: Identity::Admin,
                    },
                )
                .gate(),
                ScenarioStep::new("Get Current User (Admin)", CurrentUser).gate(),
                ScenarioStep::new("Admin Access", AdminAccess),
                ScenarioStep::new("Categories", Categories),
                ScenarioStep::new("Products", Products),
                ScenarioStep::new("Admin Logout", Logout),
                ScenarioStep::new(
                    "Customer Login",
                    Login {
                        identity: Identity::Customer,
                    },
                )
                .gate(),
                ScenarioStep::new("Get Current User (Customer)", CurrentUser).gate(),
                ScenarioStep::new(
                    "Add to Cart",
                    AddToCart {
                        product_id: None,
                        quantity: default_quantity(),
                    },
                ),
                ScenarioStep::new("Get Cart", GetCart),
                ScenarioStep::new(
                    "Checkout",
                    Checkout {
                        delivery_address: default_delivery_address(),
                        notes: default_notes(),
                    },
                ),
                ScenarioStep::new("Get Orders", Orders),
                ScenarioStep::new("Customer Logout", Logout),
            ],
        }
    }

    /// Load and validate a scenario from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        let scenario = parse_yaml(&content).map_err(|error| Error::ScenarioParse {
            path: path.display().to_string(),
            error,
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reject scenarios that could never run meaningfully
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::Scenario(format!(
                "scenario '{}' has no steps",
                self.name
            )));
        }

        for (i, step) in self.steps.iter().enumerate() {
            if step.title.trim().is_empty() {
                return Err(Error::Scenario(format!("step {} has an empty title", i + 1)));
            }
            if let StepAction::Request {
                endpoint,
                expected_status,
                ..
            } = &step.action
            {
                if endpoint.trim().is_empty() {
                    return Err(Error::Scenario(format!(
                        "step {} '{}' has an empty endpoint",
                        i + 1,
                        step.title
                    )));
                }
                if !(100..=599).contains(expected_status) {
                    return Err(Error::Scenario(format!(
                        "step {} '{}' expects invalid status {}",
                        i + 1,
                        step.title,
                        expected_status
                    )));
                }
            }
        }

        Ok(())
    }
}
