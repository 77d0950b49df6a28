//! Scenario driver
//!
//! Walks a [`Scenario`] step by step, threading fixture artifacts (fetched
//! products, the created order, ...) from one step to the next. A failing
//! abort gate ends the run; any other failure is recorded and the next step
//! still runs.

use colored::Colorize;
use tracing::{info, warn};

use crate::api::types::{CartItem, Category, EntityId, Order, Product, User};

use super::config::{Scenario, ScenarioStep, StepAction};
use super::report::RunReport;
use super::runner::{Listing, TestRunner};
use super::state::StepState;

/// Artifacts produced by earlier steps, local to one run
#[derive(Debug, Default)]
pub struct ScenarioContext {
    pub current_user: Option<User>,
    pub categories: Listing<Category>,
    pub products: Listing<Product>,
    pub cart: Listing<CartItem>,
    /// Product the last successful add-to-cart used
    pub product_added: Option<EntityId>,
    /// Order returned by the last successful checkout
    pub order: Option<Order>,
}

/// How a single step ended, before the failure policy is applied
#[derive(Debug, PartialEq)]
enum Outcome {
    Passed,
    Failed(String),
    Skipped(String),
}

impl Outcome {
    fn from_check(ok: bool, reason: &str) -> Self {
        if ok {
            Outcome::Passed
        } else {
            Outcome::Failed(reason.to_string())
        }
    }
}

/// Run every step of `scenario` in order
pub async fn run_scenario(runner: &mut TestRunner, scenario: &Scenario) -> RunReport {
    println!(
        "\n{} {}",
        "Running Scenario:".blue().bold(),
        scenario.name.white().bold()
    );
    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }
    info!(
        scenario = %scenario.name,
        target = %runner.client().api_root(),
        steps = scenario.steps.len(),
        "starting run"
    );

    let total = scenario.steps.len();
    let mut states: Vec<StepState> = scenario
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| StepState::new(i, &step.title))
        .collect();
    let mut ctx = ScenarioContext::default();
    let mut aborted = false;

    for (step, state) in scenario.steps.iter().zip(states.iter_mut()) {
        println!(
            "\n{} {}",
            format!("[{}/{}]", state.index + 1, total).dimmed(),
            step.title.cyan().bold()
        );

        let before = runner.tests_run();
        state.start();
        let outcome = perform(runner, step, &mut ctx).await;
        state.requests = runner.tests_run() - before;

        match outcome {
            Outcome::Passed => state.pass(),
            Outcome::Skipped(reason) => {
                println!("  {} Skipped: {}", "↷".yellow(), reason);
                state.skip(reason);
            }
            Outcome::Failed(reason) if step.is_gate() => {
                println!("  {} {}, stopping run", "⊘".red().bold(), reason);
                warn!(step = %step.title, %reason, "abort gate failed");
                state.abort(reason);
                aborted = true;
                break;
            }
            Outcome::Failed(reason) => {
                println!("  {} {}", "✗".red(), reason);
                state.fail(reason);
            }
        }
    }

    let report = RunReport::new(scenario, &states, runner, &ctx, aborted);
    report.print_summary();
    report
}

async fn perform(
    runner: &mut TestRunner,
    step: &ScenarioStep,
    ctx: &mut ScenarioContext,
) -> Outcome {
    match &step.action {
        StepAction::Login { identity } => match runner.login(*identity).await {
            Some(user) => {
                ctx.current_user = Some(user);
                Outcome::Passed
            }
            None => Outcome::Failed(format!("{} login failed", identity)),
        },

        StepAction::CurrentUser => match runner.current_user().await {
            Some(user) => {
                ctx.current_user = Some(user);
                Outcome::Passed
            }
            None => Outcome::Failed("failed to get current user info".to_string()),
        },

        StepAction::AdminAccess => Outcome::from_check(
            runner.admin_access_check().await,
            "admin access check failed",
        ),

        StepAction::Categories => match runner.categories().await {
            Some(categories) => {
                println!("  {} Found {} categories", "✓".green(), categories.len);
                ctx.categories = categories;
                Outcome::Passed
            }
            None => Outcome::Failed("failed to get categories".to_string()),
        },

        StepAction::Products => match runner.products().await {
            Some(products) => {
                println!("  {} Found {} products", "✓".green(), products.len);
                ctx.products = products;
                Outcome::Passed
            }
            None => Outcome::Failed("failed to get products".to_string()),
        },

        StepAction::AddToCart {
            product_id,
            quantity,
        } => {
            let chosen = product_id
                .clone()
                .or_else(|| ctx.products.items.first().map(|p| p.id.clone()));
            let Some(id) = chosen else {
                let reason = if ctx.products.len == 0 {
                    "no products were fetched"
                } else {
                    "no fetched product carries a usable id"
                };
                return Outcome::Skipped(reason.to_string());
            };
            match runner.add_to_cart(&id, *quantity).await {
                Some(_) => {
                    ctx.product_added = Some(id);
                    Outcome::Passed
                }
                None => Outcome::Failed("failed to add product to cart".to_string()),
            }
        }

        StepAction::GetCart => match runner.cart().await {
            Some(items) => {
                println!("  {} Cart has {} items", "✓".green(), items.len);
                ctx.cart = items;
                Outcome::Passed
            }
            None => Outcome::Failed("failed to get cart".to_string()),
        },

        StepAction::ClearCart => {
            let cleared = runner.clear_cart().await;
            if cleared {
                ctx.cart = Listing::default();
            }
            Outcome::from_check(cleared, "failed to clear cart")
        }

        StepAction::Checkout {
            delivery_address,
            notes,
        } => match runner.checkout(delivery_address, notes).await {
            Some(order) => {
                match &order.id {
                    Some(id) => println!("  {} Order created with ID: {}", "✓".green(), id),
                    None => {
                        warn!("checkout response carried no order id");
                        println!("  {} Order created but no ID was returned", "!".yellow());
                    }
                }
                ctx.order = Some(order);
                Outcome::Passed
            }
            None => Outcome::Failed("checkout failed".to_string()),
        },

        StepAction::Orders => match runner.orders().await {
            Some(orders) => {
                println!("  {} Found {} orders", "✓".green(), orders.len);
                Outcome::Passed
            }
            None => Outcome::Failed("failed to get orders".to_string()),
        },

        StepAction::OrderDetail => {
            let Some(id) = ctx.order.as_ref().and_then(|o| o.id.clone()) else {
                return Outcome::Skipped("no order was created earlier in the run".to_string());
            };
            match runner.order(&id).await {
                Some(order) => match &order.id {
                    Some(returned) if *returned != id => Outcome::Failed(format!(
                        "order detail returned id {}, expected {}",
                        returned, id
                    )),
                    _ => {
                        println!("  {} Order {} retrieved", "✓".green(), id);
                        Outcome::Passed
                    }
                },
                None => Outcome::Failed(format!("failed to get order {}", id)),
            }
        }

        StepAction::Logout => {
            let ok = runner.logout().await;
            if ok {
                ctx.current_user = None;
            }
            Outcome::from_check(ok, "logout failed")
        }

        StepAction::ExpectSignedOut => Outcome::from_check(
            runner.expect_signed_out().await,
            "session still accepted after logout",
        ),

        StepAction::Request {
            method,
            endpoint,
            expected_status,
            payload,
        } => {
            let passed = runner
                .execute(&step.title, *method, endpoint, *expected_status, payload.clone())
                .await
                .passed;
            Outcome::from_check(
                passed,
                &format!("{} {} did not answer {}", method, endpoint, expected_status),
            )
        }
    }
}
