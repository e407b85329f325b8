//! Cart contents report, and the suite that fills the cart from the shopping list.

use crate::catalog::{
    CAPACITY_LIMITED_PRODUCT, CartOutcome, CatalogError, CatalogOptions, SearchOutcome, ShoppingRequest, fill_cart,
};
use crate::config::{SitecheckConfig, TimeoutConfig};
use crate::driver::Driver;
use crate::error::DriverError;
use crate::expect::expect;
use crate::locator::Locator;
use crate::report::{CheckOutcome, ScenarioReport, Severity};
use serde::Serialize;
use std::fmt;
use tracing::info;

pub const SUITE: &str = "cart";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub title: String,
    pub unit_price: String,
    pub line_price: String,
    pub quantity: u32,
}

impl fmt::Display for CartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Quantity = {}, Cost of 1 = {}",
            self.title, self.quantity, self.unit_price
        )?;
        if self.quantity != 1 {
            write!(f, ", Cost of {} = {}", self.quantity, self.line_price)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total: String,
}

fn cart_icon() -> Locator {
    Locator::css(r#"a[data-test="nav-cart"][aria-label="cart"]"#)
}

fn rows() -> Locator {
    Locator::css("tbody tr")
}

/// Open the cart and read every row back from the page.
pub async fn read_cart<D: Driver + ?Sized>(
    driver: &mut D,
    timeouts: &TimeoutConfig,
) -> Result<CartSummary, DriverError> {
    let icon = cart_icon();
    if driver.is_visible(&icon).await? {
        driver.click(&icon).await?;
    }
    driver.wait_for_load().await?;

    expect(driver, rows().nth(0))
        .with_timeout(timeouts.cart_rows())
        .with_interval(timeouts.poll_interval())
        .with_message("cart table has no rows")
        .to_be_visible()
        .await?
        .into_result()?;

    let count = driver.count(&rows()).await?;
    let mut lines = Vec::with_capacity(count);
    for i in 0..count {
        let row = rows().nth(i);
        let cell = |selector: &str| row.clone().locator(Locator::css(selector));

        let title = driver
            .inner_text(&cell(r#"span[data-test="product-title"]"#))
            .await?;
        let unit_price = driver
            .inner_text(&cell(r#"span[data-test="product-price"]"#))
            .await?;
        let line_price = driver
            .inner_text(&cell(r#"span[data-test="line-price"]"#))
            .await?;
        let raw_quantity = driver
            .input_value(&cell(r#"input[data-test="product-quantity"]"#))
            .await?;
        let quantity = raw_quantity.trim().parse().map_err(|_| {
            DriverError::Serialization(format!(
                "quantity of {} is not a number: {:?}",
                title, raw_quantity
            ))
        })?;

        lines.push(CartLine {
            title: title.trim().to_string(),
            unit_price: unit_price.trim().to_string(),
            line_price: line_price.trim().to_string(),
            quantity,
        });
    }

    let total = driver
        .inner_text(&Locator::css(r#"td[data-test="cart-total"]"#))
        .await?
        .trim()
        .to_string();
    Ok(CartSummary { lines, total })
}

impl CartSummary {
    pub fn line(&self, title: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.title == title)
    }
}

fn describe(request: &ShoppingRequest, outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::Found { page, cart } => {
            let what = match cart {
                CartOutcome::Added { quantity } => format!("added {}", quantity),
                CartOutcome::CapacityLimited => "capped at one".to_string(),
                CartOutcome::OutOfStock => "out of stock".to_string(),
            };
            format!("{}: found on page {}, {}", request, page, what)
        }
        SearchOutcome::NotFound => format!("{}: not found on any page", request),
    }
}

/// Quantity each product should have in the cart, in first-requested order.
/// Repeated requests for one product add up; the capacity-limited product never exceeds one.
fn expected_quantities(outcomes: &[(ShoppingRequest, SearchOutcome)]) -> Vec<(&str, u32)> {
    let mut expected: Vec<(&str, u32)> = Vec::new();
    for (request, outcome) in outcomes {
        let added = match outcome {
            SearchOutcome::Found {
                cart: CartOutcome::Added { quantity },
                ..
            } => *quantity,
            SearchOutcome::Found {
                cart: CartOutcome::CapacityLimited,
                ..
            } => 1,
            _ => continue,
        };
        match expected.iter_mut().find(|(name, _)| *name == request.name()) {
            Some((_, total)) => *total += added,
            None => expected.push((request.name(), added)),
        }
    }
    for (name, total) in &mut expected {
        if *name == CAPACITY_LIMITED_PRODUCT {
            *total = (*total).min(1);
        }
    }
    expected
}

/// Compare what was added with what the cart shows, one check per product.
pub fn verify_cart(
    outcomes: &[(ShoppingRequest, SearchOutcome)],
    summary: &CartSummary,
) -> Vec<(String, CheckOutcome)> {
    expected_quantities(outcomes)
        .into_iter()
        .map(|(name, expected)| {
            let line = summary.line(name);
            let outcome =
                CheckOutcome::check(line.map(|l| l.quantity) == Some(expected), || match line {
                    Some(line) => format!(
                        "{} has quantity {} in the cart, expected {}",
                        name, line.quantity, expected
                    ),
                    None => format!("{} is missing from the cart", name),
                });
            (format!("{} in cart", name), outcome)
        })
        .collect()
}

/// Fill the cart from the configured shopping list and report its contents.
pub async fn run_suite<D: Driver + ?Sized>(
    driver: &mut D,
    config: &SitecheckConfig,
) -> Vec<ScenarioReport> {
    let mut report = ScenarioReport::new(SUITE, "fill cart from shopping list");
    let options = CatalogOptions {
        timeouts: config.timeouts,
        ..CatalogOptions::default()
    };

    let result = async {
        let requests = config
            .cart
            .shopping_list
            .iter()
            .map(ShoppingRequest::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        driver.navigate(&config.sites.catalog).await?;
        driver.wait_for_load().await?;

        let outcomes = fill_cart(driver, &requests, &options).await?;
        for (request, outcome) in &outcomes {
            report.note(describe(request, outcome));
        }

        let summary = read_cart(driver, &config.timeouts).await?;
        info!("Cart holds {} lines, total {}", summary.lines.len(), summary.total);
        report.note("CART CONTENTS:");
        for line in &summary.lines {
            report.note(line.to_string());
        }
        report.note(format!("Cart total: {}", summary.total));

        for (label, outcome) in verify_cart(&outcomes, &summary) {
            report.record(label, Severity::Hard, outcome);
        }
        Ok::<(), CatalogError>(())
    }
    .await;
    vec![report.finish(result)]
}
