//! Multi-page product search and add-to-cart on the practice shop.
//!
//! The catalog is walked one page at a time. The wanted product is found by its exact
//! heading text; once found it is opened, its quantity raised `quantity - 1` times and
//! added to the cart. Afterwards the listing is always left on page 1, so requests can be
//! chained.

use crate::config::{ShoppingItem, TimeoutConfig};
use crate::driver::Driver;
use crate::error::DriverError;
use crate::expect::expect;
use crate::locator::Locator;
use crate::report::CheckOutcome;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// The one product the shop refuses to hold more than once.
pub const CAPACITY_LIMITED_PRODUCT: &str = "Thor Hammer";

pub const PRODUCT_ADDED: &str = "Product added to shopping cart.";
pub const CAPACITY_WARNING: &str = "You can only have one Thor Hammer in the cart.";

/// Pagination items that are controls, not pages ("previous" and "next").
const PAGINATION_CONTROLS: usize = 2;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid shopping request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("No cart confirmation for {product}: {reason}")]
    Confirmation { product: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingRequest {
    name: String,
    quantity: u32,
}

impl ShoppingRequest {
    pub fn new(name: impl Into<String>, quantity: u32) -> Result<Self, CatalogError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidRequest("product name is empty".into()));
        }
        if quantity == 0 {
            return Err(CatalogError::InvalidRequest(format!(
                "quantity of {} must be at least 1",
                name
            )));
        }
        Ok(Self { name, quantity })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    fn is_capacity_limited(&self) -> bool {
        self.name == CAPACITY_LIMITED_PRODUCT && self.quantity > 1
    }
}

impl TryFrom<&ShoppingItem> for ShoppingRequest {
    type Error = CatalogError;

    fn try_from(item: &ShoppingItem) -> Result<Self, Self::Error> {
        ShoppingRequest::new(item.name.clone(), item.quantity)
    }
}

impl fmt::Display for ShoppingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.name, self.quantity)
    }
}

/// Position in the paginated listing, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    current_page: usize,
    page_count: usize,
}

impl PageCursor {
    /// Cursor on page 1 of a listing whose pagination control renders `items` entries.
    pub fn from_pagination_items(items: usize) -> Self {
        Self {
            current_page: 1,
            page_count: items.saturating_sub(PAGINATION_CONTROLS).max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.page_count
    }

    fn advance(&mut self) {
        debug_assert!(self.has_next());
        self.current_page += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    Added { quantity: u32 },
    /// The shop capped the product at one unit, as expected.
    CapacityLimited,
    /// The add-to-cart button was disabled or hidden; nothing changed.
    OutOfStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found { page: usize, cart: CartOutcome },
    NotFound,
}

/// Selectors of the practice shop.
#[derive(Debug, Clone)]
pub struct CatalogSelectors {
    pub pagination_items: Locator,
    pub active_page: Locator,
    pub next_page: Locator,
    pub first_page: Locator,
    pub add_to_cart: Locator,
    pub increase_quantity: Locator,
    pub product_added: Locator,
    pub capacity_warning: Locator,
}

impl Default for CatalogSelectors {
    fn default() -> Self {
        Self {
            pagination_items: Locator::css("ul.pagination li.page-item"),
            active_page: Locator::css("ul.pagination li.page-item.active"),
            next_page: Locator::button("Next").exact(),
            first_page: Locator::button("Page-1").exact(),
            add_to_cart: Locator::button("Add to cart").exact(),
            increase_quantity: Locator::button("Increase quantity").exact(),
            product_added: Locator::css(format!("[aria-label='{}']", PRODUCT_ADDED)),
            capacity_warning: Locator::css(format!("[aria-label='{}']", CAPACITY_WARNING)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    pub selectors: CatalogSelectors,
    pub timeouts: TimeoutConfig,
}

impl CatalogOptions {
    fn pacing(&self) -> Duration {
        self.timeouts.pacing()
    }
}

/// Find `request` in the catalog and put it in the cart.
///
/// The driver must be on page 1 of the listing. On return it is on page 1 again.
pub async fn locate_and_add_to_cart<D: Driver + ?Sized>(
    driver: &mut D,
    request: &ShoppingRequest,
    options: &CatalogOptions,
) -> Result<SearchOutcome, CatalogError> {
    let selectors = &options.selectors;
    driver.pause(options.pacing()).await;

    let items = driver.count(&selectors.pagination_items).await?;
    let mut cursor = PageCursor::from_pagination_items(items);
    let heading = Locator::heading(request.name());

    loop {
        info!(
            "Searching for {} on page {}/{}",
            request.name(),
            cursor.current_page(),
            cursor.page_count()
        );
        wait_for_page(driver, &cursor, options).await?;

        if driver.is_visible(&heading).await? {
            info!("{} found on page {}", request.name(), cursor.current_page());
            let cart = add_to_cart(driver, request, &heading, options).await?;
            return Ok(SearchOutcome::Found {
                page: cursor.current_page(),
                cart,
            });
        }

        if cursor.has_next() {
            driver.click(&selectors.next_page).await?;
            cursor.advance();
            driver.pause(options.pacing()).await;
        } else {
            driver.click(&selectors.first_page).await?;
            warn!("{} not found on any of {} pages", request.name(), cursor.page_count());
            return Ok(SearchOutcome::NotFound);
        }
    }
}

/// Button of page `page` inside the active pagination item.
fn active_page_button(selectors: &CatalogSelectors, page: usize) -> Locator {
    selectors
        .active_page
        .clone()
        .locator(Locator::button(format!("Page-{}", page)).exact())
}

/// Load state first, then the pagination marking the cursor's page active.
/// Matched by the button's accessible name, since the item's text may carry
/// a screen-reader suffix such as "(current)".
async fn wait_for_page<D: Driver + ?Sized>(
    driver: &mut D,
    cursor: &PageCursor,
    options: &CatalogOptions,
) -> Result<(), DriverError> {
    driver.wait_for_load().await?;
    if cursor.page_count() == 1 {
        return Ok(());
    }
    let active = active_page_button(&options.selectors, cursor.current_page());
    let outcome = expect(driver, active)
        .with_timeouts(&options.timeouts)
        .to_be_visible()
        .await?;
    if let CheckOutcome::Fail { reason } = outcome {
        warn!("Pagination did not settle: {}", reason);
    }
    Ok(())
}

async fn add_to_cart<D: Driver + ?Sized>(
    driver: &mut D,
    request: &ShoppingRequest,
    heading: &Locator,
    options: &CatalogOptions,
) -> Result<CartOutcome, CatalogError> {
    let selectors = &options.selectors;
    driver.click(heading).await?;
    driver.wait_for_load().await?;

    let outcome = if driver.is_enabled(&selectors.add_to_cart).await?
        && driver.is_visible(&selectors.add_to_cart).await?
    {
        fill_quantity_and_add(driver, request, options).await?
    } else {
        warn!("{} is not in stock", request.name());
        CartOutcome::OutOfStock
    };

    driver.go_back().await?;
    driver.click(&selectors.first_page).await?;
    Ok(outcome)
}

async fn fill_quantity_and_add<D: Driver + ?Sized>(
    driver: &mut D,
    request: &ShoppingRequest,
    options: &CatalogOptions,
) -> Result<CartOutcome, CatalogError> {
    let selectors = &options.selectors;
    for step in 1..request.quantity() {
        driver.click(&selectors.increase_quantity).await?;
        info!("Increased quantity of {} to {}", request.name(), step + 1);
        driver.pause(options.pacing()).await;
    }
    driver.click(&selectors.add_to_cart).await?;

    let (banner, outcome) = if request.is_capacity_limited() {
        (&selectors.capacity_warning, CartOutcome::CapacityLimited)
    } else {
        (
            &selectors.product_added,
            CartOutcome::Added {
                quantity: request.quantity(),
            },
        )
    };

    let confirmation = expect(driver, banner.clone())
        .with_timeouts(&options.timeouts)
        .to_be_visible()
        .await?;
    if let CheckOutcome::Fail { reason } = confirmation {
        return Err(CatalogError::Confirmation {
            product: request.name().to_string(),
            reason,
        });
    }

    match outcome {
        CartOutcome::CapacityLimited => {
            info!("Only one {} allowed in the cart", request.name())
        }
        _ => info!("Added {} to cart {} times", request.name(), request.quantity()),
    }
    Ok(outcome)
}

/// Run every request in order. Products that are missing or out of stock do not stop
/// the loop; a missing confirmation does.
pub async fn fill_cart<D: Driver + ?Sized>(
    driver: &mut D,
    requests: &[ShoppingRequest],
    options: &CatalogOptions,
) -> Result<Vec<(ShoppingRequest, SearchOutcome)>, CatalogError> {
    let mut outcomes = Vec::with_capacity(requests.len());
    for request in requests {
        let outcome = locate_and_add_to_cart(driver, request, options).await?;
        outcomes.push((request.clone(), outcome));
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_excludes_controls() {
        assert_eq!(PageCursor::from_pagination_items(7).page_count(), 5);
        assert_eq!(PageCursor::from_pagination_items(0).page_count(), 1);
        assert_eq!(PageCursor::from_pagination_items(3).page_count(), 1);
    }

    #[test]
    fn cursor_stays_in_range() {
        let mut cursor = PageCursor::from_pagination_items(4);
        assert_eq!(cursor.current_page(), 1);
        assert!(cursor.has_next());
        cursor.advance();
        assert_eq!(cursor.current_page(), 2);
        assert!(!cursor.has_next());
    }

    #[test]
    fn request_validation() {
        assert!(ShoppingRequest::new("", 1).is_err());
        assert!(ShoppingRequest::new("Pliers", 0).is_err());
        let req = ShoppingRequest::new("Thor Hammer", 12).unwrap();
        assert!(req.is_capacity_limited());
        assert!(!ShoppingRequest::new("Thor Hammer", 1).unwrap().is_capacity_limited());
        assert_eq!(req.to_string(), "Thor Hammer x12");
    }
}
