#![allow(dead_code)]

use async_trait::async_trait;
use sitecheck_engine::catalog::{CAPACITY_LIMITED_PRODUCT, CatalogOptions, CatalogSelectors};
use sitecheck_engine::config::TimeoutConfig;
use sitecheck_engine::driver::{Driver, DriverError, NavigationResult};
use sitecheck_engine::locator::Locator;
use std::time::Duration;

/// Timeouts short enough for tests, no pacing.
pub fn fast_timeouts() -> TimeoutConfig {
    TimeoutConfig {
        expect_ms: 200,
        action_ms: 200,
        load_ms: 200,
        poll_interval_ms: 5,
        pacing_ms: 0,
        cart_rows_ms: 200,
    }
}

pub fn fast_options() -> CatalogOptions {
    CatalogOptions {
        timeouts: fast_timeouts(),
        ..CatalogOptions::default()
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub name: String,
    pub in_stock: bool,
    pub price_cents: u32,
}

pub fn product(name: &str) -> Product {
    Product {
        name: name.to_string(),
        in_stock: true,
        price_cents: 1000,
    }
}

pub fn out_of_stock(name: &str) -> Product {
    Product {
        in_stock: false,
        ..product(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Added,
    CapacityWarning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Listing,
    Product { page: usize, index: usize },
    Cart,
}

/// Click counters, one per control.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Clicks {
    pub next: usize,
    pub first_page: usize,
    pub increase: usize,
    pub add: usize,
    pub heading: usize,
    pub go_back: usize,
}

/// Scripted practice shop: a paginated listing, product pages and a cart page.
pub struct MockShop {
    pages: Vec<Vec<Product>>,
    selectors: CatalogSelectors,
    current_page: usize,
    view: View,
    quantity: u32,
    banner: Option<Banner>,
    /// When set, adding shows no banner, as if the confirmation never appeared.
    pub suppress_banner: bool,
    pub cart: Vec<(Product, u32)>,
    pub clicks: Clicks,
    pub visited: Vec<String>,
}

impl MockShop {
    pub fn new(pages: Vec<Vec<Product>>) -> Self {
        Self {
            pages,
            selectors: CatalogSelectors::default(),
            current_page: 1,
            view: View::Listing,
            quantity: 1,
            banner: None,
            suppress_banner: false,
            cart: Vec::new(),
            clicks: Clicks::default(),
            visited: Vec::new(),
        }
    }

    /// `page_count` pages of filler with `wanted` placed on `page`.
    pub fn with_product_on_page(wanted: Product, page: usize, page_count: usize) -> Self {
        let pages = (1..=page_count)
            .map(|p| {
                let mut items: Vec<Product> =
                    (0..3).map(|i| product(&format!("Filler {}-{}", p, i))).collect();
                if p == page {
                    items.insert(1, wanted.clone());
                }
                items
            })
            .collect();
        Self::new(pages)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn banner(&self) -> Option<Banner> {
        self.banner
    }

    pub fn cart_quantity(&self, name: &str) -> Option<u32> {
        self.cart
            .iter()
            .find(|(p, _)| p.name == name)
            .map(|(_, q)| *q)
    }

    fn listed(&self, name: &str) -> Option<usize> {
        self.pages
            .get(self.current_page - 1)?
            .iter()
            .position(|p| p.name == name)
    }

    fn heading_name(locator: &Locator) -> Option<&str> {
        match locator {
            Locator::Role {
                role,
                name: Some(name),
                exact: true,
            } if role == "heading" => Some(name),
            _ => None,
        }
    }

    /// Page number of a `active item >> button "Page-N"` locator.
    fn active_page_button(&self, locator: &Locator) -> Option<usize> {
        let Locator::Within { parent, child } = locator else {
            return None;
        };
        if **parent != self.selectors.active_page {
            return None;
        }
        match child.as_ref() {
            Locator::Role {
                role,
                name: Some(name),
                exact: true,
            } if role == "button" => name.strip_prefix("Page-")?.parse().ok(),
            _ => None,
        }
    }

    fn open_product(&self) -> Option<&Product> {
        match self.view {
            View::Product { page, index } => self.pages.get(page - 1)?.get(index),
            _ => None,
        }
    }

    fn not_found(locator: &Locator) -> DriverError {
        DriverError::ElementNotFound {
            locator: locator.to_string(),
        }
    }

    fn add_to_cart(&mut self) {
        let Some(product) = self.open_product().cloned() else {
            return;
        };
        let limited = product.name == CAPACITY_LIMITED_PRODUCT;
        let already = self.cart_quantity(&product.name).unwrap_or(0);
        let banner = if limited && already + self.quantity > 1 {
            if already == 0 {
                self.cart.push((product, 1));
            }
            Banner::CapacityWarning
        } else {
            match self.cart.iter_mut().find(|(p, _)| p.name == product.name) {
                Some((_, q)) => *q += self.quantity,
                None => self.cart.push((product, self.quantity)),
            }
            Banner::Added
        };
        if !self.suppress_banner {
            self.banner = Some(banner);
        }
    }

    /// `(row, cell selector)` of a `tbody tr >> nth=row >> cell` locator.
    fn cart_cell(locator: &Locator) -> Option<(usize, &str)> {
        let Locator::Within { parent, child } = locator else {
            return None;
        };
        let Locator::Nth { base, index } = parent.as_ref() else {
            return None;
        };
        match (base.as_ref(), child.as_ref()) {
            (Locator::Css { selector: rows }, Locator::Css { selector: cell }) if rows == "tbody tr" => {
                Some((*index, cell.as_str()))
            }
            _ => None,
        }
    }

    fn price(cents: u32) -> String {
        format!("${}.{:02}", cents / 100, cents % 100)
    }

    fn cart_text(&self, locator: &Locator) -> Option<String> {
        if self.view != View::Cart {
            return None;
        }
        if *locator == Locator::css(r#"td[data-test="cart-total"]"#) {
            let total: u32 = self.cart.iter().map(|(p, q)| p.price_cents * q).sum();
            return Some(Self::price(total));
        }
        let (row, cell) = Self::cart_cell(locator)?;
        let (product, quantity) = self.cart.get(row)?;
        match cell {
            r#"span[data-test="product-title"]"# => Some(format!("{} ", product.name)),
            r#"span[data-test="product-price"]"# => Some(Self::price(product.price_cents)),
            r#"span[data-test="line-price"]"# => Some(Self::price(product.price_cents * quantity)),
            r#"input[data-test="product-quantity"]"# => Some(quantity.to_string()),
            _ => None,
        }
    }

    fn is_cart_row(&self, locator: &Locator) -> bool {
        match locator {
            Locator::Nth { base, index } => {
                self.view == View::Cart
                    && **base == Locator::css("tbody tr")
                    && *index < self.cart.len()
            }
            _ => false,
        }
    }
}

fn nav(url: &str) -> NavigationResult {
    NavigationResult {
        url: url.to_string(),
        title: "Practice Software Testing".to_string(),
        status: 200,
    }
}

#[async_trait]
impl Driver for MockShop {
    async fn launch(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        true
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, DriverError> {
        self.visited.push(url.to_string());
        self.view = View::Listing;
        self.current_page = 1;
        Ok(nav(url))
    }

    async fn go_back(&mut self) -> Result<NavigationResult, DriverError> {
        self.clicks.go_back += 1;
        self.view = View::Listing;
        self.banner = None;
        Ok(nav("back"))
    }

    async fn reload(&mut self) -> Result<NavigationResult, DriverError> {
        Ok(nav("reload"))
    }

    async fn wait_for_load(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize, DriverError> {
        if *locator == self.selectors.pagination_items {
            return Ok(self.pages.len() + 2);
        }
        if *locator == self.selectors.active_page {
            return Ok(usize::from(self.view == View::Listing));
        }
        if *locator == Locator::css("tbody tr") && self.view == View::Cart {
            return Ok(self.cart.len());
        }
        let visible = self.is_visible(locator).await?;
        Ok(usize::from(visible))
    }

    async fn is_visible(&mut self, locator: &Locator) -> Result<bool, DriverError> {
        if let Some(name) = Self::heading_name(locator) {
            return Ok(self.view == View::Listing && self.listed(name).is_some());
        }
        if let Some(page) = self.active_page_button(locator) {
            return Ok(self.view == View::Listing && page == self.current_page);
        }
        if *locator == self.selectors.add_to_cart || *locator == self.selectors.increase_quantity {
            return Ok(self.open_product().is_some());
        }
        if *locator == self.selectors.product_added {
            return Ok(self.banner == Some(Banner::Added));
        }
        if *locator == self.selectors.capacity_warning {
            return Ok(self.banner == Some(Banner::CapacityWarning));
        }
        if *locator == Locator::css(r#"a[data-test="nav-cart"][aria-label="cart"]"#) {
            return Ok(!self.cart.is_empty());
        }
        Ok(self.is_cart_row(locator))
    }

    async fn is_enabled(&mut self, locator: &Locator) -> Result<bool, DriverError> {
        if *locator == self.selectors.add_to_cart {
            return Ok(self.open_product().is_some_and(|p| p.in_stock));
        }
        self.is_visible(locator).await
    }

    async fn inner_text(&mut self, locator: &Locator) -> Result<String, DriverError> {
        if *locator == self.selectors.active_page && self.view == View::Listing {
            return Ok(format!("{} (current)", self.current_page));
        }
        self.cart_text(locator).ok_or_else(|| Self::not_found(locator))
    }

    async fn input_value(&mut self, locator: &Locator) -> Result<String, DriverError> {
        self.cart_text(locator).ok_or_else(|| Self::not_found(locator))
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        if let Some(name) = Self::heading_name(locator) {
            let index = self
                .listed(name)
                .filter(|_| self.view == View::Listing)
                .ok_or_else(|| Self::not_found(locator))?;
            self.clicks.heading += 1;
            self.view = View::Product {
                page: self.current_page,
                index,
            };
            self.quantity = 1;
            self.banner = None;
            return Ok(());
        }

        if *locator == self.selectors.next_page {
            if self.current_page >= self.pages.len() {
                return Err(DriverError::ElementDisabled {
                    locator: locator.to_string(),
                });
            }
            self.clicks.next += 1;
            self.current_page += 1;
        } else if *locator == self.selectors.first_page {
            self.clicks.first_page += 1;
            self.current_page = 1;
        } else if *locator == self.selectors.increase_quantity && self.open_product().is_some() {
            self.clicks.increase += 1;
            self.quantity += 1;
        } else if *locator == self.selectors.add_to_cart {
            if !self.open_product().is_some_and(|p| p.in_stock) {
                return Err(DriverError::ElementDisabled {
                    locator: locator.to_string(),
                });
            }
            self.clicks.add += 1;
            self.add_to_cart();
        } else if *locator == Locator::css(r#"a[data-test="nav-cart"][aria-label="cart"]"#) {
            self.view = View::Cart;
        } else {
            return Err(Self::not_found(locator));
        }
        Ok(())
    }

    async fn dblclick(&mut self, locator: &Locator) -> Result<(), DriverError> {
        Err(Self::not_found(locator))
    }

    async fn fill(&mut self, locator: &Locator, _text: &str) -> Result<(), DriverError> {
        Err(Self::not_found(locator))
    }

    async fn press(&mut self, locator: &Locator, _key: &str) -> Result<(), DriverError> {
        Err(Self::not_found(locator))
    }

    async fn set_checked(&mut self, locator: &Locator, _checked: bool) -> Result<(), DriverError> {
        Err(Self::not_found(locator))
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, DriverError> {
        Ok(Vec::new())
    }

    async fn pause(&mut self, _duration: Duration) {}
}
