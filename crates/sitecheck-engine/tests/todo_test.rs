use async_trait::async_trait;
use serde_json::Value;
use sitecheck_engine::config::TimeoutConfig;
use sitecheck_engine::driver::{Driver, DriverError, NavigationResult};
use sitecheck_engine::locator::Locator;
use sitecheck_engine::todo::{TodoFilter, TodoPage, TodoScenario, run_suite};

fn fast() -> TimeoutConfig {
    TimeoutConfig {
        expect_ms: 50,
        action_ms: 50,
        load_ms: 50,
        poll_interval_ms: 5,
        pacing_ms: 0,
        cart_rows_ms: 50,
    }
}

/// In-memory TodoMVC answering the locators the page object uses.
#[derive(Default)]
struct MockTodoApp {
    items: Vec<(String, bool)>,
    filter: Option<TodoFilter>,
    draft: String,
    editing: Option<(usize, String)>,
    /// Simulates a broken app that ignores Enter.
    ignore_enter: bool,
}

impl MockTodoApp {
    fn shown(&self) -> Vec<usize> {
        (0..self.items.len())
            .filter(|&i| match self.filter {
                Some(TodoFilter::Active) => !self.items[i].1,
                Some(TodoFilter::Completed) => self.items[i].1,
                _ => true,
            })
            .collect()
    }

    /// Shown item matched by a `listitem` filtered by text.
    fn item(&self, locator: &Locator) -> Option<usize> {
        let Locator::HasText { base, text } = locator else {
            return None;
        };
        if **base != Locator::role("listitem") {
            return None;
        }
        self.shown()
            .into_iter()
            .find(|&i| self.items[i].0.contains(text.as_str()))
    }

    fn within_item<'l>(&self, locator: &'l Locator) -> Option<(usize, &'l Locator)> {
        let Locator::Within { parent, child } = locator else {
            return None;
        };
        Some((self.item(parent)?, child.as_ref()))
    }

    fn missing(locator: &Locator) -> DriverError {
        DriverError::ElementNotFound {
            locator: locator.to_string(),
        }
    }

    fn new_todo() -> Locator {
        Locator::role_named("textbox", "What needs to be done?")
    }

    fn filter_link(locator: &Locator) -> Option<TodoFilter> {
        TodoFilter::ALL
            .into_iter()
            .find(|f| *locator == Locator::role_named("link", f.link_text()).exact())
    }
}

fn nav() -> NavigationResult {
    NavigationResult {
        url: "https://demo.playwright.dev/todomvc#/".into(),
        title: "React • TodoMVC".into(),
        status: 200,
    }
}

#[async_trait]
impl Driver for MockTodoApp {
    async fn launch(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
    async fn close(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
    async fn is_ready(&self) -> bool {
        true
    }
    async fn navigate(&mut self, _url: &str) -> Result<NavigationResult, DriverError> {
        self.filter = None;
        Ok(nav())
    }
    async fn go_back(&mut self) -> Result<NavigationResult, DriverError> {
        Ok(nav())
    }
    async fn reload(&mut self) -> Result<NavigationResult, DriverError> {
        self.filter = None;
        self.editing = None;
        Ok(nav())
    }
    async fn wait_for_load(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize, DriverError> {
        if *locator == Locator::css("ul.todo-list > li") {
            return Ok(self.shown().len());
        }
        if *locator == Locator::css("ul.todo-list > li.completed") {
            return Ok(self.shown().iter().filter(|&&i| self.items[i].1).count());
        }
        if *locator == Locator::css("ul.filters > li > a") {
            return Ok(TodoFilter::ALL.len());
        }
        if *locator == Locator::css("ul.todo-list") {
            return Ok(1);
        }
        if let Locator::Nth { base, index } = locator {
            if **base == Locator::css("ul.filters > li > a") && *index < TodoFilter::ALL.len() {
                return Ok(1);
            }
        }
        Ok(usize::from(self.item(locator).is_some()))
    }

    async fn is_visible(&mut self, locator: &Locator) -> Result<bool, DriverError> {
        Ok(self.count(locator).await? > 0)
    }

    async fn is_enabled(&mut self, locator: &Locator) -> Result<bool, DriverError> {
        self.is_visible(locator).await
    }

    async fn inner_text(&mut self, locator: &Locator) -> Result<String, DriverError> {
        if *locator == Locator::css("ul.todo-list") {
            let texts: Vec<&str> = self
                .shown()
                .into_iter()
                .map(|i| self.items[i].0.as_str())
                .collect();
            return Ok(texts.join("\n"));
        }
        if let Locator::Nth { base, index } = locator {
            if **base == Locator::css("ul.filters > li > a") {
                if let Some(filter) = TodoFilter::ALL.get(*index) {
                    return Ok(filter.link_text().to_string());
                }
            }
        }
        Err(Self::missing(locator))
    }

    async fn input_value(&mut self, locator: &Locator) -> Result<String, DriverError> {
        Err(Self::missing(locator))
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        if *locator == Self::new_todo() {
            return Ok(());
        }
        if let Some(filter) = Self::filter_link(locator) {
            self.filter = Some(filter);
            return Ok(());
        }
        if *locator == Locator::button("Clear completed") {
            self.items.retain(|(_, done)| !done);
            return Ok(());
        }
        if *locator == Locator::button("Delete").nth(0) {
            let first = *self.shown().first().ok_or_else(|| Self::missing(locator))?;
            self.items.remove(first);
            return Ok(());
        }
        match self.within_item(locator) {
            Some((index, child)) if *child == Locator::css("button.destroy") => {
                self.items.remove(index);
                Ok(())
            }
            _ => Err(Self::missing(locator)),
        }
    }

    async fn dblclick(&mut self, locator: &Locator) -> Result<(), DriverError> {
        match self.within_item(locator) {
            Some((index, child)) if *child == Locator::css("label") => {
                self.editing = Some((index, self.items[index].0.clone()));
                Ok(())
            }
            _ => Err(Self::missing(locator)),
        }
    }

    async fn fill(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        if *locator == Self::new_todo() {
            self.draft = text.to_string();
            return Ok(());
        }
        match (self.within_item(locator), &mut self.editing) {
            (Some((index, child)), Some((editing, value)))
                if *child == Locator::css("input.edit") && index == *editing =>
            {
                *value = text.to_string();
                Ok(())
            }
            _ => Err(Self::missing(locator)),
        }
    }

    async fn press(&mut self, locator: &Locator, key: &str) -> Result<(), DriverError> {
        if key != "Enter" || self.ignore_enter {
            return Ok(());
        }
        if *locator == Self::new_todo() {
            let draft = std::mem::take(&mut self.draft);
            if !draft.trim().is_empty() {
                self.items.push((draft, false));
            }
            return Ok(());
        }
        match self.editing.take() {
            Some((index, value)) => {
                self.items[index].0 = value;
                Ok(())
            }
            None => Err(Self::missing(locator)),
        }
    }

    async fn set_checked(&mut self, locator: &Locator, checked: bool) -> Result<(), DriverError> {
        match self.within_item(locator) {
            Some((index, child)) if *child == Locator::label("Toggle Todo") => {
                self.items[index].1 = checked;
                Ok(())
            }
            _ => Err(Self::missing(locator)),
        }
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, DriverError> {
        Ok(Vec::new())
    }

    async fn execute_script(&mut self, _script: &str) -> Result<Value, DriverError> {
        self.items.clear();
        Ok(Value::Bool(true))
    }
}

const URL: &str = "https://demo.playwright.dev/todomvc#/";

#[tokio::test]
async fn test_all_scenarios_pass_on_a_working_app() {
    let mut app = MockTodoApp::default();
    let reports = run_suite(&mut app, URL, fast()).await;

    assert_eq!(reports.len(), TodoScenario::ALL.len());
    for report in &reports {
        assert!(report.passed(), "{}: {:?} {:?}", report.name, report.error, report.checks);
        assert!(!report.checks.is_empty());
    }
}

#[tokio::test]
async fn test_each_scenario_starts_from_an_empty_list() {
    let mut app = MockTodoApp::default();
    app.items.push(("left over".into(), true));
    let report = TodoScenario::AddTasks.run(&mut app, URL, fast()).await;
    assert!(report.passed(), "{:?}", report.checks);
    assert_eq!(app.items.len(), 3);
}

#[tokio::test]
async fn test_broken_app_fails_hard() {
    let mut app = MockTodoApp {
        ignore_enter: true,
        ..MockTodoApp::default()
    };
    let report = TodoScenario::AddTasks.run(&mut app, URL, fast()).await;

    assert!(!report.passed());
    assert_eq!(report.hard_failures(), 4);
    assert!(report.checks.iter().any(|c| matches!(
        &c.outcome,
        sitecheck_engine::CheckOutcome::Fail { reason } if reason == "item a1 was not added to the list"
    )));
}

#[tokio::test]
async fn test_edit_replaces_the_text() {
    let mut app = MockTodoApp::default();
    let mut page = TodoPage::new(&mut app, fast());
    page.add_task("a1").await.unwrap();
    page.edit_task("a1", "updated").await.unwrap();

    assert!(page.assert_task_in_list("updated").await.unwrap().is_pass());
    assert!(page.assert_task_not_in_list("a1").await.unwrap().is_pass());
    assert!(page.assert_total_items_count(1).await.unwrap().is_pass());
}

#[tokio::test]
async fn test_delete_task_removes_only_that_item() {
    let mut app = MockTodoApp::default();
    let mut page = TodoPage::new(&mut app, fast());
    for task in ["a1", "a2"] {
        page.add_task(task).await.unwrap();
    }
    page.delete_task("a1").await.unwrap();

    assert!(page.assert_task_not_in_list("a1").await.unwrap().is_pass());
    assert!(page.assert_task_in_list("a2").await.unwrap().is_pass());
    assert!(page.assert_total_items_count(1).await.unwrap().is_pass());
}
