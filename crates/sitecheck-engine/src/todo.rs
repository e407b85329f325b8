//! Page object for the TodoMVC demo.

use crate::config::TimeoutConfig;
use crate::driver::Driver;
use crate::error::DriverError;
use crate::expect::expect;
use crate::locator::Locator;
use crate::report::{CheckOutcome, ScenarioReport, Severity};
use std::fmt;
use tracing::info;

pub const SUITE: &str = "todo";

const TASKS: [&str; 3] = ["a1", "a2", "a3"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoFilter {
    All,
    Active,
    Completed,
}

impl TodoFilter {
    pub const ALL: [TodoFilter; 3] = [TodoFilter::All, TodoFilter::Active, TodoFilter::Completed];

    pub fn link_text(&self) -> &'static str {
        match self {
            TodoFilter::All => "All",
            TodoFilter::Active => "Active",
            TodoFilter::Completed => "Completed",
        }
    }
}

impl fmt::Display for TodoFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.link_text())
    }
}

pub struct TodoPage<'a, D: Driver + ?Sized> {
    driver: &'a mut D,
    timeouts: TimeoutConfig,
}

fn new_todo() -> Locator {
    Locator::role_named("textbox", "What needs to be done?")
}

fn item(task: &str) -> Locator {
    Locator::role("listitem").filter_text(task)
}

fn list() -> Locator {
    Locator::css("ul.todo-list")
}

fn items() -> Locator {
    Locator::css("ul.todo-list > li")
}

fn completed_items() -> Locator {
    Locator::css("ul.todo-list > li.completed")
}

fn filter_links() -> Locator {
    Locator::css("ul.filters > li > a")
}

impl<'a, D: Driver + ?Sized> TodoPage<'a, D> {
    pub fn new(driver: &'a mut D, timeouts: TimeoutConfig) -> Self {
        Self { driver, timeouts }
    }

    /// Navigate to the app and start from an empty list.
    pub async fn open_fresh(&mut self, url: &str) -> Result<(), DriverError> {
        self.driver.navigate(url).await?;
        match self.driver.execute_script("window.localStorage.clear(), true").await {
            Ok(_) => {
                self.driver.reload().await?;
            }
            Err(DriverError::NotSupported(_)) => {}
            Err(e) => return Err(e),
        }
        self.driver.wait_for_load().await
    }

    pub async fn add_task(&mut self, task: &str) -> Result<(), DriverError> {
        let textbox = new_todo();
        self.driver.click(&textbox).await?;
        self.driver.fill(&textbox, task).await?;
        self.driver.press(&textbox, "Enter").await
    }

    pub async fn assert_task_added(&mut self, task: &str) -> Result<CheckOutcome, DriverError> {
        expect(self.driver, item(task))
            .with_timeouts(&self.timeouts)
            .with_message(format!("item {} was not added to the list", task))
            .to_be_visible()
            .await
    }

    pub async fn delete_task(&mut self, task: &str) -> Result<(), DriverError> {
        self.driver
            .click(&item(task).locator(Locator::css("button.destroy")))
            .await
    }

    /// Delete the first item through its "Delete" button.
    pub async fn delete_first(&mut self) -> Result<(), DriverError> {
        self.driver.click(&Locator::button("Delete").nth(0)).await
    }

    pub async fn edit_task(&mut self, old_task: &str, new_task: &str) -> Result<(), DriverError> {
        let row = item(old_task);
        self.driver
            .dblclick(&row.clone().locator(Locator::css("label")))
            .await?;
        let editor = row.locator(Locator::css("input.edit"));
        self.driver.fill(&editor, new_task).await?;
        self.driver.press(&editor, "Enter").await
    }

    pub async fn assert_total_items_count(
        &mut self,
        expected: usize,
    ) -> Result<CheckOutcome, DriverError> {
        expect(self.driver, items())
            .with_timeouts(&self.timeouts)
            .with_message(format!("List doesn't have {} items", expected))
            .to_have_count(expected)
            .await
    }

    pub async fn mark_completed(&mut self, task: &str) -> Result<(), DriverError> {
        self.set_completed(task, true).await
    }

    pub async fn mark_active(&mut self, task: &str) -> Result<(), DriverError> {
        self.set_completed(task, false).await
    }

    async fn set_completed(&mut self, task: &str, completed: bool) -> Result<(), DriverError> {
        let toggle = item(task).locator(Locator::label("Toggle Todo"));
        self.driver.set_checked(&toggle, completed).await
    }

    pub async fn clear_completed(&mut self) -> Result<(), DriverError> {
        self.driver
            .click(&Locator::button("Clear completed"))
            .await
    }

    pub async fn assert_no_completed(&mut self) -> Result<CheckOutcome, DriverError> {
        expect(self.driver, completed_items())
            .with_timeouts(&self.timeouts)
            .to_have_count(0)
            .await
    }

    pub async fn assert_task_in_list(&mut self, task: &str) -> Result<CheckOutcome, DriverError> {
        expect(self.driver, list())
            .with_timeouts(&self.timeouts)
            .with_message(format!("List doesn't contain item {}", task))
            .to_contain_text(task)
            .await
    }

    pub async fn assert_task_not_in_list(
        &mut self,
        task: &str,
    ) -> Result<CheckOutcome, DriverError> {
        expect(self.driver, list())
            .with_timeouts(&self.timeouts)
            .with_message(format!("List contains item {}", task))
            .not_to_contain_text(task)
            .await
    }

    pub async fn filter_by(&mut self, filter: TodoFilter) -> Result<(), DriverError> {
        self.driver
            .click(&Locator::role_named("link", filter.link_text()).exact())
            .await
    }

    /// The three filter links, in order.
    pub async fn assert_filter_links(&mut self) -> Result<Vec<CheckOutcome>, DriverError> {
        let mut outcomes = vec![
            expect(self.driver, filter_links())
                .with_timeouts(&self.timeouts)
                .to_have_count(TodoFilter::ALL.len())
                .await?,
        ];
        for (index, filter) in TodoFilter::ALL.iter().enumerate() {
            outcomes.push(
                expect(self.driver, filter_links().nth(index))
                    .with_timeouts(&self.timeouts)
                    .to_have_text(filter.link_text())
                    .await?,
            );
        }
        Ok(outcomes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoScenario {
    AddTasks,
    FilterActive,
    FilterCompleted,
    ClearCompleted,
    EditTask,
    FilterLinksVisible,
    DeleteAllTasks,
    MarkTaskActive,
}

impl TodoScenario {
    pub const ALL: [TodoScenario; 8] = [
        TodoScenario::AddTasks,
        TodoScenario::FilterActive,
        TodoScenario::FilterCompleted,
        TodoScenario::ClearCompleted,
        TodoScenario::EditTask,
        TodoScenario::FilterLinksVisible,
        TodoScenario::DeleteAllTasks,
        TodoScenario::MarkTaskActive,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TodoScenario::AddTasks => "add tasks",
            TodoScenario::FilterActive => "filter active tasks",
            TodoScenario::FilterCompleted => "filter completed tasks",
            TodoScenario::ClearCompleted => "clear completed tasks",
            TodoScenario::EditTask => "edit task",
            TodoScenario::FilterLinksVisible => "filter links visible",
            TodoScenario::DeleteAllTasks => "delete all tasks",
            TodoScenario::MarkTaskActive => "mark task as active",
        }
    }

    async fn body<D: Driver + ?Sized>(
        &self,
        page: &mut TodoPage<'_, D>,
        report: &mut ScenarioReport,
    ) -> Result<(), DriverError> {
        if *self == TodoScenario::EditTask {
            page.add_task("a1").await?;
            report.record("a1 added", Severity::Hard, page.assert_task_added("a1").await?);
        } else {
            for task in TASKS {
                page.add_task(task).await?;
                let outcome = page.assert_task_added(task).await?;
                report.record(format!("{} added", task), Severity::Hard, outcome);
            }
        }

        match self {
            TodoScenario::AddTasks => {
                report.record("3 items", Severity::Hard, page.assert_total_items_count(3).await?);
            }
            TodoScenario::FilterActive => {
                page.mark_completed("a1").await?;
                page.filter_by(TodoFilter::Active).await?;
                report.record("a1 hidden", Severity::Hard, page.assert_task_not_in_list("a1").await?);
                report.record("a2 listed", Severity::Hard, page.assert_task_in_list("a2").await?);
                report.record("a3 listed", Severity::Hard, page.assert_task_in_list("a3").await?);
                report.record("2 items", Severity::Hard, page.assert_total_items_count(2).await?);
            }
            TodoScenario::FilterCompleted => {
                page.mark_completed("a1").await?;
                page.filter_by(TodoFilter::Completed).await?;
                report.record("a1 listed", Severity::Hard, page.assert_task_in_list("a1").await?);
                report.record("a2 hidden", Severity::Hard, page.assert_task_not_in_list("a2").await?);
                report.record("a3 hidden", Severity::Hard, page.assert_task_not_in_list("a3").await?);
                report.record("1 item", Severity::Hard, page.assert_total_items_count(1).await?);
            }
            TodoScenario::ClearCompleted => {
                page.mark_completed("a1").await?;
                page.mark_completed("a2").await?;
                page.clear_completed().await?;
                report.record("no completed", Severity::Hard, page.assert_no_completed().await?);
                report.record("1 item", Severity::Hard, page.assert_total_items_count(1).await?);
            }
            TodoScenario::EditTask => {
                page.edit_task("a1", "updated").await?;
                report.record("updated listed", Severity::Hard, page.assert_task_in_list("updated").await?);
                report.record("a1 gone", Severity::Hard, page.assert_task_not_in_list("a1").await?);
                report.record("1 item", Severity::Hard, page.assert_total_items_count(1).await?);
            }
            TodoScenario::FilterLinksVisible => {
                let labels = ["3 filter links", "All link", "Active link", "Completed link"];
                for (label, outcome) in labels.into_iter().zip(page.assert_filter_links().await?) {
                    report.record(label, Severity::Hard, outcome);
                }
            }
            TodoScenario::DeleteAllTasks => {
                for _ in TASKS {
                    page.delete_first().await?;
                }
                for task in TASKS {
                    let outcome = page.assert_task_not_in_list(task).await?;
                    report.record(format!("{} gone", task), Severity::Hard, outcome);
                }
                report.record("0 items", Severity::Hard, page.assert_total_items_count(0).await?);
            }
            TodoScenario::MarkTaskActive => {
                page.mark_completed("a1").await?;
                page.mark_active("a1").await?;
                page.filter_by(TodoFilter::Active).await?;
                report.record("a1 listed", Severity::Hard, page.assert_task_in_list("a1").await?);
                report.record("3 items", Severity::Hard, page.assert_total_items_count(3).await?);
            }
        }
        Ok(())
    }

    /// Run on a fresh list at `url`.
    pub async fn run<D: Driver + ?Sized>(
        &self,
        driver: &mut D,
        url: &str,
        timeouts: TimeoutConfig,
    ) -> ScenarioReport {
        info!("TodoMVC: {}", self.name());
        let mut report = ScenarioReport::new(SUITE, self.name());
        let mut page = TodoPage::new(driver, timeouts);
        let result = match page.open_fresh(url).await {
            Ok(()) => self.body(&mut page, &mut report).await,
            Err(e) => Err(e),
        };
        report.finish(result)
    }
}

pub async fn run_suite<D: Driver + ?Sized>(
    driver: &mut D,
    url: &str,
    timeouts: TimeoutConfig,
) -> Vec<ScenarioReport> {
    let mut reports = Vec::with_capacity(TodoScenario::ALL.len());
    for scenario in TodoScenario::ALL {
        reports.push(scenario.run(driver, url, timeouts).await);
    }
    reports
}
