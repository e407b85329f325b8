//! Login forms of the three practice sites and the cases run against them.
//!
//! Invalid inputs are plain test data. Anything that must be a real account comes from
//! [`Credentials`]; a case that needs one which is not configured is skipped.

use crate::config::{Credentials, SitecheckConfig, TimeoutConfig};
use crate::driver::Driver;
use crate::error::DriverError;
use crate::expect::expect;
use crate::locator::Locator;
use crate::report::{CheckOutcome, ScenarioReport, Severity};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub const SUITE: &str = "login";

/// A real account on one of the sites.
#[derive(Clone)]
pub struct Credential {
    pub user: String,
    pub password: String,
}

impl Credential {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where each login control lives on a site.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub site: &'static str,
    pub url: String,
    /// Control that opens the login dialog, if the form is not on the page already.
    pub open: Option<Locator>,
    pub email: Locator,
    pub password: Locator,
    pub submit: Locator,
    pub logout: Option<Locator>,
    /// Pacing after load, for sites whose widgets attach late.
    pub settle: Duration,
}

impl LoginForm {
    pub fn najada(url: impl Into<String>, settle: Duration) -> Self {
        Self {
            site: "najada",
            url: url.into(),
            open: Some(Locator::css(".loginAction")),
            email: Locator::css("#email"),
            password: Locator::css("#password"),
            submit: Locator::css(r#"[type="submit"]"#),
            logout: Some(Locator::css(r#"[class="icon icon_logout"]"#)),
            settle,
        }
    }

    pub fn rohlik(url: impl Into<String>, settle: Duration) -> Self {
        Self {
            site: "rohlik",
            url: url.into(),
            open: Some(Locator::css(r#"[data-test="IconUserLogin"]"#)),
            email: Locator::css("#email"),
            password: Locator::css("#password"),
            submit: Locator::css(r#"[data-test="btnSignIn"]"#),
            logout: None,
            settle,
        }
    }

    pub fn kitner(url: impl Into<String>) -> Self {
        Self {
            site: "kitner",
            url: url.into(),
            open: None,
            email: Locator::css(r#"[data-test="email_input"]"#),
            password: Locator::css(r#"[data-test="password_input"]"#),
            submit: Locator::css(r#"[data-test="login_button"]"#),
            logout: Some(Locator::css(r#"[data-test="logout_button"]"#)),
            settle: Duration::ZERO,
        }
    }
}

/// Value typed into a login field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Text(&'static str),
    User,
    Password,
}

impl Input {
    fn needs_credential(&self) -> bool {
        !matches!(self, Input::Text(_))
    }

    fn resolve<'c>(&self, credential: Option<&'c Credential>) -> Option<&'c str> {
        match self {
            Input::Text(text) => Some(*text),
            Input::User => credential.map(|c| c.user.as_str()),
            Input::Password => credential.map(|c| c.password.as_str()),
        }
    }

    /// Loggable form of the input.
    fn describe(&self) -> &'static str {
        match self {
            Input::Text("") => "<empty>",
            Input::Text(text) => *text,
            Input::User => "<configured user>",
            Input::Password => "<configured password>",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginCase {
    pub name: &'static str,
    pub email: Input,
    pub password: Input,
    /// Locators that must become visible after submitting.
    pub expect_visible: Vec<Locator>,
    /// When set, log out afterwards and expect these locators.
    pub after_logout: Option<Vec<Locator>>,
    /// File name of the screenshot taken at the end.
    pub screenshot: Option<&'static str>,
}

impl LoginCase {
    fn new(name: &'static str, email: Input, password: Input, expect_visible: Vec<Locator>) -> Self {
        Self {
            name,
            email,
            password,
            expect_visible,
            after_logout: None,
            screenshot: None,
        }
    }

    fn with_logout(mut self, expect_visible: Vec<Locator>) -> Self {
        self.after_logout = Some(expect_visible);
        self
    }

    fn with_screenshot(mut self, file: &'static str) -> Self {
        self.screenshot = Some(file);
        self
    }

    pub fn needs_credential(&self) -> bool {
        self.email.needs_credential() || self.password.needs_credential()
    }
}

fn najada_user_link() -> Locator {
    Locator::css(r#"a[class="UserStateReview__name font-encodeCond text-left line-1"]"#)
}

pub fn najada_cases() -> Vec<LoginCase> {
    vec![
        LoginCase::new(
            "najada: unknown user, short password",
            Input::Text("no_such_account"),
            Input::Text("chyba"),
            vec![Locator::css(".validation-message")],
        ),
        LoginCase::new(
            "najada: bad password",
            Input::User,
            Input::Text("123456798"),
            vec![Locator::css(r#"p[class="red error-message"]"#)],
        ),
        LoginCase::new(
            "najada: login success",
            Input::User,
            Input::Password,
            vec![najada_user_link()],
        )
        .with_screenshot("screenshot_login_success_najada.png"),
        LoginCase::new("najada: logout", Input::User, Input::Password, vec![najada_user_link()])
            .with_logout(vec![Locator::css(".loginAction")])
            .with_screenshot("screenshot_logout_success_najada.png"),
    ]
}

pub fn rohlik_cases() -> Vec<LoginCase> {
    vec![
        LoginCase::new(
            "rohlik: bad email, bad password",
            Input::Text("123@seznam.cz"),
            Input::Text("chyba"),
            vec![Locator::css(r#"span[data-test="notification-content"]"#)],
        ),
        LoginCase::new(
            "rohlik: no email, no password",
            Input::Text(""),
            Input::Text(""),
            vec![
                Locator::text("Email je povinný"),
                Locator::text("Heslo je povinné"),
            ],
        ),
    ]
}

fn kitner_email_errors() -> Locator {
    Locator::css(r#"[data-test="email_input_errors"]"#)
}

fn kitner_password_errors() -> Locator {
    Locator::css(r#"[data-test="password_input_errors"]"#)
}

fn kitner_courses_title() -> Locator {
    Locator::css(r#"[data-test="courses_title"]"#)
}

pub fn kitner_cases() -> Vec<LoginCase> {
    vec![
        LoginCase::new(
            "kitner: unknown email, valid password",
            Input::Text("nobody@example.invalid"),
            Input::Password,
            vec![kitner_email_errors()],
        ),
        LoginCase::new(
            "kitner: no email, valid password",
            Input::Text(""),
            Input::Password,
            vec![kitner_email_errors()],
        ),
        LoginCase::new(
            "kitner: valid email, bad password",
            Input::User,
            Input::Text("extajne123"),
            vec![kitner_email_errors()],
        ),
        LoginCase::new(
            "kitner: valid email, no password",
            Input::User,
            Input::Text(""),
            vec![kitner_password_errors()],
        ),
        LoginCase::new(
            "kitner: no email, no password",
            Input::Text(""),
            Input::Text(""),
            vec![kitner_email_errors(), kitner_password_errors()],
        ),
        LoginCase::new(
            "kitner: login success",
            Input::User,
            Input::Password,
            vec![kitner_courses_title()],
        )
        .with_screenshot("screenshot_login_success_kitner.png"),
        LoginCase::new(
            "kitner: logout",
            Input::User,
            Input::Password,
            vec![kitner_courses_title()],
        )
        .with_logout(vec![Locator::css(r#"[data-test="login_link"]"#)])
        .with_screenshot("screenshot_logout_success_kitner.png"),
    ]
}

/// Open the site, fill the form and submit it.
pub async fn login<D: Driver + ?Sized>(
    driver: &mut D,
    form: &LoginForm,
    email: &str,
    password: &str,
) -> Result<(), DriverError> {
    driver.navigate(&form.url).await?;
    driver.wait_for_load().await?;
    if !form.settle.is_zero() {
        driver.pause(form.settle).await;
    }

    if let Some(open) = &form.open {
        driver.click(open).await?;
    }
    driver.fill(&form.email, email).await?;
    driver.fill(&form.password, password).await?;
    driver.click(&form.submit).await
}

/// Click the logout control. A missing or unclickable control is a failed check.
pub async fn logout<D: Driver + ?Sized>(
    driver: &mut D,
    form: &LoginForm,
) -> Result<CheckOutcome, DriverError> {
    let Some(control) = &form.logout else {
        return Ok(CheckOutcome::fail(format!("{} has no logout control", form.site)));
    };
    match driver.click(control).await {
        Ok(()) => Ok(CheckOutcome::Pass),
        Err(e @ DriverError::TimeoutWithContext { .. }) => Ok(CheckOutcome::fail(format!(
            "logout button not visible or clickable: {}",
            e
        ))),
        Err(e) => Err(e),
    }
}

/// Start a case logged out. Drivers that cannot clear the session log out instead.
pub async fn reset_session<D: Driver + ?Sized>(
    driver: &mut D,
    form: &LoginForm,
) -> Result<(), DriverError> {
    driver.navigate(&form.url).await?;
    driver.wait_for_load().await?;
    match driver.clear_session().await {
        Ok(()) => Ok(()),
        Err(DriverError::NotSupported(_)) => {
            if let Some(control) = &form.logout {
                if driver.is_visible(control).await? {
                    info!("Logging out of {} before the next case", form.site);
                    driver.click(control).await?;
                }
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn save_screenshot<D: Driver + ?Sized>(
    driver: &mut D,
    dir: &Path,
    file: &str,
) -> Result<(), DriverError> {
    let png = driver.screenshot().await?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file);
    tokio::fs::write(&path, png).await?;
    info!("Saved screenshot {}", path.display());
    Ok(())
}

pub struct CaseContext<'a> {
    pub timeouts: TimeoutConfig,
    pub severity: Severity,
    pub screenshot_dir: &'a Path,
}

/// Run one case and report every expectation.
pub async fn run_case<D: Driver + ?Sized>(
    driver: &mut D,
    form: &LoginForm,
    case: &LoginCase,
    credential: Option<&Credential>,
    ctx: &CaseContext<'_>,
) -> ScenarioReport {
    let (Some(email), Some(password)) = (
        case.email.resolve(credential),
        case.password.resolve(credential),
    ) else {
        warn!("Skipping {}: no credentials for {}", case.name, form.site);
        return ScenarioReport::skipped(
            SUITE,
            case.name,
            format!("credentials for {} are not configured", form.site),
        );
    };

    info!(
        "Logging in to {}. Email: {}, Password: {}",
        form.site,
        case.email.describe(),
        case.password.describe()
    );
    let mut report = ScenarioReport::new(SUITE, case.name);
    let result = async {
        reset_session(driver, form).await?;
        login(driver, form, email, password).await?;
        for locator in &case.expect_visible {
            let outcome = expect(driver, locator.clone())
                .with_timeouts(&ctx.timeouts)
                .to_be_visible()
                .await?;
            report.record(format!("{} visible", locator), ctx.severity, outcome);
        }

        if let Some(after_logout) = &case.after_logout {
            let outcome = logout(driver, form).await?;
            report.record("logout clicked", ctx.severity, outcome);
            for locator in after_logout {
                let outcome = expect(driver, locator.clone())
                    .with_timeouts(&ctx.timeouts)
                    .to_be_visible()
                    .await?;
                report.record(format!("{} visible after logout", locator), ctx.severity, outcome);
            }
        }

        if let Some(file) = case.screenshot {
            save_screenshot(driver, ctx.screenshot_dir, file).await?;
        }
        Ok::<(), DriverError>(())
    }
    .await;
    report.finish(result)
}

fn credential_pair(user: &Option<String>, password: &Option<String>) -> Option<Credential> {
    match (user, password) {
        (Some(user), Some(password)) => Some(Credential::new(user, password)),
        _ => None,
    }
}

fn site_credential(credentials: &Credentials, site: &str) -> Option<Credential> {
    match site {
        "najada" => credential_pair(&credentials.najada_user, &credentials.najada_password),
        "kitner" => credential_pair(&credentials.kitner_email, &credentials.kitner_password),
        _ => None,
    }
}

/// Every login case of every site.
pub async fn run_suite<D: Driver + ?Sized>(
    driver: &mut D,
    config: &SitecheckConfig,
) -> Vec<ScenarioReport> {
    let settle = Duration::from_millis(config.login.settle_ms);
    let sites = [
        (LoginForm::najada(&config.sites.najada, settle), najada_cases()),
        (LoginForm::rohlik(&config.sites.rohlik, settle), rohlik_cases()),
        (LoginForm::kitner(&config.sites.kitner_login), kitner_cases()),
    ];
    let ctx = CaseContext {
        timeouts: config.timeouts,
        severity: if config.login.soft_checks {
            Severity::Soft
        } else {
            Severity::Hard
        },
        screenshot_dir: &config.artifacts.screenshot_dir,
    };

    let mut reports = Vec::new();
    for (form, cases) in &sites {
        let credential = site_credential(&config.credentials, form.site);
        for case in cases {
            reports.push(run_case(driver, form, case, credential.as_ref(), &ctx).await);
        }
    }
    reports
}
