use anyhow::{Context, bail};
use clap::ValueEnum;
use sitecheck_engine::api::{self, registration, spotify};
use sitecheck_engine::config::SitecheckConfig;
use sitecheck_engine::{Driver, RunReport, cart, login, todo};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Suite {
    Cart,
    Todo,
    Login,
    Spotify,
    Registration,
}

impl Suite {
    pub const ALL: [Suite; 5] = [
        Suite::Cart,
        Suite::Todo,
        Suite::Login,
        Suite::Spotify,
        Suite::Registration,
    ];

    pub fn needs_browser(&self) -> bool {
        matches!(self, Suite::Cart | Suite::Todo | Suite::Login)
    }
}

/// Suites to run, in canonical order. None requested means every suite the mode can run.
pub fn select(requested: &[Suite], with_browser: bool) -> anyhow::Result<Vec<Suite>> {
    if requested.is_empty() {
        return Ok(Suite::ALL
            .into_iter()
            .filter(|s| with_browser || !s.needs_browser())
            .collect());
    }
    if !with_browser {
        if let Some(suite) = requested.iter().find(|s| s.needs_browser()) {
            bail!("suite {:?} needs a browser; use the headless or embedded mode", suite);
        }
    }
    Ok(Suite::ALL
        .into_iter()
        .filter(|s| requested.contains(s))
        .collect())
}

/// Run `suites` in order. Browser suites share `driver`, which must already be launched.
pub async fn run(
    mut driver: Option<&mut dyn Driver>,
    suites: &[Suite],
    config: &SitecheckConfig,
) -> anyhow::Result<RunReport> {
    let http = api::http_client(config.timeouts.load()).context("building HTTP client")?;
    let mut report = RunReport::default();

    for suite in suites {
        info!("Running {:?} suite", suite);
        let scenarios = match (suite, driver.as_deref_mut()) {
            (Suite::Spotify, _) => spotify::run_suite(&http, config).await,
            (Suite::Registration, _) => registration::run_suite(&http, config).await,
            (Suite::Cart, Some(d)) => cart::run_suite(d, config).await,
            (Suite::Todo, Some(d)) => {
                todo::run_suite(d, &config.sites.todomvc, config.timeouts).await
            }
            (Suite::Login, Some(d)) => login::run_suite(d, config).await,
            (suite, None) => {
                warn!("No browser for {:?} suite", suite);
                bail!("suite {:?} needs a browser", suite);
            }
        };
        report.extend(scenarios);
    }
    Ok(report)
}
