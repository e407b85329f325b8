mod runner;

use anyhow::Context;
use clap::{Parser, Subcommand};
use runner::Suite;
use sitecheck_e::EmbeddedDriver;
use sitecheck_engine::Driver;
use sitecheck_engine::config::{ConfigLoader, SitecheckConfig};
use sitecheck_engine::formatter::{format_driver_error, format_report};
use sitecheck_h::HeadlessDriver;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sitecheck", version, about = "End-to-end checks for practice web shops and APIs")]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Config file (default: $SITECHECK_CONFIG, ./sitecheck.yaml, ~/.sitecheck/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Suites to run; repeat for several (default: all the mode supports)
    #[arg(long = "suite", value_enum)]
    suites: Vec<Suite>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Use headless browser (Chromium) via CDP
    Headless {
        /// Launch browser in visible mode (not headless)
        #[arg(long)]
        visible: bool,
    },
    /// Use a browser behind an external W3C WebDriver server
    Embedded {
        /// WebDriver URL, e.g. http://localhost:4444
        #[arg(long)]
        driver_url: String,
    },
    /// HTTP suites only, no browser
    Api,
}

impl Mode {
    fn driver(&self, config: &SitecheckConfig) -> Option<Box<dyn Driver>> {
        match self {
            Mode::Headless { visible } => Some(Box::new(HeadlessDriver::new_with_visibility(
                *visible,
                config.timeouts,
            ))),
            Mode::Embedded { driver_url } => Some(Box::new(EmbeddedDriver::with_url(
                driver_url.clone(),
                config.timeouts,
            ))),
            Mode::Api => None,
        }
    }
}

async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SitecheckConfig> {
    let config = match path {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConfigLoader::load_default().await.context("loading config")?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // stdout carries only the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref()).await?;

    let mut driver = args.mode.driver(&config);
    let suites = runner::select(&args.suites, driver.is_some())?;

    if let Some(driver) = driver.as_mut() {
        if let Err(e) = driver.launch().await {
            eprintln!("Failed to launch driver:\n{}", format_driver_error(&e));
            return Err(e.into());
        }
    }

    let result = runner::run(driver.as_deref_mut().map(|d| d as &mut dyn Driver), &suites, &config).await;

    if let Some(driver) = driver.as_mut() {
        if let Err(e) = driver.close().await {
            tracing::warn!("Failed to close driver: {}", e);
        }
    }

    let report = result?;
    println!("{}", format_report(&report));
    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_suites_and_mode() {
        let args = Args::try_parse_from([
            "sitecheck",
            "--suite",
            "cart",
            "--suite",
            "registration",
            "headless",
            "--visible",
        ])
        .unwrap();
        assert_eq!(args.suites, vec![Suite::Cart, Suite::Registration]);
        assert!(matches!(args.mode, Mode::Headless { visible: true }));
    }

    #[test]
    fn embedded_requires_driver_url() {
        assert!(Args::try_parse_from(["sitecheck", "embedded"]).is_err());
        let args =
            Args::try_parse_from(["sitecheck", "embedded", "--driver-url", "http://localhost:4444"])
                .unwrap();
        assert!(matches!(args.mode, Mode::Embedded { .. }));
    }

    #[test]
    fn api_mode_has_no_driver() {
        assert!(Mode::Api.driver(&SitecheckConfig::default()).is_none());
    }
}
