use std::process::ExitCode;
use std::sync::Arc;

use jobscan_core::{AppState, FilterSelection, JobPhase, Msg};
use jobscan_engine::{BackendError, OpenError, ReqwestBackend, Session, SystemUrlOpener};
use jobscan_logging::{jobscan_error, jobscan_info};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::Cli;
use crate::config::{AppConfig, ConfigError};
use crate::render;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("backend client could not be built: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Opener(#[from] OpenError),
    #[error("terminal io failed: {0}")]
    Io(#[from] std::io::Error),
}

pub fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let config_path = AppConfig::locate(cli.config.as_deref());
    let config = AppConfig::load(config_path.as_deref())?;
    jobscan_logging::initialize(cli.log.into(), config.level()?, &config.log_file);
    match &config_path {
        Some(path) => jobscan_info!("Loaded config from {:?}", path),
        None => jobscan_info!("No config file found, using defaults"),
    }
    jobscan_info!(
        "jobscan starting: backend={} filter={}",
        config.backend_url,
        cli.filter.name()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(scan(cli.email, cli.filter, config))
}

async fn scan(
    email: String,
    filter: FilterSelection,
    config: AppConfig,
) -> Result<ExitCode, AppError> {
    let backend = ReqwestBackend::new(&config.backend_settings())?;
    let opener = SystemUrlOpener::new()?;
    let mut session = Session::create(
        Arc::new(backend),
        Arc::new(opener),
        config.session_config(),
    )
    .on_online(|| jobscan_info!("Backend reachable, ready to scan"));
    session.dispatch(Msg::FilterSelected(filter));
    session.dispatch(Msg::EmailChanged(email));

    let mut printer = StatusPrinter::default();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    advance(&mut session, &mut printer, |s| s.liveness().is_online()).await;
    loop {
        session.dispatch(Msg::StartClicked);
        advance(&mut session, &mut printer, |s| !s.phase().is_busy()).await;

        match session.state().phase() {
            JobPhase::AwaitingAuth(_) => {
                session.dispatch(Msg::OpenAuthClicked);
                printer.refresh(&mut session);
                println!("Press Enter once sign-in is complete.");
                if stdin.next_line().await?.is_none() {
                    jobscan_info!("stdin closed while waiting for sign-in");
                    return Ok(ExitCode::FAILURE);
                }
            }
            JobPhase::Done(_) => {
                print!("{}", render::results(&session.view()));
                return Ok(ExitCode::SUCCESS);
            }
            JobPhase::Error(err) => {
                jobscan_error!("Scan failed ({}): {}", err.kind(), err);
                return Ok(ExitCode::FAILURE);
            }
            JobPhase::Idle | JobPhase::Starting | JobPhase::Processing => {
                // Start was refused; the notice has already been printed.
                return Ok(ExitCode::FAILURE);
            }
        }
    }
}

async fn advance(
    session: &mut Session,
    printer: &mut StatusPrinter,
    mut done: impl FnMut(&AppState) -> bool,
) {
    printer.refresh(session);
    while !done(session.state()) {
        session.next().await;
        printer.refresh(session);
    }
}

/// Prints the status line whenever it changes.
#[derive(Default)]
struct StatusPrinter {
    last: Option<String>,
}

impl StatusPrinter {
    fn refresh(&mut self, session: &mut Session) {
        if !session.consume_dirty() && self.last.is_some() {
            return;
        }
        let line = render::status(&session.view());
        if self.last.as_deref() != Some(line.as_str()) {
            println!("{line}");
            self.last = Some(line);
        }
    }
}
