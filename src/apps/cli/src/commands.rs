use std::process::ExitCode;

use anyhow::{Context, Result};
use sovereign_core::export::{write_document, ExportFormat};
use sovereign_core::research::SessionSnapshot;
use sovereign_core::{
    ClientConfig, ResearchError, SessionState, SseConnector, StreamSessionController,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ui::{state_label, SnapshotPrinter};
use crate::{ExportArgs, ResearchArgs};

const EXIT_INVALID_INPUT: u8 = 2;
const EXIT_CANCELLED: u8 = 130;

pub async fn research(args: ResearchArgs, mut config: ClientConfig) -> Result<ExitCode> {
    if let Some(endpoint) = args.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        config.endpoint = endpoint.to_string();
    }

    let connector = SseConnector::new(&config).context("failed to build stream client")?;
    let mut controller = StreamSessionController::new(connector);
    let printer = tokio::spawn(print_snapshots(controller.subscribe()));

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling session");
            ctrl_c.cancel();
        }
    });

    let state = match controller.start_until(&args.topic, &cancel).await {
        // drive returns at once if Ctrl-C already ended the connection attempt
        Ok(()) => controller.drive(&cancel).await,
        Err(ResearchError::InvalidInput(reason)) => {
            controller.shutdown();
            let _ = printer.await;
            eprintln!("Error: {}", reason);
            return Ok(ExitCode::from(EXIT_INVALID_INPUT));
        }
        // Transport failures are already reflected in the session state.
        Err(_) => controller.state(),
    };

    let exported = if args.export {
        if controller.report().is_empty() {
            warn!("Export skipped: no report received");
            None
        } else {
            let document = controller.export_document()?;
            let dir = args.output.dir(&config);
            Some(write_document(&document, &dir, args.output.format.into())?)
        }
    } else {
        None
    };

    let report = controller.report();
    controller.shutdown();
    let _ = printer.await;

    println!("\nSTATUS: {}", state_label(state));
    if !report.is_empty() {
        println!("\n{}", report.text);
    }
    if let Some(path) = exported {
        println!("\nExported: {}", path.display());
    }

    Ok(match state {
        SessionState::Errored => ExitCode::FAILURE,
        SessionState::Idle => ExitCode::from(EXIT_CANCELLED),
        _ => ExitCode::SUCCESS,
    })
}

pub fn export(args: ExportArgs, config: &ClientConfig) -> Result<ExitCode> {
    let topic = args.topic.trim();
    if topic.is_empty() {
        eprintln!("Error: topic cannot be empty");
        return Ok(ExitCode::from(EXIT_INVALID_INPUT));
    }

    let text = std::fs::read_to_string(&args.report)
        .with_context(|| format!("failed to read report {}", args.report.display()))?;
    let document = sovereign_core::export::export(topic, &text);
    let format: ExportFormat = args.output.format.into();
    let path = write_document(&document, &args.output.dir(config), format)?;

    info!(
        "Offline export finished: path={}, pages={}",
        path.display(),
        document.pages.len()
    );
    println!("Exported: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// Runs until the controller drops its sender.
async fn print_snapshots(mut rx: watch::Receiver<SessionSnapshot>) {
    let mut printer = SnapshotPrinter::new();
    while rx.changed().await.is_ok() {
        let update = printer.render_update(&rx.borrow_and_update());
        if !update.is_empty() {
            print!("{}", update);
        }
    }
}
