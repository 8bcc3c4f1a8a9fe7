use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use log::LevelFilter;
use report_core::{build_report_url, DeliveryKind, ReportAction, ReportType};
use report_engine::{
    DispatchOptions, Dispatcher, InMemorySession, ReqwestTransport, Routes, Services,
    SessionContext, WorkstationResolver,
};
use report_logging::{report_info, report_warn};
use serde_json::{Map, Value};

use super::cli::{Cli, Command, WorkstationCommand};
use super::config::AppConfig;
use super::console::{ConsoleActions, ConsoleBlocking, ConsoleDialog, ConsoleNotifier};
use super::logging;
use super::preferences::FilePreferenceStore;

pub async fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log.unwrap_or(config.log_destination), level);

    let session = Arc::new(
        InMemorySession::new(config.csrf_token.clone())
            .with_context(config.user_context())
            .with_printing_enabled(config.printing_enabled)
            .with_company_enabled(config.company_enabled),
    );
    let routes = Routes::default();
    let transport = Arc::new(ReqwestTransport::new(config.transport_settings())?);
    let resolver = WorkstationResolver::new(
        transport.clone(),
        session.clone(),
        Arc::new(FilePreferenceStore::open(&config.preferences_path)),
        routes.workstation_lookup.clone(),
    );

    match cli.command {
        Command::Url { report, kind } => {
            let action = report.to_action(report_type_for(kind))?;
            println!("{}", build_report_url(&action, kind, &session.user_context()));
        }
        Command::Workstation { action } => match action {
            WorkstationCommand::Show => match resolver.stored() {
                Some(id) => println!("{id}"),
                None => println!("no workstation selected"),
            },
            WorkstationCommand::Set { id } => {
                resolver.select(Some(id))?;
                println!("workstation set to {id}");
            }
            WorkstationCommand::Clear => {
                resolver.select(None)?;
                println!("workstation cleared");
            }
        },
        Command::Print {
            report,
            report_type,
            download,
            close,
        } => {
            let mut action = report.to_action(report_type)?;
            if close {
                action = action.closing_on_download();
            }

            if let Err(err) = resolver.resolve().await {
                report_warn!("Workstation lookup failed: {}", err);
            }

            let services = Services {
                transport,
                blocking: Arc::new(ConsoleBlocking::default()),
                notifier: Arc::new(ConsoleNotifier),
                dialog: Arc::new(ConsoleDialog),
                actions: Arc::new(ConsoleActions),
                session: session.clone(),
            };
            let dispatcher = Dispatcher::new(services, routes);
            let report_name = action.report_name.clone();
            let options = DispatchOptions {
                download,
                on_close: Some(Box::new(move || report_info!("Report {} handled", report_name))),
            };

            match dispatcher.dispatch(&action, options).await {
                Ok(Some(true)) => println!("submitted"),
                Ok(Some(false)) => println!("declined by server"),
                Ok(None) => println!(
                    "fallback to download: {}",
                    download_url(&action, &session.user_context())
                ),
                Err(err) => {
                    dispatcher.present(&err);
                    return Err(anyhow!("report {} was not printed", action.report_name));
                }
            }
        }
    }
    Ok(())
}

fn report_type_for(kind: DeliveryKind) -> ReportType {
    match kind {
        DeliveryKind::Pdf => ReportType::Pdf,
        DeliveryKind::Text => ReportType::Text,
        DeliveryKind::Html => ReportType::Html,
    }
}

fn download_url(action: &ReportAction, session_context: &Map<String, Value>) -> String {
    let kind = match action.report_type {
        ReportType::Pdf => DeliveryKind::Pdf,
        ReportType::Text => DeliveryKind::Text,
        ReportType::Html | ReportType::Other => DeliveryKind::Html,
    };
    build_report_url(action, kind, session_context)
}
