use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use report_core::{ActionContext, DeliveryKind, RecordId, ReportAction, ReportType};
use serde_json::{Map, Value};

use super::config::DEFAULT_CONFIG_PATH;
use super::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "report_app", about = "Send reports to network printers or fall back to download")]
pub struct Cli {
    /// RON configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// Overrides the configured log destination.
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,
    #[arg(short, long)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Dispatch a report action: print it, or report that it should be downloaded.
    Print {
        #[command(flatten)]
        report: ReportArgs,
        #[arg(long = "type", default_value = "qweb-pdf")]
        report_type: ReportType,
        /// Request the download path.
        #[arg(long)]
        download: bool,
        /// Close the current view once the job is accepted.
        #[arg(long)]
        close: bool,
    },
    /// Print the report fetch path for an action.
    Url {
        #[command(flatten)]
        report: ReportArgs,
        #[arg(long, default_value = "pdf")]
        kind: DeliveryKind,
    },
    /// Manage this machine's workstation id.
    Workstation {
        #[command(subcommand)]
        action: WorkstationCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum WorkstationCommand {
    Show,
    Set { id: RecordId },
    Clear,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Technical report name, e.g. `sale.report_saleorder`.
    #[arg(long)]
    pub report: String,
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<RecordId>,
    #[arg(long)]
    pub printer: Option<RecordId>,
    #[arg(long)]
    pub bin: Option<RecordId>,
    /// Wizard options as a JSON object.
    #[arg(long)]
    pub data: Option<String>,
    /// Extra action context as a JSON object.
    #[arg(long)]
    pub context: Option<String>,
}

impl ReportArgs {
    pub fn to_action(&self, report_type: ReportType) -> anyhow::Result<ReportAction> {
        let mut context: ActionContext = match &self.context {
            Some(raw) => serde_json::from_str(raw).context("--context must be a JSON object")?,
            None => ActionContext::default(),
        };
        if !self.ids.is_empty() {
            context.active_ids = self.ids.clone();
        }
        if self.printer.is_some() {
            context.printer_id = self.printer;
        }
        if self.bin.is_some() {
            context.printer_bin = self.bin;
        }

        let mut action = ReportAction::new(self.report.clone(), report_type).with_context(context);
        if let Some(raw) = &self.data {
            action = action.with_data(parse_object(raw)?);
        }
        Ok(action)
    }
}

fn parse_object(raw: &str) -> anyhow::Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).context("--data must be JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("--data must be a JSON object, got {other}"),
    }
}
