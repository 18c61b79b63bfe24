//! Airtable command handlers: status, sync, reset.

use tabled::Tabled;

use mapinv_config::Config;
use mapinv_core::{
    CoreError, EntityKind, Inventory, KindStatus, RecordTable, ResetReport, StatusCounts,
    StatusReport, SyncReport,
};

use crate::cli::{AirtableArgs, AirtableCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Table")]
    table: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Missing")]
    missing: String,
    #[tabled(rename = "Outdated")]
    outdated: String,
    #[tabled(rename = "Orphaned")]
    orphaned: String,
    #[tabled(rename = "Duplicates")]
    duplicates: String,
}

impl StatusRow {
    fn new(kind: String, table: String, counts: StatusCounts, color: bool) -> Self {
        Self {
            kind,
            table,
            current: output::count(counts.current, Tone::Good, color),
            missing: output::count(counts.missing, Tone::Warn, color),
            outdated: output::count(counts.outdated, Tone::Warn, color),
            orphaned: output::count(counts.orphaned, Tone::Bad, color),
            duplicates: output::count(counts.duplicates, Tone::Bad, color),
        }
    }
}

#[derive(Tabled)]
struct SyncRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Created")]
    created: usize,
    #[tabled(rename = "Updated")]
    updated: usize,
    #[tabled(rename = "Deleted")]
    deleted: usize,
    #[tabled(rename = "Before (cur/miss/out/orph/dup)")]
    before: String,
    #[tabled(rename = "After")]
    after: String,
}

#[derive(Tabled)]
struct ResetRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Table")]
    table: String,
    #[tabled(rename = "Deleted")]
    deleted: usize,
}

fn counts_cell(counts: StatusCounts) -> String {
    format!(
        "{}/{}/{}/{}/{}",
        counts.current, counts.missing, counts.outdated, counts.orphaned, counts.duplicates
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: AirtableArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let catalogue = util::load_catalogue(&config::data_path(global, cfg))?;
    let airtable = config::airtable(global, cfg)?;
    let mut inventory = Inventory::new(catalogue, airtable.tables()?);

    let out = match args.command {
        AirtableCommand::Status { kind } => {
            let spinner = util::spinner("Comparing with Airtable", global.quiet);
            let report = match kind {
                Some(kind) => single_status(inventory.status(kind.into()).await),
                None => inventory.status_all().await,
            };
            spinner.finish_and_clear();
            render_status(&report?, global)?
        }

        AirtableCommand::Sync { kind } => {
            let spinner = util::spinner("Synchronising with Airtable", global.quiet);
            let reports = match kind {
                Some(kind) => inventory.sync(kind.into()).await.map(|r| vec![r]),
                None => inventory.sync_all().await,
            };
            spinner.finish_and_clear();
            render_sync(&reports?, global)?
        }

        AirtableCommand::Reset { kind } => {
            let scope = kind.map_or_else(
                || "every managed table".to_owned(),
                |k| format!("the {} table", airtable.tables.get(k.into())),
            );
            if !util::confirm(
                &format!("Delete all records in {scope}? This is destructive."),
                "airtable reset",
                global.yes,
            )? {
                return Ok(());
            }
            let spinner = util::spinner("Deleting Airtable records", global.quiet);
            let reports = reset(&mut inventory, kind.map(EntityKind::from)).await;
            spinner.finish_and_clear();
            render_reset(&reports?, global)?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn single_status(
    status: Result<KindStatus, CoreError>,
) -> Result<StatusReport, CoreError> {
    let status = status?;
    Ok(StatusReport {
        totals: status.counts,
        kinds: vec![status],
    })
}

async fn reset<T: RecordTable>(
    inventory: &mut Inventory<T>,
    kind: Option<EntityKind>,
) -> Result<Vec<ResetReport>, CoreError> {
    match kind {
        Some(kind) => inventory.reset(kind).await.map(|r| vec![r]),
        None => inventory.reset_all().await,
    }
}

// ── Rendering ───────────────────────────────────────────────────────

fn render_status(report: &StatusReport, global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(global.color);
    output::render_single(
        global.output,
        report,
        |r| {
            let mut rows: Vec<StatusRow> = r
                .kinds
                .iter()
                .map(|k| StatusRow::new(k.kind.to_string(), k.table.clone(), k.counts, color))
                .collect();
            if r.kinds.len() > 1 {
                rows.push(StatusRow::new("total".into(), String::new(), r.totals, color));
            }
            format!(
                "{}\n{}",
                output::render_table(&rows),
                output::sync_label(r.is_in_sync(), color)
            )
        },
        |r| {
            r.kinds
                .iter()
                .map(|k| {
                    format!(
                        "{}\t{}\t{}\t{}\t{}\t{}",
                        k.kind,
                        k.counts.current,
                        k.counts.missing,
                        k.counts.outdated,
                        k.counts.orphaned,
                        k.counts.duplicates
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}

fn render_sync(reports: &[SyncReport], global: &GlobalOpts) -> Result<String, CliError> {
    output::render_list(
        global.output,
        reports,
        |r| SyncRow {
            kind: r.kind.to_string(),
            created: r.outcome.created,
            updated: r.outcome.updated,
            deleted: r.outcome.deleted,
            before: counts_cell(r.before),
            after: counts_cell(r.after),
        },
        |r| {
            format!(
                "{}\t{}\t{}\t{}",
                r.kind, r.outcome.created, r.outcome.updated, r.outcome.deleted
            )
        },
    )
}

fn render_reset(reports: &[ResetReport], global: &GlobalOpts) -> Result<String, CliError> {
    if global.output == OutputFormat::Plain {
        let total: usize = reports.iter().map(|r| r.deleted).sum();
        return Ok(total.to_string());
    }
    output::render_list(
        global.output,
        reports,
        |r| ResetRow {
            kind: r.kind.to_string(),
            table: r.table.clone(),
            deleted: r.deleted,
        },
        |r| r.kind.to_string(),
    )
}
