//! Report rendering.

use std::fmt::Write as _;

use dirsync_core::SyncReport;

use crate::error::CliResult;

/// Render `report` as pretty JSON.
pub fn render_json(report: &SyncReport) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render `report` as a short human readable summary.
pub fn render_text(report: &SyncReport) -> String {
    let mut out = String::new();
    let plan = &report.plan;

    let mode = if report.dry_run { " (dry run)" } else { "" };
    let _ = writeln!(
        out,
        "Sync {} finished in {}ms{}",
        report.run_id,
        report.duration_ms(),
        mode
    );
    let _ = writeln!(
        out,
        "Plan:    users +{} ~{} -{} ({} unchanged), groups +{} -{} ({} existing), memberships -{}",
        plan.users_to_add,
        plan.users_to_update,
        plan.users_to_delete,
        plan.users_unchanged,
        plan.groups_to_add,
        plan.groups_to_delete,
        plan.groups_equal,
        plan.memberships_to_delete,
    );

    match &report.applied {
        Some(stats) => {
            let _ = writeln!(
                out,
                "Applied: users +{} ~{} -{}, groups +{} -{} ({} adopted), members +{} -{}",
                stats.users_created,
                stats.users_updated,
                stats.users_deleted,
                stats.groups_created,
                stats.groups_deleted,
                stats.groups_adopted,
                stats.members_added,
                stats.members_removed,
            );
            if stats.users_already_deleted > 0 {
                let _ = writeln!(
                    out,
                    "         {} user(s) were already gone downstream",
                    stats.users_already_deleted
                );
            }
            if stats.stale_members_dropped > 0 {
                let _ = writeln!(
                    out,
                    "         {} stale cached member(s) dropped",
                    stats.stale_members_dropped
                );
            }
        }
        None => {
            let _ = writeln!(out, "Applied: nothing");
        }
    }

    out
}

/// Print `report` to stdout.
pub fn print_report(report: &SyncReport, json: bool) -> CliResult<()> {
    if json {
        println!("{}", render_json(report)?);
    } else {
        print!("{}", render_text(report));
    }
    Ok(())
}
