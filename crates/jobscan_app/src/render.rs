use std::fmt::Write;

use jobscan_core::{AppViewModel, PhaseView};

/// One-line summary of liveness and job progress.
pub fn status(view: &AppViewModel) -> String {
    let mut line = view.status_line.clone();
    match view.phase {
        PhaseView::Processing if view.poll_ticks > 0 => {
            let _ = write!(line, " ({} checks)", view.poll_ticks);
        }
        PhaseView::AwaitingAuth => {
            if let Some(url) = &view.auth_url {
                let _ = write!(line, ": {url}");
            }
        }
        PhaseView::Error => {
            if let Some(error) = &view.error {
                let _ = write!(line, ": {error}");
            }
        }
        _ => {}
    }
    if let Some(notice) = &view.notice {
        let _ = write!(line, " | {notice}");
    }
    line
}

/// Result table for a finished job.
pub fn results(view: &AppViewModel) -> String {
    if let Some(message) = &view.empty_message {
        return format!("{message}\n");
    }
    if view.rows.is_empty() {
        return format!(
            "No matching emails ({} filter, {} total).\n",
            view.filter.name(),
            view.total_records
        );
    }

    let company_width = column_width("Company", view.rows.iter().map(|r| r.company.as_str()));
    let date_width = column_width("Date", view.rows.iter().map(|r| r.date.as_str()));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<company_width$}  {:<date_width$}  Status",
        "Company", "Date"
    );
    for row in &view.rows {
        let _ = writeln!(
            out,
            "{:<company_width$}  {:<date_width$}  {}",
            row.company, row.date, row.label
        );
    }
    let _ = writeln!(
        out,
        "\nShowing {} of {} ({} filter)",
        view.rows.len(),
        view.total_records,
        view.filter.name()
    );
    out
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|cell| cell.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
}
