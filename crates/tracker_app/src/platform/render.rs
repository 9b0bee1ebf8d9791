use std::fmt::Write;

use tracker_core::{JobRowView, PanelViewModel};

/// Formats the panel as a plain-text table.
pub fn render(view: &PanelViewModel) -> String {
    let mut out = String::new();

    if let Some(error) = &view.load_error {
        let _ = writeln!(out, "Job list unavailable: {}", error);
    } else if view.jobs.is_empty() {
        out.push_str("No calculations\n");
    } else {
        let _ = writeln!(out, "{:<12} {:<10} {:<26} ACTIONS", "ID", "STATUS", "ENQUEUED");
        for row in &view.jobs {
            let _ = writeln!(
                out,
                "{:<12} {:<10} {:<26} {}",
                row.id.as_str(),
                row.status.as_str(),
                row.enqueued,
                actions(row)
            );
        }
    }

    if view.busy {
        out.push_str("Working...\n");
    }
    if let Some(message) = &view.message {
        let _ = writeln!(out, "Server: {}", message);
    }
    out
}

fn actions(row: &JobRowView) -> String {
    let mut actions = Vec::new();
    if row.can_abort {
        actions.push("abort");
    }
    if row.can_show_results {
        actions.push("results");
    }
    actions.push("delete");
    actions.join(",")
}
