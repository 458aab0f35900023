//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::workflow::action::SnapshotRecord;
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render snapshot records as a formatted table
    pub fn render_snapshot_list(&self, records: &[SnapshotRecord]) -> String {
        if records.is_empty() {
            return "No snapshots found".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("SNAPSHOT").set_alignment(CellAlignment::Left),
                Cell::new("SOURCE PVC").set_alignment(CellAlignment::Left),
                Cell::new("READY").set_alignment(CellAlignment::Center),
                Cell::new("AGE").set_alignment(CellAlignment::Right),
            ]);

        for record in records {
            let icon = StatusIcon::get_ready_icon(record.ready_to_use);
            let text = StatusIcon::get_ready_text(record.ready_to_use);
            let color = self.theme.get_ready_color(record.ready_to_use);

            table.add_row(vec![
                Cell::new(&record.name),
                Cell::new(&record.source_pvc),
                Cell::new(format!("{} {}", icon, text)).fg(color),
                Cell::new(format_age(record.creation_timestamp)),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Volume Snapshots {} ─╮\n",
            format!("[{} snapshots]", records.len())
                .bright_black()
                .to_string()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Ready  {} Pending\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::PENDING.yellow()
        ));

        output
    }

    /// Render one tab-separated line per record, in the given order.
    /// Suited for scripting; no headers, no decoration.
    pub fn render_plain(records: &[SnapshotRecord]) -> String {
        records
            .iter()
            .map(|record| {
                format!(
                    "{}\t{}\t{}",
                    record.name,
                    record.source_pvc,
                    if record.ready_to_use { "ready" } else { "pending" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Compact kubectl-style age: 42s, 5m, 3h, 7d.
fn format_age(created: Option<DateTime<Utc>>) -> String {
    let Some(created) = created else {
        return "<unknown>".to_string();
    };

    let secs = (Utc::now() - created).num_seconds().max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}
