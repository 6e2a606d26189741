//! Rendering helpers (markdown) for human-readable artifacts.

use architect_types::report::{Bucket, ImportReport, ImportResult};
use serde_json::Value;

pub fn render_import_md(report: &ImportReport) -> String {
    let mut out = String::new();
    out.push_str("# architect import\n\n");
    out.push_str(&format!(
        "- Status: {}\n",
        if report.no_errors { "ok" } else { "errors" }
    ));
    out.push_str(&format!(
        "- Items: {} (succeeded {}, failed {})\n",
        report.summary.attempted, report.summary.succeeded, report.summary.failed
    ));
    if report.summary.pruned > 0 {
        out.push_str(&format!("- Entry types pruned: {}\n", report.summary.pruned));
    }
    if let Some(location) = &report.backup_location {
        out.push_str(&format!("- Restore point: `{}`\n", location));
    }
    out.push('\n');

    if report.results.is_empty() {
        out.push_str("_Nothing imported._\n");
        return out;
    }

    for bucket in Bucket::IMPORT_ORDER {
        let results = report.bucket(bucket);
        if results.is_empty() {
            continue;
        }
        out.push_str(&format!("## {}\n\n", bucket));
        for (i, result) in results.iter().enumerate() {
            render_result(&mut out, i + 1, result);
        }
        out.push('\n');
    }

    if !report.pruned_entry_types.is_empty() {
        out.push_str("## Pruned entry types\n\n");
        for pair in &report.pruned_entry_types {
            out.push_str(&format!("- `{}`\n", pair));
        }
        out.push('\n');
    }

    if !report.diagnostics.is_empty() {
        out.push_str("## Diagnostics\n\n");
        for d in &report.diagnostics {
            out.push_str(&format!("- {}\n", d));
        }
        out.push('\n');
    }

    out
}

fn render_result(out: &mut String, n: usize, result: &ImportResult) {
    let mark = if result.success { "ok" } else { "failed" };
    out.push_str(&format!("{}. `{}` {}\n", n, item_label(&result.item), mark));
    for (key, messages) in &result.errors {
        for message in messages {
            out.push_str(&format!("   - `{}`: {}\n", key, message));
        }
    }
}

/// Short name for an item: its handle, else its name, else `?`.
fn item_label(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => ["handle", "name"]
            .iter()
            .filter_map(|k| map.get(*k).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .unwrap_or("?")
            .to_string(),
        _ => "?".to_string(),
    }
}
