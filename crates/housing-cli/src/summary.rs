use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use housing_core::TrainingRun;
use housing_model::DriftReport;

use crate::commands::ActiveModel;

pub fn print_training_summary(run: &TrainingRun) {
    println!("Run: {}", run.run_id);
    println!("Model: {}", run.model_path.display());
    println!("Active: {}", run.active_model_path.display());
    println!("Profile: {}", run.profile_path.display());
    println!("Metrics: {}", run.metrics_path.display());
    println!("Manifest: {}", run.manifest_path.display());

    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    for (name, value) in metric_rows(run) {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    align_column(&mut table, 1, CellAlignment::Right);
    println!("{table}");
}

pub fn print_active_model(active: &ActiveModel) {
    let artifact = &active.artifact;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);
    table.add_row(vec![Cell::new("run_id"), Cell::new(artifact.run_id.as_str())]);
    table.add_row(vec![
        Cell::new("trained_at"),
        Cell::new(artifact.trained_at.to_rfc3339()),
    ]);
    table.add_row(vec![
        Cell::new("path"),
        Cell::new(active.path.display().to_string()),
    ]);
    table.add_row(vec![
        Cell::new("alpha"),
        Cell::new(format_value(artifact.model.alpha())),
    ]);
    table.add_row(vec![
        Cell::new("features"),
        Cell::new(artifact.model.pipeline().width()),
    ]);
    println!("{table}");
}

/// Short drift digest on stderr so stdout stays valid JSON.
pub fn print_drift_digest(drift: Option<&DriftReport>) {
    let Some(drift) = drift else {
        return;
    };
    if let Some((column, shift)) = drift.max_abs_shift() {
        eprintln!("largest median shift: {column} ({})", format_value(shift));
    }
    if let Some((column, share)) = drift.max_unknown_share() {
        eprintln!("largest unknown share: {column} ({})", format_value(share));
    }
}

fn metric_rows(run: &TrainingRun) -> Vec<(String, String)> {
    let mut rows = vec![
        ("rmse".to_string(), format_value(run.metrics.rmse)),
        ("mae".to_string(), format_value(run.metrics.mae)),
        ("r2".to_string(), format_value(run.metrics.r2)),
    ];
    rows.extend(
        run.meta
            .iter()
            .map(|(name, value)| (name.clone(), format_value(*value))),
    );
    rows
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
