//! Console tables printed after a run.

use std::fmt::Write;

use crate::pipeline::{AnalysisResult, ProjectionResult};

const VALUE_WIDTH: usize = 12;

/// Descriptor x axis loading table with `PC1` / `PC2` columns.
pub fn format_loadings(projection: &ProjectionResult) -> String {
    let names = projection.column_names();
    let name_width = label_width(names.iter().copied());
    let value_width = VALUE_WIDTH;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:name_width$}{:>value_width$}{:>value_width$}",
        "", "PC1", "PC2"
    );
    for (name, row) in names.iter().zip(projection.loadings().rows()) {
        let _ = writeln!(
            out,
            "{name:name_width$}{:>value_width$.6}{:>value_width$.6}",
            row[0], row[1]
        );
    }
    out
}

/// Cluster x descriptor mean table, ascending cluster id.
pub fn format_cluster_summary(result: &AnalysisResult) -> String {
    let names = result.table().column_names();
    let widths: Vec<usize> = names
        .iter()
        .map(|name| name.len().max(VALUE_WIDTH - 2) + 2)
        .collect();
    let cluster_width = "cluster".len() + 2;
    let mut out = String::new();
    let _ = write!(out, "{:cluster_width$}", "");
    for (name, width) in names.iter().zip(&widths) {
        let _ = write!(out, "{name:>width$}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "cluster");
    for summary in result.summaries() {
        let _ = write!(out, "{:<cluster_width$}", summary.cluster);
        for (mean, width) in summary.means.iter().zip(&widths) {
            let _ = write!(out, "{mean:>width$.6}");
        }
        let _ = writeln!(out);
    }
    out
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(str::len).max().unwrap_or(0) + 2
}
