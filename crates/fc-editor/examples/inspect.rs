//! Inspect exported FlowCanvas documents from the command line.
//!
//! Prints a summary per file and, when the document carries at least two
//! saved versions, the change counts between the two most recent saves.
//!
//! Usage:
//!   cargo run --example inspect -- export.json [more.json ...]

use fc_core::diff::{snapshot_diff, DiffStatus, SnapshotDiff};
use fc_core::{ElementId, Version};
use fc_editor::CanvasEngine;
use std::collections::HashMap;
use std::fs;

fn count(statuses: &HashMap<ElementId, DiffStatus>, status: DiffStatus) -> usize {
    statuses.values().filter(|s| **s == status).count()
}

fn print_change_line(label: &str, diff: &SnapshotDiff) {
    println!(
        "    {label}: +{} ~{} -{} nodes, +{} ~{} -{} edges",
        count(&diff.nodes, DiffStatus::Added),
        count(&diff.nodes, DiffStatus::Modified),
        count(&diff.nodes, DiffStatus::Deleted),
        count(&diff.edges, DiffStatus::Added),
        count(&diff.edges, DiffStatus::Modified),
        count(&diff.edges, DiffStatus::Deleted),
    );
}

fn main() {
    env_logger::init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: inspect <export.json> [more.json ...]");
        std::process::exit(1);
    }

    let mut failures = 0;
    for path in &paths {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("✗ {path}: {err}");
                failures += 1;
                continue;
            }
        };

        let mut engine = CanvasEngine::default();
        match engine.import_json(&text) {
            Ok(()) => {
                let snapshot = engine.snapshot();
                println!(
                    "✓ {path}: {} node(s), {} edge(s), {} version(s)",
                    snapshot.nodes.len(),
                    snapshot.edges.len(),
                    engine.versions().len()
                );
                let mut versions: Vec<&Version> = engine.versions().iter().collect();
                versions.sort_by_key(|v| v.timestamp);
                if let [.., previous, latest] = versions.as_slice() {
                    let diff = snapshot_diff(&previous.snapshot, &latest.snapshot);
                    let label = format!("{} → {}", previous.name, latest.name);
                    print_change_line(&label, &diff);
                }
            }
            Err(err) => {
                eprintln!("✗ {path}: {err}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
