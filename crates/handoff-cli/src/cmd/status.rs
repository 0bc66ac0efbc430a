use super::{load_config, load_state};
use crate::output::{print_json, print_table};
use anyhow::Context;
use handoff_core::pipeline;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let state = load_state(root)?;
    let rows = pipeline::status(root, &config, &state).context("failed to read artifacts")?;

    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!(
            "No plans or RCAs yet. Start with: handoff planning <feature> or handoff rca <issue-id>"
        );
        return Ok(());
    }

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.kind.to_string(),
                r.subject.clone(),
                r.position.to_string(),
                r.next.clone().unwrap_or_else(|| "-".to_string()),
                r.title.clone(),
            ]
        })
        .collect();
    print_table(&["KIND", "SUBJECT", "POSITION", "NEXT", "TITLE"], &table);
    Ok(())
}
