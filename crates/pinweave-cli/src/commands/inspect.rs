//! Show the nodes and relations a blueprint builds.

use anyhow::{Context, Result};
use colored::Colorize;
use pinweave::prelude::*;
use pinweave::runtime::circuit::CircuitSnapshot;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

pub fn snapshot(path: &Path) -> Result<CircuitSnapshot> {
    let blueprint = Blueprint::load(path)
        .with_context(|| format!("Failed to load blueprint: {}", path.display()))?;
    let circuit = blueprint.instantiate(Rc::new(NodeRegistry::standard()))?;
    debug!(blueprint = %path.display(), nodes = circuit.len(), "inspecting circuit");
    Ok(circuit.snapshot())
}

pub fn run(blueprint: &str, json: bool) -> Result<()> {
    let snapshot = snapshot(Path::new(blueprint))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{}", "Nodes".bold());
    for node in &snapshot.nodes {
        let proxied = if node.proxied { " (proxied)".yellow().to_string() } else { String::new() };
        println!("  {} {}{}", node.name.cyan(), node.kind.dimmed(), proxied);
        if !node.inputs.is_empty() {
            println!("    in:      {}", node.inputs.join(", "));
        }
        if !node.outputs.is_empty() {
            println!("    out:     {}", node.outputs.join(", "));
        }
        if !node.signals.is_empty() {
            println!("    signals: {}", node.signals.join(", "));
        }
    }

    println!();
    println!("{}", "Relations".bold());
    if snapshot.relations.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for r in &snapshot.relations {
        let detail = match &r.relation {
            Relation::Contains => "contains".to_string(),
            Relation::Proxies => "proxies".to_string(),
            Relation::Wire { output, input } => format!("{output} → {input}"),
            Relation::Signal { signal } => format!("{signal} → control"),
        };
        println!("  {} {} {}  {}", r.from.cyan(), "→".dimmed(), r.to.cyan(), detail);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn snapshot_lists_nodes_and_relations() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "nodes": [
                    {{ "name": "facade", "kind": "agent", "signature": {{ "inputs": ["in"] }} }},
                    {{ "name": "core", "kind": "call", "path": "std/relay" }}
                ],
                "proxies": [ {{ "facade": "facade", "core": "core" }} ]
            }}"#
        )
        .unwrap();

        let snapshot = snapshot(file.path()).unwrap();
        let names: Vec<&str> = snapshot.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["facade", "core"]);
        assert!(snapshot.nodes[0].proxied);
        assert_eq!(snapshot.nodes[1].kind, "call");
        assert_eq!(snapshot.relations[0].relation, Relation::Proxies);
    }
}
