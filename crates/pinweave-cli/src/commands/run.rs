//! Build a circuit from a blueprint and drive it.

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use pinweave::prelude::*;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};

use crate::config::Config;

/// One thing done to a running circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Stimulus {
    Send { to: Endpoint, value: Payload },
    Activate(String),
}

impl Stimulus {
    /// Parse `node.tag=value`. The value is read as JSON, falling back to a
    /// plain string.
    pub fn parse_send(spec: &str) -> Result<Self> {
        let (target, raw) = spec
            .split_once('=')
            .ok_or_else(|| anyhow!("expected node.tag=value, got {spec:?}"))?;
        let to: Endpoint = target.parse()?;
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Payload::String(raw.to_string()));
        Ok(Stimulus::Send { to, value })
    }
}

/// Load the blueprint, apply `stimuli` in order and collect every emission.
pub fn execute(path: &Path, stimuli: &[Stimulus]) -> Result<Vec<Emission>> {
    let blueprint = Blueprint::load(path)
        .with_context(|| format!("Failed to load blueprint: {}", path.display()))?;
    let circuit = blueprint.instantiate(Rc::new(NodeRegistry::standard()))?;
    info!(
        blueprint = %path.display(),
        nodes = circuit.len(),
        stimuli = stimuli.len(),
        "circuit ready"
    );

    let emissions = Rc::new(RefCell::new(Vec::new()));
    let sink = emissions.clone();
    circuit.tap(move |e| sink.borrow_mut().push(e.clone()));

    for stimulus in stimuli {
        debug!(?stimulus, "applying stimulus");
        match stimulus {
            Stimulus::Send { to, value } => circuit.send(to, value.clone())?,
            Stimulus::Activate(name) => circuit.activate(name)?,
        }
    }

    drop(circuit);
    let emissions = emissions.take();
    debug!(emissions = emissions.len(), "run finished");
    Ok(emissions)
}

pub fn run(
    blueprint: &str,
    sends: &[String],
    activations: &[String],
    json: bool,
    config: &Config,
) -> Result<()> {
    let mut stimuli = sends
        .iter()
        .map(|s| Stimulus::parse_send(s))
        .collect::<Result<Vec<_>>>()?;
    stimuli.extend(activations.iter().cloned().map(Stimulus::Activate));

    if !json {
        println!(
            "{} Running {} with {} stimuli...",
            "→".blue(),
            blueprint.cyan(),
            stimuli.len().to_string().cyan()
        );
    }

    let emissions = execute(Path::new(blueprint), &stimuli)?;

    if json {
        for e in &emissions {
            println!("{}", serde_json::to_string(e)?);
        }
        return Ok(());
    }

    if config.run.print_events {
        for e in &emissions {
            println!(
                "  {}.{} {} {}",
                e.node.bold(),
                e.tag,
                "→".dimmed(),
                e.value.to_string().green()
            );
        }
    }

    println!();
    println!(
        "{} {} emissions",
        "✓".green().bold(),
        emissions.len().to_string().cyan()
    );
    Ok(())
}
