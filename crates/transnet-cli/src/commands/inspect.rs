//! Dataset inspection: what the loaders keep and what they drop.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Result};
use tabwriter::TabWriter;
use transnet_cli::{load_inference_config, InspectFormat};
use transnet_io::{IngestDiagnostics, MemoryStore};

pub fn handle(dataset: &Path, config: Option<&Path>, format: InspectFormat) -> Result<()> {
    if !dataset.exists() {
        bail!("Input '{}' does not exist", dataset.display());
    }
    let config = load_inference_config(config)?;
    let store = MemoryStore::from_path(dataset)?;
    let diagnostics = store.diagnose(&config.voltage_classes);

    match format {
        InspectFormat::Plain => print_summary(dataset, &config.voltage_classes, &diagnostics),
        InspectFormat::Json => {
            serde_json::to_writer_pretty(io::stdout(), &diagnostics)
                .map_err(|err| anyhow::anyhow!("serializing diagnostics to JSON: {err}"))?;
            println!();
            Ok(())
        }
    }
}

fn print_summary(
    dataset: &Path,
    voltage_classes: &[String],
    diagnostics: &IngestDiagnostics,
) -> Result<()> {
    let stats = &diagnostics.stats;
    println!("Dataset {}", dataset.display());
    println!("Voltage classes: {}", voltage_classes.join(", "));

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "ENTITY\tCOUNT")?;
    writeln!(writer, "nodes\t{}", stats.nodes)?;
    writeln!(writer, "ways\t{}", stats.ways)?;
    writeln!(writer, "relations\t{}", stats.relations)?;
    writeln!(writer, "stations\t{}", stats.stations)?;
    writeln!(writer, "plants\t{}", stats.plants)?;
    writeln!(writer, "lines\t{}", stats.lines)?;
    writeln!(writer, "ground-truth relations\t{}", stats.ground_truth_relations)?;
    writeln!(writer, "dropped features\t{}", stats.dropped_features)?;
    writer.flush()?;

    if diagnostics.has_issues() {
        println!(
            "\n{} warning(s), {} error(s):",
            diagnostics.warning_count(),
            diagnostics.error_count()
        );
        print!("{diagnostics}");
    }
    Ok(())
}
