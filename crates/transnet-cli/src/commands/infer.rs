use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use transnet_algo::{format_circuit, overpass_query, CircuitPipeline};
use transnet_cli::{resolve_inference_config, InferArgs};
use transnet_core::{Circuit, CircuitSink, StationId};
use transnet_io::{write_circuit_graph, JsonCircuitSink, MemoryStore};

pub fn handle(args: &InferArgs) -> Result<()> {
    let config = resolve_inference_config(args.config.as_deref(), args.radius, args.token_policy)?;
    let store = MemoryStore::from_path(&args.dataset)?;
    let pipeline = CircuitPipeline::new(&store, store.geometry(), &config);
    let mut topology = pipeline
        .load_topology()
        .context("loading topology from dataset")?;

    let seeds: Vec<StationId> = if args.all {
        topology.station_ids()
    } else {
        args.stations.iter().copied().map(StationId::new).collect()
    };
    if seeds.is_empty() {
        bail!("no seed stations to trace");
    }
    for seed in &seeds {
        if topology.station(*seed).is_none() {
            warn!("{} is not a loaded station; it yields no circuits", seed);
        }
    }
    info!(
        "Inferring circuits for {} seed(s) within {:.0} m",
        seeds.len(),
        config.neighborhood_radius
    );

    let report = pipeline.run(&mut topology, &seeds);

    let mut index = 0;
    for seed_report in &report.seeds {
        for circuit in &seed_report.circuits {
            index += 1;
            println!("{}", format_circuit(index, circuit, &topology));
            if args.overpass {
                println!("  overpass: {}", overpass_query(circuit, &topology));
            }
        }
        println!("{seed_report}");
    }
    match report.average_accuracy() {
        Some(average) => println!(
            "Total: {} circuit(s), average accuracy {:.1}%",
            report.circuit_count(),
            average * 100.0
        ),
        None => println!("Total: 0 circuit(s)"),
    }

    let circuits: Vec<Circuit> = report.circuits().cloned().collect();
    if let Some(out) = &args.out {
        JsonCircuitSink
            .publish(&circuits, out)
            .with_context(|| format!("writing circuits to '{}'", out.display()))?;
        info!("Wrote {} circuit(s) to {}", circuits.len(), out.display());
    }
    if let Some(dot) = &args.dot {
        let stats = write_circuit_graph(&circuits, &topology, dot)?;
        info!(
            "Wrote circuit graph ({} stations, {} circuits, {} components) to {}",
            stats.node_count,
            stats.edge_count,
            stats.connected_components,
            dot.display()
        );
    }
    Ok(())
}
