use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;
use transnet_cli::{Cli, Commands};

mod commands;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    let result = match &cli.command {
        Some(Commands::Infer(args)) => {
            info!("Inferring circuits from {}", args.dataset.display());
            commands::infer::handle(args)
        }
        Some(Commands::Inspect {
            dataset,
            config,
            format,
        }) => {
            info!("Inspecting {}", dataset.display());
            commands::inspect::handle(dataset, config.as_deref(), *format)
        }
        None => {
            info!("No subcommand provided. Use `transnet --help` for more information.");
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("Command failed: {:?}", e);
        std::process::exit(1);
    }
}
