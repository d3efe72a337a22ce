pub mod cli;
pub mod config;

pub use cli::{build_cli_command, Cli, Commands, InferArgs, InspectFormat};
pub use config::{load_inference_config, resolve_inference_config};
