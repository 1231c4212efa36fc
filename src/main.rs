//! reroute CLI: serve and query GNN-predicted counter reroutes.

use clap::{Parser, Subcommand};
use reroute::config::RouterConfig;
use reroute::features::{EDGE_FEATURES, NODE_FEATURES};
use reroute::gnn::{GcnEdgeRegressor, DEFAULT_HIDDEN_DIM};
use reroute::oracle::load_oracle;
use reroute::pipeline::RoutePipeline;
use reroute::telemetry::RouteRequest;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reroute")]
#[command(about = "Reroute suggestions from GNN-predicted edge delays")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model file (overrides config)
    #[arg(short, long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Answer one route request read from a JSON file
    Predict {
        /// Request file
        request: PathBuf,

        /// Output file (JSON); stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a freshly initialised (untrained) model
    InitModel {
        /// Output model file
        #[arg(short, long, default_value = "gnn_model.bin")]
        output: PathBuf,

        /// Hidden width
        #[arg(long, default_value_t = DEFAULT_HIDDEN_DIM)]
        hidden: usize,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Display model information
    Info,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref(), cli.model).and_then(|config| {
        match cli.command {
            Commands::Serve { host, port } => cmd_serve(config, host, port),
            Commands::Predict { request, output } => {
                cmd_predict(&config, &request, output.as_deref())
            }
            Commands::InitModel {
                output,
                hidden,
                seed,
            } => cmd_init_model(&output, hidden, seed),
            Commands::Info => cmd_info(&config),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&Path>,
    model: Option<PathBuf>,
) -> Result<RouterConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => RouterConfig::load(path)?,
        None => RouterConfig::default(),
    };
    Ok(match model {
        Some(model) => config.with_model_path(model),
        None => config,
    })
}

fn build_pipeline(
    config: &RouterConfig,
) -> Result<RoutePipeline<GcnEdgeRegressor>, Box<dyn std::error::Error>> {
    let model = load_oracle(&config.model_path)?;
    Ok(RoutePipeline::from_config(model, config)?)
}

fn cmd_serve(
    mut config: RouterConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }

    let pipeline = Arc::new(build_pipeline(&config)?);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(reroute::server::serve(&config, pipeline))?;
    Ok(())
}

fn cmd_predict(
    config: &RouterConfig,
    request: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(config)?;
    let content = std::fs::read_to_string(request)?;
    let request: RouteRequest = serde_json::from_str(&content)?;

    let plan = pipeline.predict_route(&request)?;
    let json = serde_json::to_string_pretty(&plan)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_init_model(
    output: &Path,
    hidden: usize,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    if hidden == 0 {
        return Err("hidden width must be positive".into());
    }
    let model = GcnEdgeRegressor::with_seed(NODE_FEATURES, EDGE_FEATURES, hidden, seed);
    model.save(output)?;

    println!("Initialised model (untrained)");
    println!("  Output:      {}", output.display());
    println!("  Hidden:      {hidden}");
    println!("  Parameters:  {}", model.num_parameters());
    Ok(())
}

fn cmd_info(config: &RouterConfig) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_oracle(&config.model_path)?;

    println!("Model Information");
    println!("=================");
    println!("File:           {}", config.model_path.display());
    println!("Node features:  {}", model.node_features());
    println!("Edge features:  {}", model.edge_features());
    println!("Hidden:         {}", model.hidden_dim());
    println!("Parameters:     {}", model.num_parameters());
    Ok(())
}
