use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deptroute::{AppConfig, ModelMetrics, RoutingEngine, TracingDecisionLog};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deptroute", about = "Classify and route complaint reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify text into a department category
    Classify { text: String },
    /// Run the full escalation policy on text
    Route {
        text: String,
        /// Skip the keyword-rule stage and consult the advisory service
        #[arg(long)]
        force_advisory: bool,
    },
    /// Print the offline training metrics of the loaded model
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Classify { text } => {
            let engine = build_engine(&config)?;
            let result = engine.classify(&text).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Route {
            text,
            force_advisory,
        } => {
            let engine = build_engine(&config)?;
            let decision = engine.route(&text, force_advisory).await?;
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
        Commands::Metrics => match ModelMetrics::load(&config.model_dir)? {
            Some(metrics) => println!("{}", serde_json::to_string_pretty(&metrics)?),
            None => println!("{}", json!({"detail": "metrics not found"})),
        },
    }

    Ok(())
}

fn build_engine(config: &AppConfig) -> Result<RoutingEngine> {
    Ok(RoutingEngine::from_config(config)?.with_decision_log(Arc::new(TracingDecisionLog)))
}
