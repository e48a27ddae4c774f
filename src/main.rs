//! Nutri
//!
//! An MCP server for building nutrition facts labels.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use nutri::build_info;
use nutri::config::{self, LabelConfig};
use nutri::mcp::NutriService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nutri=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    tracing::info!(build = %build_info::BuildInfo::current().summary(), "Starting");

    let label_config = LabelConfig::from_env()?;
    eprintln!(
        "Daily value references: {} nutrients, energy factors {}/{}/{} kJ per g",
        label_config.daily_values.len(),
        label_config.energy_factors.carbohydrate,
        label_config.energy_factors.protein,
        label_config.energy_factors.fat,
    );

    let export_dir = config::export_dir();
    eprintln!("Export directory: {}", export_dir.display());

    // Create the Nutri service
    let service = NutriService::new(label_config, export_dir);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
