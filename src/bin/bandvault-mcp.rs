//! MCP server binary entry point: serves bandvault's eight operations over
//! stdio (spec.md §6.1).

use bandvault::mcp::config::Config;
use bandvault::mcp::server::BandVaultServer;
use rmcp::{transport::stdio, ServiceExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    config.init_logging();

    if let Err(e) = config.validate_root_path() {
        eprintln!("{e}");
        std::process::exit(3);
    }

    let server = BandVaultServer::new(config);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        eprintln!("error starting server: {e}");
    })?;
    service.waiting().await?;

    Ok(())
}
