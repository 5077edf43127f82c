use std::sync::Arc;

use rmcp::handler::server::{tool::ToolRouter, ServerHandler};
use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::tool_handler;

use crate::core::storage::Storage;
use crate::mcp::config::Config;

#[derive(Clone)]
pub struct BandVaultServer {
    pub(crate) tool_router: ToolRouter<Self>,
    pub(crate) storage: Arc<Storage>,
    pub(crate) config: Config,
}

impl BandVaultServer {
    pub fn new(config: Config) -> Self {
        let storage = Storage::new(config.root_path.clone(), config.cache_duration, config.lock_timeout);
        Self {
            tool_router: Self::tool_router(),
            storage: Arc::new(storage),
            config,
        }
    }
}

#[tool_handler]
impl ServerHandler for BandVaultServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bandvault".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "bandvault - local music-collection indexing service over band/album folders".into(),
            ),
        }
    }
}
