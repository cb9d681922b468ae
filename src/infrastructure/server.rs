// Infrastructure: server setup and configuration

use std::net::SocketAddr;
use tonic::transport::Server;

use crate::application::mappers::game_optimizer::game_optimizer_server::GameOptimizerServer;
use crate::application::GrpcGameOptimizerService;
use crate::domain::SolverBackend;
use crate::solver::SolverFactory;

/// Listen address used when `GAMEOPT_ADDR` is not set
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:50051";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub address: SocketAddr,
    /// Backend for requests that ask for `AUTO`
    pub backend: SolverBackend,
}

impl ServerConfig {
    pub fn new(address: SocketAddr, backend: SolverBackend) -> Self {
        Self { address, backend }
    }

    /// Read `GAMEOPT_ADDR` and `GAMEOPT_SOLVER`, falling back to defaults
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_vars(
            std::env::var("GAMEOPT_ADDR").ok().as_deref(),
            std::env::var("GAMEOPT_SOLVER").ok().as_deref(),
        )
    }

    fn from_vars(
        address: Option<&str>,
        solver: Option<&str>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let address = address.unwrap_or(DEFAULT_ADDRESS).parse()?;
        let backend = match solver {
            Some(name) => name.parse::<SolverBackend>()?,
            None => SolverBackend::Auto,
        };
        Ok(Self::new(address, backend))
    }
}

pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let default_solver = SolverFactory::create_from_backend(config.backend)?;
    let service = GrpcGameOptimizerService::new(config.backend);

    tracing::info!(
        address = %config.address,
        backend = %config.backend,
        solver = default_solver.name(),
        available = ?SolverFactory::available_backends(),
        "Game optimizer listening"
    );

    Server::builder()
        .add_service(GameOptimizerServer::new(service))
        .serve(config.address)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_overrides() {
        let config = ServerConfig::from_vars(None, None).unwrap();
        assert_eq!(config.address, DEFAULT_ADDRESS.parse::<SocketAddr>().unwrap());
        assert_eq!(config.backend, SolverBackend::Auto);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ServerConfig::from_vars(Some("127.0.0.1:6000"), Some("microlp")).unwrap();
        assert_eq!(config.address.port(), 6000);
        assert_eq!(config.backend, SolverBackend::MicroLp);

        assert!(ServerConfig::from_vars(None, Some("gurobi")).is_err());
        assert!(ServerConfig::from_vars(Some("not an address"), None).is_err());
    }
}
