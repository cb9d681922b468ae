// Application layer: entry points for callers outside the crate

pub mod embedding;
#[cfg(feature = "server")]
pub mod grpc_service;
#[cfg(feature = "server")]
pub mod mappers;

pub use embedding::{optimize_loadout, validate_allocation_problem, EmbeddingResult};
#[cfg(feature = "server")]
pub use grpc_service::GrpcGameOptimizerService;
