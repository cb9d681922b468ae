// Domain module: model types, backend contract and the engine facade

pub mod engine;
pub mod error;
pub mod models;
pub mod solver_service;
pub mod value_objects;

pub use engine::SolverEngine;
pub use error::{OptimizerError, OptimizerResult};
pub use models::*;
pub use solver_service::*;
pub use value_objects::*;
