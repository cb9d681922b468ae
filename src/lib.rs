// Domain layer: model types, backend contract and the engine facade
pub mod domain;

// Solver adapters: concrete implementations of SolverService
pub mod solver;

// Model builders
pub mod allocation;
pub mod loadout;

// Application layer: embedding entry points and the gRPC service
pub mod application;

// Infrastructure layer: external concerns (gRPC server)
#[cfg(feature = "server")]
pub mod infrastructure;

// Re-export commonly used types
pub use domain::{
    LinearExpr, OptimizationType, OptimizerError, OptimizerResult, SolutionStatus, SolverBackend,
    SolverConfig, SolverEngine, SolverError, SolverService, VariableHandle, VariableType,
};

pub use allocation::{
    AllocationProblem, AllocationRules, Building, EffectScope, IdentitySequence, ProblemState,
    Province, Region, ScopedEffect,
};
pub use loadout::{Item, Loadout, LoadoutOptimizer, LoadoutResult, PowerType, Stats, Target};

pub use application::{optimize_loadout, validate_allocation_problem, EmbeddingResult};

#[cfg(feature = "server")]
pub use infrastructure::{start_server, ServerConfig};

pub use solver::{MicroLpSolver, SolverFactory};
#[cfg(feature = "coin_cbc")]
pub use solver::CoinCbcSolver;
#[cfg(feature = "highs")]
pub use solver::HighsSolver;
