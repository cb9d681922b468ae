// Solver adapters module

mod good_lp_model;
mod presolve;

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc_solver;
pub mod factory;
#[cfg(feature = "highs")]
pub mod highs_solver;
pub mod microlp_solver;

#[cfg(feature = "coin_cbc")]
pub use coin_cbc_solver::CoinCbcSolver;
pub use factory::SolverFactory;
#[cfg(feature = "highs")]
pub use highs_solver::HighsSolver;
pub use microlp_solver::MicroLpSolver;
