use crate::domain::{
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolverBackend,
};
use crate::solver::MicroLpSolver;
use std::sync::Arc;

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver for a specific backend
    pub fn create_from_backend(backend: SolverBackend) -> Result<Arc<dyn SolverService>> {
        match backend {
            SolverBackend::Auto => Ok(Self::default_solver()),
            SolverBackend::MicroLp => Ok(Arc::new(MicroLpSolver::new())),
            SolverBackend::CoinCbc => Self::coin_cbc(),
            SolverBackend::Highs => Self::highs(),
        }
    }

    /// Get the default solver: HiGHS, then CBC, then microlp, whichever is compiled in
    pub fn default_solver() -> Arc<dyn SolverService> {
        Self::highs()
            .or_else(|_| Self::coin_cbc())
            .unwrap_or_else(|_| Arc::new(MicroLpSolver::new()))
    }

    /// Backends compiled into this build
    pub fn available_backends() -> Vec<SolverBackend> {
        [
            SolverBackend::MicroLp,
            SolverBackend::CoinCbc,
            SolverBackend::Highs,
        ]
        .into_iter()
        .filter(|b| Self::create_from_backend(*b).is_ok())
        .collect()
    }

    #[cfg(feature = "coin_cbc")]
    fn coin_cbc() -> Result<Arc<dyn SolverService>> {
        Ok(Arc::new(crate::solver::CoinCbcSolver::new()))
    }

    #[cfg(not(feature = "coin_cbc"))]
    fn coin_cbc() -> Result<Arc<dyn SolverService>> {
        Err(SolverError::SolverNotAvailable(
            "COIN-OR CBC (build with feature `coin_cbc`)".to_string(),
        ))
    }

    #[cfg(feature = "highs")]
    fn highs() -> Result<Arc<dyn SolverService>> {
        Ok(Arc::new(crate::solver::HighsSolver::new()))
    }

    #[cfg(not(feature = "highs"))]
    fn highs() -> Result<Arc<dyn SolverService>> {
        Err(SolverError::SolverNotAvailable(
            "HiGHS (build with feature `highs`)".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn microlp_is_always_available() {
        let solver = SolverFactory::create_from_backend(SolverBackend::MicroLp).unwrap();
        assert_eq!(solver.name(), "microlp");
        assert!(SolverFactory::available_backends().contains(&SolverBackend::MicroLp));
    }

    #[test]
    fn auto_resolves_to_a_mip_backend() {
        let solver = SolverFactory::create_from_backend(SolverBackend::Auto).unwrap();
        assert!(solver.supports_mip());
    }

    #[cfg(not(feature = "highs"))]
    #[test]
    fn missing_backend_is_reported() {
        let err = SolverFactory::create_from_backend(SolverBackend::Highs)
            .err()
            .unwrap();
        assert!(matches!(err, SolverError::SolverNotAvailable(_)));
    }
}
