use tonic::{Request, Response, Status};

use super::embedding::validate_allocation_problem;
use super::mappers::{self, game_optimizer};
use crate::domain::{OptimizerError, SolverBackend};
use crate::loadout::{Item, LoadoutOptimizer, Target};
use crate::solver::SolverFactory;

/// gRPC service implementation
pub struct GrpcGameOptimizerService {
    default_backend: SolverBackend,
}

impl GrpcGameOptimizerService {
    /// `default_backend` serves requests that ask for `AUTO`
    pub fn new(default_backend: SolverBackend) -> Self {
        Self { default_backend }
    }

    fn resolve_backend(&self, requested: i32) -> SolverBackend {
        match mappers::proto_to_domain_backend(requested) {
            SolverBackend::Auto => self.default_backend,
            backend => backend,
        }
    }

    async fn run_loadout(
        &self,
        target: Target,
        candidates: Vec<Item>,
        backend: SolverBackend,
    ) -> Result<game_optimizer::LoadoutResponse, Status> {
        let solver = SolverFactory::create_from_backend(backend)
            .map_err(|e| Status::failed_precondition(e.to_string()))?;
        let solver_name = solver.name().to_string();

        tracing::info!(
            target_name = target.name(),
            candidates = candidates.len(),
            solver = %solver_name,
            "Optimizing loadout"
        );

        // Solving is CPU-bound; keep it off the async workers
        tokio::task::spawn_blocking(move || {
            let outcome = LoadoutOptimizer::new(&target, &candidates, solver)
                .and_then(|optimizer| optimizer.optimize());
            match outcome {
                Ok(result) => Ok(mappers::domain_to_proto_loadout(&result, &solver_name)),
                Err(e @ (OptimizerError::Solve { .. } | OptimizerError::Optimization(_))) => {
                    tracing::warn!(error = %e, "Loadout not found");
                    Ok(mappers::failed_loadout(e.to_string(), &solver_name))
                }
                Err(e) => Err(mappers::optimizer_error_to_status(&e)),
            }
        })
        .await
        .map_err(|e| Status::internal(format!("Solver task failed: {}", e)))?
    }
}

impl Default for GrpcGameOptimizerService {
    fn default() -> Self {
        Self::new(SolverBackend::Auto)
    }
}

#[tonic::async_trait]
impl game_optimizer::game_optimizer_server::GameOptimizer for GrpcGameOptimizerService {
    async fn optimize_loadout(
        &self,
        request: Request<game_optimizer::LoadoutRequest>,
    ) -> Result<Response<game_optimizer::LoadoutResponse>, Status> {
        let request = request.into_inner();

        let target = request
            .target
            .as_ref()
            .ok_or_else(|| Status::invalid_argument("Target is required"))?;
        let target = mappers::proto_to_domain_target(target).map_err(|e| *e)?;
        let candidates = request
            .candidates
            .iter()
            .map(mappers::proto_to_domain_item)
            .collect();
        let backend = self.resolve_backend(request.solver);

        let response = self.run_loadout(target, candidates, backend).await?;
        Ok(Response::new(response))
    }

    async fn optimize_loadout_stream(
        &self,
        request: Request<tonic::Streaming<game_optimizer::LoadoutChunk>>,
    ) -> Result<Response<game_optimizer::LoadoutResponse>, Status> {
        let mut stream = request.into_inner();

        let mut target = None;
        let mut candidates = Vec::new();
        let mut solver = game_optimizer::SolverBackend::Auto as i32;

        // Collect all chunks
        while let Some(chunk) = stream.message().await? {
            match chunk.chunk {
                Some(game_optimizer::loadout_chunk::Chunk::Target(t)) => {
                    target = Some(t);
                }
                Some(game_optimizer::loadout_chunk::Chunk::Candidate(item)) => {
                    candidates.push(mappers::proto_to_domain_item(&item));
                }
                Some(game_optimizer::loadout_chunk::Chunk::Solver(s)) => {
                    solver = s;
                }
                None => {}
            }
        }

        let target = target.ok_or_else(|| Status::invalid_argument("Target chunk is required"))?;
        let target = mappers::proto_to_domain_target(&target).map_err(|e| *e)?;
        let backend = self.resolve_backend(solver);

        let response = self.run_loadout(target, candidates, backend).await?;
        Ok(Response::new(response))
    }

    async fn validate_allocation_problem(
        &self,
        request: Request<game_optimizer::ValidateRequest>,
    ) -> Result<Response<game_optimizer::ValidationResponse>, Status> {
        let backend = self.resolve_backend(request.into_inner().solver);
        let result = validate_allocation_problem(backend);

        let errors = if result.success {
            Vec::new()
        } else {
            vec![result.message]
        };
        Ok(Response::new(game_optimizer::ValidationResponse {
            success: result.success,
            value: result.value,
            errors,
        }))
    }

    async fn get_available_solvers(
        &self,
        _request: Request<game_optimizer::Empty>,
    ) -> Result<Response<game_optimizer::AvailableSolvers>, Status> {
        let solvers = SolverFactory::available_backends()
            .into_iter()
            .filter_map(|backend| SolverFactory::create_from_backend(backend).ok())
            .map(|solver| mappers::domain_to_proto_solver_info(solver.as_ref()))
            .collect();

        Ok(Response::new(game_optimizer::AvailableSolvers { solvers }))
    }
}
