// Building allocation over a province/region hierarchy

pub mod building;
pub mod effect;
pub mod hierarchy;
pub mod problem;

pub use building::{Building, BuildingId, IdentitySequence, Proximity};
pub use effect::{EffectKind, EffectScope, EffectTargets, ScopedEffect};
pub use hierarchy::{Province, Region};
pub use problem::{AllocationProblem, AllocationRules, ProblemState};
