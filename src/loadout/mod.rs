// Equipment loadout selection

pub mod item;
#[allow(clippy::module_inception)]
pub mod loadout;
pub mod optimizer;

pub use item::{Item, PowerType, Stats, Target};
pub use loadout::{Loadout, LOADOUT_SLOTS};
pub use optimizer::{objective_coefficient, LoadoutOptimizer, LoadoutResult};
