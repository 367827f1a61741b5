#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Host adapter for Skirmish: the session API presentation layers drive and
//! the TOML scenario format used to set matches up.

mod scenario;
mod session;

pub use scenario::{
    Action, GridSection, MapSection, Scenario, ScenarioError, TerrainEntry, UnitEntry,
};
pub use session::Session;
