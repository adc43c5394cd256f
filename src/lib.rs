// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod corpus;
pub mod error;
pub mod game;
pub mod matcher;
pub mod runtime;
pub mod session;
pub mod spawn;
pub mod stats;
pub mod target;
pub mod tracker;
pub mod util;

pub use error::{GameError, Result};
pub use game::{Game, Hotspot, KeyInput, TickInput, TickOutcome};
