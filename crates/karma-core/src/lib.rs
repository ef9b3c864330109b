pub mod config;
pub mod error;
pub mod io;
pub mod manager;
pub mod paths;

pub use config::{KarmaConfig, Tier};
pub use error::{KarmaError, Result};
pub use manager::{KarmaManager, KarmaProfile};
