pub mod errors;
pub mod game;
pub mod messages;
pub mod player;
pub mod report;
pub mod snapshot;
pub mod stats;

// Re-export all types
pub use errors::*;
pub use game::*;
pub use messages::*;
pub use player::*;
pub use report::*;
pub use snapshot::*;
pub use stats::*;

pub type PlayerId = String;
pub type GameId = String;
pub type AccountId = String;
