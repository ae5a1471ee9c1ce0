pub mod badges;
pub mod exchange;
pub mod formulas;
pub mod reports;
pub mod session;
pub mod store;

// Re-export main components
pub use badges::*;
pub use exchange::{ImportError, parse_import, share_text};
pub use formulas::*;
pub use reports::*;
pub use session::*;
pub use store::*;
