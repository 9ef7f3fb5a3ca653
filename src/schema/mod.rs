pub mod rules;
pub mod sheets;
pub mod types;

pub use rules::*;
pub use sheets::*;
pub use types::*;
