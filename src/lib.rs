pub mod cli;
pub mod document;
pub mod error;
pub mod model;
pub mod parser;
pub mod schema;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::{Error, IntegrityError, Position, SheetError};
pub use model::Solution;
pub use parser::{read, read_with_ui};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui};
pub use writer::{write, write_with_ui};
