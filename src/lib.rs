pub mod commands;
pub mod session;
pub mod storage;

pub use commands::{Command, CommandError, CommandOutput, CommandResult};
pub use session::{SaveSummary, Session, SessionState};
pub use storage::{Document, EntityPath, Error, MakerSettings, Result};
