use std::path::Path;

use crate::session::{SaveSummary, Session};

use super::{failed, CommandResult};

/// Start a new, empty module set
pub fn new_session(session: &mut Session) -> CommandResult<()> {
    session.new_session().map_err(failed("New"))
}

/// Open a module set archive, returning how many modules it holds
pub fn open_session(session: &mut Session, path: &Path) -> CommandResult<usize> {
    session.open_session(path).map_err(failed("Open"))
}

/// Save the current module set to an archive
pub fn save_session(session: &mut Session, path: &Path) -> CommandResult<SaveSummary> {
    session.save_session(path).map_err(failed("Save"))
}

/// Close the current module set. Never fails; cleanup problems are only logged.
pub fn close_session(session: &mut Session) {
    session.close_session();
}
