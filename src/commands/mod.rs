//! User-facing operations.
//!
//! Each operation is a plain function over a [`Session`], and every operation
//! is also available as a serialisable [`Command`] so a presentation layer can
//! forward user actions as data carrying the target entity's path. Failures
//! come back as a single [`CommandError`] message naming the operation and
//! the cause.

mod media;
mod module;
mod section;
mod session;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::session::{SaveSummary, Session};
use crate::storage::{EntityPath, Error};

pub use media::*;
pub use module::*;
pub use section::*;
pub use session::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandError {
    pub message: String,
}

impl CommandError {
    pub fn new(operation: &str, err: Error) -> Self {
        Self {
            message: format!("{}: {}", operation, err),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

pub type CommandResult<T> = Result<T, CommandError>;

/// Attach the operation name to a storage error.
fn failed(operation: &'static str) -> impl FnOnce(Error) -> CommandError {
    move |err| CommandError::new(operation, err)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "command",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    NewSession,
    OpenSession { path: PathBuf },
    SaveSession { path: PathBuf },
    CloseSession,
    AddModule,
    DeleteModule { module: usize },
    AddTopic { module: usize },
    DeleteTopic { module: usize, topic: usize },
    AddSection { module: usize, topic: usize, section_type: String },
    DeleteSection { module: usize, topic: usize, section: usize },
    ChangeSectionType { module: usize, topic: usize, section: usize, section_type: String },
    AddListEntry { module: usize, topic: usize, section: usize },
    DeleteListEntry { module: usize, topic: usize, section: usize, entry: usize },
    AddQuiz { module: usize },
    DeleteQuiz { module: usize },
    AddQuizQuestion { module: usize },
    DeleteQuizQuestion { module: usize, question: usize },
    SetField { path: EntityPath, field: String, value: String },
    AttachMedia { path: EntityPath, source: PathBuf },
    ResolveMedia { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum CommandOutput {
    Done,
    Index(usize),
    ModuleCount(usize),
    Saved(SaveSummary),
    Media(String),
    Path(PathBuf),
}

impl Command {
    pub fn execute(self, session: &mut Session) -> CommandResult<CommandOutput> {
        use CommandOutput::*;

        Ok(match self {
            Command::NewSession => {
                new_session(session)?;
                Done
            }
            Command::OpenSession { path } => ModuleCount(open_session(session, &path)?),
            Command::SaveSession { path } => Saved(save_session(session, &path)?),
            Command::CloseSession => {
                close_session(session);
                Done
            }
            Command::AddModule => Index(add_module(session)?),
            Command::DeleteModule { module } => {
                delete_module(session, module)?;
                Done
            }
            Command::AddTopic { module } => Index(add_topic(session, module)?),
            Command::DeleteTopic { module, topic } => {
                delete_topic(session, module, topic)?;
                Done
            }
            Command::AddSection {
                module,
                topic,
                section_type,
            } => Index(add_section(session, module, topic, &section_type)?),
            Command::DeleteSection {
                module,
                topic,
                section,
            } => {
                delete_section(session, module, topic, section)?;
                Done
            }
            Command::ChangeSectionType {
                module,
                topic,
                section,
                section_type,
            } => {
                change_section_type(session, module, topic, section, &section_type)?;
                Done
            }
            Command::AddListEntry {
                module,
                topic,
                section,
            } => Index(add_list_entry(session, module, topic, section)?),
            Command::DeleteListEntry {
                module,
                topic,
                section,
                entry,
            } => {
                delete_list_entry(session, module, topic, section, entry)?;
                Done
            }
            Command::AddQuiz { module } => {
                add_quiz(session, module)?;
                Done
            }
            Command::DeleteQuiz { module } => {
                delete_quiz(session, module)?;
                Done
            }
            Command::AddQuizQuestion { module } => Index(add_quiz_question(session, module)?),
            Command::DeleteQuizQuestion { module, question } => {
                delete_quiz_question(session, module, question)?;
                Done
            }
            Command::SetField { path, field, value } => {
                set_field(session, &path, &field, &value)?;
                Done
            }
            Command::AttachMedia { path, source } => Media(attach_media(session, &path, &source)?),
            Command::ResolveMedia { name } => Path(resolve_media(session, &name)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MakerSettings;
    use serde_json::json;
    use tempfile::TempDir;

    fn run(session: &mut Session, command: serde_json::Value) -> CommandResult<CommandOutput> {
        let command: Command = serde_json::from_value(command).unwrap();
        command.execute(session)
    }

    #[test]
    fn test_commands_from_json() {
        let temp = TempDir::new().unwrap();
        let mut session = Session::new(MakerSettings {
            workspace_dir: Some(temp.path().to_path_buf()),
            ..Default::default()
        });

        run(&mut session, json!({ "command": "newSession" })).unwrap();
        assert_eq!(
            run(&mut session, json!({ "command": "addModule" })).unwrap(),
            CommandOutput::Index(0)
        );
        run(&mut session, json!({ "command": "addTopic", "module": 0 })).unwrap();
        assert_eq!(
            run(
                &mut session,
                json!({ "command": "addSection", "module": 0, "topic": 0, "sectionType": "trivia" })
            )
            .unwrap(),
            CommandOutput::Index(0)
        );
        run(
            &mut session,
            json!({
                "command": "setField",
                "path": { "entity": "section", "module": 0, "topic": 0, "section": 0 },
                "field": "content",
                "value": "Honey never spoils."
            }),
        )
        .unwrap();

        let archive_path = temp.path().join("trivia.zip");
        let saved = run(
            &mut session,
            json!({ "command": "saveSession", "path": archive_path }),
        )
        .unwrap();
        assert!(matches!(saved, CommandOutput::Saved(_)));

        assert_eq!(
            run(
                &mut session,
                json!({ "command": "openSession", "path": archive_path })
            )
            .unwrap(),
            CommandOutput::ModuleCount(1)
        );
    }

    #[test]
    fn test_error_message_names_operation() {
        let mut session = Session::default();
        let err = Command::SaveSession {
            path: PathBuf::from("out.zip"),
        }
        .execute(&mut session)
        .unwrap_err();
        assert_eq!(err.message, "Save: No active session");

        let err = Command::AddModule.execute(&mut session).unwrap_err();
        assert_eq!(err.message, "Add Module: No active session");
    }

    #[test]
    fn test_output_serialisation() {
        let value = serde_json::to_value(CommandOutput::Index(3)).unwrap();
        assert_eq!(value, json!({ "kind": "index", "value": 3 }));
        let value = serde_json::to_value(CommandOutput::Done).unwrap();
        assert_eq!(value, json!({ "kind": "done" }));
    }
}
