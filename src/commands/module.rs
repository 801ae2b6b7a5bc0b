use crate::session::Session;
use crate::storage::{Module, QuizQuestion, Topic};

use super::{failed, CommandResult};

pub fn add_module(session: &mut Session) -> CommandResult<usize> {
    session
        .document_mut()
        .map(|doc| doc.add_module())
        .map_err(failed("Add Module"))
}

pub fn delete_module(session: &mut Session, module: usize) -> CommandResult<Module> {
    session
        .document_mut()
        .and_then(|doc| doc.delete_module(module))
        .map_err(failed("Delete Module"))
}

pub fn add_topic(session: &mut Session, module: usize) -> CommandResult<usize> {
    session
        .document_mut()
        .and_then(|doc| doc.add_topic(module))
        .map_err(failed("Add Topic"))
}

pub fn delete_topic(session: &mut Session, module: usize, topic: usize) -> CommandResult<Topic> {
    session
        .document_mut()
        .and_then(|doc| doc.delete_topic(module, topic))
        .map_err(failed("Delete Topic"))
}

pub fn add_quiz(session: &mut Session, module: usize) -> CommandResult<()> {
    session
        .document_mut()
        .and_then(|doc| doc.add_quiz(module))
        .map_err(failed("Add Quiz"))
}

pub fn delete_quiz(
    session: &mut Session,
    module: usize,
) -> CommandResult<Option<Vec<QuizQuestion>>> {
    session
        .document_mut()
        .and_then(|doc| doc.delete_quiz(module))
        .map_err(failed("Delete Quiz"))
}

pub fn add_quiz_question(session: &mut Session, module: usize) -> CommandResult<usize> {
    session
        .document_mut()
        .and_then(|doc| doc.add_quiz_question(module))
        .map_err(failed("Add Quiz Question"))
}

pub fn delete_quiz_question(
    session: &mut Session,
    module: usize,
    question: usize,
) -> CommandResult<QuizQuestion> {
    session
        .document_mut()
        .and_then(|doc| doc.delete_quiz_question(module, question))
        .map_err(failed("Delete Quiz Question"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MakerSettings;
    use tempfile::TempDir;

    #[test]
    fn test_module_commands() {
        let temp = TempDir::new().unwrap();
        let mut session = Session::new(MakerSettings {
            workspace_dir: Some(temp.path().to_path_buf()),
            ..Default::default()
        });
        session.new_session().unwrap();

        assert_eq!(add_module(&mut session).unwrap(), 0);
        assert_eq!(add_topic(&mut session, 0).unwrap(), 0);
        add_quiz(&mut session, 0).unwrap();
        assert_eq!(add_quiz_question(&mut session, 0).unwrap(), 0);

        let err = delete_topic(&mut session, 0, 4).unwrap_err();
        assert_eq!(err.message, "Delete Topic: topic index 4 out of range (len 1)");

        delete_quiz_question(&mut session, 0, 0).unwrap();
        assert_eq!(delete_quiz(&mut session, 0).unwrap(), Some(Vec::new()));
        assert_eq!(delete_module(&mut session, 0).unwrap().title, "Untitled Module 0");
        assert!(session.document().is_empty());
    }
}
