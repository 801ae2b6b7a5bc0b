use std::path::{Path, PathBuf};

use crate::session::Session;
use crate::storage::EntityPath;

use super::{failed, CommandResult};

/// Copy an image into the package and set it on a module cover, image section
/// or quiz question
pub fn attach_media(session: &mut Session, path: &EntityPath, source: &Path) -> CommandResult<String> {
    session
        .attach_media(path, source)
        .map_err(failed("Upload Image"))
}

/// Locate a stored media reference, e.g. for a preview
pub fn resolve_media(session: &Session, name: &str) -> CommandResult<PathBuf> {
    session.resolve_media(name).map_err(failed("Load Image"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MakerSettings;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_attach_question_image() {
        let temp = TempDir::new().unwrap();
        let mut session = Session::new(MakerSettings {
            workspace_dir: Some(temp.path().join("ws")),
            ..Default::default()
        });
        let source = temp.path().join("Quiz Figure 1.GIF");
        fs::write(&source, b"GIF89a").unwrap();

        session.new_session().unwrap();
        let doc = session.document_mut().unwrap();
        doc.add_module();
        doc.add_quiz(0).unwrap();
        doc.add_quiz_question(0).unwrap();

        let path = EntityPath::Question {
            module: 0,
            question: 0,
        };
        let name = attach_media(&mut session, &path, &source).unwrap();
        assert_eq!(name, "quiz_figure_1.gif");
        assert_eq!(
            session.document().question(0, 0).unwrap().img_src.as_deref(),
            Some("quiz_figure_1.gif")
        );
        assert!(resolve_media(&session, &name).unwrap().is_file());

        let err = resolve_media(&session, "missing.png").unwrap_err();
        assert_eq!(err.message, "Load Image: Not found: media 'missing.png'");
    }
}
