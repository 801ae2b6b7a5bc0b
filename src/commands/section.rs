use crate::session::Session;
use crate::storage::{EntityPath, Section};

use super::{failed, CommandResult};

/// Add a section of the chosen type to a topic
pub fn add_section(
    session: &mut Session,
    module: usize,
    topic: usize,
    section_type: &str,
) -> CommandResult<usize> {
    session
        .document_mut()
        .and_then(|doc| doc.add_section(module, topic, section_type))
        .map_err(failed("Add Section"))
}

pub fn delete_section(
    session: &mut Session,
    module: usize,
    topic: usize,
    section: usize,
) -> CommandResult<Section> {
    session
        .document_mut()
        .and_then(|doc| doc.delete_section(module, topic, section))
        .map_err(failed("Delete Section"))
}

/// Switch a section to another type, discarding its current fields
pub fn change_section_type(
    session: &mut Session,
    module: usize,
    topic: usize,
    section: usize,
    section_type: &str,
) -> CommandResult<()> {
    session
        .document_mut()
        .and_then(|doc| doc.change_section_type(module, topic, section, section_type))
        .map_err(failed("Change Section Type"))
}

pub fn add_list_entry(
    session: &mut Session,
    module: usize,
    topic: usize,
    section: usize,
) -> CommandResult<usize> {
    session
        .document_mut()
        .and_then(|doc| doc.add_list_entry(module, topic, section))
        .map_err(failed("Add Entry"))
}

pub fn delete_list_entry(
    session: &mut Session,
    module: usize,
    topic: usize,
    section: usize,
    entry: usize,
) -> CommandResult<String> {
    session
        .document_mut()
        .and_then(|doc| doc.delete_list_entry(module, topic, section, entry))
        .map_err(failed("Remove Entry"))
}

/// Edit one field of any entity (titles, section text, quiz choices, ...)
pub fn set_field(
    session: &mut Session,
    path: &EntityPath,
    field: &str,
    value: &str,
) -> CommandResult<()> {
    session
        .document_mut()
        .and_then(|doc| doc.set_field(path, field, value))
        .map_err(failed("Edit Field"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MakerSettings, SectionKind};
    use tempfile::TempDir;

    fn active_session(temp: &TempDir) -> Session {
        let mut session = Session::new(MakerSettings {
            workspace_dir: Some(temp.path().to_path_buf()),
            ..Default::default()
        });
        session.new_session().unwrap();
        let doc = session.document_mut().unwrap();
        doc.add_module();
        doc.add_topic(0).unwrap();
        session
    }

    #[test]
    fn test_section_commands() {
        let temp = TempDir::new().unwrap();
        let mut session = active_session(&temp);

        assert_eq!(add_section(&mut session, 0, 0, "list").unwrap(), 0);
        assert_eq!(add_list_entry(&mut session, 0, 0, 0).unwrap(), 0);
        let path = EntityPath::Section {
            module: 0,
            topic: 0,
            section: 0,
        };
        set_field(&mut session, &path, "entries.0", "first").unwrap();
        assert_eq!(delete_list_entry(&mut session, 0, 0, 0, 0).unwrap(), "first");

        change_section_type(&mut session, 0, 0, 0, "remember").unwrap();
        assert_eq!(
            session.document().section(0, 0, 0).unwrap().kind(),
            SectionKind::Remember
        );
        assert_eq!(
            delete_section(&mut session, 0, 0, 0).unwrap().kind(),
            SectionKind::Remember
        );
    }

    #[test]
    fn test_invalid_section_type_message() {
        let temp = TempDir::new().unwrap();
        let mut session = active_session(&temp);

        let err = add_section(&mut session, 0, 0, "poll").unwrap_err();
        assert_eq!(
            err.message,
            "Add Section: Invalid argument: unknown section type 'poll'"
        );
    }
}
