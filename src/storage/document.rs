//! In-memory module tree and its structural mutators.
//!
//! Entities are addressed by position. Deleting an entity shifts every later
//! sibling down by one, so callers must re-resolve any index they hold past
//! the deleted one.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::models::{ChoiceLabel, Module, QuizQuestion, Section, SectionKind, Topic};

/// Address of an entity inside the module tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "camelCase")]
pub enum EntityPath {
    Module {
        module: usize,
    },
    Topic {
        module: usize,
        topic: usize,
    },
    Section {
        module: usize,
        topic: usize,
        section: usize,
    },
    Question {
        module: usize,
        question: usize,
    },
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module { module } => write!(f, "module {}", module),
            Self::Topic { module, topic } => write!(f, "module {} / topic {}", module, topic),
            Self::Section {
                module,
                topic,
                section,
            } => write!(
                f,
                "module {} / topic {} / section {}",
                module, topic, section
            ),
            Self::Question { module, question } => {
                write!(f, "module {} / question {}", module, question)
            }
        }
    }
}

fn check_index(kind: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange { kind, index, len })
    }
}

fn no_field(path: &EntityPath, field: &str) -> Error {
    Error::NotFound(format!("field '{}' on {}", field, path))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(Error::InvalidArgument(format!("not a boolean: '{}'", other))),
    }
}

/// Optional text fields are cleared when set to an empty string.
fn optional_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    modules: Vec<Module>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_modules(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn into_modules(self) -> Vec<Module> {
        self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module(&self, index: usize) -> Result<&Module> {
        check_index("module", index, self.modules.len())?;
        Ok(&self.modules[index])
    }

    fn module_mut(&mut self, index: usize) -> Result<&mut Module> {
        check_index("module", index, self.modules.len())?;
        Ok(&mut self.modules[index])
    }

    pub fn topic(&self, module: usize, topic: usize) -> Result<&Topic> {
        let topics = &self.module(module)?.topics;
        check_index("topic", topic, topics.len())?;
        Ok(&topics[topic])
    }

    fn topic_mut(&mut self, module: usize, topic: usize) -> Result<&mut Topic> {
        let topics = &mut self.module_mut(module)?.topics;
        check_index("topic", topic, topics.len())?;
        Ok(&mut topics[topic])
    }

    pub fn section(&self, module: usize, topic: usize, section: usize) -> Result<&Section> {
        let sections = &self.topic(module, topic)?.sections;
        check_index("section", section, sections.len())?;
        Ok(&sections[section])
    }

    fn section_mut(&mut self, module: usize, topic: usize, section: usize) -> Result<&mut Section> {
        let sections = &mut self.topic_mut(module, topic)?.sections;
        check_index("section", section, sections.len())?;
        Ok(&mut sections[section])
    }

    fn assessment_mut(&mut self, module: usize) -> Result<&mut Vec<QuizQuestion>> {
        self.module_mut(module)?
            .assessment
            .as_mut()
            .ok_or_else(|| Error::NotFound(format!("quiz on module {}", module)))
    }

    pub fn question(&self, module: usize, question: usize) -> Result<&QuizQuestion> {
        let questions = self
            .module(module)?
            .assessment
            .as_ref()
            .ok_or_else(|| Error::NotFound(format!("quiz on module {}", module)))?;
        check_index("question", question, questions.len())?;
        Ok(&questions[question])
    }

    fn question_mut(&mut self, module: usize, question: usize) -> Result<&mut QuizQuestion> {
        let questions = self.assessment_mut(module)?;
        check_index("question", question, questions.len())?;
        Ok(&mut questions[question])
    }

    // ===== Module Operations =====

    /// Append a module titled "Untitled Module N" where N is the count before
    /// insertion. Returns its index.
    pub fn add_module(&mut self) -> usize {
        let index = self.modules.len();
        self.modules
            .push(Module::new(format!("Untitled Module {}", index)));
        index
    }

    pub fn delete_module(&mut self, index: usize) -> Result<Module> {
        check_index("module", index, self.modules.len())?;
        Ok(self.modules.remove(index))
    }

    // ===== Topic Operations =====

    pub fn add_topic(&mut self, module: usize) -> Result<usize> {
        let topics = &mut self.module_mut(module)?.topics;
        let index = topics.len();
        topics.push(Topic::new(format!("Topic {}", index)));
        Ok(index)
    }

    pub fn delete_topic(&mut self, module: usize, topic: usize) -> Result<Topic> {
        let topics = &mut self.module_mut(module)?.topics;
        check_index("topic", topic, topics.len())?;
        Ok(topics.remove(topic))
    }

    // ===== Section Operations =====

    /// Append a fresh section of `kind`, which must name one of the six
    /// section types.
    pub fn add_section(&mut self, module: usize, topic: usize, kind: &str) -> Result<usize> {
        let kind: SectionKind = kind.parse()?;
        let sections = &mut self.topic_mut(module, topic)?.sections;
        let index = sections.len();
        sections.push(Section::new(kind));
        Ok(index)
    }

    pub fn delete_section(&mut self, module: usize, topic: usize, section: usize) -> Result<Section> {
        let sections = &mut self.topic_mut(module, topic)?.sections;
        check_index("section", section, sections.len())?;
        Ok(sections.remove(section))
    }

    /// Replace a section with the empty field set of another kind. Nothing from
    /// the previous kind survives, even when the kind is unchanged.
    pub fn change_section_type(
        &mut self,
        module: usize,
        topic: usize,
        section: usize,
        kind: &str,
    ) -> Result<()> {
        let kind: SectionKind = kind.parse()?;
        *self.section_mut(module, topic, section)? = Section::new(kind);
        Ok(())
    }

    pub fn add_list_entry(&mut self, module: usize, topic: usize, section: usize) -> Result<usize> {
        match self.section_mut(module, topic, section)? {
            Section::List { entries, .. } => {
                entries.push(String::new());
                Ok(entries.len() - 1)
            }
            other => Err(Error::InvalidArgument(format!(
                "{} section has no list entries",
                other.kind()
            ))),
        }
    }

    pub fn delete_list_entry(
        &mut self,
        module: usize,
        topic: usize,
        section: usize,
        entry: usize,
    ) -> Result<String> {
        match self.section_mut(module, topic, section)? {
            Section::List { entries, .. } => {
                check_index("entry", entry, entries.len())?;
                Ok(entries.remove(entry))
            }
            other => Err(Error::InvalidArgument(format!(
                "{} section has no list entries",
                other.kind()
            ))),
        }
    }

    // ===== Quiz Operations =====

    /// Give the module an empty quiz. An existing quiz is left untouched.
    pub fn add_quiz(&mut self, module: usize) -> Result<()> {
        self.module_mut(module)?.assessment.get_or_insert_with(Vec::new);
        Ok(())
    }

    /// Remove the quiz entirely, returning its questions if there was one.
    pub fn delete_quiz(&mut self, module: usize) -> Result<Option<Vec<QuizQuestion>>> {
        Ok(self.module_mut(module)?.assessment.take())
    }

    pub fn add_quiz_question(&mut self, module: usize) -> Result<usize> {
        let questions = self.assessment_mut(module)?;
        questions.push(QuizQuestion::default());
        Ok(questions.len() - 1)
    }

    pub fn delete_quiz_question(&mut self, module: usize, question: usize) -> Result<QuizQuestion> {
        let questions = self.assessment_mut(module)?;
        check_index("question", question, questions.len())?;
        Ok(questions.remove(question))
    }

    // ===== Field Editing =====

    /// Set a leaf field on the entity at `path`.
    ///
    /// Values arrive as text and are coerced to the field's type. Fails with
    /// `NotFound` when the path does not resolve or the entity has no such
    /// field.
    pub fn set_field(&mut self, path: &EntityPath, field: &str, value: &str) -> Result<()> {
        match *path {
            EntityPath::Module { module } => {
                let module = self
                    .module_mut(module)
                    .map_err(|_| Error::NotFound(path.to_string()))?;
                match field {
                    "title" => module.title = value.to_string(),
                    "imgSrc" => module.img_src = optional_text(value),
                    _ => return Err(no_field(path, field)),
                }
            }
            EntityPath::Topic { module, topic } => {
                let topic = self
                    .topic_mut(module, topic)
                    .map_err(|_| Error::NotFound(path.to_string()))?;
                match field {
                    "title" => topic.title = value.to_string(),
                    _ => return Err(no_field(path, field)),
                }
            }
            EntityPath::Section {
                module,
                topic,
                section,
            } => {
                let section = self
                    .section_mut(module, topic, section)
                    .map_err(|_| Error::NotFound(path.to_string()))?;
                if field == "type" {
                    *section = Section::new(value.parse()?);
                    return Ok(());
                }
                set_section_field(section, path, field, value)?;
            }
            EntityPath::Question { module, question } => {
                let question = self
                    .question_mut(module, question)
                    .map_err(|_| Error::NotFound(path.to_string()))?;
                set_question_field(question, path, field, value)?;
            }
        }
        Ok(())
    }

    /// Whether the entity at `path` can carry an `imgSrc` reference.
    pub fn accepts_media(&self, path: &EntityPath) -> Result<()> {
        let accepted = match *path {
            EntityPath::Module { module } => self.module(module).map(|_| true),
            EntityPath::Topic { module, topic } => self.topic(module, topic).map(|_| false),
            EntityPath::Section {
                module,
                topic,
                section,
            } => self
                .section(module, topic, section)
                .map(|s| s.kind() == SectionKind::Image),
            EntityPath::Question { module, question } => {
                self.question(module, question).map(|_| true)
            }
        }
        .map_err(|_| Error::NotFound(path.to_string()))?;

        if accepted {
            Ok(())
        } else {
            Err(no_field(path, "imgSrc"))
        }
    }

    /// Every non-empty `imgSrc` in tree order. Duplicates are kept.
    pub fn media_references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        for module in &self.modules {
            refs.extend(module.img_src.as_deref().filter(|s| !s.is_empty()));
            for topic in &module.topics {
                refs.extend(topic.sections.iter().filter_map(Section::img_src));
            }
            for question in module.assessment.iter().flatten() {
                refs.extend(question.img_src.as_deref().filter(|s| !s.is_empty()));
            }
        }
        refs
    }
}

fn set_section_field(section: &mut Section, path: &EntityPath, field: &str, value: &str) -> Result<()> {
    match section {
        Section::Text { header, content } => match field {
            "header" => *header = optional_text(value),
            "content" => *content = value.to_string(),
            _ => return Err(no_field(path, field)),
        },
        Section::Trivia { content } | Section::Remember { content } => match field {
            "content" => *content = value.to_string(),
            _ => return Err(no_field(path, field)),
        },
        Section::List {
            category,
            has_header,
            entries,
        } => match field {
            "category" => *category = value.parse()?,
            "hasHeader" => *has_header = parse_bool(value)?,
            _ => {
                let entry = field
                    .strip_prefix("entries.")
                    .and_then(|i| i.parse::<usize>().ok())
                    .filter(|i| *i < entries.len())
                    .ok_or_else(|| no_field(path, field))?;
                entries[entry] = value.to_string();
            }
        },
        Section::Image {
            img_src,
            caption,
            attribution,
        } => match field {
            "imgSrc" => *img_src = value.to_string(),
            "caption" => *caption = optional_text(value),
            "attribution" => *attribution = optional_text(value),
            _ => return Err(no_field(path, field)),
        },
        Section::ActiveRecall { question, answer } => match field {
            "question" => *question = value.to_string(),
            "answer" => *answer = value.to_string(),
            _ => return Err(no_field(path, field)),
        },
    }
    Ok(())
}

fn set_question_field(
    question: &mut QuizQuestion,
    path: &EntityPath,
    field: &str,
    value: &str,
) -> Result<()> {
    match field {
        "question" => question.question = value.to_string(),
        "answer" => {
            question.answer = match value.trim() {
                "" => None,
                label => Some(label.parse::<ChoiceLabel>()?),
            }
        }
        "imgSrc" => question.img_src = optional_text(value),
        "caption" => question.caption = optional_text(value),
        "attribution" => question.attribution = optional_text(value),
        _ => {
            let label = field
                .strip_prefix("choices.")
                .and_then(|l| l.parse::<ChoiceLabel>().ok())
                .ok_or_else(|| no_field(path, field))?;
            *question.choices.get_mut(label) = value.to_string();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::ListCategory;

    fn section_path(module: usize, topic: usize, section: usize) -> EntityPath {
        EntityPath::Section {
            module,
            topic,
            section,
        }
    }

    #[test]
    fn test_add_module_default_titles() {
        let mut doc = Document::new();
        assert_eq!(doc.add_module(), 0);
        assert_eq!(doc.add_module(), 1);
        assert_eq!(doc.module(0).unwrap().title, "Untitled Module 0");
        assert_eq!(doc.module(1).unwrap().title, "Untitled Module 1");
        assert!(doc.module(1).unwrap().topics.is_empty());
    }

    #[test]
    fn test_delete_module_shifts_indices() {
        let mut doc = Document::new();
        for _ in 0..3 {
            doc.add_module();
        }
        let removed = doc.delete_module(1).unwrap();
        assert_eq!(removed.title, "Untitled Module 1");
        assert_eq!(doc.module(1).unwrap().title, "Untitled Module 2");

        doc.delete_module(1).unwrap();
        assert!(matches!(
            doc.module(1),
            Err(Error::IndexOutOfRange { kind: "module", index: 1, len: 1 })
        ));
        assert!(matches!(
            doc.delete_module(5),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_topics_and_sections() {
        let mut doc = Document::new();
        let m = doc.add_module();
        assert_eq!(doc.add_topic(m).unwrap(), 0);
        assert_eq!(doc.add_topic(m).unwrap(), 1);
        assert_eq!(doc.topic(m, 1).unwrap().title, "Topic 1");

        assert_eq!(doc.add_section(m, 0, "text").unwrap(), 0);
        assert_eq!(doc.add_section(m, 0, "active-recall").unwrap(), 1);
        assert!(matches!(
            doc.add_section(m, 0, "video"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            doc.add_section(m, 7, "text"),
            Err(Error::IndexOutOfRange { kind: "topic", .. })
        ));

        let removed = doc.delete_section(m, 0, 0).unwrap();
        assert_eq!(removed.kind(), SectionKind::Text);
        assert_eq!(
            doc.section(m, 0, 0).unwrap().kind(),
            SectionKind::ActiveRecall
        );

        doc.delete_topic(m, 0).unwrap();
        assert_eq!(doc.topic(m, 0).unwrap().title, "Topic 1");
    }

    #[test]
    fn test_section_type_switch_starts_fresh() {
        let mut doc = Document::new();
        let m = doc.add_module();
        doc.add_topic(m).unwrap();
        doc.add_section(m, 0, "image").unwrap();
        let path = section_path(m, 0, 0);
        doc.set_field(&path, "imgSrc", "cat.png").unwrap();
        doc.set_field(&path, "caption", "A cat").unwrap();

        doc.set_field(&path, "type", "text").unwrap();
        let value = serde_json::to_value(doc.section(m, 0, 0).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "text", "content": "" }));

        doc.change_section_type(m, 0, 0, "image").unwrap();
        assert_eq!(doc.section(m, 0, 0).unwrap().img_src(), None);
        assert!(matches!(
            doc.change_section_type(m, 0, 0, "gallery"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_set_field_on_sections() {
        let mut doc = Document::new();
        let m = doc.add_module();
        doc.add_topic(m).unwrap();
        doc.add_section(m, 0, "text").unwrap();
        doc.add_section(m, 0, "list").unwrap();

        let text = section_path(m, 0, 0);
        doc.set_field(&text, "header", "Intro").unwrap();
        doc.set_field(&text, "content", "Body").unwrap();
        assert!(matches!(
            doc.set_field(&text, "answer", "x"),
            Err(Error::NotFound(_))
        ));

        let list = section_path(m, 0, 1);
        doc.set_field(&list, "category", "ordered").unwrap();
        doc.set_field(&list, "hasHeader", "true").unwrap();
        doc.add_list_entry(m, 0, 1).unwrap();
        doc.add_list_entry(m, 0, 1).unwrap();
        doc.set_field(&list, "entries.1", "second").unwrap();
        assert!(matches!(
            doc.set_field(&list, "entries.2", "third"),
            Err(Error::NotFound(_))
        ));
        doc.delete_list_entry(m, 0, 1, 0).unwrap();

        match doc.section(m, 0, 1).unwrap() {
            Section::List {
                category,
                has_header,
                entries,
            } => {
                assert_eq!(*category, ListCategory::Ordered);
                assert!(*has_header);
                assert_eq!(entries, &vec!["second".to_string()]);
            }
            other => panic!("unexpected section {:?}", other),
        }
        assert!(matches!(
            doc.add_list_entry(m, 0, 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_set_field_unresolved_path() {
        let mut doc = Document::new();
        let result = doc.set_field(&EntityPath::Module { module: 0 }, "title", "x");
        assert!(matches!(result, Err(Error::NotFound(_))));

        doc.add_module();
        let result = doc.set_field(&EntityPath::Question { module: 0, question: 0 }, "question", "x");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_quiz_lifecycle() {
        let mut doc = Document::new();
        let m = doc.add_module();
        assert!(matches!(doc.add_quiz_question(m), Err(Error::NotFound(_))));

        doc.add_quiz(m).unwrap();
        assert_eq!(doc.add_quiz_question(m).unwrap(), 0);
        assert_eq!(doc.add_quiz_question(m).unwrap(), 1);

        let q = EntityPath::Question { module: m, question: 1 };
        doc.set_field(&q, "question", "Capital of France?").unwrap();
        doc.set_field(&q, "choices.c", "Paris").unwrap();
        doc.set_field(&q, "answer", "C").unwrap();
        let question = doc.question(m, 1).unwrap();
        assert_eq!(question.choices.c, "Paris");
        assert_eq!(question.answer, Some(ChoiceLabel::C));

        doc.set_field(&q, "answer", "").unwrap();
        assert_eq!(doc.question(m, 1).unwrap().answer, None);
        assert!(matches!(
            doc.set_field(&q, "choices.e", "nope"),
            Err(Error::NotFound(_))
        ));

        doc.delete_quiz_question(m, 0).unwrap();
        assert_eq!(doc.question(m, 0).unwrap().question, "Capital of France?");

        let removed = doc.delete_quiz(m).unwrap();
        assert_eq!(removed.map(|q| q.len()), Some(1));
        assert!(doc.module(m).unwrap().assessment.is_none());
    }

    #[test]
    fn test_media_references_and_targets() {
        let mut doc = Document::new();
        let m = doc.add_module();
        doc.add_topic(m).unwrap();
        doc.add_section(m, 0, "image").unwrap();
        doc.add_section(m, 0, "text").unwrap();
        doc.add_quiz(m).unwrap();
        doc.add_quiz_question(m).unwrap();

        doc.set_field(&EntityPath::Module { module: m }, "imgSrc", "cover.png")
            .unwrap();
        doc.set_field(&section_path(m, 0, 0), "imgSrc", "diagram.png")
            .unwrap();
        doc.set_field(&EntityPath::Question { module: m, question: 0 }, "imgSrc", "q.png")
            .unwrap();

        assert_eq!(
            doc.media_references(),
            vec!["cover.png", "diagram.png", "q.png"]
        );

        assert!(doc.accepts_media(&section_path(m, 0, 0)).is_ok());
        assert!(matches!(
            doc.accepts_media(&section_path(m, 0, 1)),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            doc.accepts_media(&EntityPath::Topic { module: m, topic: 0 }),
            Err(Error::NotFound(_))
        ));
    }
}
