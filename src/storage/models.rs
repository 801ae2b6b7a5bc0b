use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::Error;

/// A learning module: the top level of the content tree, persisted as one
/// data file per module inside a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub title: String,
    #[serde(rename = "imgSrc", default, skip_serializing_if = "Option::is_none")]
    pub img_src: Option<String>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    /// `None` means the module has no quiz at all, which is different from an
    /// empty quiz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Vec<QuizQuestion>>,
}

impl Module {
    pub fn new(title: String) -> Self {
        Self {
            title,
            img_src: None,
            topics: Vec::new(),
            assessment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Topic {
    pub fn new(title: String) -> Self {
        Self {
            title,
            sections: Vec::new(),
        }
    }
}

/// The six recognised section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    Text,
    List,
    Image,
    Trivia,
    Remember,
    ActiveRecall,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        Self::Text,
        Self::List,
        Self::Image,
        Self::Trivia,
        Self::Remember,
        Self::ActiveRecall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::List => "list",
            Self::Image => "image",
            Self::Trivia => "trivia",
            Self::Remember => "remember",
            Self::ActiveRecall => "active-recall",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown section type '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListCategory {
    #[default]
    Unordered,
    Ordered,
}

impl FromStr for ListCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unordered" => Ok(Self::Unordered),
            "ordered" => Ok(Self::Ordered),
            other => Err(Error::InvalidArgument(format!(
                "unknown list category '{}'",
                other
            ))),
        }
    }
}

/// A content section. The field set is carried by the variant, so a section
/// can never hold fields belonging to another kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Section {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<String>,
        #[serde(default)]
        content: String,
    },
    List {
        #[serde(default)]
        category: ListCategory,
        #[serde(rename = "hasHeader", default)]
        has_header: bool,
        #[serde(default)]
        entries: Vec<String>,
    },
    Image {
        /// Empty until an image has been chosen.
        #[serde(rename = "imgSrc", default)]
        img_src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },
    Trivia {
        #[serde(default)]
        content: String,
    },
    Remember {
        #[serde(default)]
        content: String,
    },
    ActiveRecall {
        #[serde(default)]
        question: String,
        #[serde(default)]
        answer: String,
    },
}

impl Section {
    /// Fresh section of the given kind with empty fields.
    pub fn new(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Text => Self::Text {
                header: None,
                content: String::new(),
            },
            SectionKind::List => Self::List {
                category: ListCategory::default(),
                has_header: false,
                entries: Vec::new(),
            },
            SectionKind::Image => Self::Image {
                img_src: String::new(),
                caption: None,
                attribution: None,
            },
            SectionKind::Trivia => Self::Trivia {
                content: String::new(),
            },
            SectionKind::Remember => Self::Remember {
                content: String::new(),
            },
            SectionKind::ActiveRecall => Self::ActiveRecall {
                question: String::new(),
                answer: String::new(),
            },
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Text { .. } => SectionKind::Text,
            Self::List { .. } => SectionKind::List,
            Self::Image { .. } => SectionKind::Image,
            Self::Trivia { .. } => SectionKind::Trivia,
            Self::Remember { .. } => SectionKind::Remember,
            Self::ActiveRecall { .. } => SectionKind::ActiveRecall,
        }
    }

    pub fn img_src(&self) -> Option<&str> {
        match self {
            Self::Image { img_src, .. } if !img_src.is_empty() => Some(img_src.as_str()),
            _ => None,
        }
    }
}

/// Label of one of the four quiz choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceLabel {
    #[serde(alias = "A")]
    A,
    #[serde(alias = "B")]
    B,
    #[serde(alias = "C")]
    C,
    #[serde(alias = "D")]
    D,
}

impl ChoiceLabel {
    pub const ALL: [ChoiceLabel; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
        }
    }
}

impl FromStr for ChoiceLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(Self::A),
            "b" => Ok(Self::B),
            "c" => Ok(Self::C),
            "d" => Ok(Self::D),
            _ => Err(Error::InvalidArgument(format!("unknown choice label '{}'", s))),
        }
    }
}

/// Exactly four choices, always serialised with keys `a`, `b`, `c`, `d` in
/// that order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Choices {
    #[serde(default, alias = "A")]
    pub a: String,
    #[serde(default, alias = "B")]
    pub b: String,
    #[serde(default, alias = "C")]
    pub c: String,
    #[serde(default, alias = "D")]
    pub d: String,
}

impl Choices {
    pub fn get(&self, label: ChoiceLabel) -> &str {
        match label {
            ChoiceLabel::A => &self.a,
            ChoiceLabel::B => &self.b,
            ChoiceLabel::C => &self.c,
            ChoiceLabel::D => &self.d,
        }
    }

    pub fn get_mut(&mut self, label: ChoiceLabel) -> &mut String {
        match label {
            ChoiceLabel::A => &mut self.a,
            ChoiceLabel::B => &mut self.b,
            ChoiceLabel::C => &mut self.c,
            ChoiceLabel::D => &mut self.d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub choices: Choices,
    /// Serialised as `""` while no answer is selected.
    #[serde(default, with = "answer_label")]
    pub answer: Option<ChoiceLabel>,
    #[serde(rename = "imgSrc", default)]
    pub img_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

mod answer_label {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<ChoiceLabel>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map_or("", |label| label.as_str()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ChoiceLabel>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(label) => label
                .parse()
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
