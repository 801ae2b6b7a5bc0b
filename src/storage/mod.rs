pub mod archive;
pub mod codec;
mod document;
mod error;
pub mod media;
mod models;
pub mod settings;
mod workspace;

pub use document::{Document, EntityPath};
pub use error::{Error, Result};
pub use media::MediaStore;
pub use models::*;
pub use settings::{ArchiveCompression, MakerSettings, ModuleNaming};
pub use workspace::Workspace;
