//! Lifecycle of the one open package.
//!
//! A session is either empty or active. An active session owns a scratch
//! [`Workspace`] holding the unpacked package and the [`Document`] decoded from
//! it. New and open replace the workspace; save writes the document back into
//! the same workspace and bundles it, so the session stays usable afterwards.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::storage::{
    archive, codec, settings, Document, EntityPath, Error, MakerSettings, MediaStore, Result, Workspace,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Empty,
    Active,
}

/// What a save wrote
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSummary {
    pub module_files: Vec<String>,
    pub bundled_files: usize,
    pub pruned_media: Vec<String>,
}

#[derive(Debug)]
pub struct Session {
    settings: MakerSettings,
    workspace: Option<Workspace>,
    document: Document,
    has_media: bool,
}

impl Session {
    pub fn new(settings: MakerSettings) -> Self {
        Self {
            settings,
            workspace: None,
            document: Document::new(),
            has_media: false,
        }
    }

    /// A session using the settings saved in `config_dir`, or the defaults
    /// when none were saved.
    pub fn from_config_dir(config_dir: &Path) -> Result<Self> {
        let settings = settings::load_settings(config_dir)?;
        log::debug!("Loaded settings from {:?}", config_dir);
        Ok(Self::new(settings))
    }

    /// A session using the settings in the user's config directory.
    pub fn from_default_config() -> Result<Self> {
        Self::from_config_dir(&settings::default_config_dir()?)
    }

    pub fn settings(&self) -> &MakerSettings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        if self.workspace.is_some() {
            SessionState::Active
        } else {
            SessionState::Empty
        }
    }

    pub fn workspace_path(&self) -> Option<&Path> {
        self.workspace.as_ref().map(Workspace::path)
    }

    fn active_workspace(&self) -> Result<&Workspace> {
        self.workspace.as_ref().ok_or(Error::NoActiveSession)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The document, for editing. Only an active session can be edited.
    pub fn document_mut(&mut self) -> Result<&mut Document> {
        if self.workspace.is_none() {
            return Err(Error::NoActiveSession);
        }
        Ok(&mut self.document)
    }

    /// Whether the package has a media folder
    pub fn has_media(&self) -> bool {
        self.has_media
    }

    fn discard(&mut self) {
        // Dropping the workspace deletes it.
        self.workspace = None;
        self.document = Document::new();
        self.has_media = false;
    }

    fn fresh_workspace(&self) -> Result<Workspace> {
        Workspace::create(
            self.settings.workspace_dir.as_deref(),
            &self.settings.workspace_prefix,
        )
    }

    /// Start over with an empty module list in a fresh workspace.
    pub fn new_session(&mut self) -> Result<()> {
        self.discard();
        self.workspace = Some(self.fresh_workspace()?);
        log::info!("New module set created");
        Ok(())
    }

    /// Unpack and decode `archive_path`. Returns the number of modules.
    ///
    /// On failure the session is left empty; a half-read package is never
    /// adopted.
    pub fn open_session(&mut self, archive_path: &Path) -> Result<usize> {
        self.discard();

        let workspace = self.fresh_workspace()?;
        archive::unbundle(archive_path, workspace.path())?;
        let modules = codec::decode(workspace.path())?;
        let has_media = MediaStore::new(workspace.path()).exists();

        self.document = Document::from_modules(modules);
        self.has_media = has_media;
        self.workspace = Some(workspace);

        log::info!(
            "Loaded {} modules from {:?}",
            self.document.len(),
            archive_path
        );
        Ok(self.document.len())
    }

    /// Write the document into the workspace and bundle it to `archive_path`.
    pub fn save_session(&mut self, archive_path: &Path) -> Result<SaveSummary> {
        let workspace = self.active_workspace()?;
        let media = MediaStore::new(workspace.path());
        let references = self.document.media_references();

        if self.settings.check_media_on_save {
            let missing = media.missing(&references);
            if !missing.is_empty() {
                return Err(Error::NotFound(format!(
                    "media referenced but missing: {}",
                    missing.join(", ")
                )));
            }
        }

        // Unused media is left out of the archive and only deleted once the
        // archive is in place.
        let unused_media = if self.settings.prune_unused_media {
            media.unreferenced(&references)?
        } else {
            Vec::new()
        };
        let excluded: Vec<PathBuf> = unused_media.iter().map(|n| media.dir().join(n)).collect();

        let module_files = codec::encode(
            self.document.modules(),
            workspace.path(),
            self.settings.module_naming,
        )?;
        let bundled_files = archive::bundle_excluding(
            workspace.path(),
            archive_path,
            self.settings.compression,
            &excluded,
        )?;

        let pruned_media = if unused_media.is_empty() {
            Vec::new()
        } else {
            media.prune(&references)?
        };

        log::info!("Modules saved to {:?}", archive_path);
        Ok(SaveSummary {
            module_files,
            bundled_files,
            pruned_media,
        })
    }

    /// Drop the document and delete the workspace.
    pub fn close_session(&mut self) {
        if self.workspace.is_some() {
            log::info!("Closing session");
        }
        self.discard();
    }

    /// Copy a media file into the package and return its reference name.
    pub fn import_media(&mut self, source: &Path) -> Result<String> {
        let name = MediaStore::new(self.active_workspace()?.path()).import(source)?;
        self.has_media = true;
        Ok(name)
    }

    /// Import a media file and point the entity's `imgSrc` at it.
    ///
    /// The target is checked first, so nothing is copied for an entity that
    /// cannot carry an image.
    pub fn attach_media(&mut self, path: &EntityPath, source: &Path) -> Result<String> {
        self.active_workspace()?;
        self.document.accepts_media(path)?;
        let name = self.import_media(source)?;
        self.document.set_field(path, "imgSrc", &name)?;
        Ok(name)
    }

    /// Absolute path of a media reference in the open package.
    pub fn resolve_media(&self, name: &str) -> Result<PathBuf> {
        MediaStore::new(self.active_workspace()?.path()).resolve(name)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(MakerSettings::default())
    }
}
