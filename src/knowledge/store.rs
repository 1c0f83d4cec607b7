use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::errors::AppError;

use super::types::KnowledgeBase;

/// Result of reading the knowledge file, keeping "not there yet" apart from
/// "there but unusable".
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Absent,
    Corrupt(String),
    Loaded(KnowledgeBase),
}

impl LoadOutcome {
    pub fn into_knowledge_base(self) -> KnowledgeBase {
        match self {
            LoadOutcome::Loaded(kb) => kb,
            LoadOutcome::Absent | LoadOutcome::Corrupt(_) => KnowledgeBase::default(),
        }
    }
}

/// JSON file holding the knowledge base.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    path: PathBuf,
}

impl KnowledgeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn inspect(&self) -> LoadOutcome {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return LoadOutcome::Absent,
            Err(err) => return LoadOutcome::Corrupt(format!("read failed: {}", err)),
        };

        match serde_json::from_str::<KnowledgeBase>(&contents) {
            Ok(kb) => LoadOutcome::Loaded(kb),
            Err(err) => LoadOutcome::Corrupt(format!("invalid JSON: {}", err)),
        }
    }

    /// Never fails: an absent or unusable file yields the empty schema. The
    /// unusable case is only visible in the logs; use [`Self::inspect`] to
    /// tell the cases apart.
    pub fn load(&self) -> KnowledgeBase {
        let outcome = self.inspect();
        match &outcome {
            LoadOutcome::Absent => {
                tracing::info!(
                    "Knowledge base {} not found; starting empty",
                    self.path.display()
                );
            }
            LoadOutcome::Corrupt(reason) => {
                tracing::warn!(
                    "Knowledge base {} is unusable ({}); starting empty",
                    self.path.display(),
                    reason
                );
            }
            LoadOutcome::Loaded(kb) => {
                tracing::debug!(
                    "Loaded knowledge base {}: {} locations, {} rules, {} items",
                    self.path.display(),
                    kb.locations.len(),
                    kb.rules.len(),
                    kb.items.len()
                );
            }
        }
        outcome.into_knowledge_base()
    }

    /// Overwrites the file with the full knowledge base.
    pub fn save(&self, kb: &KnowledgeBase) -> Result<(), AppError> {
        let mut data = kb.to_pretty_json()?;
        data.push('\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
            }
        }
        fs::write(&self.path, data).map_err(|e| AppError::io(&self.path, e))?;

        tracing::debug!("Saved knowledge base to {}", self.path.display());
        Ok(())
    }
}
