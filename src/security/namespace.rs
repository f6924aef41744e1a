use crate::store::ChainError;
use std::path::{Component, Path};

pub struct NamespaceSanitizer;

impl NamespaceSanitizer {
    /// Validate a namespace id so it names exactly one file inside the data
    /// directory. Rejects:
    /// - Path separators and directory traversal (../)
    /// - Absolute paths (/etc/passwd)
    /// - Hidden names (starting with .)
    ///
    /// Returns the id unchanged when it is usable.
    pub fn sanitize(raw_id: &str) -> Result<&str, ChainError> {
        Self::sanitize_with_options(raw_id, false)
    }

    /// Sanitize with custom options
    pub fn sanitize_with_options(raw_id: &str, allow_hidden: bool) -> Result<&str, ChainError> {
        if raw_id.is_empty() {
            return Err(ChainError::InvalidNamespace("Empty namespace".to_string()));
        }

        // Backslash only separates on Windows, but never belongs in an id
        if raw_id.contains(['/', '\\']) {
            return Err(ChainError::InvalidNamespace(format!(
                "Path separator not allowed: {}",
                raw_id
            )));
        }

        if raw_id.contains('\0') {
            return Err(ChainError::InvalidNamespace(format!(
                "NUL byte not allowed: {:?}",
                raw_id
            )));
        }

        let mut components = Path::new(raw_id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            (Some(Component::ParentDir), None) => {
                return Err(ChainError::InvalidNamespace(format!(
                    "Parent directory traversal not allowed: {}",
                    raw_id
                )));
            }
            (Some(Component::Prefix(_) | Component::RootDir), _) => {
                return Err(ChainError::InvalidNamespace(format!(
                    "Absolute path not allowed: {}",
                    raw_id
                )));
            }
            _ => {
                return Err(ChainError::InvalidNamespace(format!(
                    "Not a single file name: {}",
                    raw_id
                )));
            }
        }

        if !allow_hidden && raw_id.starts_with('.') {
            return Err(ChainError::InvalidNamespace(format!(
                "Hidden names not allowed: {}",
                raw_id
            )));
        }

        Ok(raw_id)
    }
}
