//! Discord id to GitHub login mapping.
//!
//! The table is loaded once at start-up from an `account-mappings.json`
//! document and is read-only afterwards, so it can be shared freely between
//! concurrent handlers. Lookups are total: an unmapped id yields `None`.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading the mapping table.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The mappings file could not be read.
    #[error("failed to read identity mappings from '{path}': {message}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// The mappings document was not valid JSON of the expected shape.
    #[error("identity mappings are malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One Discord account paired with one GitHub account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityMapping {
    /// Discord user id (a snowflake rendered as a string).
    #[serde(rename = "discordId")]
    pub discord_id: String,
    /// GitHub login.
    #[serde(rename = "githubId")]
    pub github_login: String,
}

#[derive(Debug, Deserialize)]
struct MappingDocument {
    #[serde(default)]
    mappings: Vec<IdentityMapping>,
}

/// Immutable bidirectional lookup between Discord ids and GitHub logins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMapper {
    mappings: Vec<IdentityMapping>,
}

impl IdentityMapper {
    /// Builds a mapper from already-parsed pairs.
    #[must_use]
    pub const fn new(mappings: Vec<IdentityMapping>) -> Self {
        Self { mappings }
    }

    /// Parses a mappings document of the form
    /// `{"mappings": [{"discordId": "...", "githubId": "..."}]}`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Parse`] when the document is malformed.
    pub fn from_json(document: &str) -> Result<Self, IdentityError> {
        let parsed: MappingDocument = serde_json::from_str(document)?;
        Ok(Self::new(parsed.mappings))
    }

    /// Reads and parses the mappings file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Io`] when the file cannot be read and
    /// [`IdentityError::Parse`] when its contents are malformed.
    pub fn load(path: &Utf8Path) -> Result<Self, IdentityError> {
        let io_error = |error: std::io::Error| IdentityError::Io {
            path: path.to_string(),
            message: error.to_string(),
        };
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = path.file_name().ok_or_else(|| IdentityError::Io {
            path: path.to_string(),
            message: "path has no file name".to_owned(),
        })?;

        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
        let content = dir.read_to_string(file_name).map_err(io_error)?;
        let mapper = Self::from_json(&content)?;
        tracing::info!(count = mapper.len(), %path, "loaded identity mappings");
        Ok(mapper)
    }

    /// GitHub login for a Discord id, comparing ids without surrounding
    /// whitespace. When an id is mapped twice the last pair wins.
    #[must_use]
    pub fn github_login_for(&self, discord_id: &str) -> Option<&str> {
        let wanted = discord_id.trim();
        self.mappings
            .iter()
            .rev()
            .find(|mapping| mapping.discord_id.trim() == wanted)
            .map(|mapping| mapping.github_login.as_str())
    }

    /// Discord id for a GitHub login. When a login is mapped twice the last
    /// pair wins.
    #[must_use]
    pub fn discord_id_for(&self, github_login: &str) -> Option<&str> {
        self.mappings
            .iter()
            .rev()
            .find(|mapping| mapping.github_login == github_login)
            .map(|mapping| mapping.discord_id.trim())
    }

    /// Number of loaded pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether no pairs were loaded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
