use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::cache::token::TokenRecord;

/// Result of reading the token file. Absence is an expected state, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredToken {
    Present(TokenRecord),
    Absent,
}

impl StoredToken {
    pub fn into_option(self) -> Option<TokenRecord> {
        match self {
            StoredToken::Present(record) => Some(record),
            StoredToken::Absent => None,
        }
    }
}

/// Single-file persistence for the current [`TokenRecord`].
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing, unreadable or unparsable files all read as [`StoredToken::Absent`].
    pub async fn load(&self) -> StoredToken {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("token file {} not found", self.path.display());
                return StoredToken::Absent;
            }
            Err(e) => {
                warn!("token file {} unreadable: {}", self.path.display(), e);
                return StoredToken::Absent;
            }
        };

        match serde_json::from_str::<TokenRecord>(&content) {
            Ok(record) => StoredToken::Present(record),
            Err(e) => {
                warn!("token file {} is corrupt, ignoring: {}", self.path.display(), e);
                StoredToken::Absent
            }
        }
    }

    /// Write to a sibling temp file, then rename over the target.
    pub async fn save(&self, record: &TokenRecord) -> std::io::Result<()> {
        let body = serde_json::to_vec_pretty(record)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &body).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }
        fs::rename(&tmp, &self.path).await?;

        info!("token record written to {}", self.path.display());
        Ok(())
    }
}
