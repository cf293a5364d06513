// Token lookup. The flag and the GITHUB_TOKEN variable are handled by clap;
// this adds the token file in the user's config directory as a fallback.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::CommandError;

/// Location of the token file, e.g. `~/.config/release-me/token` on Linux.
pub fn token_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("release-me").join("token"))
}

/// Read a token from `path`. A missing or blank file yields `None`.
pub fn load_token(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(data) => {
            let token = data.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read token file {}", path.display()))
        }
    }
}

/// Pick the token to use: explicit value first, then the token file.
pub fn resolve(explicit: Option<&str>) -> Result<String, CommandError> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    let Some(path) = token_file() else {
        return Err(CommandError::MissingToken);
    };
    debug!(path = %path.display(), "looking for token file");
    load_token(&path)?.ok_or(CommandError::MissingToken)
}
