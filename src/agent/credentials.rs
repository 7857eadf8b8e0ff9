//! API-key resolution.
//!
//! The key is looked up under a fixed name (`OPENAI_API_KEY`): first in the
//! process environment, then as a file of that name inside the configured
//! secrets directory. The trait seam exists so tests can substitute a fake
//! source without touching process-global state.

use std::path::PathBuf;

use super::AgentError;

/// Fixed name used both as the environment variable and as the filename
/// inside the secrets directory.
pub static API_KEY_VAR: &str = "OPENAI_API_KEY";

pub trait CredentialResolver: Send + Sync {
    fn resolve(&self) -> Result<String, AgentError>;
}

/// Production resolver: environment variable first, secret file second.
pub struct EnvFileResolver {
    var_name: String,
    secrets_dir: Option<PathBuf>,
}

impl EnvFileResolver {
    pub fn new(var_name: impl Into<String>, secrets_dir: Option<PathBuf>) -> Self {
        Self {
            var_name: var_name.into(),
            secrets_dir,
        }
    }
}

impl CredentialResolver for EnvFileResolver {
    fn resolve(&self) -> Result<String, AgentError> {
        if let Ok(value) = std::env::var(&self.var_name) {
            if !value.is_empty() {
                return Ok(value);
            }
        }

        if let Some(dir) = &self.secrets_dir {
            let path = dir.join(&self.var_name);
            if let Ok(contents) = std::fs::read_to_string(&path) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return Ok(trimmed.to_owned());
                }
            }
        }

        Err(AgentError::Credential(self.var_name.clone()))
    }
}
