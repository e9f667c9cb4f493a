//! Access token handling for the Earth Engine REST API.
//!
//! Obtaining the OAuth token itself is left to the Google tooling
//! (`gcloud auth print-access-token`, `earthengine authenticate`); this module only
//! reuses a token that is already around, or asks for one once.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::collect::global_variables::TOKEN_ENV_VAR;
use crate::errors::ElevJoinError;

/// What a request needs to be authorised
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Result of an authentication attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Credentials),
    /// No reusable session, a user could supply one
    NeedsInteractive(String),
    /// Terminal failure
    Failed(String),
}

/// Looks for a token in the environment, then in a cached token file
#[derive(Debug, Clone)]
pub struct Authenticator {
    env_token: Option<String>,
    /// `None` when the platform has no config directory; nothing is cached then
    token_file: Option<PathBuf>,
}

impl Authenticator {
    /// Reads `EARTHENGINE_TOKEN` from the environment; `token_file` overrides the default cache
    pub fn new(token_file: Option<PathBuf>) -> Self {
        Authenticator {
            env_token: std::env::var(TOKEN_ENV_VAR).ok(),
            token_file: token_file.or_else(default_token_file),
        }
    }

    /// Build without looking at the process environment
    pub fn with_sources(env_token: Option<String>, token_file: PathBuf) -> Self {
        Authenticator {
            env_token,
            token_file: Some(token_file),
        }
    }

    pub fn token_file(&self) -> Option<&Path> {
        self.token_file.as_deref()
    }

    /// Reuse an existing session without user interaction
    pub fn try_silent(&self) -> AuthOutcome {
        if let Some(token) = self.env_token.as_deref().map(str::trim) {
            if !token.is_empty() {
                tracing::debug!("using access token from {}", TOKEN_ENV_VAR);
                return authenticated(token);
            }
        }

        let Some(token_file) = self.token_file.as_deref() else {
            return AuthOutcome::NeedsInteractive(format!(
                "no {} set and no config directory for a cached token",
                TOKEN_ENV_VAR
            ));
        };

        match std::fs::read_to_string(token_file) {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    AuthOutcome::NeedsInteractive(format!("token file {:?} is empty", token_file))
                } else {
                    tracing::debug!("using cached access token from {:?}", token_file);
                    authenticated(token)
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AuthOutcome::NeedsInteractive(
                format!("no {} set and no cached token at {:?}", TOKEN_ENV_VAR, token_file),
            ),
            Err(e) => AuthOutcome::Failed(format!("cannot read token file {:?}: {}", token_file, e)),
        }
    }

    /// Ask for a token once on `input`, caching it on success
    pub fn interactive<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> AuthOutcome {
        let prompt = writeln!(
            output,
            "Paste an Earth Engine access token (e.g. from `gcloud auth print-access-token`):"
        )
        .and_then(|_| output.flush());
        if let Err(e) = prompt {
            return AuthOutcome::Failed(format!("cannot prompt for a token: {}", e));
        }

        let mut line = String::new();
        if let Err(e) = input.read_line(&mut line) {
            return AuthOutcome::Failed(format!("cannot read token: {}", e));
        }
        let token = line.trim();
        if token.is_empty() {
            return AuthOutcome::Failed("no token entered".to_string());
        }

        if let Err(e) = self.cache_token(token) {
            // the token is still usable for this run
            tracing::warn!("{:#}", e);
        }
        authenticated(token)
    }

    fn cache_token(&self, token: &str) -> Result<()> {
        let token_file = self
            .token_file
            .as_deref()
            .context("No config directory to cache the token in")?;
        if let Some(parent) = token_file.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {:?}", parent))?;
        }
        std::fs::write(token_file, token)
            .context(format!("Failed to cache token to {:?}", token_file))
    }

    /// Silent reuse first, then at most one interactive attempt when allowed
    pub fn authenticate<R: BufRead, W: Write>(
        &self,
        allow_interactive: bool,
        input: &mut R,
        output: &mut W,
    ) -> Result<Credentials> {
        let outcome = match self.try_silent() {
            AuthOutcome::NeedsInteractive(reason) if allow_interactive => {
                tracing::info!("{}, asking for a token", reason);
                self.interactive(input, output)
            }
            outcome => outcome,
        };

        match outcome {
            AuthOutcome::Authenticated(credentials) => Ok(credentials),
            AuthOutcome::NeedsInteractive(reason) | AuthOutcome::Failed(reason) => {
                Err(ElevJoinError::Auth(reason).into())
            }
        }
    }
}

fn authenticated(token: &str) -> AuthOutcome {
    AuthOutcome::Authenticated(Credentials {
        access_token: token.to_string(),
    })
}

/// `access_token` in the platform config directory (`~/.config/rselev` on Linux)
fn default_token_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rselev").map(|dirs| dirs.config_dir().join("access_token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_env_token_wins() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("token");
        std::fs::write(&file, "from-file").unwrap();
        let auth = Authenticator::with_sources(Some("from-env".to_string()), file);
        match auth.try_silent() {
            AuthOutcome::Authenticated(c) => assert_eq!(c.access_token, "from-env"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_cached_token_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("token");
        std::fs::write(&file, "ya29.cached\n").unwrap();
        let auth = Authenticator::with_sources(Some("   ".to_string()), file);
        match auth.try_silent() {
            AuthOutcome::Authenticated(c) => assert_eq!(c.access_token, "ya29.cached"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_no_session_needs_interactive() {
        let dir = tempfile::tempdir().unwrap();
        let auth = Authenticator::with_sources(None, dir.path().join("missing"));
        assert!(matches!(auth.try_silent(), AuthOutcome::NeedsInteractive(_)));
    }

    #[test]
    fn test_unreadable_token_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be read as a file
        let auth = Authenticator::with_sources(None, dir.path().to_path_buf());
        assert!(matches!(auth.try_silent(), AuthOutcome::Failed(_)));
    }

    #[test]
    fn test_interactive_caches_token() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested").join("token");
        let auth = Authenticator::with_sources(None, file.clone());
        let mut input = Cursor::new("ya29.pasted\n");
        let mut output = Vec::new();

        let credentials = auth.authenticate(true, &mut input, &mut output).unwrap();
        assert_eq!(credentials.access_token, "ya29.pasted");
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "ya29.pasted");
        assert!(String::from_utf8(output).unwrap().contains("access token"));

        // the next run reuses it silently
        assert!(matches!(auth.try_silent(), AuthOutcome::Authenticated(_)));
    }

    #[test]
    fn test_interactive_empty_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let auth = Authenticator::with_sources(None, dir.path().join("token"));
        let mut input = Cursor::new("\n");
        let err = auth
            .authenticate(true, &mut input, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ElevJoinError>(),
            Some(ElevJoinError::Auth(_))
        ));
    }

    #[test]
    fn test_interactive_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let auth = Authenticator::with_sources(None, dir.path().join("token"));
        let mut input = Cursor::new("ya29.never-read\n");
        let mut output = Vec::new();
        assert!(auth.authenticate(false, &mut input, &mut output).is_err());
        assert!(output.is_empty());
    }

    #[test]
    fn test_token_file_override_and_default() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("token");
        let auth = Authenticator::new(Some(file.clone()));
        assert_eq!(auth.token_file(), Some(file.as_path()));

        let expected = ProjectDirs::from("", "", "rselev")
            .map(|dirs| dirs.config_dir().join("access_token"));
        assert_eq!(Authenticator::new(None).token_file(), expected.as_deref());
        if let Some(default) = default_token_file() {
            assert!(default.ends_with("access_token"));
            assert!(default.parent().unwrap().ends_with("rselev"));
        }
    }

    #[test]
    fn test_without_config_dir_nothing_is_cached() {
        let auth = Authenticator {
            env_token: None,
            token_file: None,
        };
        assert!(matches!(auth.try_silent(), AuthOutcome::NeedsInteractive(_)));

        // the pasted token is still used for the run
        let mut input = Cursor::new("ya29.pasted\n");
        let credentials = auth.authenticate(true, &mut input, &mut Vec::new()).unwrap();
        assert_eq!(credentials.access_token, "ya29.pasted");
    }

    #[test]
    fn test_debug_redacts_token() {
        let c = Credentials {
            access_token: "secret".to_string(),
        };
        assert!(!format!("{:?}", c).contains("secret"));
    }
}
