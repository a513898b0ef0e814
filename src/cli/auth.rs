//! Authentication CLI commands
//!
//! The backend issues a bearer token; `auth login` stores it encrypted under
//! a passphrase. `FIELDSALES_TOKEN` takes precedence over the stored token.

use clap::Subcommand;
use tracing::{debug, warn};

use super::Session;
use crate::config::settings::ENV_TOKEN;
use crate::config::CredentialStore;
use crate::error::{FieldSalesError, FieldSalesResult};

const MIN_PASSPHRASE_LEN: usize = 8;

/// Authentication subcommands
#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store a bearer token, encrypted under a passphrase
    Login {
        /// Token to store (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,
    },
    /// Remove the stored token
    Logout,
    /// Show where the token comes from
    Status,
}

/// Handle an auth command
pub fn handle_auth_command(session: &Session, cmd: AuthCommands) -> FieldSalesResult<()> {
    let store = CredentialStore::new(session.paths.clone());

    match cmd {
        AuthCommands::Login { token } => {
            let token = match token {
                Some(token) => token,
                None => prompt_secret("API token: ")?,
            };
            if token.trim().is_empty() {
                return Err(FieldSalesError::Validation("Token cannot be empty".into()));
            }

            if store.exists() {
                println!("Replacing the stored token.");
            }
            let passphrase = prompt_new_passphrase()?;
            println!("Encrypting token...");
            store.store(&token, &passphrase, &session.settings.api_base_url)?;
            println!(
                "Token saved to {}",
                session.paths.credentials_file().display()
            );
        }

        AuthCommands::Logout => {
            if store.clear()? {
                println!("Stored token removed.");
            } else {
                println!("No stored token.");
            }
        }

        AuthCommands::Status => {
            println!("Backend: {}", session.settings.api_base_url);
            if session.settings.env_token.is_some() {
                println!("Token:   from {}", ENV_TOKEN);
            } else if store.exists() {
                let stored = store.read()?;
                println!(
                    "Token:   stored (saved {})",
                    stored.saved_at.format("%Y-%m-%d %H:%M UTC")
                );
                if !stored.token.is_for(&session.settings.api_base_url) {
                    println!("         issued by {}; log in again to use it here", stored.token.backend);
                }
            } else {
                println!("Token:   none. Run 'fieldsales auth login' or set {}.", ENV_TOKEN);
            }
        }
    }

    Ok(())
}

/// Token for API requests: the environment first, then the encrypted store
pub fn resolve_token(session: &Session) -> FieldSalesResult<Option<String>> {
    if let Some(token) = &session.settings.env_token {
        debug!("using token from environment");
        return Ok(Some(token.clone()));
    }

    let store = CredentialStore::new(session.paths.clone());
    if !store.exists() {
        debug!("no token available, sending unauthenticated requests");
        return Ok(None);
    }

    let backend = &session.settings.api_base_url;
    if !store.read()?.token.is_for(backend) {
        warn!(backend = %backend, "stored token belongs to another backend, sending unauthenticated requests");
        return Ok(None);
    }

    let passphrase = prompt_secret("Passphrase: ")?;
    let token = store.load(&passphrase, backend)?;
    Ok(Some(token.as_str().to_string()))
}

fn prompt_new_passphrase() -> FieldSalesResult<String> {
    loop {
        let pass1 = prompt_secret("New passphrase: ")?;

        if pass1.len() < MIN_PASSPHRASE_LEN {
            println!(
                "Passphrase must be at least {} characters. Please try again.",
                MIN_PASSPHRASE_LEN
            );
            continue;
        }

        let pass2 = prompt_secret("Confirm passphrase: ")?;
        if pass1 != pass2 {
            println!("Passphrases do not match. Please try again.");
            continue;
        }

        return Ok(pass1);
    }
}

fn prompt_secret(prompt: &str) -> FieldSalesResult<String> {
    rpassword::prompt_password(prompt)
        .map_err(|e| FieldSalesError::Auth(format!("Failed to read input: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldSalesPaths, Settings};
    use tempfile::TempDir;

    #[test]
    fn test_env_token_wins() {
        let temp = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.env_token = Some("from-env".into());
        let session = Session::new(
            FieldSalesPaths::with_base_dir(temp.path().to_path_buf()),
            settings,
        );
        assert_eq!(resolve_token(&session).unwrap().as_deref(), Some("from-env"));
    }

    #[test]
    fn test_no_token_is_anonymous() {
        let temp = TempDir::new().unwrap();
        let session = Session::new(
            FieldSalesPaths::with_base_dir(temp.path().to_path_buf()),
            Settings::default(),
        );
        assert_eq!(resolve_token(&session).unwrap(), None);
    }

    #[test]
    fn test_token_for_other_backend_is_not_used() {
        let temp = TempDir::new().unwrap();
        let paths = FieldSalesPaths::with_base_dir(temp.path().to_path_buf());
        CredentialStore::new(paths.clone())
            .store("abc", "passphrase", "https://crm.example.com/api")
            .unwrap();

        // default settings point at localhost, so no passphrase is asked for
        let session = Session::new(paths, Settings::default());
        assert_eq!(resolve_token(&session).unwrap(), None);
    }

    #[test]
    fn test_logout_without_token() {
        let temp = TempDir::new().unwrap();
        let session = Session::new(
            FieldSalesPaths::with_base_dir(temp.path().to_path_buf()),
            Settings::default(),
        );
        assert!(handle_auth_command(&session, AuthCommands::Logout).is_ok());
    }
}
