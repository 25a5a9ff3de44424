//! Session persistence for the CLI.
//!
//! The session file holds `auth_token`, `auth_email` and `auth_name`. It
//! defaults to `$SVCDESK_SESSION_FILE`, then
//! `$XDG_CONFIG_HOME/svcdesk/session.json`, then
//! `$HOME/.config/svcdesk/session.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use svcdesk_client::auth::Session;
use svcdesk_client::storage::{SessionStore, StorageKey};
use svcdesk_client::BearerToken;

/// Resolve the default session file location.
pub fn default_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("SVCDESK_SESSION_FILE").filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .context("cannot locate a config directory; pass --session-file")?;
    Ok(config_dir.join("svcdesk").join("session.json"))
}

/// Persist a freshly signed-in session.
pub fn save(store: &dyn SessionStore, session: &Session) -> Result<()> {
    store.set(StorageKey::Token.as_str(), session.token.as_str())?;
    store.set(StorageKey::Email.as_str(), &session.email)?;
    match &session.name {
        Some(name) => store.set(StorageKey::Name.as_str(), name)?,
        None => store.remove(StorageKey::Name.as_str())?,
    }
    Ok(())
}

/// The stored bearer token, if any.
pub fn load_token(store: &dyn SessionStore) -> Result<Option<BearerToken>> {
    Ok(store
        .get(StorageKey::Token.as_str())?
        .filter(|t| !t.is_empty())
        .map(BearerToken::new))
}

/// Signed-in email and display name, if stored.
pub fn identity(store: &dyn SessionStore) -> Result<(Option<String>, Option<String>)> {
    Ok((
        store.get(StorageKey::Email.as_str())?,
        store.get(StorageKey::Name.as_str())?,
    ))
}

/// Remove every session key.
pub fn clear(store: &dyn SessionStore) -> Result<()> {
    for key in StorageKey::ALL {
        store.remove(key.as_str())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use svcdesk_client::storage::FileStore;

    fn session(name: Option<&str>) -> Session {
        Session {
            token: BearerToken::new("tok"),
            email: "me@example.ge".into(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn save_then_load_round_trips_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("session.json"));

        save(&store, &session(Some("Me"))).unwrap();

        assert_eq!(load_token(&store).unwrap().unwrap().as_str(), "tok");
        assert_eq!(
            identity(&store).unwrap(),
            (Some("me@example.ge".into()), Some("Me".into()))
        );
    }

    #[test]
    fn saving_without_name_drops_stale_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));

        save(&store, &session(Some("Old"))).unwrap();
        save(&store, &session(None)).unwrap();

        assert_eq!(identity(&store).unwrap().1, None);
    }

    #[test]
    fn clear_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));

        save(&store, &session(Some("Me"))).unwrap();
        clear(&store).unwrap();

        assert!(load_token(&store).unwrap().is_none());
        assert_eq!(identity(&store).unwrap(), (None, None));
    }
}
