//! Session manager — the single unlocked vault of this process.
//!
//! The session owns the in-memory `Vault` and the master password, guards
//! both with one lock, and moves vault contents across the process
//! boundary only through the handoff file:
//!
//! ```text
//! unlock: engine(unlock) -> handoff -> memory
//! add / delete: memory -> handoff
//! save:   memory -> handoff -> engine(sync)
//! logout: drop memory, scrub handoff
//! ```
//!
//! Every operation holds the lock for its whole duration, engine calls
//! included, so at most one engine process runs at a time.

use std::path::Path;

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::engine::{EngineClient, EngineTransport, ProcessTransport};
use crate::errors::{PasslockError, Result};
use crate::handoff::HandoffStore;
use crate::password::{self, StrengthReport};
use crate::vault::{Entry, NewEntry, Vault, VaultFile, VaultInfo};

/// Locked/unlocked state machine.
enum SessionState {
    Locked,
    Unlocked {
        vault: Vault,
        credential: Zeroizing<String>,
    },
}

/// The one session of this process.  Starts `Locked`.
///
/// Dropping the session scrubs the handoff file.
pub struct SessionManager {
    engine: EngineClient,
    handoff: HandoffStore,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(engine: EngineClient, handoff: HandoffStore) -> Self {
        Self {
            engine,
            handoff,
            state: Mutex::new(SessionState::Locked),
        }
    }

    /// Build a session for `dir` that talks to `transport`.
    pub fn with_transport(
        dir: &Path,
        settings: &Settings,
        transport: Box<dyn EngineTransport>,
    ) -> Self {
        let engine = EngineClient::new(transport, VaultFile::new(settings.vault_path(dir)));
        Self::new(engine, HandoffStore::new(settings.handoff_path(dir)))
    }

    /// Build a session for `dir` that spawns the configured engine program.
    pub fn open_dir(dir: &Path, settings: &Settings) -> Result<Self> {
        let program = settings.engine_program()?;
        debug!(engine = %program.display(), dir = %dir.display(), "session configured");
        Ok(Self::with_transport(
            dir,
            settings,
            Box::new(ProcessTransport::new(program, dir)),
        ))
    }

    // ------------------------------------------------------------------
    // Always available
    // ------------------------------------------------------------------

    /// Is there an on-disk vault?
    pub fn check_exists(&self) -> bool {
        self.engine.vault_file().exists()
    }

    /// Salt and ciphertext size of the on-disk vault, without unlocking.
    pub fn vault_info(&self) -> Result<VaultInfo> {
        self.engine.vault_file().info()
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(*self.state.lock(), SessionState::Unlocked { .. })
    }

    /// Have the engine create a new vault.  Does not unlock it.
    pub fn create_vault(&self, password: &str, confirmation: &str) -> Result<()> {
        let _guard = self.state.lock();
        let created = self.engine.create(password, confirmation);
        // Engines may leave a handoff behind; this session did not ask for one.
        self.handoff.scrub();
        created
    }

    /// Unlock the on-disk vault with `candidate`.
    pub fn unlock(&self, candidate: &str) -> Result<()> {
        let mut state = self.state.lock();

        if matches!(*state, SessionState::Unlocked { .. }) {
            return Err(PasslockError::InvalidInput(
                "session is already unlocked; log out first".into(),
            ));
        }
        if !self.check_exists() {
            return Err(PasslockError::VaultMissing);
        }

        // A snapshot left by a crashed session must not be mistaken for
        // the engine's output.
        self.handoff.scrub();

        let response = self.engine.unlock(candidate)?;
        if !response.success {
            warn!("unlock rejected by vault engine");
            return Err(PasslockError::WrongCredential);
        }

        let vault = match self.handoff.read() {
            Ok(vault) => vault,
            Err(e) => {
                self.handoff.scrub();
                return Err(e);
            }
        };

        info!(entries = vault.entries.len(), "session unlocked");
        *state = SessionState::Unlocked {
            vault,
            credential: Zeroizing::new(candidate.to_string()),
        };
        Ok(())
    }

    /// Drop the vault and the master password.  Idempotent.
    pub fn logout(&self) {
        let mut state = self.state.lock();
        if matches!(*state, SessionState::Unlocked { .. }) {
            info!("session locked");
        }
        *state = SessionState::Locked;
        self.handoff.scrub();
    }

    // ------------------------------------------------------------------
    // Require an unlocked session
    // ------------------------------------------------------------------

    /// All entries in stored order.
    pub fn list(&self) -> Result<Vec<Entry>> {
        self.with_vault(|vault| Ok(vault.entries.clone()))
    }

    /// Entries carrying `tag`; empty tag returns everything.
    pub fn filter_by_tag(&self, tag: &str) -> Result<Vec<Entry>> {
        self.with_vault(|vault| Ok(vault.filter_by_tag(tag)))
    }

    /// Entries whose name, username, or url contain `query`, ignoring case.
    pub fn search(&self, query: &str) -> Result<Vec<Entry>> {
        self.with_vault(|vault| Ok(vault.search(query)))
    }

    /// Look up one entry by id.
    pub fn get(&self, id: &str) -> Result<Entry> {
        self.with_vault(|vault| {
            vault
                .get(id)
                .cloned()
                .ok_or_else(|| PasslockError::NotFound(id.to_string()))
        })
    }

    /// Append a new entry and mirror the vault into the handoff file.
    pub fn add(&self, fields: &NewEntry) -> Result<Entry> {
        let mut state = self.state.lock();
        let SessionState::Unlocked { vault, .. } = &mut *state else {
            return Err(PasslockError::NotUnlocked);
        };

        // Memory changes only once the mirror is on disk.
        let mut next = vault.clone();
        let entry = next.insert(fields)?;
        self.handoff.write(&next)?;
        *vault = next;
        info!(id = %entry.id, "entry added");
        Ok(entry)
    }

    /// Remove the entry with `id`; `NotFound` if there is none.
    pub fn delete(&self, id: &str) -> Result<Entry> {
        let mut state = self.state.lock();
        let SessionState::Unlocked { vault, .. } = &mut *state else {
            return Err(PasslockError::NotUnlocked);
        };

        let mut next = vault.clone();
        let removed = next.remove(id)?;
        self.handoff.write(&next)?;
        *vault = next;
        info!(id = %removed.id, "entry deleted");
        Ok(removed)
    }

    /// Persist the in-memory vault through the engine.
    ///
    /// On failure the in-memory vault is kept as is; retry or log out.
    pub fn save(&self) -> Result<()> {
        let state = self.state.lock();
        let SessionState::Unlocked { vault, credential } = &*state else {
            return Err(PasslockError::NotUnlocked);
        };

        self.handoff.write(vault)?;
        let response = self.engine.sync(credential)?;
        if !response.success {
            warn!("vault engine failed to persist the vault");
            return Err(PasslockError::PersistFailed(response.diagnostic));
        }

        info!(entries = vault.entries.len(), "vault saved");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stateless helpers exposed on the session API
    // ------------------------------------------------------------------

    pub fn score_strength(&self, password: &str) -> StrengthReport {
        password::score(password)
    }

    pub fn generate_password(&self, length: Option<i64>) -> String {
        password::generate(length)
    }

    fn with_vault<T>(&self, f: impl FnOnce(&Vault) -> Result<T>) -> Result<T> {
        let state = self.state.lock();
        match &*state {
            SessionState::Unlocked { vault, .. } => f(vault),
            SessionState::Locked => Err(PasslockError::NotUnlocked),
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.handoff.scrub();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineRequest, EngineResponse};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// An engine that keeps the "encrypted" vault as plain JSON and
    /// accepts exactly one password.  `fail_sync` simulates a broken disk.
    struct FakeEngine {
        dir: std::path::PathBuf,
        password: String,
        fail_sync: Arc<Mutex<bool>>,
    }

    impl FakeEngine {
        fn store(&self) -> HandoffStore {
            HandoffStore::new(self.dir.join(".passlock.handoff"))
        }
        fn vault(&self) -> std::path::PathBuf {
            self.dir.join(".passlock.vault")
        }
    }

    impl EngineTransport for FakeEngine {
        fn invoke(&self, request: &EngineRequest<'_>) -> Result<EngineResponse> {
            match *request {
                EngineRequest::Create { .. } => {
                    let json = serde_json::to_string(&Vault::new("c2FsdA==".into())).unwrap();
                    std::fs::write(self.vault(), format!("c2FsdA==:{json}"))?;
                    Ok(EngineResponse::ok())
                }
                EngineRequest::Unlock { password } => {
                    if password != self.password {
                        return Ok(EngineResponse::failed("Error: decryption failed"));
                    }
                    let data = std::fs::read_to_string(self.vault())?;
                    let (_, json) = data.split_once(':').unwrap();
                    std::fs::write(self.store().path(), json)?;
                    Ok(EngineResponse::ok())
                }
                EngineRequest::Sync { password } => {
                    if *self.fail_sync.lock() || password != self.password {
                        return Ok(EngineResponse::failed("Error: disk full"));
                    }
                    let json = std::fs::read_to_string(self.store().path())?;
                    std::fs::write(self.vault(), format!("c2FsdA==:{json}"))?;
                    Ok(EngineResponse::ok())
                }
            }
        }
    }

    fn session(dir: &TempDir) -> (SessionManager, Arc<Mutex<bool>>) {
        let fail_sync = Arc::new(Mutex::new(false));
        let engine = FakeEngine {
            dir: dir.path().to_path_buf(),
            password: "correct".into(),
            fail_sync: Arc::clone(&fail_sync),
        };
        let session =
            SessionManager::with_transport(dir.path(), &Settings::default(), Box::new(engine));
        (session, fail_sync)
    }

    fn unlocked(dir: &TempDir) -> (SessionManager, Arc<Mutex<bool>>) {
        let (session, fail) = session(dir);
        session.create_vault("correct", "correct").unwrap();
        session.unlock("correct").unwrap();
        (session, fail)
    }

    #[test]
    fn locked_session_rejects_vault_operations() {
        let dir = TempDir::new().unwrap();
        let (session, _) = session(&dir);
        assert!(!session.is_unlocked());
        assert!(matches!(session.list(), Err(PasslockError::NotUnlocked)));
        assert!(matches!(session.search("x"), Err(PasslockError::NotUnlocked)));
        assert!(matches!(session.filter_by_tag("x"), Err(PasslockError::NotUnlocked)));
        assert!(matches!(session.get("x"), Err(PasslockError::NotUnlocked)));
        assert!(matches!(
            session.add(&NewEntry::new("a", "b", "c")),
            Err(PasslockError::NotUnlocked)
        ));
        assert!(matches!(session.delete("x"), Err(PasslockError::NotUnlocked)));
        assert!(matches!(session.save(), Err(PasslockError::NotUnlocked)));
    }

    #[test]
    fn unlock_without_vault_is_vault_missing() {
        let dir = TempDir::new().unwrap();
        let (session, _) = session(&dir);
        assert!(!session.check_exists());
        assert!(matches!(session.unlock("correct"), Err(PasslockError::VaultMissing)));
    }

    #[test]
    fn wrong_password_stays_locked() {
        let dir = TempDir::new().unwrap();
        let (session, _) = session(&dir);
        session.create_vault("correct", "correct").unwrap();

        assert!(matches!(session.unlock("wrong"), Err(PasslockError::WrongCredential)));
        assert!(!session.is_unlocked());
        assert!(matches!(session.list(), Err(PasslockError::NotUnlocked)));
    }

    #[test]
    fn unlock_twice_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (session, _) = unlocked(&dir);
        assert!(matches!(
            session.unlock("correct"),
            Err(PasslockError::InvalidInput(_))
        ));
        assert!(session.is_unlocked());
    }

    #[test]
    fn add_mirrors_into_handoff() {
        let dir = TempDir::new().unwrap();
        let (session, _) = unlocked(&dir);

        let entry = session.add(&NewEntry::new("gh", "bob", "pw1")).unwrap();
        let mirrored = session.handoff.read().unwrap();
        assert_eq!(mirrored.entries.len(), 1);
        assert_eq!(mirrored.entries[0].id, entry.id);
    }

    #[test]
    fn add_rejects_empty_fields_without_touching_vault() {
        let dir = TempDir::new().unwrap();
        let (session, _) = unlocked(&dir);
        assert!(matches!(
            session.add(&NewEntry::new("gh", "", "pw1")),
            Err(PasslockError::InvalidInput(_))
        ));
        assert!(session.list().unwrap().is_empty());
    }

    /// Turn the handoff path into a non-empty directory so writes fail.
    fn block_handoff(session: &SessionManager) {
        let path = session.handoff.path().to_path_buf();
        session.handoff.scrub();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("blocker"), "x").unwrap();
    }

    #[test]
    fn failed_mirror_write_leaves_vault_unchanged() {
        let dir = TempDir::new().unwrap();
        let (session, _) = unlocked(&dir);
        let kept = session.add(&NewEntry::new("gh", "bob", "pw1")).unwrap();
        block_handoff(&session);

        assert!(session.add(&NewEntry::new("mail", "ann", "pw2")).is_err());
        assert!(session.delete(&kept.id).is_err());

        let entries = session.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, kept.id);
        assert!(!crate::vault::file::temp_path(session.handoff.path()).exists());
    }

    #[test]
    fn failed_add_is_not_persisted_by_a_later_save() {
        let dir = TempDir::new().unwrap();
        let (session, _) = unlocked(&dir);
        block_handoff(&session);
        assert!(session.add(&NewEntry::new("mail", "ann", "pw2")).is_err());

        std::fs::remove_dir_all(session.handoff.path()).unwrap();
        session.save().unwrap();
        session.logout();

        session.unlock("correct").unwrap();
        assert!(session.list().unwrap().is_empty());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let (session, _) = unlocked(&dir);
        session.add(&NewEntry::new("gh", "bob", "pw1")).unwrap();
        assert!(matches!(session.delete("missing"), Err(PasslockError::NotFound(_))));
        assert_eq!(session.list().unwrap().len(), 1);
    }

    #[test]
    fn failed_save_keeps_in_memory_changes() {
        let dir = TempDir::new().unwrap();
        let (session, fail_sync) = unlocked(&dir);
        session.add(&NewEntry::new("gh", "bob", "pw1")).unwrap();

        *fail_sync.lock() = true;
        match session.save() {
            Err(PasslockError::PersistFailed(detail)) => assert!(detail.contains("disk full")),
            other => panic!("expected PersistFailed, got {other:?}"),
        }
        assert_eq!(session.list().unwrap().len(), 1);

        *fail_sync.lock() = false;
        session.save().unwrap();
    }

    #[test]
    fn logout_scrubs_handoff_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let (session, _) = unlocked(&dir);
        assert!(session.handoff.exists());

        session.logout();
        assert!(!session.is_unlocked());
        assert!(!session.handoff.exists());
        session.logout();
        assert!(matches!(session.list(), Err(PasslockError::NotUnlocked)));
    }

    #[test]
    fn unlock_ignores_stale_handoff_from_a_crash() {
        let dir = TempDir::new().unwrap();
        let (session, _) = session(&dir);
        session.create_vault("correct", "correct").unwrap();

        let mut stale = Vault::new("c2FsdA==".into());
        stale.insert(&NewEntry::new("ghost", "x", "y")).unwrap();
        session.handoff.write(&stale).unwrap();

        assert!(session.unlock("wrong").is_err());
        assert!(!session.handoff.exists());
        session.unlock("correct").unwrap();
        assert!(session.list().unwrap().is_empty());
    }

    #[test]
    fn corrupt_handoff_after_unlock_is_reported() {
        struct Garbage;
        impl EngineTransport for Garbage {
            fn invoke(&self, _: &EngineRequest<'_>) -> Result<EngineResponse> {
                Ok(EngineResponse::ok())
            }
        }

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".passlock.vault"), "s:c").unwrap();
        let session =
            SessionManager::with_transport(dir.path(), &Settings::default(), Box::new(Garbage));

        assert!(matches!(session.unlock("pw"), Err(PasslockError::HandoffUnavailable)));

        struct WritesGarbage(std::path::PathBuf);
        impl EngineTransport for WritesGarbage {
            fn invoke(&self, _: &EngineRequest<'_>) -> Result<EngineResponse> {
                std::fs::write(&self.0, "not json")?;
                Ok(EngineResponse::ok())
            }
        }
        let session = SessionManager::with_transport(
            dir.path(),
            &Settings::default(),
            Box::new(WritesGarbage(dir.path().join(".passlock.handoff"))),
        );
        assert!(matches!(session.unlock("pw"), Err(PasslockError::HandoffCorrupt(_))));
        assert!(!session.is_unlocked());
    }

    #[test]
    fn drop_scrubs_handoff() {
        let dir = TempDir::new().unwrap();
        let handoff = dir.path().join(".passlock.handoff");
        {
            let (session, _) = unlocked(&dir);
            session.add(&NewEntry::new("gh", "bob", "pw1")).unwrap();
            assert!(handoff.exists());
        }
        assert!(!handoff.exists());
    }

    #[test]
    fn session_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<SessionManager>();

        let dir = TempDir::new().unwrap();
        let (session, _) = unlocked(&dir);
        let session = Arc::new(session);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = Arc::clone(&session);
                std::thread::spawn(move || {
                    s.add(&NewEntry::new(&format!("site{i}"), "u", "p")).unwrap()
                })
            })
            .collect();
        let ids: std::collections::HashSet<String> =
            handles.into_iter().map(|h| h.join().unwrap().id.clone()).collect();

        assert_eq!(ids.len(), 8);
        assert_eq!(session.list().unwrap().len(), 8);
        assert_eq!(session.handoff.read().unwrap().entries.len(), 8);
    }
}
