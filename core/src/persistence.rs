//! Durable per-team records.
//!
//! One JSON file per team under `<data-dir>/teams/`, written with a temp
//! file + rename pattern. Where rename-over-existing fails, a `.bak`
//! backup-and-restore fallback avoids data loss; `.bak` leftovers from an
//! interrupted write are recovered when the directory is opened.
//!
//! Reading is deliberately forgiving: a missing record means "fresh team",
//! and a malformed record is logged and treated the same way. Durability
//! corruption must never block the user.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use mision_types::{MissionState, TeamId};

use crate::codec;

const TEAMS_DIR: &str = "teams";
const RECORD_PREFIX: &str = "team-";

/// Platform data directory for the application.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mision")
}

/// Handle to the on-disk store of durable team records.
#[derive(Debug, Clone)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    /// Open a state directory, recovering any interrupted atomic writes.
    ///
    /// The directory itself is created lazily on first save.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let dir = Self { root: root.into() };
        dir.recover_interrupted_writes();
        dir
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn teams_dir(&self) -> PathBuf {
        self.root.join(TEAMS_DIR)
    }

    /// Storage key for one team's durable record.
    #[must_use]
    pub fn record_path(&self, team: TeamId) -> PathBuf {
        self.teams_dir()
            .join(format!("{RECORD_PREFIX}{}.json", team.value()))
    }

    /// Load a team's durable record.
    ///
    /// Returns `None` when no record exists or the record is malformed; the
    /// latter is logged, never surfaced as a failure. A record whose
    /// `teamName` disagrees with the requested team keeps the requested
    /// identity and has its name rewritten to canonical form.
    #[must_use]
    pub fn load(&self, team: TeamId) -> Option<MissionState> {
        let path = self.record_path(team);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to read durable record: {e}");
                return None;
            }
        };

        match codec::deserialize(&text) {
            Ok(mut import) => {
                if import.team != team {
                    tracing::warn!(
                        path = %path.display(),
                        "Durable record names {}, expected {}; keeping the requested team",
                        import.state.team_name,
                        team.team_name(),
                    );
                    import.state.team_name = team.team_name();
                }
                Some(import.state)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "Durable record is malformed, starting from a fresh template: {e}"
                );
                None
            }
        }
    }

    /// Persist a team's record, creating the directory tree as needed.
    pub fn save(&self, team: TeamId, state: &MissionState) -> io::Result<()> {
        fs::create_dir_all(self.teams_dir())?;
        let text = codec::serialize(state);
        atomic_write(&self.record_path(team), text.as_bytes())
    }

    /// Erase a team's durable record entirely. Missing records are fine.
    pub fn remove(&self, team: TeamId) -> io::Result<()> {
        let path = self.record_path(team);
        let _ = fs::remove_file(path.with_extension("bak"));
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Restore `.bak` files left behind by a crash during the backup-rename
    /// window in [`atomic_write`].
    fn recover_interrupted_writes(&self) {
        let Ok(entries) = fs::read_dir(self.teams_dir()) else {
            return;
        };
        for entry in entries.flatten() {
            let backup = entry.path();
            if backup.extension().is_some_and(|ext| ext == "bak") {
                let canonical = backup.with_extension("json");
                if canonical.exists() {
                    continue;
                }
                match fs::rename(&backup, &canonical) {
                    Ok(()) => {
                        tracing::warn!(
                            path = %canonical.display(),
                            "Recovered .bak file from interrupted atomic write"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %backup.display(),
                            "Failed to recover .bak file: {e}"
                        );
                    }
                }
            }
        }
    }
}

/// Write `bytes` to `path` atomically via temp file + rename.
///
/// On platforms where rename-over-existing fails, falls back to renaming the
/// existing file to `.bak`, persisting, then removing the backup.
fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    if let Err(err) = tmp.persist(path) {
        if path.exists() {
            let backup = path.with_extension("bak");
            let _ = fs::remove_file(&backup);
            fs::rename(path, &backup)?;

            if let Err(rename_err) = err.file.persist(path) {
                let _ = fs::rename(&backup, path);
                return Err(rename_err.error);
            }
            if let Err(e) = fs::remove_file(&backup) {
                tracing::warn!(
                    path = %backup.display(),
                    "Failed to remove .bak after atomic write: {e}"
                );
            }
        } else {
            return Err(err.error);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::StateDir;
    use mision_types::{MissionState, TeamId};
    use std::fs;

    fn team(n: u32) -> TeamId {
        TeamId::new(n).unwrap()
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = StateDir::open(dir.path());

        let mut state = MissionState::fresh(team(3));
        state.hypothesis = "El agua se pierde por fugas".to_string();
        store.save(team(3), &state).expect("save");

        assert_eq!(store.load(team(3)), Some(state));
    }

    #[test]
    fn load_missing_record_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = StateDir::open(dir.path());
        assert_eq!(store.load(team(1)), None);
    }

    #[test]
    fn load_malformed_record_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = StateDir::open(dir.path());
        fs::create_dir_all(dir.path().join("teams")).unwrap();
        fs::write(store.record_path(team(2)), "{ not json").unwrap();
        assert_eq!(store.load(team(2)), None);
    }

    #[test]
    fn load_rewrites_mismatched_team_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = StateDir::open(dir.path());

        let state = MissionState::fresh(team(9));
        store.save(team(9), &state).expect("save");
        // Simulate a record copied into the wrong slot.
        fs::rename(store.record_path(team(9)), store.record_path(team(4))).unwrap();

        let loaded = store.load(team(4)).expect("load");
        assert_eq!(loaded.team_name, "Equipo 4");
    }

    #[test]
    fn remove_erases_the_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = StateDir::open(dir.path());

        store
            .save(team(5), &MissionState::fresh(team(5)))
            .expect("save");
        store.remove(team(5)).expect("remove");
        assert_eq!(store.load(team(5)), None);
        // Removing again is a no-op.
        store.remove(team(5)).expect("remove twice");
    }

    #[test]
    fn open_recovers_bak_leftover() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = StateDir::open(dir.path());
            store
                .save(team(7), &MissionState::fresh(team(7)))
                .expect("save");
            // Simulate a crash between backup-rename and persist.
            fs::rename(
                store.record_path(team(7)),
                store.record_path(team(7)).with_extension("bak"),
            )
            .unwrap();
        }

        let store = StateDir::open(dir.path());
        assert!(store.load(team(7)).is_some());
        assert!(!store.record_path(team(7)).with_extension("bak").exists());
    }
}
