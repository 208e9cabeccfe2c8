//! # History store
//!
//! Run-over-run state under `~/.gh-traffic/<user>/<repo>/`:
//!
//! - `star_history.json`: one `{timestamp, count}` record per UTC day,
//!   used for the stars delta on the summary line.
//! - `stargazers.txt`: login-per-line snapshot from the previous run; the
//!   old snapshot is kept as `stargazers_prior.txt` when overwritten.
//!
//! All writes are atomic (write `.tmp`, then `rename()`) for crash safety.
//! The store is rooted at an explicit directory so tests can run in a
//! scratch dir.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

const STAR_HISTORY_FILE: &str = "star_history.json";
const STARGAZERS_FILE: &str = "stargazers.txt";
const STARGAZERS_PRIOR_FILE: &str = "stargazers_prior.txt";

/// One recorded star count.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StarRecord {
    pub timestamp: DateTime<Utc>,
    pub count: u64,
}

/// Per-repository history directory.
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Opens (and creates) `~/.gh-traffic/<user>/<repo>/`.
    pub fn open(user: &str, repo: &str) -> io::Result<HistoryStore> {
        let home = dirs::home_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?;
        HistoryStore::at(home.join(".gh-traffic").join(user).join(repo))
    }

    /// Opens a store rooted at an explicit directory.
    pub fn at(dir: PathBuf) -> io::Result<HistoryStore> {
        fs::create_dir_all(&dir)?;
        Ok(HistoryStore { dir })
    }

    /// The most recent recorded star count, if any.
    pub fn last_star_count(&self) -> io::Result<Option<u64>> {
        Ok(self.load_star_history()?.last().map(|r| r.count))
    }

    /// Records today's star count, maintaining one record per UTC day:
    /// a same-day run replaces today's record, a new day appends. A
    /// recorded timestamp later than `now` means the clock went backwards
    /// and is an error.
    pub fn record_star_count(&self, now: DateTime<Utc>, count: u64) -> io::Result<()> {
        let mut history = self.load_star_history()?;
        match history.last_mut() {
            Some(last) if last.timestamp.date_naive() == now.date_naive() => {
                last.timestamp = now;
                last.count = count;
            }
            Some(last) if last.timestamp > now => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "current timestamp predates last recorded star count: \
                         now '{now}', last '{}'",
                        last.timestamp
                    ),
                ));
            }
            _ => history.push(StarRecord {
                timestamp: now,
                count,
            }),
        }
        atomic_write(&self.dir.join(STAR_HISTORY_FILE), &to_json(&history)?)
    }

    /// All recorded star counts, oldest first. A missing file is an empty
    /// history. A malformed one is an `InvalidData` error: treating it as
    /// empty would let the next record atomically overwrite every prior
    /// entry.
    pub fn load_star_history(&self) -> io::Result<Vec<StarRecord>> {
        let path = self.dir.join(STAR_HISTORY_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path)?;
        serde_json::from_str(&contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("malformed star history at {}: {e}", path.display()),
            )
        })
    }

    /// The stargazer snapshot from the previous run, or `None` on the
    /// first run.
    pub fn load_stargazers(&self) -> io::Result<Option<Vec<String>>> {
        let path = self.dir.join(STARGAZERS_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        Ok(Some(contents.lines().map(str::to_string).collect()))
    }

    /// Replaces the stargazer snapshot, preserving the old one as
    /// `stargazers_prior.txt`.
    pub fn save_stargazers(&self, gazers: &[String]) -> io::Result<()> {
        let path = self.dir.join(STARGAZERS_FILE);
        if path.exists() {
            fs::copy(&path, self.dir.join(STARGAZERS_PRIOR_FILE))?;
        }
        let mut contents = gazers.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        debug!("saving {} stargazers to {}", gazers.len(), path.display());
        atomic_write(&path, &contents)
    }
}

fn to_json<T: Serialize>(data: &T) -> io::Result<String> {
    serde_json::to_string_pretty(data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write via `.tmp` + rename so a crash never leaves a torn file.
fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scratch_store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::at(dir.path().join("u").join("r")).unwrap();
        (dir, store)
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn empty_store_has_no_history() {
        let (_dir, store) = scratch_store();
        assert_eq!(store.last_star_count().unwrap(), None);
        assert_eq!(store.load_stargazers().unwrap(), None);
    }

    #[test]
    fn record_then_read_back() {
        let (_dir, store) = scratch_store();
        store.record_star_count(at(2026, 8, 22, 10), 41).unwrap();
        assert_eq!(store.last_star_count().unwrap(), Some(41));
    }

    #[test]
    fn same_day_run_replaces_todays_record() {
        let (_dir, store) = scratch_store();
        store.record_star_count(at(2026, 8, 22, 10), 41).unwrap();
        store.record_star_count(at(2026, 8, 22, 15), 43).unwrap();
        let history = store.load_star_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].count, 43);
        assert_eq!(history[0].timestamp, at(2026, 8, 22, 15));
    }

    #[test]
    fn new_day_appends_a_record() {
        let (_dir, store) = scratch_store();
        store.record_star_count(at(2026, 8, 21, 10), 41).unwrap();
        store.record_star_count(at(2026, 8, 22, 10), 44).unwrap();
        let history = store.load_star_history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].count, 44);
    }

    #[test]
    fn clock_going_backwards_is_an_error() {
        let (_dir, store) = scratch_store();
        store.record_star_count(at(2026, 8, 22, 10), 41).unwrap();
        let err = store.record_star_count(at(2026, 8, 21, 10), 40).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn malformed_history_is_an_error_and_never_clobbered() {
        let (_dir, store) = scratch_store();
        let path = store.dir.join(STAR_HISTORY_FILE);
        fs::write(&path, "not json").unwrap();

        let err = store.load_star_history().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        // Recording fails too, leaving the file byte-for-byte intact.
        assert!(store.record_star_count(at(2026, 8, 22, 10), 41).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn stargazers_round_trip() {
        let (_dir, store) = scratch_store();
        let gazers = vec!["alice".to_string(), "bob".to_string()];
        store.save_stargazers(&gazers).unwrap();
        assert_eq!(store.load_stargazers().unwrap(), Some(gazers));
    }

    #[test]
    fn saving_preserves_prior_snapshot() {
        let (_dir, store) = scratch_store();
        store.save_stargazers(&["alice".to_string()]).unwrap();
        store
            .save_stargazers(&["alice".to_string(), "bob".to_string()])
            .unwrap();
        let prior = fs::read_to_string(store.dir.join(STARGAZERS_PRIOR_FILE)).unwrap();
        assert_eq!(prior, "alice\n");
    }
}
