//! Key-value persistence for the debt list and unlocked achievements.
//!
//! The engine and report never touch storage; callers load debts through a
//! [`DebtBook`] and hand the plain list to the core.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use crate::core::{Debt, Milestone, validate_inputs};
use crate::errors::{Error, Result};

pub const DEBTS_KEY: &str = "debts";
pub const ACHIEVEMENTS_KEY: &str = "achievements";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::Storage("store lock poisoned".to_string()))
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        lock(&self.entries)?.clear();
        Ok(())
    }
}

/// Stores every entry in a single JSON object on disk. A missing file reads as
/// an empty store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                Error::Storage(format!("corrupt store file {:?}: {}", self.path, e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = lock(&self.guard)?;
        let mut entries = self.read_entries()?;
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = lock(&self.guard)?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        self.update(BTreeMap::clear)
    }
}

/// Typed view over a [`KeyValueStore`] for the planner's saved state.
pub struct DebtBook<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> DebtBook<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load_debts(&self) -> Result<Vec<Debt>> {
        match self.store.get(DEBTS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Rejects lists with negative or non-finite amounts.
    pub fn save_debts(&self, debts: &[Debt]) -> Result<()> {
        validate_inputs(debts, 0.0, 1)?;
        self.store.set(DEBTS_KEY, &serde_json::to_string(debts)?)?;
        tracing::info!(count = debts.len(), "saved debt list");
        Ok(())
    }

    pub fn achievements(&self) -> Result<BTreeSet<String>> {
        match self.store.get(ACHIEVEMENTS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(BTreeSet::new()),
        }
    }

    /// Records the given milestones as unlocked and returns the ones that were
    /// not unlocked before.
    pub fn unlock<'m>(&self, milestones: &'m [Milestone]) -> Result<Vec<&'m Milestone>> {
        let mut unlocked = self.achievements()?;
        let fresh: Vec<&Milestone> = milestones
            .iter()
            .filter(|m| unlocked.insert(m.achievement_key()))
            .collect();
        if !fresh.is_empty() {
            self.store
                .set(ACHIEVEMENTS_KEY, &serde_json::to_string(&unlocked)?)?;
            tracing::info!(count = fresh.len(), "unlocked achievements");
        }
        Ok(fresh)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Strategy, milestones, simulate};

    fn sample_debts() -> Vec<Debt> {
        vec![
            Debt::new("card", "Credit card", 4_500.0, 90.0, 22.9),
            Debt::new("medical", "Medical bill", 600.0, 25.0, 0.0),
        ]
    }

    fn exercise_store(store: &dyn KeyValueStore) {
        assert_eq!(store.get("missing").expect("get"), None);
        store.set("a", "1").expect("set");
        store.set("b", "2").expect("set");
        assert_eq!(store.get("a").expect("get").as_deref(), Some("1"));
        store.set("a", "3").expect("overwrite");
        assert_eq!(store.get("a").expect("get").as_deref(), Some("3"));
        store.remove("a").expect("remove");
        assert_eq!(store.get("a").expect("get"), None);
        assert_eq!(store.get("b").expect("get").as_deref(), Some("2"));
        store.clear().expect("clear");
        assert_eq!(store.get("b").expect("get"), None);
    }

    #[test]
    fn memory_store_round_trips_entries() {
        exercise_store(&MemoryStore::new());
    }

    #[test]
    fn file_store_round_trips_entries() {
        let dir = tempfile::tempdir().expect("temp dir");
        exercise_store(&JsonFileStore::new(dir.path().join("nested").join("store.json")));
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("store.json");
        JsonFileStore::new(&path).set("k", "v").expect("set");
        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("k").expect("get").as_deref(), Some("v"));
    }

    #[test]
    fn file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").expect("write");
        let err = JsonFileStore::new(&path).get("k").expect_err("corrupt");
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn debt_book_saves_and_loads_debts() {
        let book = DebtBook::new(MemoryStore::new());
        assert!(book.load_debts().expect("load").is_empty());
        book.save_debts(&sample_debts()).expect("save");
        assert_eq!(book.load_debts().expect("load"), sample_debts());
    }

    #[test]
    fn debt_book_rejects_invalid_debts() {
        let book = DebtBook::new(MemoryStore::new());
        let mut debts = sample_debts();
        debts[1].min_payment = -25.0;
        let err = book.save_debts(&debts).expect_err("invalid");
        assert!(matches!(err, Error::Simulation(_)));
        assert!(book.load_debts().expect("load").is_empty());
    }

    #[test]
    fn unlock_returns_only_new_achievements() {
        let book = DebtBook::new(MemoryStore::new());
        let result = simulate(&sample_debts(), 200.0, Strategy::Snowball, 1200).expect("amortizes");
        let list = milestones(&result);

        let first = book.unlock(&list).expect("unlock");
        assert_eq!(first.len(), list.len());
        let second = book.unlock(&list).expect("unlock");
        assert!(second.is_empty());
        assert!(book.achievements().expect("read").contains("debt-free"));

        book.clear().expect("clear");
        assert!(book.achievements().expect("read").is_empty());
    }
}
