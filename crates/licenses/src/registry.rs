use std::collections::{BTreeMap, BTreeSet};

use {
    keyward_common::{ActorId, RoleId},
    keyward_config::{
        ConfigStore, LicenseEntry, LicensesTable, UsedKeysTable,
        store::{LICENSES, USED_KEYS},
    },
    tokio::sync::Mutex,
    tracing::{debug, info, warn},
};

use crate::{Error, Result};

/// A license key and the role it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    pub key: String,
    pub role_id: RoleId,
}

/// A key that was just consumed. The caller is responsible for granting
/// `role_id`; the key stays consumed whether or not that succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub key: String,
    pub role_id: RoleId,
}

#[derive(Debug, Default)]
struct RegistryState {
    licenses: BTreeMap<String, RoleId>,
    redeemed: BTreeSet<String>,
}

impl RegistryState {
    fn load(store: &ConfigStore) -> Self {
        let table: LicensesTable = store.load_table(LICENSES);
        let mut licenses = BTreeMap::new();
        for entry in table.keys {
            if let Some(previous) = licenses.insert(entry.key.clone(), entry.role_id) {
                warn!(
                    key = %entry.key,
                    dropped_role_id = %previous,
                    "duplicate license key in table, keeping the last entry"
                );
            }
        }

        let used: UsedKeysTable = store.load_table(USED_KEYS);
        let redeemed: BTreeSet<String> = used.keys.into_iter().collect();

        Self { licenses, redeemed }
    }

    fn licenses_table(&self) -> LicensesTable {
        LicensesTable {
            keys: self
                .licenses
                .iter()
                .map(|(key, role_id)| LicenseEntry {
                    key: key.clone(),
                    role_id: role_id.clone(),
                })
                .collect(),
        }
    }

    fn used_keys_table(&self) -> UsedKeysTable {
        UsedKeysTable {
            keys: self.redeemed.iter().cloned().collect(),
        }
    }
}

/// License table plus the set of consumed keys.
///
/// Every operation runs under one lock and persists before it returns, so
/// two concurrent redemptions of the same key cannot both succeed. A failed
/// write is rolled back in memory and reported as [`Error::Storage`].
#[derive(Debug)]
pub struct LicenseRegistry {
    store: ConfigStore,
    state: Mutex<RegistryState>,
}

impl LicenseRegistry {
    /// Load both tables from `store`.
    pub fn load(store: ConfigStore) -> Self {
        let state = RegistryState::load(&store);
        info!(
            licenses = state.licenses.len(),
            redeemed = state.redeemed.len(),
            "license registry loaded"
        );
        Self {
            store,
            state: Mutex::new(state),
        }
    }

    /// Re-read both tables, discarding the in-memory copy.
    pub async fn reload(&self) {
        let mut state = self.state.lock().await;
        *state = RegistryState::load(&self.store);
        info!(
            licenses = state.licenses.len(),
            redeemed = state.redeemed.len(),
            "license registry reloaded"
        );
    }

    pub async fn add(&self, key: &str, role_id: RoleId) -> Result<License> {
        let mut state = self.state.lock().await;
        if state.licenses.contains_key(key) {
            return Err(Error::already_exists(key));
        }

        state.licenses.insert(key.to_string(), role_id.clone());
        if let Err(e) = self.store.save_table(LICENSES, &state.licenses_table()) {
            state.licenses.remove(key);
            return Err(e.into());
        }

        info!(key, role_id = %role_id, "license added");
        Ok(License {
            key: key.to_string(),
            role_id,
        })
    }

    /// Remove a key from the license table. Its redemption record, if any,
    /// is kept, so re-adding the same key later leaves it already redeemed.
    pub async fn remove(&self, key: &str) -> Result<License> {
        let mut state = self.state.lock().await;
        let Some(role_id) = state.licenses.remove(key) else {
            return Err(Error::not_found(key));
        };

        if let Err(e) = self.store.save_table(LICENSES, &state.licenses_table()) {
            state.licenses.insert(key.to_string(), role_id);
            return Err(e.into());
        }

        info!(key, role_id = %role_id, "license removed");
        Ok(License {
            key: key.to_string(),
            role_id,
        })
    }

    /// Consume `key`.
    pub async fn redeem(&self, key: &str, actor: &ActorId) -> Result<Redemption> {
        let mut state = self.state.lock().await;
        let Some(role_id) = state.licenses.get(key).cloned() else {
            debug!(key, actor = %actor, "redeem of unknown key");
            return Err(Error::unknown_key(key));
        };
        if state.redeemed.contains(key) {
            debug!(key, actor = %actor, "redeem of consumed key");
            return Err(Error::already_redeemed(key));
        }

        state.redeemed.insert(key.to_string());
        if let Err(e) = self.store.save_table(USED_KEYS, &state.used_keys_table()) {
            state.redeemed.remove(key);
            return Err(e.into());
        }

        info!(key, actor = %actor, role_id = %role_id, "license redeemed");
        Ok(Redemption {
            key: key.to_string(),
            role_id,
        })
    }

    pub async fn get(&self, key: &str) -> Option<License> {
        let state = self.state.lock().await;
        state.licenses.get(key).map(|role_id| License {
            key: key.to_string(),
            role_id: role_id.clone(),
        })
    }

    /// All licenses, ordered by key.
    pub async fn list(&self) -> Vec<License> {
        let state = self.state.lock().await;
        state
            .licenses
            .iter()
            .map(|(key, role_id)| License {
                key: key.clone(),
                role_id: role_id.clone(),
            })
            .collect()
    }

    pub async fn is_redeemed(&self, key: &str) -> bool {
        self.state.lock().await.redeemed.contains(key)
    }

    pub async fn redeemed_count(&self) -> usize {
        self.state.lock().await.redeemed.len()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;

    fn temp_registry() -> (tempfile::TempDir, LicenseRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let registry = LicenseRegistry::load(ConfigStore::new(dir.path()));
        (dir, registry)
    }

    fn actor() -> ActorId {
        ActorId::new("1001")
    }

    #[rstest]
    #[case("10")]
    #[case("99")]
    #[tokio::test]
    async fn add_twice_fails_regardless_of_role(#[case] second_role: &str) {
        let (_dir, registry) = temp_registry();
        registry.add("ABC", RoleId::new("10")).await.unwrap();

        let err = registry
            .add("ABC", RoleId::new(second_role))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { ref key } if key == "ABC"));
        assert_eq!(
            registry.get("ABC").await.unwrap().role_id,
            RoleId::new("10")
        );
    }

    #[tokio::test]
    async fn keys_are_case_sensitive() {
        let (_dir, registry) = temp_registry();
        registry.add("abc", RoleId::new("1")).await.unwrap();
        registry.add("ABC", RoleId::new("2")).await.unwrap();
        assert_eq!(registry.list().await.len(), 2);
        assert!(matches!(
            registry.redeem("Abc", &actor()).await,
            Err(Error::UnknownKey { .. })
        ));
    }

    #[tokio::test]
    async fn redeem_succeeds_exactly_once() {
        let (_dir, registry) = temp_registry();
        registry.add("XYZ", RoleId::new("42")).await.unwrap();

        let redemption = registry.redeem("XYZ", &actor()).await.unwrap();
        assert_eq!(redemption.role_id, RoleId::new("42"));

        for _ in 0..3 {
            let err = registry.redeem("XYZ", &actor()).await.unwrap_err();
            assert!(matches!(err, Error::AlreadyRedeemed { .. }));
        }
        assert_eq!(registry.redeemed_count().await, 1);
    }

    #[tokio::test]
    async fn redeem_unknown_key() {
        let (_dir, registry) = temp_registry();
        let err = registry.redeem("nope", &actor()).await.unwrap_err();
        assert!(matches!(err, Error::UnknownKey { ref key } if key == "nope"));
        assert!(!registry.is_redeemed("nope").await);
    }

    #[tokio::test]
    async fn remove_missing_key_is_not_found() {
        let (_dir, registry) = temp_registry();
        let err = registry.remove("ghost").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn remove_then_readd_stays_redeemed() {
        let (_dir, registry) = temp_registry();
        registry.add("K", RoleId::new("1")).await.unwrap();
        registry.redeem("K", &actor()).await.unwrap();

        registry.remove("K").await.unwrap();
        assert!(registry.get("K").await.is_none());
        assert!(registry.is_redeemed("K").await);

        registry.add("K", RoleId::new("2")).await.unwrap();
        let err = registry.redeem("K", &actor()).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyRedeemed { .. }));
    }

    #[tokio::test]
    async fn redemptions_survive_restart() {
        let (dir, registry) = temp_registry();
        registry.add("XYZ", RoleId::new("42")).await.unwrap();
        registry.redeem("XYZ", &actor()).await.unwrap();
        drop(registry);

        let reopened = LicenseRegistry::load(ConfigStore::new(dir.path()));
        assert_eq!(
            reopened.get("XYZ").await.unwrap().role_id,
            RoleId::new("42")
        );
        let err = reopened.redeem("XYZ", &actor()).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyRedeemed { .. }));
    }

    #[tokio::test]
    async fn loads_existing_tables_and_collapses_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("licenses.json"),
            r#"{"keys": [
                {"key": "A", "role_id": "1"},
                {"key": "B", "role_id": 2},
                {"key": "A", "role_id": "3"}
            ]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("used_keys.json"), r#"{"keys": ["B"]}"#).unwrap();

        let registry = LicenseRegistry::load(ConfigStore::new(dir.path()));
        let licenses = registry.list().await;
        assert_eq!(licenses, vec![
            License {
                key: "A".into(),
                role_id: RoleId::new("3"),
            },
            License {
                key: "B".into(),
                role_id: RoleId::new("2"),
            },
        ]);
        assert!(registry.is_redeemed("B").await);
        assert!(registry.redeem("A", &actor()).await.is_ok());
    }

    #[tokio::test]
    async fn reload_reflects_external_edits() {
        let (dir, registry) = temp_registry();
        registry.add("A", RoleId::new("1")).await.unwrap();

        std::fs::write(
            dir.path().join("licenses.json"),
            r#"{"keys": [{"key": "B", "role_id": "2"}]}"#,
        )
        .unwrap();
        registry.reload().await;

        assert!(registry.get("A").await.is_none());
        assert!(registry.get("B").await.is_some());
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let registry = LicenseRegistry::load(ConfigStore::new(&data));
        registry.add("A", RoleId::new("1")).await.unwrap();
        registry.add("GONE", RoleId::new("2")).await.unwrap();

        // A plain file where the data directory should be fails every write.
        std::fs::remove_dir_all(&data).unwrap();
        std::fs::write(&data, b"").unwrap();

        let err = registry.add("B", RoleId::new("3")).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(registry.get("B").await.is_none());

        let err = registry.remove("GONE").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(registry.get("GONE").await.is_some());

        let err = registry.redeem("A", &actor()).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!registry.is_redeemed("A").await);

        std::fs::remove_file(&data).unwrap();
        assert!(registry.redeem("A", &actor()).await.is_ok());
        assert!(registry.is_redeemed("A").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_redeems_yield_one_success() {
        let (_dir, registry) = temp_registry();
        registry.add("RACE", RoleId::new("7")).await.unwrap();
        let registry = Arc::new(registry);

        let mut tasks = Vec::new();
        for i in 0..16u64 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry.redeem("RACE", &ActorId::from(i)).await
            }));
        }

        let mut successes = 0;
        let mut already = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => successes += 1,
                Err(Error::AlreadyRedeemed { .. }) => already += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(already, 15);
    }
}
