//! Tests for the key-value backends
//!
//! Both backends run the same behavioural checks; the file backend is also
//! checked for persistence across re-opens.

#[cfg(test)]
mod storage_tests {
    use crate::errors::{CacheError, Result};
    use crate::storage::{FileStore, KeyValueStore, MemoryStore};
    use tempfile::TempDir;

    fn exercise_basic_operations(store: &dyn KeyValueStore) -> Result<()> {
        assert_eq!(store.get("ns-a.py")?, None);

        store.set("ns-a.py", "one")?;
        assert_eq!(store.get("ns-a.py")?.as_deref(), Some("one"));

        store.set("ns-a.py", "two")?;
        assert_eq!(store.get("ns-a.py")?.as_deref(), Some("two"));

        store.set("ns-dir/b.py", "three")?;
        let mut keys = store.keys()?;
        keys.sort();
        assert_eq!(keys, vec!["ns-a.py".to_string(), "ns-dir/b.py".to_string()]);

        assert!(store.remove("ns-a.py")?);
        assert!(!store.remove("ns-a.py")?);
        assert_eq!(store.get("ns-a.py")?, None);

        Ok(())
    }

    #[test]
    fn test_memory_store_basic() -> Result<()> {
        exercise_basic_operations(&MemoryStore::new())
    }

    #[test]
    fn test_file_store_basic() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        exercise_basic_operations(&FileStore::open(temp_dir.path())?)
    }

    #[test]
    fn test_file_store_survives_reopen() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = FileStore::open(temp_dir.path())?;
            store.set("ns-notebooks/über.py", "print('hi')")?;
        }

        let reopened = FileStore::open(temp_dir.path())?;
        assert_eq!(
            reopened.get("ns-notebooks/über.py")?.as_deref(),
            Some("print('hi')")
        );
        assert_eq!(reopened.keys()?, vec!["ns-notebooks/über.py".to_string()]);
        Ok(())
    }

    #[test]
    fn test_file_store_ignores_foreign_files() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path())?;
        std::fs::write(temp_dir.path().join("README.txt"), "not a value").unwrap();
        std::fs::write(temp_dir.path().join(".abc.tmp"), "partial").unwrap();
        std::fs::write(temp_dir.path().join(format!("{}.json", "0".repeat(64))), "{").unwrap();

        assert!(store.keys()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_file_store_accepts_keys_longer_than_a_file_name() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path())?;
        let key = format!("ns-{}/analysis.py", "deeply-nested-directory/".repeat(12));
        assert!(key.len() >= 200);

        store.set(&key, "print('long')")?;
        assert_eq!(store.get(&key)?.as_deref(), Some("print('long')"));
        assert_eq!(store.keys()?, vec![key.clone()]);

        for entry in std::fs::read_dir(temp_dir.path()).unwrap() {
            let name = entry.unwrap().file_name();
            assert_eq!(name.len(), 64 + ".json".len());
        }

        assert!(store.remove(&key)?);
        assert!(store.keys()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_quota_is_enforced() {
        let store = MemoryStore::with_quota(4);
        match store.set("k", "12345") {
            Err(CacheError::QuotaExceeded {
                requested_bytes,
                limit_bytes,
                ..
            }) => {
                assert_eq!(requested_bytes, 5);
                assert_eq!(limit_bytes, 4);
            }
            other => panic!("expected quota error, got {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        assert!(matches!(
            store.set("", "x"),
            Err(CacheError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_file_store_over_a_file_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("occupied");
        std::fs::write(&file_path, "x").unwrap();

        assert!(FileStore::open(&file_path).is_err());
    }
}
