//! Insert, replace and delete through a table set.

#[cfg(test)]
mod tests {
    use tableset_core::expression::{field, predicate};
    use tableset_core::{TableError, TableSetConfig};
    use tableset_memory::StorageError;
    use tableset_model::TableOperation;

    use crate::{Country, LOG_ENTRIES, LogEntry, empty_table, sample_countries, seeded_countries};

    fn storage_error(err: &TableError) -> &StorageError {
        let TableError::Storage(source) = err else {
            panic!("expected a storage failure, got {err}");
        };
        source
            .downcast_ref::<StorageError>()
            .unwrap_or_else(|| panic!("expected a StorageError, got {source}"))
    }

    fn log_entry(message: &str) -> LogEntry {
        LogEntry {
            id: "2026-10-19".to_owned(),
            source: "collector-1".to_owned(),
            message: message.to_owned(),
            private_data: vec![1, 2, 3],
            ..LogEntry::default()
        }
    }

    #[tokio::test]
    async fn test_should_update_country() {
        let (executor, countries) = seeded_countries(TableSetConfig::default()).await;
        let mut finland = countries
            .single(Some(predicate(field("Name").equals("Finland"))))
            .await
            .unwrap();
        finland.presidents_count += 1;

        let updated = countries.update(finland.clone()).await.unwrap();
        assert_eq!(updated, finland);
        assert_eq!(executor.operations().last(), Some(&TableOperation::Replace));

        let reread = countries
            .single(Some(predicate(field("Name").equals("Finland"))))
            .await
            .unwrap();
        assert_eq!(reread.presidents_count, 13);
    }

    #[tokio::test]
    async fn test_should_reject_null_update_without_writing() {
        let (executor, countries) = empty_table::<Country>("nulls", TableSetConfig::default());
        let err = countries.update(None::<Country>).await.unwrap_err();
        assert!(matches!(err, TableError::NullArgument { .. }));
        assert_eq!(executor.write_count(), 0);
    }

    #[tokio::test]
    async fn test_should_reject_null_collections_without_writing() {
        let (executor, countries) = empty_table::<Country>("nulls", TableSetConfig::default());
        let err = countries.add_many(None::<Vec<Country>>).await.unwrap_err();
        assert!(matches!(err, TableError::NullArgument { .. }));
        let err = countries.update_many(None::<Vec<Country>>).await.unwrap_err();
        assert!(matches!(err, TableError::NullArgument { .. }));
        let err = countries.remove_many(None::<Vec<Country>>).await.unwrap_err();
        assert!(matches!(err, TableError::NullArgument { .. }));
        assert_eq!(executor.write_count(), 0);
    }

    #[tokio::test]
    async fn test_should_fail_update_of_missing_country() {
        let (_, countries) = empty_table::<Country>("missing", TableSetConfig::default());
        let err = countries
            .update(sample_countries().remove(0))
            .await
            .unwrap_err();
        assert!(matches!(storage_error(&err), StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_insert() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let err = countries
            .add(sample_countries().remove(1))
            .await
            .unwrap_err();
        let StorageError::Conflict { row_key, .. } = storage_error(&err) else {
            panic!("expected a conflict, got {err}");
        };
        assert_eq!(row_key, "Spain");
    }

    #[tokio::test]
    async fn test_should_remove_country() {
        let (executor, countries) = seeded_countries(TableSetConfig::default()).await;
        let spain = countries
            .first(Some(predicate(field("Name").equals("Spain"))))
            .await
            .unwrap();
        countries.remove(spain).await.unwrap();

        assert_eq!(executor.operations().last(), Some(&TableOperation::Delete));
        let remaining = countries.to_list().await.unwrap();
        assert_eq!(remaining.len(), 3);
        assert!(remaining.iter().all(|c| c.name != "Spain"));
    }

    #[tokio::test]
    async fn test_should_write_back_server_columns() {
        let (_, logs) = empty_table::<LogEntry>(LOG_ENTRIES, TableSetConfig::default());
        let added = logs.add(log_entry("started")).await.unwrap();

        assert!(added.etag.is_some());
        assert!(added.timestamp.is_some());
        assert_eq!(added.private_data, vec![1, 2, 3]);

        let stored = logs.first(None).await.unwrap();
        assert_eq!(stored.message, "started");
        assert_eq!(stored.etag, added.etag);
        assert!(stored.private_data.is_empty());
    }

    #[tokio::test]
    async fn test_should_reject_stale_etag() {
        let (_, logs) = empty_table::<LogEntry>(LOG_ENTRIES, TableSetConfig::default());
        let added = logs.add(log_entry("started")).await.unwrap();

        let mut fresh = added.clone();
        fresh.message = "running".to_owned();
        let fresh = logs.update(fresh).await.unwrap();
        assert_ne!(fresh.etag, added.etag);

        let mut stale = added;
        stale.message = "stopped".to_owned();
        let err = logs.update(stale).await.unwrap_err();
        assert!(matches!(
            storage_error(&err),
            StorageError::PreconditionFailed { .. }
        ));

        let stored = logs.first(None).await.unwrap();
        assert_eq!(stored.message, "running");
    }

    #[tokio::test]
    async fn test_should_replace_unconditionally_without_etag() {
        let (_, logs) = empty_table::<LogEntry>(LOG_ENTRIES, TableSetConfig::default());
        logs.add(log_entry("started")).await.unwrap();

        let updated = logs.update(log_entry("forced")).await.unwrap();
        assert!(updated.etag.is_some());
        assert_eq!(logs.first(None).await.unwrap().message, "forced");
    }
}
