//! Column mapping between records and stored rows.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::{Deserialize, Serialize};
    use tableset_core::expression::{field, predicate};
    use tableset_core::schema::{schema_for, to_bag, to_record};
    use tableset_core::{SchemaBuilder, TableEntity, TableError, TableSet, TableSetConfig};
    use tableset_memory::MemoryExecutor;
    use tableset_model::{DataKind, EntityValue};

    use crate::{Country, LOG_ENTRIES, LogEntry, empty_table, sample_countries};

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Keyless {
        name: String,
    }

    impl TableEntity for Keyless {
        fn describe(schema: &mut SchemaBuilder) {
            schema.property("Name", DataKind::String);
        }
    }

    #[test]
    fn test_should_round_trip_country_through_bag() {
        let finland = sample_countries().remove(3);
        let bag = to_bag(&finland).unwrap();

        assert_eq!(bag.get("PartitionKey"), Some(&EntityValue::from("Europe")));
        assert_eq!(bag.get("RowKey"), Some(&EntityValue::from("Finland")));
        assert_eq!(bag.get("PresidentsCount"), Some(&EntityValue::Int32(12)));
        assert!(bag.get("Name").is_none());

        let back: Country = to_record(&bag).unwrap();
        assert_eq!(back, finland);
    }

    #[test]
    fn test_should_store_renamed_column_and_skip_ignored_members() {
        let entry = LogEntry {
            id: "1".to_owned(),
            source: "app".to_owned(),
            message: "hello".to_owned(),
            private_data: vec![9],
            country: sample_countries().pop(),
            ..LogEntry::default()
        };
        let bag = to_bag(&entry).unwrap();

        assert_eq!(bag.get("OldMessage"), Some(&EntityValue::from("hello")));
        for column in ["Message", "PrivateData", "Country", "Timestamp", "ETag"] {
            assert!(!bag.contains_key(column), "unexpected column {column}");
        }
    }

    #[test]
    fn test_should_filter_on_renamed_column() {
        let (_, logs) = empty_table::<LogEntry>(LOG_ENTRIES, TableSetConfig::default());
        let query = logs
            .query()
            .filter(predicate(field("Message").equals("hello")));
        let translation = logs.translate(&query).unwrap();
        assert_eq!(
            translation.filter_string.as_deref(),
            Some("OldMessage eq 'hello'")
        );
    }

    #[test]
    fn test_should_reject_entity_without_keys() {
        let executor = Arc::new(MemoryExecutor::new());
        let err = TableSet::<Keyless>::new("keyless", executor).unwrap_err();
        assert!(matches!(err, TableError::MappingIntegrity { .. }));
    }

    #[test]
    fn test_should_share_schema_between_table_sets() {
        let (_, first) = empty_table::<Country>("first", TableSetConfig::default());
        let (_, second) = empty_table::<Country>("second", TableSetConfig::default());
        let cached = schema_for::<Country>().unwrap();
        assert!(std::ptr::eq(first.schema(), second.schema()));
        assert!(std::ptr::eq(first.schema(), cached.as_ref()));
    }
}
