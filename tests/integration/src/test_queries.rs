//! Query scenarios over the four sample countries.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use futures::future::join_all;
    use parking_lot::RwLock;
    use tableset_core::expression::{capture, field, predicate};
    use tableset_core::{PostProcessing, TableError, TableSetConfig};

    use crate::seeded_countries;

    const GERMANY: &str = "Germany";
    const SPAIN: &str = "Spain";
    const FRANCE: &str = "France";
    const FINLAND: &str = "Finland";
    const EUROPE: &str = "Europe";

    fn names(countries: &[crate::Country]) -> Vec<&str> {
        countries.iter().map(|c| c.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_should_list_all_countries() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let all = countries.to_list().await.unwrap();
        assert_eq!(all.len(), 4);
        for name in [GERMANY, SPAIN, FRANCE, FINLAND] {
            assert!(names(&all).contains(&name), "missing {name}");
        }
    }

    #[tokio::test]
    async fn test_should_list_countries_with_predicate() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let europe = countries
            .to_list_where(predicate(field("Continent").equals(EUROPE)))
            .await
            .unwrap();
        assert_eq!(europe.len(), 4);
    }

    #[tokio::test]
    async fn test_should_take_two_countries() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let two = countries.take(2).await.unwrap();
        assert_eq!(two.len(), 2);
    }

    #[tokio::test]
    async fn test_should_translate_negated_flag() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let query = countries.query().filter(predicate(!field("IsExists")));
        let translation = countries.translate(&query).unwrap();
        assert_eq!(translation.filter_string.as_deref(), Some("not IsExists"));

        let gone = countries.execute(&query).await.unwrap();
        assert_eq!(names(&gone), [SPAIN]);
    }

    #[tokio::test]
    async fn test_should_translate_where_first_like_first_with_predicate() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let condition = || predicate(field("Name").equals(FRANCE));
        let chained = countries
            .translate(&countries.query().filter(condition()).first(None))
            .unwrap();
        let direct = countries
            .translate(&countries.query().first(Some(condition())))
            .unwrap();
        assert_eq!(chained, direct);
        assert_eq!(chained.filter_string.as_deref(), Some("RowKey eq 'France'"));
        assert_eq!(chained.post_processing, Some(PostProcessing::TakeFirst));
    }

    #[tokio::test]
    async fn test_should_get_first_of_filtered_chain() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let query = countries
            .query()
            .filter(predicate(field("Name").equals(FRANCE)))
            .first(None);
        let france = countries.execute_one(&query).await.unwrap().unwrap();
        assert_eq!(france.name, FRANCE);
    }

    #[tokio::test]
    async fn test_should_get_first_with_predicate() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let spain = countries
            .first(Some(predicate(field("Name").equals(SPAIN))))
            .await
            .unwrap();
        assert_eq!(spain.name, SPAIN);
        assert!(!spain.is_exists);
    }

    #[tokio::test]
    async fn test_should_fail_first_without_match() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let err = countries
            .first(Some(predicate(field("Name").equals("none"))))
            .await
            .unwrap_err();
        assert!(matches!(err, TableError::InvalidOperation { .. }));
    }

    #[tokio::test]
    async fn test_should_get_first_or_default() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let query = countries
            .query()
            .filter(predicate(field("Name").equals(GERMANY)))
            .first_or_default(None);
        let germany = countries.execute_one(&query).await.unwrap();
        assert_eq!(germany.map(|c| c.name).as_deref(), Some(GERMANY));

        let germany = countries
            .first_or_default(Some(predicate(field("Name").equals(GERMANY))))
            .await
            .unwrap();
        assert_eq!(germany.map(|c| c.population), Some(81_799_600));
    }

    #[tokio::test]
    async fn test_should_return_none_for_first_or_default_without_match() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let none = countries
            .first_or_default(Some(predicate(field("Name").equals("none"))))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_should_get_single_of_filtered_chain() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let query = countries
            .query()
            .filter(predicate(field("Name").equals(FINLAND)))
            .single(None);
        let finland = countries.execute_one(&query).await.unwrap().unwrap();
        assert_eq!(finland.name, FINLAND);
    }

    #[tokio::test]
    async fn test_should_fail_single_with_multiple_results() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let err = countries.single(None).await.unwrap_err();
        assert!(matches!(err, TableError::InvalidOperation { .. }));
    }

    #[tokio::test]
    async fn test_should_get_single_with_predicate() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let finland = countries
            .single(Some(predicate(field("Name").equals(FINLAND))))
            .await
            .unwrap();
        assert_eq!(finland.name, FINLAND);
        assert_eq!(finland.presidents_count, 12);
    }

    #[tokio::test]
    async fn test_should_get_single_or_default() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let query = countries
            .query()
            .filter(predicate(field("Name").equals(FRANCE)))
            .single_or_default(None);
        let france = countries.execute_one(&query).await.unwrap();
        assert_eq!(france.map(|c| c.name).as_deref(), Some(FRANCE));

        let france = countries
            .single_or_default(Some(predicate(field("Name").equals(FRANCE))))
            .await
            .unwrap();
        assert!(france.is_some());
    }

    #[tokio::test]
    async fn test_should_fail_single_or_default_with_multiple_results() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let err = countries.single_or_default(None).await.unwrap_err();
        assert!(matches!(err, TableError::InvalidOperation { .. }));
    }

    #[tokio::test]
    async fn test_should_return_none_for_single_or_default_without_match() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let none = countries
            .single_or_default(Some(predicate(field("Name").equals("none"))))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_should_filter_by_typed_literals() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let formed = Utc.with_ymd_and_hms(1809, 3, 29, 0, 0, 0).unwrap();
        let finland = countries
            .single(Some(predicate(field("Formed").equals(formed))))
            .await
            .unwrap();
        assert_eq!(finland.name, FINLAND);

        let secret = countries
            .to_list_where(predicate(
                field("TopSecretKey")
                    .equals(vec![0xaa_u8, 0xbb, 0xcc])
                    .and(field("Area").greater_than(400_000.0)),
            ))
            .await
            .unwrap();
        let mut found = names(&secret);
        found.sort_unstable();
        assert_eq!(found, [FRANCE, SPAIN]);
    }

    #[tokio::test]
    async fn test_should_mix_logical_operators() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let found = countries
            .to_list_where(predicate(
                field("Name")
                    .equals(SPAIN)
                    .or(field("Name").equals(FINLAND))
                    .and(field("IsExists")),
            ))
            .await
            .unwrap();
        assert_eq!(names(&found), [FINLAND]);
    }

    #[tokio::test]
    async fn test_should_reread_captured_value_per_query() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let threshold = Arc::new(RwLock::new(50_000_000_i64));
        let reader = Arc::clone(&threshold);
        let query = countries.query().filter(predicate(
            field("Population").greater_than(capture("threshold", move || *reader.read())),
        ));

        assert_eq!(countries.execute(&query).await.unwrap().len(), 2);
        *threshold.write() = 10_000_000;
        assert_eq!(countries.execute(&query).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_should_page_with_small_segments() {
        let config = TableSetConfig {
            page_size: 1,
            ..TableSetConfig::default()
        };
        let (executor, countries) = seeded_countries(config).await;
        let all = countries.to_list().await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(executor.segment_count(), 4);
    }

    #[tokio::test]
    async fn test_should_reject_take_above_configured_maximum() {
        let config = TableSetConfig {
            max_take: Some(3),
            ..TableSetConfig::default()
        };
        let (executor, countries) = seeded_countries(config).await;
        let err = countries.take(5).await.unwrap_err();
        assert!(matches!(err, TableError::OutOfRange { .. }));
        assert_eq!(executor.segment_count(), 0);
    }

    #[tokio::test]
    async fn test_should_reject_unsupported_predicate_before_querying() {
        let (executor, countries) = seeded_countries(TableSetConfig::default()).await;
        let err = countries
            .to_list_where(predicate(field("Name").equals(field("Continent"))))
            .await
            .unwrap_err();
        assert!(matches!(err, TableError::Unsupported { .. }));
        assert_eq!(executor.segment_count(), 0);
    }

    #[tokio::test]
    async fn test_should_serve_concurrent_queries() {
        let (_, countries) = seeded_countries(TableSetConfig::default()).await;
        let lookups = [GERMANY, SPAIN, FRANCE, FINLAND]
            .map(|name| countries.single(Some(predicate(field("Name").equals(name)))));
        let found = join_all(lookups).await;
        for (result, name) in found.into_iter().zip([GERMANY, SPAIN, FRANCE, FINLAND]) {
            assert_eq!(result.unwrap().name, name);
        }
    }
}
