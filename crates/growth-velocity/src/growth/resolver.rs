use super::domain::{IntervalBucket, MeasurementKind, Sex};
use super::interval::AgeWindowKey;
use super::reference::{AgeWindow, AgeWindowTable, ReferenceTableStore, ThresholdRecord};
use tracing::debug;

/// Percentile band matched for one age window.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedThreshold {
    pub window: AgeWindow,
    pub record: ThresholdRecord,
    /// Candidate label that produced the hit.
    pub matched_key: String,
}

/// Looks percentile bands up in a [`ReferenceTableStore`].
#[derive(Debug, Clone, Copy)]
pub struct ThresholdResolver<'a> {
    store: &'a ReferenceTableStore,
}

impl<'a> ThresholdResolver<'a> {
    pub fn new(store: &'a ReferenceTableStore) -> Self {
        Self { store }
    }

    pub fn select_table(
        &self,
        kind: MeasurementKind,
        sex: Sex,
        bucket: IntervalBucket,
    ) -> Option<&'a AgeWindowTable> {
        self.store.table(kind, sex, bucket)
    }

    /// Tries each candidate in order; the first one present in `table` wins.
    pub fn resolve(table: &AgeWindowTable, key: &AgeWindowKey) -> Option<ResolvedThreshold> {
        let resolved = key.candidates().find_map(|candidate| {
            table
                .lookup(candidate)
                .map(|(window, record)| ResolvedThreshold {
                    window,
                    record: *record,
                    matched_key: candidate.to_string(),
                })
        });

        debug!(
            table = %table.key(),
            primary = %key.primary,
            hit = ?resolved.as_ref().map(|found| found.matched_key.as_str()),
            "resolved age window"
        );

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::interval::IntervalClassifier;
    use std::io::Cursor;

    fn store() -> ReferenceTableStore {
        ReferenceTableStore::from_sources([(
            "length_female_2mo",
            Cursor::new("window,p5,p50,p95\n0 - 2 m,6.2,8.0,9.9\n1-3m,4.8,6.3,7.9\n"),
        )])
        .expect("store builds")
    }

    #[test]
    fn selects_only_present_tables() {
        let store = store();
        let resolver = ThresholdResolver::new(&store);
        assert!(resolver
            .select_table(MeasurementKind::Length, Sex::Female, IntervalBucket::TwoMonths)
            .is_some());
        assert!(resolver
            .select_table(MeasurementKind::Length, Sex::Male, IntervalBucket::TwoMonths)
            .is_none());
    }

    #[test]
    fn resolves_labels_authored_in_any_spelling() {
        let store = store();
        let table = ThresholdResolver::new(&store)
            .select_table(MeasurementKind::Length, Sex::Female, IntervalBucket::TwoMonths)
            .expect("table");

        let key = IntervalClassifier::age_window_key(1, IntervalBucket::TwoMonths, 61);
        let resolved = ThresholdResolver::resolve(table, &key).expect("resolves");
        assert_eq!(resolved.window.canonical(), "1-3mo");
        assert_eq!(resolved.matched_key, "1-3mo");
        assert_eq!(resolved.record.p5, 4.8);
    }

    #[test]
    fn exhausting_candidates_is_not_found() {
        let store = store();
        let table = ThresholdResolver::new(&store)
            .select_table(MeasurementKind::Length, Sex::Female, IntervalBucket::TwoMonths)
            .expect("table");

        let key = IntervalClassifier::age_window_key(9, IntervalBucket::TwoMonths, 61);
        assert!(ThresholdResolver::resolve(table, &key).is_none());
    }
}
