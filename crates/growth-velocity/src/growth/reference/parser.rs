use super::label::AgeWindow;
use super::{AgeWindowTable, ReferenceDataError, TableKey, ThresholdRecord};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct ThresholdRow {
    window: String,
    p5: f64,
    p50: f64,
    p95: f64,
}

/// Parses one `window,p5,p50,p95` table, normalizing every window label to canonical form.
///
/// Lines starting with `#` carry provenance notes and are skipped.
pub(crate) fn parse_table<R: Read>(
    key: TableKey,
    reader: R,
) -> Result<AgeWindowTable, ReferenceDataError> {
    let table = key.to_string();
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);
    let mut rows = BTreeMap::new();

    for record in csv_reader.deserialize::<ThresholdRow>() {
        let row = record.map_err(|source| ReferenceDataError::Csv {
            table: table.clone(),
            source,
        })?;

        let window: AgeWindow = row.window.parse().map_err(|_| ReferenceDataError::InvalidLabel {
            table: table.clone(),
            label: row.window.clone(),
        })?;

        let threshold = ThresholdRecord::new(row.p5, row.p50, row.p95).ok_or_else(|| {
            ReferenceDataError::NonMonotonic {
                table: table.clone(),
                window: window.canonical(),
                p5: row.p5,
                p50: row.p50,
                p95: row.p95,
            }
        })?;

        if rows.insert(window, threshold).is_some() {
            return Err(ReferenceDataError::DuplicateWindow {
                table,
                window: window.canonical(),
            });
        }
    }

    if rows.is_empty() {
        return Err(ReferenceDataError::EmptyTable(table));
    }

    Ok(AgeWindowTable::new(key, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::domain::{IntervalBucket, MeasurementKind, Sex};
    use std::io::Cursor;

    fn key() -> TableKey {
        TableKey::new(MeasurementKind::Weight, Sex::Male, IntervalBucket::TwoMonths)
    }

    #[test]
    fn parses_rows_and_skips_comments() {
        let table = parse_table(
            key(),
            Cursor::new("# provenance\nwindow,p5,p50,p95\n0-2mo,1600,2250,2900\n 1 - 3 m , 1200, 1950 ,2700\n"),
        )
        .expect("table parses");

        assert_eq!(table.len(), 2);
        let record = table
            .get(&AgeWindow::months(1, 3))
            .expect("normalized label present");
        assert_eq!(record.p50, 1950.0);
    }

    #[test]
    fn rejects_inverted_percentiles() {
        let error = parse_table(
            key(),
            Cursor::new("window,p5,p50,p95\n0-2mo,2300,2250,2900\n"),
        )
        .expect_err("non-monotonic row");
        assert!(matches!(error, ReferenceDataError::NonMonotonic { .. }));
        assert!(error.to_string().contains("weight/male/2mo"));
    }

    #[test]
    fn rejects_labels_that_collide_after_normalization() {
        let error = parse_table(
            key(),
            Cursor::new("window,p5,p50,p95\n0-2mo,1600,2250,2900\n0 - 2 m,1600,2250,2900\n"),
        )
        .expect_err("duplicate window");
        match error {
            ReferenceDataError::DuplicateWindow { window, .. } => assert_eq!(window, "0-2mo"),
            other => panic!("expected duplicate window, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unparseable_labels_and_empty_tables() {
        let error = parse_table(key(), Cursor::new("window,p5,p50,p95\nbirth,1,2,3\n"))
            .expect_err("bad label");
        assert!(matches!(error, ReferenceDataError::InvalidLabel { .. }));

        let error =
            parse_table(key(), Cursor::new("window,p5,p50,p95\n")).expect_err("empty table");
        assert!(matches!(error, ReferenceDataError::EmptyTable(_)));
    }
}
