use crate::domain::model::{CellValue, Table};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledColumn {
    pub column: String,
    pub mean: f64,
    pub filled: usize,
}

/// 補值結果；`skipped` 為整欄皆空、沒有平均值可用的數值欄位
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FillReport {
    pub filled: Vec<FilledColumn>,
    pub skipped: Vec<String>,
}

impl FillReport {
    pub fn total_filled(&self) -> usize {
        self.filled.iter().map(|c| c.filled).sum()
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Null,
    Int(i64),
    Float(u64),
    Bool(bool),
    Text(&'a str),
}

impl<'a> From<&'a CellValue> for CellKey<'a> {
    fn from(value: &'a CellValue) -> Self {
        match value {
            CellValue::Null => CellKey::Null,
            CellValue::Int(i) => CellKey::Int(*i),
            // 與整數同值的浮點數視為相同
            CellValue::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                CellKey::Int(*f as i64)
            }
            CellValue::Float(f) if f.is_nan() => CellKey::Float(f64::NAN.to_bits()),
            CellValue::Float(f) => CellKey::Float(f.to_bits()),
            CellValue::Bool(b) => CellKey::Bool(*b),
            CellValue::Text(s) => CellKey::Text(s.as_str()),
        }
    }
}

/// 移除與先前某列完全相同的列，保留第一次出現的順序；回傳移除的列數
pub fn remove_duplicates(table: &mut Table) -> usize {
    let keep: Vec<bool> = {
        let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::new();
        table
            .rows()
            .map(|row| seen.insert(row.into_iter().map(CellKey::from).collect()))
            .collect()
    };

    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        table.retain_rows(&keep);
    }

    tracing::debug!("Deduplication removed {} row(s)", removed);
    removed
}

/// 數值欄位的缺值以該欄目前的平均值補上，非數值欄位不動
pub fn fill_missing(table: &mut Table) -> FillReport {
    let mut report = FillReport::default();

    for column in table.columns_mut() {
        if !column.is_numeric() {
            continue;
        }

        let missing = column.null_count();
        if missing == 0 {
            continue;
        }

        let present: Vec<f64> = column.values.iter().filter_map(CellValue::as_f64).collect();
        if present.is_empty() {
            tracing::warn!(
                "⚠️ Column '{}' has no values to average, leaving it empty",
                column.name
            );
            report.skipped.push(column.name.clone());
            continue;
        }

        let mean = present.iter().sum::<f64>() / present.len() as f64;
        for value in column.values.iter_mut().filter(|v| v.is_null()) {
            *value = CellValue::Float(mean);
        }

        tracing::debug!(
            "Filled {} missing value(s) in '{}' with mean {}",
            missing,
            column.name,
            mean
        );
        report.filled.push(FilledColumn {
            column: column.name.clone(),
            mean,
            filled: missing,
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Column;

    fn ints(values: &[Option<i64>]) -> Vec<CellValue> {
        values
            .iter()
            .map(|v| v.map(CellValue::Int).unwrap_or(CellValue::Null))
            .collect()
    }

    #[test]
    fn test_remove_duplicates_keeps_first_occurrence() {
        let mut table = Table::new(vec![
            Column::new("a", ints(&[Some(1), Some(1), Some(3), Some(1)])),
            Column::new("b", ints(&[Some(2), Some(2), Some(4), Some(5)])),
        ])
        .unwrap();

        assert_eq!(remove_duplicates(&mut table), 1);
        assert_eq!(table.column("a").unwrap().values, ints(&[Some(1), Some(3), Some(1)]));
        assert_eq!(table.column("b").unwrap().values, ints(&[Some(2), Some(4), Some(5)]));
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let mut table = Table::new(vec![Column::new(
            "a",
            ints(&[Some(1), None, Some(1), None, Some(2)]),
        )])
        .unwrap();

        remove_duplicates(&mut table);
        let once = table.clone();
        assert_eq!(remove_duplicates(&mut table), 0);
        assert_eq!(table, once);
        assert_eq!(once.column("a").unwrap().values, ints(&[Some(1), None, Some(2)]));
    }

    #[test]
    fn test_int_and_float_with_same_value_are_duplicates() {
        let mut table = Table::new(vec![Column::new(
            "a",
            vec![CellValue::Int(2), CellValue::Float(2.0), CellValue::Float(2.5)],
        )])
        .unwrap();

        assert_eq!(remove_duplicates(&mut table), 1);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_fill_missing_uses_mean() {
        let mut table = Table::new(vec![Column::new("a", ints(&[Some(1), None, Some(3)]))]).unwrap();

        let report = fill_missing(&mut table);

        assert_eq!(
            table.column("a").unwrap().values,
            vec![CellValue::Int(1), CellValue::Float(2.0), CellValue::Int(3)]
        );
        assert_eq!(report.total_filled(), 1);
        assert_eq!(report.filled[0].mean, 2.0);
    }

    #[test]
    fn test_fill_missing_leaves_text_and_empty_columns() {
        let text = vec![CellValue::Text("x".into()), CellValue::Null, CellValue::Text("y".into())];
        let mut table = Table::new(vec![
            Column::new("label", text.clone()),
            Column::new("empty", vec![CellValue::Null; 3]),
            Column::new("flag", vec![CellValue::Bool(true), CellValue::Null, CellValue::Bool(false)]),
        ])
        .unwrap();

        let report = fill_missing(&mut table);

        assert_eq!(table.column("label").unwrap().values, text);
        assert_eq!(table.column("empty").unwrap().values, vec![CellValue::Null; 3]);
        assert_eq!(table.column("flag").unwrap().null_count(), 1);
        assert_eq!(report.skipped, vec!["empty".to_string()]);
        assert!(report.filled.is_empty());
    }

    #[test]
    fn test_refill_is_a_no_op_once_filled() {
        let mut table = Table::new(vec![Column::new("a", ints(&[Some(4), None, Some(8)]))]).unwrap();
        fill_missing(&mut table);
        let once = table.clone();

        let report = fill_missing(&mut table);
        assert_eq!(table, once);
        assert_eq!(report, FillReport::default());
    }
}
