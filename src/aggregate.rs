use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::models::{DocKind, RawRecord, Vocabulary};

/// Totals for one day, one accumulator per document kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateBucket {
    pub date: NaiveDate,
    pub orders: f64,
    pub invoices: f64,
    pub returns: f64,
}

impl DateBucket {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            orders: 0.0,
            invoices: 0.0,
            returns: 0.0,
        }
    }

    pub fn add(&mut self, kind: DocKind, amount: f64) {
        match kind {
            DocKind::Order => self.orders += amount,
            DocKind::Invoice => self.invoices += amount,
            DocKind::Return => self.returns += amount,
        }
    }

    pub fn get(&self, kind: DocKind) -> f64 {
        match kind {
            DocKind::Order => self.orders,
            DocKind::Invoice => self.invoices,
            DocKind::Return => self.returns,
        }
    }

    /// False when every accumulator is zero.
    pub fn has_activity(&self) -> bool {
        DocKind::ALL.iter().any(|k| self.get(*k) != 0.0)
    }
}

/// Buckets in first-seen order, with a date index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DateBuckets {
    buckets: Vec<DateBucket>,
    #[serde(skip)]
    index: HashMap<NaiveDate, usize>,
    /// Rows skipped because their label was not recognized.
    pub dropped: usize,
}

impl DateBuckets {
    fn entry(&mut self, date: NaiveDate) -> &mut DateBucket {
        let idx = match self.index.get(&date) {
            Some(&i) => i,
            None => {
                self.buckets.push(DateBucket::new(date));
                let i = self.buckets.len() - 1;
                self.index.insert(date, i);
                i
            }
        };
        &mut self.buckets[idx]
    }

    pub fn as_slice(&self) -> &[DateBucket] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Reorder by calendar date.
    pub fn sort_by_date(&mut self) {
        self.buckets.sort_by_key(|b| b.date);
        self.index = self
            .buckets
            .iter()
            .enumerate()
            .map(|(i, b)| (b.date, i))
            .collect();
    }

    /// Days with at least one non-zero accumulator.
    pub fn active(&self) -> impl Iterator<Item = &DateBucket> {
        self.buckets.iter().filter(|b| b.has_activity())
    }

    pub fn total(&self, kind: DocKind) -> f64 {
        self.buckets.iter().map(|b| b.get(kind)).sum()
    }
}

#[cfg(test)]
impl DateBuckets {
    pub fn get(&self, date: NaiveDate) -> Option<&DateBucket> {
        self.index.get(&date).map(|&i| &self.buckets[i])
    }
}

/// Group records by canonical date, summing `total` into the slot the view's
/// vocabulary assigns to each label.
pub fn group_by_date(records: &[RawRecord], vocabulary: &Vocabulary) -> Result<DateBuckets> {
    let mut out = DateBuckets::default();
    let mut dropped = 0;
    for rec in records {
        let kind = vocabulary.classify(&rec.doc_type)?;
        let bucket = out.entry(rec.date);
        match kind {
            Some(k) => bucket.add(k, rec.total),
            None => {
                debug!(label = %rec.doc_type, date = %rec.date, "dropping unrecognized document type");
                dropped += 1;
            }
        }
    }
    out.dropped = dropped;
    Ok(out)
}

/// Sum `value` per distinct `key`, keeping first-seen key order.
pub fn sum_by_key<T>(
    rows: &[T],
    key: impl Fn(&T) -> &str,
    value: impl Fn(&T) -> f64,
) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let k = key(row);
        match index.get(k) {
            Some(&i) => totals[i].1 += value(row),
            None => {
                index.insert(k.to_string(), totals.len());
                totals.push((k.to_string(), value(row)));
            }
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabelPolicy;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(label: &str, date: NaiveDate, total: f64) -> RawRecord {
        RawRecord {
            doc_type: label.to_string(),
            date,
            total,
        }
    }

    fn english_vocab(policy: LabelPolicy) -> Vocabulary {
        Vocabulary::new(policy)
            .with_label("order", DocKind::Order)
            .with_label("invoice", DocKind::Invoice)
            .with_label("return", DocKind::Return)
    }

    #[test]
    fn test_groups_two_days() {
        let records = vec![
            rec("order", ymd(2024, 9, 1), 100.0),
            rec("invoice", ymd(2024, 9, 1), 50.0),
            rec("order", ymd(2024, 9, 2), 20.0),
        ];
        let buckets = group_by_date(&records, &english_vocab(LabelPolicy::Drop)).unwrap();
        assert_eq!(buckets.as_slice().len(), 2);

        let first = buckets.get(ymd(2024, 9, 1)).unwrap();
        assert_eq!(first.orders, 100.0);
        assert_eq!(first.invoices, 50.0);

        let second = buckets.get(ymd(2024, 9, 2)).unwrap();
        assert_eq!(second.orders, 20.0);
        assert_eq!(second.invoices, 0.0);
    }

    #[test]
    fn test_totals_are_conserved() {
        let days = [ymd(2024, 9, 3), ymd(2024, 9, 1), ymd(2024, 9, 2)];
        let labels = ["Pedidos", "NF", "Devolução", "Orçamento"];
        let mut records = Vec::new();
        for i in 0..40 {
            let amount = (i as f64) * 12.5 + 0.25;
            records.push(rec(labels[i % labels.len()], days[i % days.len()], amount));
        }
        let vocab = Vocabulary::standard(LabelPolicy::Drop);
        let buckets = group_by_date(&records, &vocab).unwrap();

        for kind in DocKind::ALL {
            let expected: f64 = records
                .iter()
                .filter(|r| vocab.classify(&r.doc_type).unwrap() == Some(kind))
                .map(|r| r.total)
                .sum();
            assert!((buckets.total(kind) - expected).abs() < 1e-9);
        }
        assert_eq!(buckets.dropped, 10);
    }

    #[test]
    fn test_unknown_label_contributes_nothing() {
        let records = vec![
            rec("Orçamento", ymd(2024, 9, 1), 999.0),
            rec("Pedidos", ymd(2024, 9, 1), 1.0),
        ];
        let buckets =
            group_by_date(&records, &Vocabulary::standard(LabelPolicy::Drop)).unwrap();
        let b = buckets.get(ymd(2024, 9, 1)).unwrap();
        assert_eq!((b.orders, b.invoices, b.returns), (1.0, 0.0, 0.0));
        assert_eq!(buckets.dropped, 1);
    }

    #[test]
    fn test_reject_policy_fails() {
        let records = vec![rec("Orçamento", ymd(2024, 9, 1), 1.0)];
        assert!(group_by_date(&records, &Vocabulary::standard(LabelPolicy::Reject)).is_err());
    }

    #[test]
    fn test_first_seen_order_then_sort() {
        let records = vec![
            rec("NF", ymd(2024, 9, 5), 1.0),
            rec("NF", ymd(2024, 9, 1), 1.0),
            rec("NF", ymd(2024, 9, 5), 1.0),
            rec("NF", ymd(2024, 8, 30), 1.0),
        ];
        let mut buckets =
            group_by_date(&records, &Vocabulary::standard(LabelPolicy::Drop)).unwrap();
        let order: Vec<NaiveDate> = buckets.as_slice().iter().map(|b| b.date).collect();
        assert_eq!(order, vec![ymd(2024, 9, 5), ymd(2024, 9, 1), ymd(2024, 8, 30)]);

        buckets.sort_by_date();
        let order: Vec<NaiveDate> = buckets.as_slice().iter().map(|b| b.date).collect();
        assert_eq!(order, vec![ymd(2024, 8, 30), ymd(2024, 9, 1), ymd(2024, 9, 5)]);
        assert_eq!(buckets.get(ymd(2024, 9, 5)).unwrap().invoices, 2.0);
    }

    #[test]
    fn test_active_skips_zero_days() {
        let records = vec![
            rec("Orçamento", ymd(2024, 9, 1), 5.0),
            rec("Pedidos", ymd(2024, 9, 2), 0.0),
            rec("NF", ymd(2024, 9, 3), 7.0),
        ];
        let buckets =
            group_by_date(&records, &Vocabulary::standard(LabelPolicy::Drop)).unwrap();
        assert_eq!(buckets.as_slice().len(), 3);
        let active: Vec<NaiveDate> = buckets.active().map(|b| b.date).collect();
        assert_eq!(active, vec![ymd(2024, 9, 3)]);
    }

    #[test]
    fn test_sum_by_key_keeps_first_seen_order() {
        let rows = vec![("b", 1.0), ("a", 2.0), ("b", 3.0)];
        let totals = sum_by_key(&rows, |r| r.0, |r| r.1);
        assert_eq!(totals, vec![("b".to_string(), 4.0), ("a".to_string(), 2.0)]);
    }
}
