use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::dates::deserialize_flexible;
use crate::error::{PainelError, Result};

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

/// Accumulator slot a document-type label feeds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    Order,
    Invoice,
    Return,
}

impl DocKind {
    pub const ALL: [DocKind; 3] = [DocKind::Order, DocKind::Invoice, DocKind::Return];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "order" => Some(DocKind::Order),
            "invoice" => Some(DocKind::Invoice),
            "return" => Some(DocKind::Return),
            _ => None,
        }
    }

    /// Series name shown in charts and table headers.
    pub fn title(self) -> &'static str {
        match self {
            DocKind::Order => "Pedidos",
            DocKind::Invoice => "NF",
            DocKind::Return => "Devolução",
        }
    }
}

/// Labels the revenue endpoints send in `Tipo de doc.`.
pub const DEFAULT_LABELS: &[(&str, DocKind)] = &[
    ("Pedidos", DocKind::Order),
    ("NF", DocKind::Invoice),
    ("Devolução", DocKind::Return),
];

/// What to do with a row whose label is not in the view's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPolicy {
    /// Skip the row; it contributes to no accumulator.
    #[default]
    Drop,
    /// Fail the whole aggregation.
    Reject,
}

impl LabelPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "drop" => Some(LabelPolicy::Drop),
            "reject" => Some(LabelPolicy::Reject),
            _ => None,
        }
    }
}

/// One view's label table: exact label string to accumulator slot.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    labels: Vec<(String, DocKind)>,
    policy: LabelPolicy,
}

impl Vocabulary {
    pub fn new(policy: LabelPolicy) -> Self {
        Self {
            labels: Vec::new(),
            policy,
        }
    }

    pub fn standard(policy: LabelPolicy) -> Self {
        DEFAULT_LABELS
            .iter()
            .fold(Self::new(policy), |v, (label, kind)| v.with_label(*label, *kind))
    }

    pub fn with_label(mut self, label: impl Into<String>, kind: DocKind) -> Self {
        self.labels.push((label.into(), kind));
        self
    }

    pub fn extend<'a>(self, extra: impl IntoIterator<Item = (&'a String, &'a DocKind)>) -> Self {
        extra
            .into_iter()
            .fold(self, |v, (label, kind)| v.with_label(label.clone(), *kind))
    }

    /// `Ok(None)` means the label is unknown and the policy says drop.
    pub fn classify(&self, label: &str) -> Result<Option<DocKind>> {
        if let Some((_, kind)) = self.labels.iter().find(|(l, _)| l == label) {
            return Ok(Some(*kind));
        }
        match self.policy {
            LabelPolicy::Drop => Ok(None),
            LabelPolicy::Reject => Err(PainelError::UnknownLabel(label.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Backend rows
// ---------------------------------------------------------------------------

/// Row from the revenue endpoints (`faturado`, `pedidos_grafico`, `teste2`).
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Tipo de doc.")]
    pub doc_type: String,
    #[serde(rename = "Data de expedição", deserialize_with = "deserialize_flexible")]
    pub date: NaiveDate,
    #[serde(rename = "Total Valor")]
    pub total: f64,
}

/// Row from `POST /api/pedidos`: one day of orders split by sales channel.
#[derive(Debug, Clone, Deserialize)]
pub struct DailySales {
    #[serde(deserialize_with = "deserialize_flexible")]
    pub docdate: NaiveDate,
    pub total_doal: f64,
    pub total_licitacao: f64,
    #[serde(rename = "Representantes")]
    pub representantes: f64,
    #[serde(default)]
    pub acumulado: Option<f64>,
}

/// Row from `GET /api/produtos_clientes`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductLine {
    #[serde(rename = "grupo_de_produtos")]
    pub product_group: String,
    #[serde(rename = "linetotal")]
    pub line_total: f64,
    #[serde(rename = "groupname")]
    pub client_group: String,
}

// ---------------------------------------------------------------------------
// Validation boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quarantined {
    pub index: usize,
    pub reason: String,
}

/// Rows that parsed, plus the ones set aside.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub rows: Vec<T>,
    pub quarantined: Vec<Quarantined>,
}

/// Deserialize each value on its own so one bad row cannot sink the batch.
pub fn parse_rows<T: DeserializeOwned>(values: Vec<Value>) -> Parsed<T> {
    let mut rows = Vec::with_capacity(values.len());
    let mut quarantined = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(index, "quarantined malformed row: {e}");
                quarantined.push(Quarantined {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }
    Parsed { rows, quarantined }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_raw_records_normalizes_dates() {
        let values = vec![
            json!({"Tipo de doc.": "NF", "Data de expedição": "01/09/2024", "Total Valor": 10.5}),
            json!({"Tipo de doc.": "Pedidos", "Data de expedição": "2024-09-01", "Total Valor": 2}),
        ];
        let parsed: Parsed<RawRecord> = parse_rows(values);
        assert!(parsed.quarantined.is_empty());
        assert_eq!(parsed.rows[0].date, parsed.rows[1].date);
        assert_eq!(parsed.rows[1].total, 2.0);
    }

    #[test]
    fn test_malformed_rows_are_quarantined() {
        let values = vec![
            json!({"Tipo de doc.": "NF", "Data de expedição": "2024-09-01", "Total Valor": 1.0}),
            json!({"Tipo de doc.": "NF", "Data de expedição": "2024-09-01"}),
            json!({"Tipo de doc.": "NF", "Data de expedição": "soon", "Total Valor": 1.0}),
            json!("not an object"),
        ];
        let parsed: Parsed<RawRecord> = parse_rows(values);
        assert_eq!(parsed.rows.len(), 1);
        let idx: Vec<usize> = parsed.quarantined.iter().map(|q| q.index).collect();
        assert_eq!(idx, vec![1, 2, 3]);
    }

    #[test]
    fn test_daily_sales_optional_accumulated() {
        let values = vec![json!({
            "docdate": "2024-09-02T00:00:00.000Z",
            "total_doal": 100.0,
            "total_licitacao": 50.0,
            "Representantes": 5.0,
            "totalPedidos": 155.0
        })];
        let parsed: Parsed<DailySales> = parse_rows(values);
        let row = &parsed.rows[0];
        assert_eq!(row.docdate, NaiveDate::from_ymd_opt(2024, 9, 2).unwrap());
        assert_eq!(row.acumulado, None);
    }

    #[test]
    fn test_product_line_field_names() {
        let values = vec![json!({"grupo_de_produtos": "Luvas", "linetotal": 12.0, "groupname": "Hospitais"})];
        let parsed: Parsed<ProductLine> = parse_rows(values);
        assert_eq!(parsed.rows[0].product_group, "Luvas");
        assert_eq!(parsed.rows[0].client_group, "Hospitais");
    }

    #[test]
    fn test_vocabulary_drop_and_reject() {
        let drop = Vocabulary::standard(LabelPolicy::Drop);
        assert_eq!(drop.classify("NF").unwrap(), Some(DocKind::Invoice));
        assert_eq!(drop.classify("Orçamento").unwrap(), None);
        // Exact match only.
        assert_eq!(drop.classify("nf").unwrap(), None);

        let reject = Vocabulary::standard(LabelPolicy::Reject);
        assert!(matches!(
            reject.classify("Orçamento"),
            Err(PainelError::UnknownLabel(l)) if l == "Orçamento"
        ));
    }

    #[test]
    fn test_vocabulary_extend() {
        let extra: std::collections::BTreeMap<String, DocKind> =
            [("order".to_string(), DocKind::Order)].into_iter().collect();
        let vocab = Vocabulary::standard(LabelPolicy::Drop).extend(&extra);
        assert_eq!(vocab.classify("order").unwrap(), Some(DocKind::Order));
        assert_eq!(vocab.classify("Pedidos").unwrap(), Some(DocKind::Order));
    }

    #[test]
    fn test_label_policy_parse() {
        assert_eq!(LabelPolicy::parse("drop"), Some(LabelPolicy::Drop));
        assert_eq!(LabelPolicy::parse("reject"), Some(LabelPolicy::Reject));
        assert_eq!(LabelPolicy::parse("ignore"), None);
    }
}
