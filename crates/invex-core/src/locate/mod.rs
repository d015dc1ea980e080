//! Coordinate reconciliation: find where each extracted value sits on each
//! page of the source PDF.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::error::{ExtractionError, InvexError};
use crate::models::ExtractedInvoice;
use crate::models::schema;
use crate::pdf::{PageSearch, Region};

/// A value and the regions where its text was found on one page.
///
/// Empty regions mean "not found on this page", which is expected for
/// multi-page documents and is not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedValue {
    /// The extracted value as returned by the completion service.
    pub value: Value,
    /// Zero or more bounding regions for the value's text.
    pub regions: Vec<Region>,
}

/// Matches for one element of an array-valued field: sub-field name to
/// located value, in the element's own key order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMatch {
    /// Ordered (sub-field, located value) pairs.
    pub fields: Vec<(String, LocatedValue)>,
}

impl LineMatch {
    /// Look up one sub-field.
    pub fn get(&self, sub_field: &str) -> Option<&LocatedValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == sub_field)
            .map(|(_, located)| located)
    }
}

impl Serialize for LineMatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ordered_pairs(&self.fields, serializer)
    }
}

/// Matches for one top-level field on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldMatch {
    /// A scalar field: one value with its regions.
    Scalar(LocatedValue),
    /// An array field: one entry per element, in element order.
    Lines(Vec<LineMatch>),
}

/// Everything located on a single page, fields in the invoice object's
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMatch {
    /// Page number, 1-indexed.
    pub page: u32,
    /// Ordered (field, match) pairs.
    #[serde(serialize_with = "ordered_pairs")]
    pub fields: Vec<(String, FieldMatch)>,
}

impl PageMatch {
    /// Look up one field.
    pub fn get(&self, field: &str) -> Option<&FieldMatch> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, matched)| matched)
    }

    /// Whether a field has an entry on this page.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }
}

/// Serialize ordered (key, value) pairs as a JSON object.
fn ordered_pairs<S: Serializer, T: Serialize>(
    pairs: &[(String, T)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (key, value) in pairs {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// The text to search for a leaf value, or `None` when the value has no
/// searchable rendering.
fn needle_for(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Locate every searchable field of the invoice across every page.
///
/// Produces one [`PageMatch`] per page, in page order. Excluded field names
/// are skipped entirely, at any nesting level. Array-valued fields get one
/// entry per element covering each of the element's non-excluded keys. A
/// value that is neither a scalar nor an array of objects fails the whole
/// pass with an unexpected-shape error; no partial results are returned.
pub fn locate(
    invoice: &ExtractedInvoice,
    document: &impl PageSearch,
) -> Result<Vec<PageMatch>, InvexError> {
    let page_count = document.page_count();
    let mut pages = Vec::with_capacity(page_count as usize);

    for page in 1..=page_count {
        let mut fields = Vec::new();

        for (name, value) in invoice.fields() {
            if schema::is_excluded(name) {
                continue;
            }

            let matched = match value {
                Value::Array(elements) => FieldMatch::Lines(locate_elements(
                    name, elements, page, document,
                )?),
                other => {
                    let needle =
                        needle_for(other).ok_or_else(|| ExtractionError::UnexpectedShape {
                            field: name.clone(),
                        })?;
                    let regions = document.search(page, &needle)?;
                    FieldMatch::Scalar(LocatedValue {
                        value: other.clone(),
                        regions,
                    })
                }
            };
            fields.push((name.clone(), matched));
        }

        debug!(page, fields = fields.len(), "Located page");
        pages.push(PageMatch { page, fields });
    }

    Ok(pages)
}

/// Locate each element of an array-valued field on one page.
fn locate_elements(
    field: &str,
    elements: &[Value],
    page: u32,
    document: &impl PageSearch,
) -> Result<Vec<LineMatch>, InvexError> {
    let mut lines = Vec::with_capacity(elements.len());

    for (index, element) in elements.iter().enumerate() {
        let record = element
            .as_object()
            .ok_or_else(|| ExtractionError::UnexpectedShape {
                field: format!("{field}[{index}]"),
            })?;

        let mut entry = Vec::new();
        for (sub_field, sub_value) in record {
            if schema::is_excluded(sub_field) {
                continue;
            }
            let needle =
                needle_for(sub_value).ok_or_else(|| ExtractionError::UnexpectedShape {
                    field: format!("{field}[{index}].{sub_field}"),
                })?;
            let regions = document.search(page, &needle)?;
            entry.push((
                sub_field.clone(),
                LocatedValue {
                    value: sub_value.clone(),
                    regions,
                },
            ));
        }
        lines.push(LineMatch { fields: entry });
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use pretty_assertions::assert_eq;

    /// Stand-in document: fixed page count, each page a set of strings it
    /// "contains"; every hit reports the same unit region.
    struct StubDocument {
        pages: Vec<Vec<&'static str>>,
    }

    impl StubDocument {
        fn new(pages: Vec<Vec<&'static str>>) -> Self {
            Self { pages }
        }
    }

    impl PageSearch for StubDocument {
        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        fn search(&self, page: u32, needle: &str) -> Result<Vec<Region>, PdfError> {
            let content = self
                .pages
                .get((page - 1) as usize)
                .ok_or(PdfError::InvalidPage(page))?;
            if content.contains(&needle) {
                Ok(vec![Region {
                    x0: 0.0,
                    x1: 1.0,
                    top: 0.0,
                    bottom: 1.0,
                }])
            } else {
                Ok(Vec::new())
            }
        }
    }

    fn invoice(raw: &str) -> ExtractedInvoice {
        ExtractedInvoice::from_completion(raw).unwrap()
    }

    #[test]
    fn test_excluded_fields_never_appear() {
        let invoice = invoice(
            r#"{
                "CardCode": "V10000",
                "DiscountPercent": "10.00",
                "DocumentLines": [
                    {"ItemCode": "A00001", "Quantity": "100", "TaxCode": "TAXON", "UnitPrice": "50"}
                ]
            }"#,
        );
        let document = StubDocument::new(vec![vec!["V10000"], vec![]]);

        let pages = locate(&invoice, &document).unwrap();

        for page in &pages {
            assert!(!page.contains("DiscountPercent"));
            let FieldMatch::Lines(lines) = page.get("DocumentLines").unwrap() else {
                panic!("DocumentLines should be an array match");
            };
            for line in lines {
                assert!(line.get("Quantity").is_none());
                assert!(line.get("TaxCode").is_none());
                assert!(line.get("UnitPrice").is_none());
                assert!(line.get("ItemCode").is_some());
            }
        }
    }

    #[test]
    fn test_one_page_match_per_page() {
        let invoice = invoice(r#"{"CardCode": "V10000"}"#);
        let document = StubDocument::new(vec![vec![], vec!["V10000"], vec![]]);

        let pages = locate(&invoice, &document).unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(
            pages.iter().map(|p| p.page).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_array_field_cardinality() {
        let invoice = invoice(
            r#"{"DocumentLines": [
                {"ItemCode": "A00001"},
                {"ItemCode": "A00002"},
                {"ItemCode": "A00003"}
            ]}"#,
        );
        let document = StubDocument::new(vec![vec!["A00002"]]);

        let pages = locate(&invoice, &document).unwrap();
        let FieldMatch::Lines(lines) = pages[0].get("DocumentLines").unwrap() else {
            panic!("expected array match");
        };

        assert_eq!(lines.len(), 3);
        assert!(lines[0].get("ItemCode").unwrap().regions.is_empty());
        assert_eq!(lines[1].get("ItemCode").unwrap().regions.len(), 1);
        assert!(lines[2].get("ItemCode").unwrap().regions.is_empty());
    }

    #[test]
    fn test_no_match_degrades_to_empty_regions() {
        let invoice = invoice(r#"{"CardCode": "V10000", "CardName": "Acme Associates"}"#);
        let document = StubDocument::new(vec![vec![]]);

        let pages = locate(&invoice, &document).unwrap();

        let FieldMatch::Scalar(card_code) = pages[0].get("CardCode").unwrap() else {
            panic!("expected scalar match");
        };
        assert!(card_code.regions.is_empty());
        assert!(pages[0].contains("CardName"));
    }

    #[test]
    fn test_field_order_follows_invoice_order() {
        let invoice = invoice(r#"{"CardName": "Acme", "CardCode": "V10000", "TaxDate": "2024-05-20"}"#);
        let document = StubDocument::new(vec![vec![]]);

        let pages = locate(&invoice, &document).unwrap();
        let names: Vec<&str> = pages[0].fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["CardName", "CardCode", "TaxDate"]);
    }

    #[test]
    fn test_numbers_search_their_rendering() {
        let invoice = invoice(r#"{"DocTotal": 1250}"#);
        let document = StubDocument::new(vec![vec!["1250"]]);

        let pages = locate(&invoice, &document).unwrap();
        let FieldMatch::Scalar(total) = pages[0].get("DocTotal").unwrap() else {
            panic!("expected scalar match");
        };
        assert_eq!(total.regions.len(), 1);
    }

    #[test]
    fn test_null_field_is_unexpected_shape() {
        let invoice = invoice(r#"{"DocDueDate": null}"#);
        let document = StubDocument::new(vec![vec![]]);

        let err = locate(&invoice, &document).unwrap_err();
        assert!(matches!(
            err,
            InvexError::Extraction(ExtractionError::UnexpectedShape { ref field }) if field == "DocDueDate"
        ));
    }

    #[test]
    fn test_nested_object_is_unexpected_shape() {
        let invoice = invoice(r#"{"Vendor": {"CardCode": "V10000"}}"#);
        let document = StubDocument::new(vec![vec![]]);

        let err = locate(&invoice, &document).unwrap_err();
        assert!(matches!(
            err,
            InvexError::Extraction(ExtractionError::UnexpectedShape { ref field }) if field == "Vendor"
        ));
    }

    #[test]
    fn test_array_of_non_objects_is_unexpected_shape() {
        let invoice = invoice(r#"{"DocumentLines": ["A00001"]}"#);
        let document = StubDocument::new(vec![vec![]]);

        let err = locate(&invoice, &document).unwrap_err();
        assert!(matches!(
            err,
            InvexError::Extraction(ExtractionError::UnexpectedShape { ref field })
                if field == "DocumentLines[0]"
        ));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let invoice = invoice(
            r#"{
                "CardCode": "V10000",
                "CardName": "Acme Associates",
                "DocumentLines": [{"ItemCode": "A00001"}]
            }"#,
        );
        let document = StubDocument::new(vec![vec!["V10000", "Acme Associates"]]);

        let pages = locate(&invoice, &document).unwrap();
        assert_eq!(pages.len(), 1);

        let FieldMatch::Scalar(card_code) = pages[0].get("CardCode").unwrap() else {
            panic!("expected scalar match");
        };
        assert_eq!(card_code.value, Value::from("V10000"));
        assert_eq!(card_code.regions.len(), 1);

        let FieldMatch::Scalar(card_name) = pages[0].get("CardName").unwrap() else {
            panic!("expected scalar match");
        };
        assert_eq!(card_name.regions.len(), 1);

        let FieldMatch::Lines(lines) = pages[0].get("DocumentLines").unwrap() else {
            panic!("expected array match");
        };
        assert_eq!(lines.len(), 1);
        assert!(lines[0].get("ItemCode").unwrap().regions.is_empty());
    }

    #[test]
    fn test_serialized_output_shape() {
        let invoice = invoice(r#"{"CardCode": "V10000", "DocumentLines": [{"ItemCode": "A00001"}]}"#);
        let document = StubDocument::new(vec![vec!["V10000"]]);

        let pages = locate(&invoice, &document).unwrap();
        let json = serde_json::to_value(&pages).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{
                "page": 1,
                "fields": {
                    "CardCode": {
                        "value": "V10000",
                        "regions": [{"x0": 0.0, "x1": 1.0, "top": 0.0, "bottom": 1.0}]
                    },
                    "DocumentLines": [
                        {"ItemCode": {"value": "A00001", "regions": []}}
                    ]
                }
            }])
        );
    }
}
