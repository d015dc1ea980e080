//! The fixed extraction target: field set, prompt example, exclusion list.
//!
//! The schema is not machine-validated; it is embedded into the instruction
//! as a literal example the completion service is asked to imitate.

use serde_json::{Value, json};

/// Field names that are never searched on a page, at any nesting level.
///
/// Their rendered text (currency symbols, percent signs, thousands
/// separators) rarely matches the PDF's literal formatting closely enough
/// for exact string search.
pub const EXCLUDED_FIELDS: [&str; 4] = ["DiscountPercent", "Quantity", "TaxCode", "UnitPrice"];

/// The scalar fields and the line-item sub-fields, in prompt order, with the
/// hint shown next to each in the instruction.
pub const SCALAR_FIELDS: [(&str, &str); 6] = [
    ("CardCode", "vendor id"),
    ("TaxDate", "keep date format as it is in pdf"),
    ("DocDate", "keep date format as it is in pdf"),
    ("DocDueDate", "keep date format as it is in pdf"),
    ("CardName", "vendor name"),
    ("DiscountPercent", ""),
];

/// Name of the array-valued line-items field.
pub const LINES_FIELD: &str = "DocumentLines";

/// Sub-fields of each line item, in prompt order.
pub const LINE_FIELDS: [&str; 4] = ["ItemCode", "Quantity", "TaxCode", "UnitPrice"];

/// Whether a field name is on the exclusion list.
pub fn is_excluded(field: &str) -> bool {
    EXCLUDED_FIELDS.contains(&field)
}

/// The literal example object embedded in the instruction.
pub fn example_invoice() -> Value {
    json!({
        "CardCode": "V10000",
        "TaxDate": "2024-05-20",
        "DocDate": "2024-05-21",
        "DocDueDate": "2024-06-25",
        "CardName": "Acme Associates",
        "DiscountPercent": "10.00",
        "DocumentLines": [
            {
                "ItemCode": "A00001",
                "Quantity": "100",
                "TaxCode": "TAXON",
                "UnitPrice": "50"
            }
        ]
    })
}
