//! Instruction builder for the field-extraction request.

use std::fmt::Write;

use crate::models::schema::{LINE_FIELDS, LINES_FIELD, SCALAR_FIELDS, example_invoice};

/// Build the extraction instruction.
///
/// The instruction has the same structure whether or not raw text is
/// supplied; image-based requests use it without embedded text and rely on
/// the image parts as content.
pub fn build_instruction(text: Option<&str>) -> String {
    let mut instruction = String::new();

    if let Some(text) = text {
        instruction.push_str(text);
        instruction.push('\n');
    }

    instruction.push_str("Extract the following data from this invoice text:\n\n");

    let mut number = 0;
    for (field, hint) in SCALAR_FIELDS {
        number += 1;
        if hint.is_empty() {
            let _ = writeln!(instruction, "{number}. {field}");
        } else {
            let _ = writeln!(instruction, "{number}. {field} ({hint})");
        }
    }
    let _ = writeln!(instruction, "{}. {} (array of line items)", number + 1, LINES_FIELD);
    for sub_field in LINE_FIELDS {
        let _ = writeln!(instruction, "   - {sub_field}");
    }

    instruction.push_str(
        "\nReturn the data in the following JSON format, and ensure the data is accurate and formatted correctly.\n",
    );
    let example = serde_json::to_string_pretty(&example_invoice())
        .expect("example invoice serializes");
    instruction.push_str(&example);
    instruction.push_str(
        "\nGive me strictly in JSON format, don't include any unnecessary headings, newline characters, or \\ before inverted commas.",
    );

    instruction
}
