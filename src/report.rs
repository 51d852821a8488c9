//! Console rendering of analysis results.
//!
//! Everything here builds `String`s; callers decide where the text goes.

use std::fmt::Write;

use crate::models::{Field, FieldType, MediaContent};

const RULE_WIDTH: usize = 80;
const MISSING: &str = "(none)";

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Formats a confidence score with exactly three decimals.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.3}", confidence)
}

/// Display text for scalar field types, `None` for containers and unknown types.
pub fn scalar_text(field: &Field) -> Option<String> {
    let text = match field.field_type? {
        FieldType::String => field.value_string.clone(),
        FieldType::Number => field.value_number.as_ref().map(|n| n.to_string()),
        FieldType::Integer => field.value_integer.map(|n| n.to_string()),
        FieldType::Date => field.value_date.clone(),
        FieldType::Time => field.value_time.clone(),
        FieldType::Boolean => field.value_boolean.map(|b| b.to_string()),
        _ => return None,
    };
    Some(text.unwrap_or_else(|| MISSING.to_string()))
}

/// Renders one field and its provenance, without the trailing blank line.
pub fn render_field(name: &str, field: &Field) -> String {
    let mut out = String::new();

    if let Some(text) = scalar_text(field) {
        let _ = writeln!(out, "{}: {}", name, text);
    } else {
        match field.field_type {
            Some(FieldType::Array) => {
                let items = field.value_array.as_deref().unwrap_or_default();
                let _ = writeln!(out, "{} (array with {} items):", name, items.len());
                for (idx, item) in items.iter().enumerate() {
                    render_array_item(&mut out, idx + 1, item);
                }
            }
            Some(FieldType::Object) => {
                let text = field
                    .value_object
                    .as_ref()
                    .map(|object| object.raw.to_string())
                    .unwrap_or_else(|| MISSING.to_string());
                let _ = writeln!(out, "{}: {}", name, text);
            }
            Some(FieldType::Json) => {
                let text = field
                    .value_json
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| MISSING.to_string());
                let _ = writeln!(out, "{}: {}", name, text);
            }
            _ => {}
        }
    }

    render_provenance(&mut out, field, "  ");
    out
}

fn render_array_item(out: &mut String, idx: usize, item: &Field) {
    if item.field_type == Some(FieldType::Object) {
        let _ = writeln!(out, "  Item {}:", idx);
        if let Some(ref object) = item.value_object {
            for (key, val) in object.iter() {
                if let Some(text) = scalar_text(val) {
                    let _ = writeln!(out, "    {}: {}", key, text);
                }
                render_provenance(out, val, "      ");
            }
        }
    } else if let Some(text) = scalar_text(item) {
        let _ = writeln!(out, "  Item {}: {}", idx, text);
    }
}

fn render_provenance(out: &mut String, field: &Field, indent: &str) {
    if let Some(confidence) = field.confidence {
        let _ = writeln!(out, "{}Confidence: {}", indent, format_confidence(confidence));
    }
    if let Some(source) = field.bounding_box() {
        let _ = writeln!(out, "{}Bounding Box: {}", indent, source);
    }
}

/// Renders the "Extracted Fields" section.
pub fn render_fields(content: &MediaContent) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📊 Extracted Fields:");
    let _ = writeln!(out, "{}", rule());

    if content.fields.is_empty() {
        let _ = writeln!(out, "No fields extracted");
    } else {
        for (name, field) in &content.fields {
            out.push_str(&render_field(name, field));
            out.push('\n');
        }
    }
    out.push('\n');
    out
}

/// Renders the "Content Metadata" section.
pub fn render_metadata(content: &MediaContent) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📋 Content Metadata:");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "Kind: {}", content.kind.as_deref().unwrap_or(MISSING));

    if content.is_document() {
        let start = content.start_page_number.unwrap_or(0);
        let end = content.end_page_number.unwrap_or(0);
        let _ = writeln!(out, "Pages: {} - {}", start, end);
        let _ = writeln!(out, "Total pages: {}", end - start + 1);
    }
    out.push('\n');
    out
}

/// Full report for one content block.
pub fn render_content(content: &MediaContent) -> String {
    let mut out = render_fields(content);
    out.push_str(&render_metadata(content));
    out
}
