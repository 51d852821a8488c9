use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ============ Operation Models ============

/// Handle to a long-running analysis started on the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOperation {
    /// URL to poll, taken from the `Operation-Location` response header.
    pub operation_location: String,
    /// Service request id, when the service returned one.
    pub request_id: Option<String>,
}

/// Status of an analysis operation as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl OperationStatus {
    /// Parses the `status` field, ignoring case.
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "notstarted" => OperationStatus::NotStarted,
            "running" => OperationStatus::Running,
            "succeeded" => OperationStatus::Succeeded,
            "failed" => OperationStatus::Failed,
            _ => OperationStatus::Unknown,
        }
    }
}

// ============ Analysis Result Models ============

/// Body returned by polling an analysis operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub id: Option<String>,
    pub status: Option<String>,
    pub result: Option<AnalyzeResult>,
}

impl AnalyzeResponse {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

/// Payload of a completed analysis.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    pub analyzer_id: Option<String>,
    pub api_version: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub warnings: Vec<Value>,
    #[serde(default)]
    pub contents: Vec<MediaContent>,
}

/// One analyzed piece of content (a document, a page range, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContent {
    pub kind: Option<String>,
    pub mime_type: Option<String>,
    pub markdown: Option<String>,
    /// Extracted fields, in the order the service returned them.
    #[serde(default)]
    pub fields: IndexMap<String, Field>,
    pub start_page_number: Option<i64>,
    pub end_page_number: Option<i64>,
}

impl MediaContent {
    pub fn is_document(&self) -> bool {
        self.kind.as_deref() == Some("document")
    }
}

/// Type discriminator of an extracted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Date,
    Time,
    Boolean,
    Array,
    Object,
    Json,
    #[serde(other)]
    Other,
}

/// An extracted field value with its provenance.
///
/// Only the `value*` member matching `field_type` is expected to be set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    pub value_string: Option<String>,
    /// Kept as a JSON number so integers and decimals print as received.
    pub value_number: Option<serde_json::Number>,
    pub value_integer: Option<i64>,
    pub value_date: Option<String>,
    pub value_time: Option<String>,
    pub value_boolean: Option<bool>,
    pub value_array: Option<Vec<Field>>,
    pub value_object: Option<ObjectValue>,
    pub value_json: Option<Value>,
    pub confidence: Option<f64>,
    /// Bounding box encoding, e.g. `D(1,0.5,1.2,...)`.
    pub source: Option<String>,
}

impl Field {
    /// Source string, if present and non-empty.
    pub fn bounding_box(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.is_empty())
    }
}

/// Members of an `object` field, typed, plus the JSON exactly as the service sent it.
#[derive(Debug, Clone, Default)]
pub struct ObjectValue {
    pub fields: IndexMap<String, Field>,
    pub raw: Value,
}

impl ObjectValue {
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Field> {
        self.fields.iter()
    }
}

impl<'de> Deserialize<'de> for ObjectValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let fields =
            IndexMap::<String, Field>::deserialize(&raw).map_err(serde::de::Error::custom)?;
        Ok(Self { fields, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_status_parse_ignores_case() {
        assert_eq!(OperationStatus::parse("Succeeded"), OperationStatus::Succeeded);
        assert_eq!(OperationStatus::parse("FAILED"), OperationStatus::Failed);
        assert_eq!(OperationStatus::parse("NotStarted"), OperationStatus::NotStarted);
        assert_eq!(OperationStatus::parse("running"), OperationStatus::Running);
        assert_eq!(OperationStatus::parse("Canceled"), OperationStatus::Unknown);
    }

    #[test]
    fn test_deserialize_preserves_field_order_and_types() {
        let value = json!({
            "id": "op-1",
            "status": "Succeeded",
            "result": {
                "analyzerId": "prebuilt-invoice",
                "contents": [{
                    "kind": "document",
                    "startPageNumber": 1,
                    "endPageNumber": 2,
                    "fields": {
                        "VendorName": {"type": "string", "valueString": "Contoso"},
                        "AmountDue": {"type": "number", "valueNumber": 610},
                        "InvoiceDate": {"type": "date", "valueDate": "2019-11-15"},
                        "Signature": {"type": "signature"}
                    }
                }]
            }
        });

        let response = AnalyzeResponse::from_value(&value).unwrap();
        let content = &response.result.unwrap().contents[0];
        let names: Vec<&str> = content.fields.keys().map(String::as_str).collect();
        assert_eq!(names, ["VendorName", "AmountDue", "InvoiceDate", "Signature"]);
        assert_eq!(content.fields["AmountDue"].field_type, Some(FieldType::Number));
        assert_eq!(content.fields["Signature"].field_type, Some(FieldType::Other));
        assert!(content.is_document());
    }

    #[test]
    fn test_object_value_keeps_raw_json() {
        let field: Field = serde_json::from_value(json!({
            "type": "object",
            "valueObject": {
                "Amount": {
                    "type": "number",
                    "valueNumber": 610,
                    "spans": [{"offset": 1, "length": 3}],
                    "confidence": 0.9
                }
            }
        }))
        .unwrap();

        let object = field.value_object.unwrap();
        assert_eq!(object.fields["Amount"].field_type, Some(FieldType::Number));
        assert_eq!(object.raw["Amount"]["spans"][0]["length"], 3);
    }

    #[test]
    fn test_empty_source_has_no_bounding_box() {
        let field: Field = serde_json::from_value(json!({"type": "string", "source": ""})).unwrap();
        assert_eq!(field.bounding_box(), None);
    }
}
