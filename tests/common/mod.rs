#![allow(dead_code)]

use rust_cu_quickparse::config::Config;
use serde_json::{json, Value};
use std::collections::HashMap;

pub const API_VERSION: &str = "2025-11-01";
pub const OPERATION_PATH: &str = "/contentunderstanding/analyzerResults/op-1";

/// Helper function to create test config pointing at a mock server.
pub fn create_test_config(endpoint: &str, output_dir: &str) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("AZURE_AI_ENDPOINT", endpoint.to_string()),
        ("AZURE_AI_API_KEY", "test-key".to_string()),
        ("OUTPUT_DIR", output_dir.to_string()),
    ]);
    let mut config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    config.poll_interval = std::time::Duration::from_millis(10);
    config
}

pub fn operation_location(base: &str) -> String {
    format!("{}{}?api-version={}", base, OPERATION_PATH, API_VERSION)
}

/// Succeeded prebuilt-invoice result, trimmed to a handful of fields.
pub fn invoice_result() -> Value {
    json!({
        "id": "op-1",
        "status": "Succeeded",
        "result": {
            "analyzerId": "prebuilt-invoice",
            "apiVersion": API_VERSION,
            "createdAt": "2025-11-20T10:15:00Z",
            "warnings": [],
            "contents": [{
                "kind": "document",
                "mimeType": "application/pdf",
                "markdown": "# INVOICE\n\nCONTOSO LTD.",
                "startPageNumber": 1,
                "endPageNumber": 1,
                "fields": {
                    "CustomerName": {
                        "type": "string",
                        "valueString": "MICROSOFT CORPORATION",
                        "confidence": 0.93,
                        "source": "D(1,0.6,1.0,2.1,1.0,2.1,1.2,0.6,1.2)"
                    },
                    "InvoiceDate": {
                        "type": "date",
                        "valueDate": "2019-11-15",
                        "confidence": 0.971
                    },
                    "AmountDue": {
                        "type": "object",
                        "valueObject": {
                            "Amount": {"type": "number", "valueNumber": 610},
                            "CurrencyCode": {"type": "string", "valueString": "USD"}
                        },
                        "confidence": 0.8
                    },
                    "LineItems": {
                        "type": "array",
                        "valueArray": [{
                            "type": "object",
                            "valueObject": {
                                "Description": {
                                    "type": "string",
                                    "valueString": "Consulting Services",
                                    "confidence": 0.9876,
                                    "source": "D(1,1,2,3,2,3,3,1,3)"
                                },
                                "Quantity": {
                                    "type": "number",
                                    "valueNumber": 2,
                                    "confidence": 0.95,
                                    "source": ""
                                }
                            }
                        }]
                    },
                    "SubTotal": {"type": "number", "valueNumber": 100.5}
                }
            }]
        }
    })
}
