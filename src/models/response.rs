use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// The JSON value returned to the caller as the `data` field.
///
/// The completion model is instructed to answer with clean JSON but is not
/// trusted to: when its output parses, the parsed value is passed through
/// untouched; when it does not, the raw output is wrapped so the caller
/// still receives a well-formed JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredResult {
    /// The model's output was syntactically valid JSON.
    ParsedJson(Value),
    /// The model's output was not JSON; serialized as
    /// `{"extracted_text": <raw output>}`.
    FallbackText(String),
}

impl Serialize for StructuredResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            StructuredResult::ParsedJson(value) => value.serialize(serializer),
            StructuredResult::FallbackText(raw) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("extracted_text", raw)?;
                map.end()
            }
        }
    }
}

/// Success envelope for `POST /upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub data: StructuredResult,
    pub extracted_text: String,
}

impl UploadResponse {
    pub fn new(data: StructuredResult, extracted_text: String) -> Self {
        Self {
            success: true,
            data,
            extracted_text,
        }
    }
}

/// Success envelope for `POST /generate`.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub generated_text: String,
}
