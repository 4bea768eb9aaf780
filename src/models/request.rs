use serde::Deserialize;

/// A file pulled out of the multipart form, before any validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub size: usize,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: String, content: Vec<u8>) -> Self {
        let size = content.len();
        Self {
            name,
            size,
            content,
        }
    }

    /// Extension check is case-insensitive, so `report.PDF` is accepted.
    pub fn has_pdf_extension(&self) -> bool {
        self.name.to_lowercase().ends_with(".pdf")
    }
}

/// Body of `POST /generate`. All three fields are required; they arrive as
/// `Option` so the handler can reject missing ones with a single message
/// instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub user_query: Option<String>,
    pub relevant_text: Option<String>,
    pub health_data: Option<String>,
}
