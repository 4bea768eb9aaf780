pub mod llm;
pub mod pdf_extractor;
pub mod structurer;

pub use llm::{ChatCompletionsClient, ChatMessage, CompletionBackend, LlmError, MockBackend};
pub use pdf_extractor::PdfExtractor;
pub use structurer::{Structurer, SYSTEM_INSTRUCTION};
