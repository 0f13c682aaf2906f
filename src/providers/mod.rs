pub mod gemini;

pub use gemini::GeminiExtractor;
