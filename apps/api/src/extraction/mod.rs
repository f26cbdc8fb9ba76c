// Profile extraction: raw job-description / résumé text → structured fields.
// Model output is parsed leniently; anything unusable falls back to heuristics.

pub mod extractor;
pub mod heuristics;
pub mod prompts;

pub use extractor::{JobDescription, Resume, TextExtractor};
