pub mod names;
pub mod parser;
pub mod pipeline;
pub mod recognizer;

pub use names::SubstitutionTable;
pub use parser::{extract_digits, split_name, LineParser};
pub use pipeline::{OrderPipeline, OrderResult, PipelineError};
pub use recognizer::{default_backend, NoEngine, OcrBackend, OcrError, PresetText};
