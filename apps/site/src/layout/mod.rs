// Document typesetting: word wrap, pagination and PDF output for the
// downloadable primer and whitepaper.
// Layout is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod content;
pub mod document;
pub mod engine;
pub mod font_metrics;
pub mod handlers;
pub mod pdf;
pub mod wrap;

pub use content::DocumentLibrary;
pub use engine::LayoutConfig;
