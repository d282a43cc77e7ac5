//! nomodia-report: Self-contained HTML rendering of assessment reports.
//!
//! Text, Markdown and JSON renderings live on `AssessmentReport` in
//! `nomodia-core`; this crate adds the standalone HTML page.

pub mod html;

pub use html::{generate_html, write_html_report};
