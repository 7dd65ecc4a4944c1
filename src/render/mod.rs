//! Rendering layer: explicit render context, tag registry, and the Tera
//! engine glue.

pub mod context;
pub mod engine;
pub mod registry;

pub use context::RenderContext;
pub use engine::{Engine, Services};
pub use registry::{TagOutput, TagRegistry};

/// HTML-escape a string for safe output.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
