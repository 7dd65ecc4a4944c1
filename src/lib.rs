//! Filament: page-tree navigation menus and content blocks for
//! Tera-templated sites.
//!
//! The crate is presentation glue between a page store and a template
//! engine. Its two jobs:
//!
//! - **Menus**: given a menu name (the title of a top-level page),
//!   select the minimal set of tree nodes needed to render navigation
//!   around the currently viewed page — the route to the current page,
//!   siblings of everything on that route, and the current page's
//!   children — bounded by minimum and maximum levels and filtered by
//!   per-page visibility.
//! - **Content blocks**: fetch the named content fragments attached to a
//!   page, in block order, for rendering inside a page template.
//!
//! Both are exposed through a small tag registry ([`Engine::invoke`])
//! whose built-in tags delegate their markup to overridable Tera
//! templates. Storage, sessions, and permissions are injected
//! capabilities ([`store::PageStore`], [`store::ContentStore`],
//! [`access::AccessPolicy`]); execution is synchronous and
//! request-scoped.

pub mod access;
pub mod content;
pub mod error;
pub mod menu;
pub mod models;
pub mod render;
pub mod settings;
pub mod store;
pub mod tree;

pub use error::{Error, Result};
pub use render::{Engine, RenderContext, Services, TagOutput, TagRegistry};
pub use settings::Settings;
