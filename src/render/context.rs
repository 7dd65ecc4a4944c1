//! Explicit, immutable render context.
//!
//! Tags never mutate shared state: each receives the context by
//! reference and returns either HTML or a binding, and the host applies
//! bindings by deriving a new context. This keeps the data flow through a
//! template render auditable.

use std::collections::BTreeMap;

use tera::Value;

use crate::models::{Page, User};

use super::registry::TagOutput;

/// Per-request render context: the viewing user, the page being viewed
/// (if any), and named variables bound during the render.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    user: User,
    page: Option<Page>,
    vars: BTreeMap<String, Value>,
}

impl RenderContext {
    /// Context for a render on behalf of `user`.
    pub fn new(user: User) -> Self {
        Self {
            user,
            page: None,
            vars: BTreeMap::new(),
        }
    }

    /// Context for a render with no session (anonymous user).
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Derive a context with the currently viewed page set.
    pub fn with_page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    /// Derive a context with one more variable bound.
    pub fn with_var(&self, name: &str, value: Value) -> Self {
        let mut next = self.clone();
        next.vars.insert(name.to_string(), value);
        next
    }

    /// Apply a tag output: bindings derive a new context, HTML leaves the
    /// context untouched and is returned to the caller.
    pub fn apply(&self, output: TagOutput) -> (Self, String) {
        match output {
            TagOutput::Html(html) => (self.clone(), html),
            TagOutput::Bind { name, value } => (self.with_var(&name, value), String::new()),
        }
    }

    /// The viewing user.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// The currently viewed page, if any.
    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// A bound variable.
    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// All bound variables, in name order.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}
