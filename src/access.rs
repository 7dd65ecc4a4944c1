//! Injected access policy and admin-URL resolution.
//!
//! No permission logic of its own lives in this crate: menu selection and
//! the `can_edit` filter forward to an [`AccessPolicy`] supplied at engine
//! construction, and editable-region markup asks an [`AdminUrls`] resolver
//! for the edit URL of an entity.

use uuid::Uuid;

use crate::models::{Page, User};

/// A persisted entity that front-end editing tooling may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Page(Uuid),
    ContentItem(Uuid),
}

/// Answers visibility and edit questions for a user.
pub trait AccessPolicy: Send + Sync {
    /// May `user` see `page` in a menu?
    fn can_view(&self, user: &User, page: &Page) -> bool;

    /// May `user` edit `target`?
    fn can_edit(&self, user: &User, target: EditTarget) -> bool;
}

/// Default policy: public pages are visible to everyone, non-public pages
/// only to authenticated users; editing requires an admin.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl AccessPolicy for DefaultPolicy {
    fn can_view(&self, user: &User, page: &Page) -> bool {
        page.public || !user.is_anonymous()
    }

    fn can_edit(&self, user: &User, _target: EditTarget) -> bool {
        user.is_admin
    }
}

/// Resolves the admin edit URL for an entity.
pub trait AdminUrls: Send + Sync {
    fn edit_url(&self, target: EditTarget) -> String;
}

/// Default URL scheme under a configurable base path.
#[derive(Debug, Clone)]
pub struct DefaultAdminUrls {
    base: String,
}

impl DefaultAdminUrls {
    /// Build a resolver rooted at `base` (e.g. "/admin"). A trailing
    /// slash on `base` is tolerated.
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl AdminUrls for DefaultAdminUrls {
    fn edit_url(&self, target: EditTarget) -> String {
        match target {
            EditTarget::Page(id) => format!("{}/pages/{}/edit", self.base, id),
            EditTarget::ContentItem(id) => format!("{}/content/{}/edit", self.base, id),
        }
    }
}
