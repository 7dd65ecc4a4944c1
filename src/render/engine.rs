//! Tera engine glue: template loading, suggestion resolution, filters,
//! and the built-in tag set.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result as AnyResult};
use dashmap::DashMap;
use tera::{Tera, Value};
use tracing::debug;
use uuid::Uuid;

use crate::access::{AccessPolicy, AdminUrls, DefaultAdminUrls, DefaultPolicy, EditTarget};
use crate::content;
use crate::error::{Error, Result};
use crate::menu::{self, Expand, MenuEntry, MenuParams};
use crate::models::{Page, User};
use crate::settings::Settings;
use crate::store::{ContentStore, PageStore};
use crate::tree::NavTree;

use super::context::RenderContext;
use super::html_escape;
use super::registry::{TagOutput, TagRegistry, str_arg, uint_arg};

/// Built-in wrapper templates, used when a template directory does not
/// override them.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("menu.html", include_str!("../../templates/menu.html")),
    (
        "content_item.html",
        include_str!("../../templates/content_item.html"),
    ),
    (
        "content_items.html",
        include_str!("../../templates/content_items.html"),
    ),
];

/// Injected collaborators for an [`Engine`].
#[derive(Clone)]
pub struct Services {
    pub pages: Arc<dyn PageStore>,
    pub content: Arc<dyn ContentStore>,
    pub policy: Arc<dyn AccessPolicy>,
    /// Admin URL resolver; when unset, the engine builds a
    /// [`DefaultAdminUrls`] from `Settings::admin_base_url`.
    pub admin_urls: Option<Arc<dyn AdminUrls>>,
}

impl Services {
    /// Services with the default access policy and admin URL scheme.
    pub fn new(pages: Arc<dyn PageStore>, content: Arc<dyn ContentStore>) -> Self {
        Self {
            pages,
            content,
            policy: Arc::new(DefaultPolicy),
            admin_urls: None,
        }
    }

    /// Replace the access policy.
    pub fn with_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the admin URL resolver.
    pub fn with_admin_urls(mut self, admin_urls: Arc<dyn AdminUrls>) -> Self {
        self.admin_urls = Some(admin_urls);
        self
    }
}

/// Rendering engine: Tera templates plus the tag registry, bound to the
/// injected stores and policies.
pub struct Engine {
    tera: Tera,
    registry: TagRegistry<Engine>,
    /// Cache mapping suggestion lists to resolved template names.
    suggestion_cache: DashMap<String, String>,
    services: Services,
    admin_urls: Arc<dyn AdminUrls>,
    settings: Settings,
}

impl Engine {
    /// Create an engine, loading templates from `template_dir` when
    /// given. Built-in wrapper templates fill any gaps, so a directory
    /// only needs the templates it wants to override.
    pub fn new(
        services: Services,
        settings: Settings,
        template_dir: Option<&Path>,
    ) -> AnyResult<Self> {
        let mut tera = match template_dir {
            Some(dir) => {
                let pattern = dir.join("**/*.html");
                let pattern_str = pattern.to_str().context("invalid template directory path")?;
                Tera::new(pattern_str).context("failed to initialize Tera templates")?
            }
            None => Tera::default(),
        };

        for (name, body) in BUILTIN_TEMPLATES {
            if tera.get_template(name).is_err() {
                tera.add_raw_template(name, body)
                    .with_context(|| format!("failed to register built-in template {name}"))?;
            }
        }

        Self::register_filters(&mut tera, services.policy.clone());

        let template_count = tera.get_template_names().count();
        debug!(count = template_count, "loaded templates");

        let admin_urls = services
            .admin_urls
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultAdminUrls::new(&settings.admin_base_url)));

        Ok(Self {
            tera,
            registry: Self::builtin_tags(),
            suggestion_cache: DashMap::new(),
            services,
            admin_urls,
            settings,
        })
    }

    /// Engine with built-in templates only.
    pub fn with_defaults(services: Services, settings: Settings) -> AnyResult<Self> {
        Self::new(services, settings, None)
    }

    /// Register custom Tera filters.
    fn register_filters(tera: &mut Tera, policy: Arc<dyn AccessPolicy>) {
        // Escapes valid JSON for use as an HTML attribute value.
        tera.register_filter(
            "escape_json_for_html",
            |value: &Value, _args: &HashMap<String, Value>| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Ok(Value::String(html_escape(&text)))
            },
        );

        // `{{ entity | can_edit(user=user) }}` — forwards to the injected
        // access policy. Unresolvable entities and missing users answer
        // false rather than failing the render.
        tera.register_filter(
            "can_edit",
            move |value: &Value, args: &HashMap<String, Value>| {
                let user = args
                    .get("user")
                    .and_then(|v| serde_json::from_value::<User>(v.clone()).ok())
                    .unwrap_or_else(User::anonymous);
                let allowed = match edit_target_from_value(value) {
                    Some(target) => policy.can_edit(&user, target),
                    None => false,
                };
                Ok(Value::Bool(allowed))
            },
        );
    }

    /// The built-in tag set.
    fn builtin_tags() -> TagRegistry<Engine> {
        let mut registry = TagRegistry::new();
        registry.register("show_menu", 3..=4, Engine::tag_show_menu);
        registry.register("show_content", 1..=1, Engine::tag_show_content);
        registry.register("show_page_content", 1..=2, Engine::tag_show_page_content);
        registry.register("capture", 2..=2, Engine::tag_capture);
        registry.register("editable_attrs", 1..=1, Engine::tag_editable_attrs);
        registry.register("version", 0..=0, Engine::tag_version);
        registry
    }

    /// Invoke a registered tag by name.
    pub fn invoke(&self, name: &str, args: &[Value], ctx: &RenderContext) -> Result<TagOutput> {
        self.registry.invoke(self, name, args, ctx)
    }

    /// The underlying Tera instance.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Mutable access to Tera (for adding templates at runtime).
    pub fn tera_mut(&mut self) -> &mut Tera {
        &mut self.tera
    }

    /// Clear the template suggestion cache.
    pub fn clear_cache(&self) {
        self.suggestion_cache.clear();
    }

    /// Resolve the first existing template from a list of suggestions,
    /// caching the result.
    fn resolve_template(&self, suggestions: &[String]) -> Option<String> {
        if suggestions.is_empty() {
            return None;
        }

        let cache_key = suggestions.join("|");
        if let Some(cached) = self.suggestion_cache.get(&cache_key) {
            return Some(cached.clone());
        }

        for suggestion in suggestions {
            if self.tera.get_template(suggestion).is_ok() {
                self.suggestion_cache
                    .insert(cache_key, suggestion.clone());
                return Some(suggestion.clone());
            }
        }

        // Don't cache negative results to allow hot-reload.
        None
    }

    /// Tera context seeded from the render context: `user`,
    /// `current_page`, and every bound variable.
    fn base_context(&self, ctx: &RenderContext) -> tera::Context {
        let mut tctx = tera::Context::new();
        tctx.insert("user", ctx.user());
        if let Some(page) = ctx.page() {
            tctx.insert("current_page", page);
        }
        for (name, value) in ctx.vars() {
            tctx.insert(name, value);
        }
        tctx
    }

    // ------------------------------------------------------------------
    // Tag implementations
    // ------------------------------------------------------------------

    fn tag_show_menu(&self, args: &[Value], ctx: &RenderContext) -> Result<TagOutput> {
        let menu_name = str_arg(args, 0, "show_menu")?;
        let min_level = uint_arg(args, 1, "show_menu")?;
        let max_level = uint_arg(args, 2, "show_menu")?;
        let expand = match args.get(3) {
            None | Some(Value::Null) => Expand::None,
            Some(v) => {
                let mode = v.as_str().ok_or_else(|| {
                    Error::InvalidUsage("'show_menu' expects a string expand mode".to_string())
                })?;
                Expand::parse(Some(mode))?
            }
        };

        let params = MenuParams {
            menu_name: menu_name.to_string(),
            min_level,
            max_level,
            expand,
        };
        self.show_menu(ctx, &params).map(TagOutput::Html)
    }

    /// Render a menu: select the needed pages and delegate to the
    /// `menu--<name>` / `menu` template.
    pub fn show_menu(&self, ctx: &RenderContext, params: &MenuParams) -> Result<String> {
        let tree = NavTree::index(self.services.pages.all_pages());
        let selection = menu::select(
            &tree,
            params,
            ctx.page(),
            ctx.user(),
            self.services.policy.as_ref(),
        )?;

        let menu_html = render_menu_list(&selection.entries, ctx.page());

        let mut tctx = self.base_context(ctx);
        tctx.insert("menu_pages", &selection.entries);
        tctx.insert("menu_parent_page", &selection.parent);
        tctx.insert(
            "menu_args",
            &serde_json::json!({
                "menu_name": params.menu_name,
                "min_level": params.min_level,
                "max_level": params.max_level,
                "expand": params.expand.as_str(),
            }),
        );
        tctx.insert("menu_html", &menu_html);

        let template = self
            .resolve_template(&[
                format!("menu--{}.html", slugify(&params.menu_name)),
                "menu.html".to_string(),
            ])
            .unwrap_or_else(|| "menu.html".to_string());

        self.tera.render(&template, &tctx).map_err(Error::from)
    }

    fn tag_show_content(&self, args: &[Value], ctx: &RenderContext) -> Result<TagOutput> {
        let name = str_arg(args, 0, "show_content")?;
        self.show_content(ctx, name).map(TagOutput::Html)
    }

    /// Render a named content item. A missing item renders as an empty
    /// block (after the optional auto-create path).
    pub fn show_content(&self, ctx: &RenderContext, name: &str) -> Result<String> {
        let item = content::named_item(self.services.content.as_ref(), &self.settings, name);

        let mut tctx = self.base_context(ctx);
        tctx.insert("content_item", &item);

        let template = self
            .resolve_template(&[
                format!("content_item--{}.html", slugify(name)),
                "content_item.html".to_string(),
            ])
            .unwrap_or_else(|| "content_item.html".to_string());

        self.tera.render(&template, &tctx).map_err(Error::from)
    }

    fn tag_show_page_content(&self, args: &[Value], ctx: &RenderContext) -> Result<TagOutput> {
        let (page, block_name) = match args {
            [Value::String(block_name)] => {
                let page = ctx.page().cloned().ok_or_else(|| {
                    Error::MissingContext(
                        "'show_page_content' requires the current page in the render context"
                            .to_string(),
                    )
                })?;
                (page, block_name.clone())
            }
            [page_value, block_value] => {
                let page = self.page_from_value(page_value)?;
                let block_name = block_value
                    .as_str()
                    .ok_or_else(|| {
                        Error::InvalidUsage(
                            "'show_page_content' received invalid arguments: expected (page, block_name)"
                                .to_string(),
                        )
                    })?
                    .to_string();
                (page, block_name)
            }
            _ => {
                return Err(Error::InvalidUsage(
                    "'show_page_content' received a page but no block name".to_string(),
                ));
            }
        };

        self.show_page_content(ctx, &page, &block_name)
            .map(TagOutput::Html)
    }

    /// Render the content items of one named block on one page.
    pub fn show_page_content(
        &self,
        ctx: &RenderContext,
        page: &Page,
        block_name: &str,
    ) -> Result<String> {
        let items = content::page_block(self.services.content.as_ref(), page, block_name);

        let mut tctx = self.base_context(ctx);
        tctx.insert("page", page);
        tctx.insert("block_name", block_name);
        tctx.insert("content_items", &items);

        let template = self
            .resolve_template(&["content_items.html".to_string()])
            .unwrap_or_else(|| "content_items.html".to_string());

        self.tera.render(&template, &tctx).map_err(Error::from)
    }

    fn tag_capture(&self, args: &[Value], _ctx: &RenderContext) -> Result<TagOutput> {
        let name = str_arg(args, 0, "capture")?;
        if !is_identifier(name) {
            return Err(Error::InvalidUsage(format!(
                "'capture' requires a valid variable name, got '{name}'"
            )));
        }
        let body = str_arg(args, 1, "capture")?;
        Ok(TagOutput::Bind {
            name: name.to_string(),
            value: Value::String(body.to_string()),
        })
    }

    fn tag_editable_attrs(&self, args: &[Value], _ctx: &RenderContext) -> Result<TagOutput> {
        // An unresolvable value renders nothing rather than failing the
        // surrounding template.
        let Some(target) = args.first().and_then(edit_target_from_value) else {
            return Ok(TagOutput::Html(String::new()));
        };

        let payload = serde_json::json!({
            "url": self.admin_urls.edit_url(target),
        });
        Ok(TagOutput::Html(format!(
            "data-edit='{}'",
            html_escape(&payload.to_string())
        )))
    }

    fn tag_version(&self, _args: &[Value], _ctx: &RenderContext) -> Result<TagOutput> {
        Ok(TagOutput::Html(env!("CARGO_PKG_VERSION").to_string()))
    }

    /// Resolve a tag argument to a stored page: either a page object
    /// (anything carrying an `id`) or a page id string.
    fn page_from_value(&self, value: &Value) -> Result<Page> {
        let id = match value {
            Value::String(s) => Uuid::parse_str(s).ok(),
            Value::Object(obj) => obj
                .get("id")
                .and_then(Value::as_str)
                .and_then(|s| Uuid::parse_str(s).ok()),
            _ => None,
        };
        let id = id.ok_or_else(|| {
            Error::InvalidUsage(
                "'show_page_content' received invalid arguments: expected (page, block_name)"
                    .to_string(),
            )
        })?;

        self.services
            .pages
            .find_page(id)
            .ok_or_else(|| Error::InvalidUsage(format!("'show_page_content': unknown page {id}")))
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("template_count", &self.tera.get_template_names().count())
            .field("tags", &self.registry.len())
            .field("cache_size", &self.suggestion_cache.len())
            .finish()
    }
}

/// Nested `<ul>` markup for the selected entries. Entries arrive in
/// pre-order with levels, so nesting is recovered from level changes.
fn render_menu_list(entries: &[MenuEntry], current: Option<&Page>) -> String {
    if entries.is_empty() {
        return String::new();
    }

    // children[i]: indices whose nearest shallower predecessor is i.
    // A visibility filter can remove a parent while keeping its children,
    // so levels may jump by more than one.
    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
    let mut stack: Vec<usize> = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        while let Some(&top) = stack.last() {
            if entries[top].level >= entry.level {
                stack.pop();
            } else {
                break;
            }
        }
        match stack.last() {
            Some(&parent) => children[parent].push(i),
            None => roots.push(i),
        }
        stack.push(i);
    }

    let mut html = String::new();
    render_menu_level(entries, &children, &roots, current, &mut html);
    html
}

fn render_menu_level(
    entries: &[MenuEntry],
    children: &[Vec<usize>],
    ids: &[usize],
    current: Option<&Page>,
    out: &mut String,
) {
    out.push_str("<ul class=\"menu\">");
    for &i in ids {
        let entry = &entries[i];
        let mut classes: Vec<&str> = Vec::new();
        if current.is_some_and(|c| c.id == entry.page.id) {
            classes.push("active");
        }
        if !children[i].is_empty() {
            classes.push("has-children");
        }
        if classes.is_empty() {
            out.push_str("<li>");
        } else {
            out.push_str(&format!("<li class=\"{}\">", classes.join(" ")));
        }
        out.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            html_escape(&entry.page.path),
            html_escape(&entry.page.title)
        ));
        if !children[i].is_empty() {
            render_menu_level(entries, children, &children[i], current, out);
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}

/// Identify a persisted entity from its serialized template value.
fn edit_target_from_value(value: &Value) -> Option<EditTarget> {
    let obj = value.as_object()?;
    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())?;

    if obj.contains_key("name") && obj.contains_key("html") {
        Some(EditTarget::ContentItem(id))
    } else if obj.contains_key("title") && obj.contains_key("path") {
        Some(EditTarget::Page(id))
    } else {
        None
    }
}

/// Template-name slug for a menu or content-item name.
fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// A usable context variable name: alphanumeric/underscore, not starting
/// with a digit.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
