//! Tag registry: explicit dispatch from tag name to rendering function.
//!
//! Each tag is a function `(host, args, context) -> Html | Bind`. The
//! registry validates the tag name and argument count before invocation,
//! so individual tags only deal with argument types. `H` is the host
//! capability handed to every tag (the engine, for the built-in set).

use std::collections::HashMap;
use std::ops::RangeInclusive;

use tera::Value;

use crate::error::{Error, Result};

use super::context::RenderContext;

/// What a tag produces.
#[derive(Debug, Clone, PartialEq)]
pub enum TagOutput {
    /// An HTML fragment to splice into the surrounding output.
    Html(String),
    /// A variable binding for the render context; produces no output.
    Bind { name: String, value: Value },
}

type TagFn<H> = Box<dyn Fn(&H, &[Value], &RenderContext) -> Result<TagOutput> + Send + Sync>;

struct TagDef<H> {
    arity: RangeInclusive<usize>,
    func: TagFn<H>,
}

/// Registry of tag functions keyed by name.
pub struct TagRegistry<H> {
    tags: HashMap<String, TagDef<H>>,
}

impl<H> TagRegistry<H> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tags: HashMap::new(),
        }
    }

    /// Register a tag with its accepted argument count range.
    pub fn register<F>(&mut self, name: &str, arity: RangeInclusive<usize>, func: F)
    where
        F: Fn(&H, &[Value], &RenderContext) -> Result<TagOutput> + Send + Sync + 'static,
    {
        self.tags.insert(
            name.to_string(),
            TagDef {
                arity,
                func: Box::new(func),
            },
        );
    }

    /// Invoke a tag, validating name and arity first.
    pub fn invoke(
        &self,
        host: &H,
        name: &str,
        args: &[Value],
        ctx: &RenderContext,
    ) -> Result<TagOutput> {
        let def = self
            .tags
            .get(name)
            .ok_or_else(|| Error::InvalidUsage(format!("unknown tag '{name}'")))?;

        if !def.arity.contains(&args.len()) {
            return Err(Error::InvalidUsage(format!(
                "'{name}' takes {} to {} arguments, got {}",
                def.arity.start(),
                def.arity.end(),
                args.len()
            )));
        }

        (def.func)(host, args, ctx)
    }

    /// Number of registered tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<H> Default for TagRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// A required string argument.
pub(crate) fn str_arg<'a>(args: &'a [Value], idx: usize, tag: &str) -> Result<&'a str> {
    args.get(idx).and_then(Value::as_str).ok_or_else(|| {
        Error::InvalidUsage(format!("'{tag}' expects a string as argument {}", idx + 1))
    })
}

/// A required non-negative integer argument.
pub(crate) fn uint_arg(args: &[Value], idx: usize, tag: &str) -> Result<u32> {
    args.get(idx)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            Error::InvalidUsage(format!(
                "'{tag}' expects a non-negative integer as argument {}",
                idx + 1
            ))
        })
}
