//! Path table filtering.

use indexmap::IndexMap;
use regex::Regex;
use scribe_config::{FilterConfig, REGEX_PREFIX};

use crate::error::{DocsError, DocsResult};
use crate::method::HttpMethod;
use crate::openapi::{PathItem, Response};
use crate::path::{has_wildcard, is_static_asset};

/// An excluded path: exact, or a regular expression.
#[derive(Debug, Clone)]
pub enum PathPattern {
    /// Matches one path exactly.
    Exact(String),
    /// Matches any path the expression finds a match in.
    Regex(Regex),
}

impl PathPattern {
    /// Parse an exclusion entry; `re:` entries are regular expressions.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::InvalidPattern`] if the expression does not compile.
    pub fn parse(entry: &str) -> DocsResult<Self> {
        match entry.strip_prefix(REGEX_PREFIX) {
            Some(pattern) => Regex::new(pattern)
                .map(Self::Regex)
                .map_err(|source| DocsError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                }),
            None => Ok(Self::Exact(entry.to_string())),
        }
    }

    /// Whether `path` is excluded.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == path,
            Self::Regex(regex) => regex.is_match(path),
        }
    }
}

/// Decides which operations reach the document.
///
/// Paths still containing a `*` wildcard are always dropped.
#[derive(Debug, Clone)]
pub struct PathFilter {
    exclude_static_files: bool,
    exclude_paths: Vec<PathPattern>,
    exclude_methods: Vec<HttpMethod>,
    exclude_tags: Vec<String>,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self {
            exclude_static_files: true,
            exclude_paths: Vec::new(),
            exclude_methods: vec![HttpMethod::Options],
            exclude_tags: Vec::new(),
        }
    }
}

impl PathFilter {
    /// A filter that keeps everything except wildcard paths.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            exclude_static_files: false,
            exclude_methods: Vec::new(),
            ..Self::default()
        }
    }

    /// Build from the `[filter]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid `re:` pattern or an unknown method.
    pub fn from_config(config: &FilterConfig) -> DocsResult<Self> {
        Ok(Self {
            exclude_static_files: config.exclude_static_files,
            exclude_paths: config
                .exclude_paths
                .iter()
                .map(|entry| PathPattern::parse(entry))
                .collect::<DocsResult<_>>()?,
            exclude_methods: config
                .exclude_methods
                .iter()
                .map(|method| method.parse())
                .collect::<DocsResult<_>>()?,
            exclude_tags: config.exclude_tags.clone(),
        })
    }

    /// Toggle the static asset heuristic.
    #[must_use]
    pub fn exclude_static_files(mut self, exclude: bool) -> Self {
        self.exclude_static_files = exclude;
        self
    }

    /// Exclude a path (`re:` for a regular expression).
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::InvalidPattern`] if the expression does not compile.
    pub fn exclude_path(mut self, entry: &str) -> DocsResult<Self> {
        self.exclude_paths.push(PathPattern::parse(entry)?);
        Ok(self)
    }

    /// Exclude a method.
    #[must_use]
    pub fn exclude_method(mut self, method: HttpMethod) -> Self {
        self.exclude_methods.push(method);
        self
    }

    /// Exclude operations carrying `tag`.
    #[must_use]
    pub fn exclude_tag(mut self, tag: impl Into<String>) -> Self {
        self.exclude_tags.push(tag.into());
        self
    }

    /// Whether `tag` is excluded.
    pub fn excludes_tag(&self, tag: &str) -> bool {
        self.exclude_tags.iter().any(|t| t == tag)
    }

    /// Whether a whole path is dropped.
    pub fn excludes_path(&self, path: &str) -> bool {
        has_wildcard(path)
            || (self.exclude_static_files && is_static_asset(path))
            || self.exclude_paths.iter().any(|p| p.matches(path))
    }

    /// Apply the filter, then give every surviving operation without
    /// responses a default one.
    pub fn apply(&self, paths: IndexMap<String, PathItem>) -> IndexMap<String, PathItem> {
        paths
            .into_iter()
            .filter(|(path, _)| !self.excludes_path(path))
            .filter_map(|(path, mut item)| {
                for method in HttpMethod::CONCRETE {
                    let Some(operation) = item.take_operation(method) else {
                        continue;
                    };
                    if self.exclude_methods.contains(&method)
                        || operation.tags.iter().any(|tag| self.excludes_tag(tag))
                    {
                        continue;
                    }
                    let mut operation = operation;
                    if operation.responses.is_empty() {
                        operation
                            .responses
                            .insert("default".to_string(), Response::new("Default response"));
                    }
                    item.set_operation(method, operation);
                }
                (!item.is_empty()).then_some((path, item))
            })
            .collect()
    }
}
