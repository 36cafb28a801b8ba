//! Path template utilities.
//!
//! Routers declare parameters as `:name`, optionally followed by an inline
//! `{pattern}` constraint and a `?` marking the segment optional. Documents
//! use `{name}` placeholders instead.

use crate::method::HttpMethod;

/// Rewrite router parameters to OpenAPI placeholders.
///
/// # Example
///
/// ```rust
/// use scribe_docs::normalize_path;
///
/// assert_eq!(normalize_path("/:id{[0-9]+}"), "/{id}");
/// assert_eq!(normalize_path("/:url{.*}?"), "/{url}");
/// assert_eq!(normalize_path("/users/:id/posts"), "/users/{id}/posts");
/// ```
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();
    let mut segment_start = true;

    while let Some(c) = chars.next() {
        if c == ':' && segment_start {
            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                if next == '{' || next == '?' || next == '/' {
                    break;
                }
                name.push(next);
                chars.next();
            }
            if chars.peek() == Some(&'{') {
                skip_constraint(&mut chars);
            }
            if chars.peek() == Some(&'?') {
                chars.next();
            }
            out.push('{');
            out.push_str(&name);
            out.push('}');
            segment_start = false;
            continue;
        }
        segment_start = c == '/';
        out.push(c);
    }

    out
}

/// Consume a balanced `{...}` group. Constraints may themselves contain
/// braces (`{[0-9]{4}}`) and slashes.
fn skip_constraint(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    let mut depth = 0usize;
    for c in chars.by_ref() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return;
                }
            }
            _ => {}
        }
    }
}

/// Default operation id for a normalized path.
///
/// # Example
///
/// ```rust
/// use scribe_docs::{operation_id_for, HttpMethod};
///
/// assert_eq!(operation_id_for(HttpMethod::Get, "/"), "getIndex");
/// assert_eq!(operation_id_for(HttpMethod::Get, "/users/{id}"), "getUsersById");
/// assert_eq!(operation_id_for(HttpMethod::Post, "/user-profiles"), "postUserProfiles");
/// ```
pub fn operation_id_for(method: HttpMethod, path: &str) -> String {
    let mut id = method.as_lower().to_string();
    let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();

    if segments.peek().is_none() {
        id.push_str("Index");
        return id;
    }

    for segment in segments {
        if let Some(name) = placeholder(segment) {
            id.push_str("By");
            push_words(&mut id, name);
        } else {
            push_words(&mut id, segment);
        }
    }
    id
}

fn push_words(out: &mut String, text: &str) {
    for word in text.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

/// Names of the `{name}` placeholders in a normalized path, in order.
pub fn path_parameter_names(path: &str) -> Vec<String> {
    path.split('/')
        .filter_map(placeholder)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether the final segment names a file (`/favicon.ico`).
pub fn is_static_asset(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or_default();
    !last.starts_with('{') && !last.starts_with(':') && last.contains('.')
}

/// Whether the path still contains a router wildcard.
pub fn has_wildcard(path: &str) -> bool {
    path.contains('*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_plain() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/users"), "/users");
        assert_eq!(normalize_path("/users/{id}"), "/users/{id}");
    }

    #[test]
    fn test_normalize_constraints() {
        assert_eq!(normalize_path("/:id{[0-9]+}"), "/{id}");
        assert_eq!(normalize_path("/:url{.*}?"), "/{url}");
        assert_eq!(normalize_path("/posts/:year{[0-9]{4}}/:slug"), "/posts/{year}/{slug}");
        assert_eq!(normalize_path("/files/:path{.+/.+}"), "/files/{path}");
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_path("/api/:version?/users"), "/api/{version}/users");
    }

    #[test]
    fn test_colon_inside_segment_kept() {
        assert_eq!(normalize_path("/v1/items:batch"), "/v1/items:batch");
    }

    #[test]
    fn test_operation_ids() {
        assert_eq!(operation_id_for(HttpMethod::Get, "/"), "getIndex");
        assert_eq!(operation_id_for(HttpMethod::Delete, ""), "deleteIndex");
        assert_eq!(operation_id_for(HttpMethod::Get, "/users/{id}"), "getUsersById");
        assert_eq!(
            operation_id_for(HttpMethod::Put, "/user-profiles/{profile_id}/avatar"),
            "putUserProfilesByProfileIdAvatar"
        );
        assert_eq!(operation_id_for(HttpMethod::Get, "/v1.2/status"), "getV12Status");
    }

    #[test]
    fn test_path_parameter_names() {
        assert_eq!(
            path_parameter_names("/orgs/{org}/repos/{repo}"),
            vec!["org".to_string(), "repo".to_string()]
        );
        assert!(path_parameter_names("/health").is_empty());
    }

    #[test]
    fn test_static_assets() {
        assert!(is_static_asset("/favicon.ico"));
        assert!(is_static_asset("/assets/app.min.js"));
        assert!(!is_static_asset("/v1.0/users"));
        assert!(!is_static_asset("/files/{name}"));
        assert!(!is_static_asset("/"));
    }

    #[test]
    fn test_wildcards() {
        assert!(has_wildcard("/static/*"));
        assert!(!has_wildcard("/users/{id}"));
    }

    proptest! {
        #[test]
        fn normalized_parameters_lose_constraints(
            name in "[a-z][a-z0-9_]{0,8}",
            constraint in "[0-9a-z+.*]{0,6}",
            optional in any::<bool>(),
        ) {
            let marker = if optional { "?" } else { "" };
            let path = format!("/items/:{name}{{{constraint}}}{marker}/detail");
            prop_assert_eq!(normalize_path(&path), format!("/items/{{{name}}}/detail"));
        }

        #[test]
        fn normalization_is_idempotent(path in "(/(:?[a-z]{1,5}|\\{[a-z]{1,5}\\}))*") {
            let once = normalize_path(&path);
            prop_assert_eq!(normalize_path(&once), once);
        }

        #[test]
        fn operation_ids_are_alphanumeric(path in "(/[a-zA-Z0-9_.{}-]{0,8}){0,4}") {
            let id = operation_id_for(HttpMethod::Patch, &path);
            prop_assert!(id.starts_with("patch"));
            prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
