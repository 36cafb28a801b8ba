//! HTTP methods as they appear in route declarations.

use std::fmt;
use std::str::FromStr;

use http::Method;
use serde::{Deserialize, Serialize};

use crate::error::DocsError;

/// A documented HTTP method, or the `ALL` wildcard.
///
/// # Example
///
/// ```rust
/// use scribe_docs::HttpMethod;
///
/// assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
/// assert_eq!(HttpMethod::try_from(&http::Method::GET).unwrap(), HttpMethod::Get);
/// assert!(HttpMethod::All.is_all());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
    /// Every concrete method on a path.
    All,
}

impl HttpMethod {
    /// Concrete methods, in path item order.
    pub const CONCRETE: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
            Self::All => "ALL",
        }
    }

    /// Lower-case method name, as used for path item keys and operation ids.
    pub fn as_lower(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
            Self::All => "all",
        }
    }

    /// Whether this is the `ALL` wildcard.
    pub fn is_all(self) -> bool {
        self == Self::All
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "PUT" => Ok(Self::Put),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            "HEAD" => Ok(Self::Head),
            "PATCH" => Ok(Self::Patch),
            "TRACE" => Ok(Self::Trace),
            "ALL" | "*" => Ok(Self::All),
            _ => Err(DocsError::UnknownMethod(s.to_string())),
        }
    }
}

impl TryFrom<&Method> for HttpMethod {
    type Error = DocsError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match *method {
            Method::GET => Ok(Self::Get),
            Method::PUT => Ok(Self::Put),
            Method::POST => Ok(Self::Post),
            Method::DELETE => Ok(Self::Delete),
            Method::OPTIONS => Ok(Self::Options),
            Method::HEAD => Ok(Self::Head),
            Method::PATCH => Ok(Self::Patch),
            Method::TRACE => Ok(Self::Trace),
            _ => Err(DocsError::UnknownMethod(method.to_string())),
        }
    }
}
