//! Request descriptors.
//!
//! A [`RequestDescriptor`] describes one logical REST operation independently
//! of the host it is sent to, so the executor can replay it unchanged against
//! every candidate host.

use std::fmt;

use serde_json::Value;
use url::form_urlencoded;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Success predicate applied to a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expect {
    /// Any 2xx status.
    #[default]
    AnySuccess,
    /// Exactly this status.
    Status(u16),
}

impl Expect {
    /// Check a response status against the predicate.
    #[must_use]
    pub const fn matches(self, status: u16) -> bool {
        match self {
            Self::AnySuccess => matches!(status, 200..=299),
            Self::Status(expected) => status == expected,
        }
    }
}

/// One logical REST operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    target: String,
    body: Option<Value>,
    expect: Expect,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` on `target`.
    ///
    /// `target` is relative to the API root, e.g. `servers/db1`.
    #[must_use]
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            body: None,
            expect: Expect::default(),
        }
    }

    /// A `GET` request.
    #[must_use]
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    /// A `PUT` request.
    #[must_use]
    pub fn put(target: impl Into<String>) -> Self {
        Self::new(Method::Put, target)
    }

    /// A `POST` request.
    #[must_use]
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::Post, target)
    }

    /// A `PATCH` request.
    #[must_use]
    pub fn patch(target: impl Into<String>) -> Self {
        Self::new(Method::Patch, target)
    }

    /// A `DELETE` request.
    #[must_use]
    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::Delete, target)
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Replace the success predicate.
    #[must_use]
    pub const fn expecting(mut self, expect: Expect) -> Self {
        self.expect = expect;
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Target relative to the API root.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// JSON body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Success predicate.
    #[must_use]
    pub const fn expect(&self) -> Expect {
        self.expect
    }
}

/// Builds a target path from raw segments and query pairs.
///
/// Every segment and query value is percent-encoded, so user input can never
/// inject extra path components or query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl Target {
    /// Start a target from its first segment.
    #[must_use]
    pub fn new(segment: &str) -> Self {
        Self::default().segment(segment)
    }

    /// Append a path segment.
    #[must_use]
    pub fn segment(mut self, segment: &str) -> Self {
        self.segments.push(encode_segment(segment));
        self
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Render the target string.
    #[must_use]
    pub fn build(&self) -> String {
        let mut target = self.segments.join("/");
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            target.push('?');
            target.push_str(&query);
        }
        target
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

// form encoding turns spaces into '+', which is literal inside a path
fn encode_segment(segment: &str) -> String {
    // byte_serialize keeps '.', and URL parsers resolve dot segments away
    if matches!(segment, "." | "..") {
        return segment.replace('.', "%2E");
    }
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
