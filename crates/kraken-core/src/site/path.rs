//! Request path splitting and hidden-segment detection.

/// The path component of a request, split into segments.
///
/// Empty segments (`//`) are dropped. A trailing slash, or the bare root,
/// marks the path as naming a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
    directory: bool,
}

impl RequestPath {
    /// Parses a URI path such as `/lorem/ipsum/`.
    ///
    /// Returns `None` when a segment can never name a file under the site:
    /// `.`, `..`, or anything containing a backslash or NUL.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let directory = trimmed.is_empty() || trimmed.ends_with('/');
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                continue;
            }
            if !is_resolvable(segment) {
                return None;
            }
            segments.push(segment.to_string());
        }
        Some(Self {
            segments,
            directory,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True for `/` and for paths ending in `/`.
    pub fn is_directory(&self) -> bool {
        self.directory
    }

    /// True if any segment is dot-prefixed.
    pub fn is_hidden(&self) -> bool {
        self.segments.iter().any(|s| s.starts_with('.'))
    }

    /// The rest of the path when its first segment equals `prefix`.
    pub fn strip_prefix(&self, prefix: &str) -> Option<RequestPath> {
        let (first, rest) = self.segments.split_first()?;
        if first != prefix {
            return None;
        }
        Some(RequestPath {
            segments: rest.to_vec(),
            directory: self.directory,
        })
    }

    /// Canonical key without the leading slash: `hello/`, `lorem/ipsum`,
    /// or the empty string for the root.
    pub fn key(&self) -> String {
        let mut key = self.segments.join("/");
        if self.directory && !key.is_empty() {
            key.push('/');
        }
        key
    }
}

fn is_resolvable(segment: &str) -> bool {
    segment != "." && segment != ".." && !segment.contains(['\\', '\0'])
}
