use std::fmt;

/// Identity of a built container image.
///
/// The tag is a pure function of `(namespace, revision)`, so rebuilding the
/// same revision always produces the same reference and concurrent runs can
/// push without coordination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    namespace: String,
    revision: String,
}

impl ImageReference {
    pub fn new(namespace: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            revision: revision.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Full registry tag, `{namespace}:{revision}`.
    pub fn tag(&self) -> String {
        format!("{}:{}", self.namespace, self.revision)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.revision)
    }
}
