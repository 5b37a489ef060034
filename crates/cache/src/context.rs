use std::collections::BTreeMap;

/// Caller-supplied request context.
///
/// Threaded through every accessor call and recorded on its tracing span.
/// The cache never makes a decision based on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    correlation_id: Option<String>,
    tags: BTreeMap<String, String>,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying the given correlation id.
    #[must_use]
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self { correlation_id: Some(correlation_id.into()), tags: BTreeMap::new() }
    }

    /// Adds a telemetry tag.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }
}
