use serde::{Deserialize, Serialize};

/// One field-level failure detail.
///
/// `path` holds field-access breadcrumbs from the outermost value inwards,
/// e.g. `["Config", "Address"]`. It is omitted from the JSON form when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    /// Human-readable failure description.
    pub message: String,
    /// Breadcrumbs to the offending field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

impl Validation {
    /// Creates a validation without a path.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    /// Sets the breadcrumbs leading to the offending field.
    #[inline]
    pub fn at<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }
}
