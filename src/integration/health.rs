use crate::error::BoxError;

/// Outcome of a single participant's health check.
///
/// `code` is an HTTP status code. A participant may report a non-200 code
/// with or without an error, and the error is collected independently of
/// the code.
#[derive(Debug)]
pub struct Health {
    pub code: u16,
    pub error: Option<BoxError>,
}

impl Health {
    /// `200 OK`.
    pub const OK: u16 = 200;
    /// `503 Service Unavailable`.
    pub const UNAVAILABLE: u16 = 503;

    /// Health with the given code and no error.
    #[inline]
    pub fn new(code: u16) -> Self {
        Self { code, error: None }
    }

    /// `200` without error.
    #[inline]
    pub fn healthy() -> Self {
        Self::new(Self::OK)
    }

    /// `503` with the given error.
    #[inline]
    pub fn unavailable(error: impl Into<BoxError>) -> Self {
        Self::new(Self::UNAVAILABLE).with_error(error)
    }

    /// Attaches an error.
    #[inline]
    pub fn with_error(mut self, error: impl Into<BoxError>) -> Self {
        self.error = Some(error.into());
        self
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::healthy()
    }
}
