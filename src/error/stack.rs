//! # ErrorStack: composable error aggregate.
//!
//! An [`ErrorStack`] is created where a failure is detected, enriched by the
//! caller that discovers more detail (validations, child errors), and then
//! handed upwards. Once returned it is treated as sealed.
//!
//! ## Rules
//! - [`ErrorStack::new`] always sets `validations` to an empty vector;
//!   deserializing a body without a `validations` key leaves it `None`.
//! - `with_*` / `push_*` accumulate, they never replace.
//! - The JSON form carries `message` (when non-empty) and `validations`
//!   (when non-empty) only; `subsystem` and `children` are never serialized.
//! - [`ErrorStack::from_error`] flattens: the source is kept as text only.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::Validation;

/// Type-erased error accepted as a child of an [`ErrorStack`].
///
/// This is the error type returned by [`Server`](crate::Server) and
/// [`Dependency`](crate::Dependency) implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Structured error carrying a message, validations and child errors.
///
/// # Example
/// ```
/// use servicevisor::{ErrorStack, Validation};
///
/// let err = ErrorStack::new("Failed to open")
///     .with_subsystem("bucket")
///     .with_validations([Validation::new("not found")]);
///
/// assert_eq!(err.to_string(), "bucket: Failed to open. Reasons:\n    - not found.\n");
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorStack {
    /// Tag of the integration the error originates from (empty = none).
    #[serde(skip)]
    pub subsystem: String,

    /// Top-level description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Field-level failures. `None` only for deserialized values.
    #[serde(default, skip_serializing_if = "no_validations")]
    pub validations: Option<Vec<Validation>>,

    /// Nested errors, rendered after the validations.
    #[serde(skip)]
    pub children: Vec<BoxError>,
}

fn no_validations(validations: &Option<Vec<Validation>>) -> bool {
    validations.as_ref().map_or(true, Vec::is_empty)
}

impl ErrorStack {
    /// Creates a stack with the given message and an empty validation list.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            subsystem: String::new(),
            message: message.into(),
            validations: Some(Vec::new()),
            children: Vec::new(),
        }
    }

    /// Creates a stack whose message is the rendered text of `err`.
    ///
    /// An `ErrorStack` given as source is flattened: its validations and
    /// children only survive as part of the text.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: fmt::Display + ?Sized,
    {
        Self::new(err.to_string())
    }

    /// Like [`from_error`](Self::from_error), returning `None` when there is no error.
    pub fn from_optional_error<E>(err: Option<&E>) -> Option<Self>
    where
        E: fmt::Display + ?Sized,
    {
        err.map(|e| Self::from_error(e))
    }

    /// Tags the stack with the integration it originates from.
    #[inline]
    pub fn with_subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = subsystem.into();
        self
    }

    /// Appends validations, keeping the ones already present.
    #[inline]
    pub fn with_validations<I>(mut self, validations: I) -> Self
    where
        I: IntoIterator<Item = Validation>,
    {
        self.validations
            .get_or_insert_with(Vec::new)
            .extend(validations);
        self
    }

    /// Appends child errors, keeping the ones already present.
    #[inline]
    pub fn with_children<I, E>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<BoxError>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Appends a single validation in place.
    pub fn push_validation(&mut self, validation: Validation) -> &mut Self {
        self.validations
            .get_or_insert_with(Vec::new)
            .push(validation);
        self
    }

    /// Appends a single child error in place.
    pub fn push_child(&mut self, child: impl Into<BoxError>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    #[inline]
    pub fn has_validations(&self) -> bool {
        !no_validations(&self.validations)
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Validations as a slice (empty when unset).
    #[inline]
    pub fn validations(&self) -> &[Validation] {
        self.validations.as_deref().unwrap_or(&[])
    }

    #[inline]
    pub fn children(&self) -> &[BoxError] {
        &self.children
    }
}

impl fmt::Display for ErrorStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.subsystem.is_empty() {
            write!(f, "{}: ", self.subsystem)?;
        }
        write!(f, "{}.", self.message)?;

        if self.has_validations() {
            f.write_str(" Reasons:\n")?;
            for validation in self.validations() {
                write!(f, "    - {}", validation.message)?;
                if validation.path.is_empty() {
                    f.write_str(".\n")?;
                } else {
                    write!(f, "\n      at {}.\n", validation.path.join(" > "))?;
                }
            }
        }

        if self.has_children() {
            f.write_str(" Caused by:\n\n")?;
            for child in &self.children {
                writeln!(f, "- {child}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ErrorStack {}
