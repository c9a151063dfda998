//! Error types for gh-demo-seed
//!
//! Every failure is tagged with the layer it came from so callers can
//! classify it without parsing messages. Batch operations reduce many
//! failures into a single [`PartialFailureError`].

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Origin of a [`LayeredError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// GitHub GraphQL or REST failure
    Api,
    /// Bad input caught before any network call
    Validation,
    /// Reading a file from disk failed
    File,
    /// A config file could not be parsed or is invalid
    Config,
    /// Project board operations
    Project,
    /// Cancellation or deadline expiry
    Context,
}

impl Layer {
    /// Get the stable string form of this layer
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Api => "api",
            Layer::Validation => "validation",
            Layer::File => "file",
            Layer::Config => "config",
            Layer::Project => "project",
            Layer::Context => "context",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error tagged with its origin layer and the operation that failed
#[derive(Debug)]
pub struct LayeredError {
    pub layer: Layer,
    pub operation: String,
    pub message: String,
    cause: Option<BoxedCause>,
    context: BTreeMap<String, String>,
}

impl LayeredError {
    pub fn new(layer: Layer, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            layer,
            operation: operation.into(),
            message: message.into(),
            cause: None,
            context: BTreeMap::new(),
        }
    }

    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Layer::Api, operation, message)
    }

    pub fn validation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Layer::Validation, operation, message)
    }

    pub fn file(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Layer::File, operation, message)
    }

    pub fn config(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Layer::Config, operation, message)
    }

    pub fn context(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Layer::Context, operation, message)
    }

    /// Project-layer error caused by missing permissions
    pub fn permission(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Layer::Project, operation, message).with_context("kind", "permission")
    }

    /// Attach the underlying error
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Attach a diagnostic key/value pair
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Diagnostic key/value pairs, sorted by key
    pub fn context_map(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    pub fn is_permission(&self) -> bool {
        self.layer == Layer::Project
            && self.context.get("kind").map(String::as_str) == Some("permission")
    }
}

impl fmt::Display for LayeredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error in {}: {}", self.layer, self.operation, self.message)?;
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, " [{}]", pairs.join(", "))?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for LayeredError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// A batch operation where at least two items failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialFailureError {
    pub messages: Vec<String>,
}

impl fmt::Display for PartialFailureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "some items failed:")?;
        for message in &self.messages {
            write!(f, "\n  - {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for PartialFailureError {}

/// Main error type for gh-demo-seed
#[derive(Error, Debug)]
pub enum SeedError {
    #[error(transparent)]
    Layered(#[from] LayeredError),

    /// A lookup succeeded but returned nothing
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error(transparent)]
    PartialFailure(#[from] PartialFailureError),
}

impl SeedError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        SeedError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Layer of this error, if it is a layered error
    pub fn layer(&self) -> Option<Layer> {
        match self {
            SeedError::Layered(e) => Some(e.layer),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SeedError::NotFound { .. })
    }
}

impl From<octocrab::Error> for SeedError {
    fn from(err: octocrab::Error) -> Self {
        crate::github::error_handler::classify_github_error(err, "github request").into()
    }
}

/// Result type alias using SeedError
pub type Result<T> = std::result::Result<T, SeedError>;
