use std::path::PathBuf;

/// Convenience result alias used across the crate.
pub type CoverResult<T> = Result<T, CoverError>;

/// Kind of external resource a [`CoverError::ResourceNotFound`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    /// Source raster image.
    Image,
    /// CSS-like stylesheet.
    Stylesheet,
    /// Font file.
    Font,
    /// Input directory for batch tools.
    Directory,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Image => "image",
            Self::Stylesheet => "stylesheet",
            Self::Font => "font",
            Self::Directory => "directory",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
/// Top-level error type for coverkit APIs.
pub enum CoverError {
    /// A required input could not be opened or read. Fatal for the current call.
    #[error("{kind} not found: '{}'", path.display())]
    ResourceNotFound {
        /// What was being opened.
        kind: ResourceKind,
        /// Path that failed.
        path: PathBuf,
    },

    /// No usable font could be resolved.
    #[error("font resolution error: {0}")]
    FontResolution(String),

    /// A style property value could not be interpreted.
    #[error("malformed style value for '{property}': '{value}'")]
    MalformedStyleValue {
        /// Property name as written in the stylesheet.
        property: String,
        /// Raw value.
        value: String,
    },

    /// The output image could not be written.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: anyhow::Error,
    },

    /// Input validation failure.
    #[error("validation error: {0}")]
    Validation(String),

    /// Rasterization failure.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoverError {
    /// Build a [`CoverError::ResourceNotFound`].
    pub fn not_found(kind: ResourceKind, path: impl Into<PathBuf>) -> Self {
        Self::ResourceNotFound {
            kind,
            path: path.into(),
        }
    }

    /// Build a [`CoverError::FontResolution`].
    pub fn font(msg: impl Into<String>) -> Self {
        Self::FontResolution(msg.into())
    }

    /// Build a [`CoverError::MalformedStyleValue`].
    pub fn malformed(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedStyleValue {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Build a [`CoverError::Write`].
    pub fn write(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self::Write {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Build a [`CoverError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CoverError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
