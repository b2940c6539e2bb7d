use thiserror::Error;

/// Errors originating from the core module.
///
/// Every public operation validates its arguments eagerly and returns one of
/// these before touching any pixel data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Malformed or out-of-range argument.
    #[error("Paramètre invalide `{name}` : {reason}")]
    InvalidParameter {
        /// Name of the offending argument.
        name: &'static str,
        /// What was expected.
        reason: String,
    },

    /// Referenced file does not exist.
    #[error("Fichier introuvable : {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },

    /// File extension outside the allow-list.
    #[error("Format non supporté : {format} (supportés : {supported})")]
    UnsupportedFormat {
        /// The extension that was rejected.
        format: String,
        /// Comma-separated allow-list.
        supported: String,
    },

    /// Frame index outside `[-len, len)`.
    #[error("Index hors limites : {index} (longueur {len})")]
    IndexOutOfRange {
        /// Requested index (may be negative).
        index: isize,
        /// Number of addressable elements.
        len: usize,
    },

    /// Replacement data does not match the target shape.
    #[error("Valeur invalide : {0}")]
    InvalidValue(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidParameter`].
    ///
    /// # Example
    /// ```
    /// use gv_core::error::CoreError;
    /// let e = CoreError::invalid("width", "must be >= 1");
    /// assert!(matches!(e, CoreError::InvalidParameter { name: "width", .. }));
    /// ```
    #[must_use]
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
