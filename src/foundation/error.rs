/// Convenience result type used across posterkit.
pub type PosterResult<T> = Result<T, PosterError>;

/// Top-level error taxonomy used by build, render and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// No template was selected and no file was uploaded.
    #[error("no images selected: choose a template or upload a background image")]
    NoSourcesSelected,

    /// The caption box is empty (or contains only blank lines).
    #[error("no caption provided: enter at least one caption, one per line")]
    NoCaptionProvided,

    /// An image source could not be read or decoded.
    #[error("image load error: '{name}': {reason}")]
    ImageLoad {
        /// Source name as shown to the user.
        name: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// Every caption paired with a source was whitespace-only.
    #[error("no renderable entries: every paired caption is blank")]
    NoRenderableEntries,

    /// The archive-packing capability is not available.
    #[error("export unavailable: archive packer is not loaded")]
    ExportUnavailable,

    /// No configured font face could draw a non-blank caption.
    #[error("font unavailable: no configured face can draw '{font}' or its fallbacks")]
    FontUnavailable {
        /// Family assigned to the entry.
        font: String,
    },

    /// Export produced no files or packing failed.
    #[error("export error: {0}")]
    Export(String),

    /// Invalid configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation was superseded by a newer build.
    #[error("cancelled: build was superseded")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    /// Build a [`PosterError::ImageLoad`] value.
    pub fn image_load(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ImageLoad {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`PosterError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`PosterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Return `true` for errors raised before any work starts (bad user input).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NoSourcesSelected | Self::NoCaptionProvided | Self::Validation(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
