//! Decoder options

/// How the EDF+ annotation channel (`"EDF Annotations"`) is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationMode {
    /// Decode it as 16-bit samples like every other channel
    #[default]
    Samples,
    /// Keep its bytes undecoded and leave it out of the table columns.
    /// The channel still appears in the metadata.
    PassThrough,
}

/// Options for [`EdfReader`](crate::EdfReader).
///
/// ```rust
/// use edfframe::{AnnotationMode, DecodeOptions};
///
/// let options = DecodeOptions::default()
///     .validate_header_size(false)
///     .annotations(AnnotationMode::PassThrough);
/// assert!(!options.validates_header_size());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    validate_header_size: bool,
    annotations: AnnotationMode,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            validate_header_size: true,
            annotations: AnnotationMode::Samples,
        }
    }
}

impl DecodeOptions {
    /// Reject files whose declared header size is not `256 + 256 * n_channels`
    pub fn validate_header_size(mut self, enabled: bool) -> Self {
        self.validate_header_size = enabled;
        self
    }

    pub fn annotations(mut self, mode: AnnotationMode) -> Self {
        self.annotations = mode;
        self
    }

    pub fn validates_header_size(&self) -> bool {
        self.validate_header_size
    }

    pub fn annotation_mode(&self) -> AnnotationMode {
        self.annotations
    }
}
