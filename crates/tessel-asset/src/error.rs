use std::fmt;

/// Category of a blob decoding failure.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BlobErrorKind {
    /// The blob ended before a section it declares.
    Truncated,
    /// The first four bytes do not identify the expected blob type.
    BadMagic,
    /// The blob was produced by an incompatible writer.
    UnsupportedVersion,
    /// A section is not aligned for zero-copy access.
    Misaligned,
    /// Header counts or record ranges are inconsistent.
    InvalidLayout,
}

/// A decode or validation error for a mesh or texture blob.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobError {
    pub kind: BlobErrorKind,
    pub detail: &'static str,
    /// Byte offset into the blob, or record index for layout errors.
    pub at: usize,
}

impl BlobError {
    pub(crate) const fn new(kind: BlobErrorKind, detail: &'static str, at: usize) -> Self {
        Self { kind, detail, at }
    }

    pub(crate) const fn truncated(detail: &'static str, at: usize) -> Self {
        Self::new(BlobErrorKind::Truncated, detail, at)
    }

    pub(crate) const fn layout(detail: &'static str, at: usize) -> Self {
        Self::new(BlobErrorKind::InvalidLayout, detail, at)
    }
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            BlobErrorKind::Truncated => "truncated blob",
            BlobErrorKind::BadMagic => "bad magic",
            BlobErrorKind::UnsupportedVersion => "unsupported version",
            BlobErrorKind::Misaligned => "misaligned section",
            BlobErrorKind::InvalidLayout => "invalid layout",
        };
        write!(f, "{kind} at {}: {}", self.at, self.detail)
    }
}

impl std::error::Error for BlobError {}
