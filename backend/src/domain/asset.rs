//! Binary assets attached to posts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest file extension carried over from an upload's original name.
pub const EXTENSION_MAX: usize = 10;

/// Validation errors for [`AssetHandle`] and [`AssetUpload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetValidationError {
    /// Handle was blank.
    EmptyHandle,
    /// Handle contained a path separator or referred to a parent directory.
    UnsafeHandle,
    /// Upload contained no bytes.
    EmptyUpload,
}

impl fmt::Display for AssetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHandle => write!(f, "asset handle must not be empty"),
            Self::UnsafeHandle => write!(f, "asset handle must be a single file name"),
            Self::EmptyUpload => write!(f, "uploaded file must not be empty"),
        }
    }
}

impl std::error::Error for AssetValidationError {}

/// Opaque reference to a stored asset: a single file name inside the asset
/// root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetHandle(String);

impl AssetHandle {
    /// Validate and construct a handle.
    ///
    /// # Examples
    /// ```
    /// use postnest::domain::AssetHandle;
    ///
    /// assert!(AssetHandle::new("1700000000000-0.png").is_ok());
    /// assert!(AssetHandle::new("../etc/passwd").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, AssetValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(AssetValidationError::EmptyHandle);
        }
        if raw == "."
            || raw == ".."
            || raw.contains(['/', '\\', '\0'])
            || raw.trim() != raw
        {
            return Err(AssetValidationError::UnsafeHandle);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for AssetHandle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<AssetHandle> for String {
    fn from(value: AssetHandle) -> Self {
        value.0
    }
}

impl TryFrom<String> for AssetHandle {
    type Error = AssetValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Uploaded file payload. The original name is only used to infer an
/// extension.
#[derive(Clone, PartialEq, Eq)]
pub struct AssetUpload {
    bytes: Vec<u8>,
    original_name: String,
}

impl AssetUpload {
    /// Wrap uploaded bytes; empty payloads are rejected.
    pub fn new(
        bytes: Vec<u8>,
        original_name: impl Into<String>,
    ) -> Result<Self, AssetValidationError> {
        if bytes.is_empty() {
            return Err(AssetValidationError::EmptyUpload);
        }
        Ok(Self {
            bytes,
            original_name: original_name.into(),
        })
    }

    /// Raw file content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Client-supplied file name.
    pub fn original_name(&self) -> &str {
        self.original_name.as_str()
    }

    /// Lower-cased extension of the original name when it is short and
    /// purely alphanumeric; anything else is discarded.
    ///
    /// # Examples
    /// ```
    /// use postnest::domain::AssetUpload;
    ///
    /// let upload = AssetUpload::new(vec![1], "Photo.JPG").expect("upload");
    /// assert_eq!(upload.extension().as_deref(), Some("jpg"));
    /// ```
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.original_name.rsplit_once('.')?;
        if stem.is_empty()
            || ext.is_empty()
            || ext.len() > EXTENSION_MAX
            || !ext.chars().all(|ch| ch.is_ascii_alphanumeric())
        {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Debug for AssetUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetUpload")
            .field("len", &self.bytes.len())
            .field("original_name", &self.original_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", AssetValidationError::EmptyHandle)]
    #[case("..", AssetValidationError::UnsafeHandle)]
    #[case("a/b.png", AssetValidationError::UnsafeHandle)]
    #[case("a\\b.png", AssetValidationError::UnsafeHandle)]
    #[case(" a.png", AssetValidationError::UnsafeHandle)]
    fn unsafe_handles_are_rejected(#[case] raw: &str, #[case] expected: AssetValidationError) {
        assert_eq!(AssetHandle::new(raw), Err(expected));
    }

    #[rstest]
    #[case("photo.png", Some("png"))]
    #[case("archive.tar.GZ", Some("gz"))]
    #[case("noext", None)]
    #[case(".hidden", None)]
    #[case("weird.p?g", None)]
    #[case("long.abcdefghijk", None)]
    fn extension_inference(#[case] name: &str, #[case] expected: Option<&str>) {
        let upload = AssetUpload::new(vec![0xFF], name).expect("non-empty upload");
        assert_eq!(upload.extension().as_deref(), expected);
    }

    #[rstest]
    fn empty_uploads_are_rejected() {
        assert_eq!(
            AssetUpload::new(Vec::new(), "a.png"),
            Err(AssetValidationError::EmptyUpload)
        );
    }
}
