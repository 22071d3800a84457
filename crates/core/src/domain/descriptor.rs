// Work Descriptor Domain Model

use super::error::DescriptorError;
use serde::{Deserialize, Serialize};

/// Unit of work decoded from a message body: `{"id": "...", "image_url": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDescriptor {
    pub id: String,
    pub image_url: String,
}

impl WorkDescriptor {
    /// Create a validated descriptor
    ///
    /// # Errors
    /// - `DescriptorError::EmptyField` if `id` or `image_url` is empty
    /// - `DescriptorError::UnsafeName` if `id` or the URL extension would
    ///   escape the artifact directories
    pub fn new(
        id: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Result<Self, DescriptorError> {
        let descriptor = Self {
            id: id.into(),
            image_url: image_url.into(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Decode a message body
    ///
    /// Invalid JSON, missing fields and non-string fields are all reported as
    /// `DescriptorError::Malformed`.
    pub fn from_body(body: &str) -> Result<Self, DescriptorError> {
        let descriptor: WorkDescriptor =
            serde_json::from_str(body).map_err(|e| DescriptorError::Malformed(e.to_string()))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// File extension taken from the URL's trailing segment after the last `.`
    ///
    /// A URL without any `.` yields the whole URL, which `validate` rejects.
    pub fn extension(&self) -> &str {
        self.image_url
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or(&self.image_url)
    }

    /// Name shared by the original and resized artifacts: `{id}.{extension}`
    pub fn artifact_name(&self) -> String {
        format!("{}.{}", self.id, self.extension())
    }

    fn validate(&self) -> Result<(), DescriptorError> {
        if self.id.trim().is_empty() {
            return Err(DescriptorError::EmptyField("id"));
        }
        if self.image_url.trim().is_empty() {
            return Err(DescriptorError::EmptyField("image_url"));
        }
        if !is_safe_component(&self.id) {
            return Err(DescriptorError::UnsafeName {
                field: "id",
                value: self.id.clone(),
            });
        }
        let extension = self.extension();
        if extension.is_empty() || !is_safe_component(extension) {
            return Err(DescriptorError::UnsafeName {
                field: "image_url",
                value: extension.to_string(),
            });
        }
        Ok(())
    }
}

// Artifact names are joined onto the originals/resized directories.
fn is_safe_component(value: &str) -> bool {
    !value.contains('/') && !value.contains('\\') && value != "." && value != ".."
}
