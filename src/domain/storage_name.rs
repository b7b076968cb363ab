use std::fmt;
use std::path::Path;

use uuid::Uuid;

/// Collision-safe storage filename: `{original-basename}-{uuid}{extension}`.
/// Two concurrent uploads sharing an original filename never map to the
/// same storage object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageName(String);

impl StorageName {
    pub fn generate(original_filename: &str) -> Self {
        let path = Path::new(original_filename);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("upload");
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        Self(format!("{}-{}{}", stem, Uuid::new_v4(), extension))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
