use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};

use crate::application::ports::{MediaStore, MediaStoreError, StoredObject};
use crate::domain::StorageName;

/// Durable upload storage on the local filesystem. Writes go through the
/// object store's multipart path so incoming bytes are piped chunk by chunk
/// rather than buffered whole.
pub struct LocalMediaStore {
    inner: Arc<LocalFileSystem>,
    base_dir: PathBuf,
}

impl LocalMediaStore {
    pub fn new(base_dir: PathBuf) -> Result<Self, MediaStoreError> {
        std::fs::create_dir_all(&base_dir).map_err(MediaStoreError::Io)?;
        let base_dir = base_dir.canonicalize().map_err(MediaStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(&base_dir)
            .map_err(|e| MediaStoreError::UploadFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            base_dir,
        })
    }

    fn relative(&self, path: &str) -> Result<StorePath, MediaStoreError> {
        let rel = Path::new(path)
            .strip_prefix(&self.base_dir)
            .map_err(|_| MediaStoreError::NotFound(path.to_string()))?;
        rel.to_str()
            .map(StorePath::from)
            .ok_or_else(|| MediaStoreError::NotFound(path.to_string()))
    }
}

#[async_trait::async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(
        &self,
        name: &StorageName,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<StoredObject, MediaStoreError> {
        let store_path = StorePath::from(name.as_str());
        let mut upload = self
            .inner
            .put_multipart(&store_path)
            .await
            .map_err(|e| MediaStoreError::UploadFailed(e.to_string()))?;

        let mut size_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = upload.abort().await;
                    return Err(MediaStoreError::Io(e));
                }
            };
            size_bytes += bytes.len() as u64;
            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                let _ = upload.abort().await;
                return Err(MediaStoreError::UploadFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| MediaStoreError::UploadFailed(e.to_string()))?;

        let path = self.base_dir.join(name.as_str());
        Ok(StoredObject {
            path: path.to_string_lossy().into_owned(),
            size_bytes,
        })
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>, MediaStoreError> {
        let store_path = self.relative(path)?;
        let result = self
            .inner
            .get(&store_path)
            .await
            .map_err(|e| MediaStoreError::NotFound(e.to_string()))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| MediaStoreError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
