/// Image file storage
///
/// Uploaded image bytes are written as individual files under a
/// configurable storage root and referenced from listings by filename.
/// Files are served read-only by the API under the `/images` path prefix.
///
/// Deletion is best-effort: a missing file is a no-op and I/O failures are
/// logged and swallowed. A failed deletion leaves an orphaned file but
/// never fails the listing operation.
///
/// # Example
///
/// ```no_run
/// use carfolio_shared::storage::ImageStore;
///
/// # async fn example() -> std::io::Result<()> {
/// let store = ImageStore::new("./images");
/// store.ensure_root().await?;
///
/// let filename = store.store(b"...jpeg bytes...").await?;
/// let url = ImageStore::url_for("http://localhost:8080", &filename);
///
/// store.delete(&filename).await; // best-effort
/// # Ok(())
/// # }
/// ```

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Maximum number of images accepted per listing
///
/// Images beyond this count in a single request are silently dropped.
pub const MAX_IMAGES_PER_LISTING: usize = 10;

/// Extension given to every stored image file
const IMAGE_EXTENSION: &str = "jpg";

/// URL path prefix under which stored images are served
pub const IMAGE_URL_PREFIX: &str = "/images";

/// Filesystem store for uploaded images
///
/// Cheap to clone; holds only the storage root path.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Creates a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the storage root directory if it doesn't exist
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Writes image bytes under a freshly generated unique filename
    ///
    /// # Returns
    ///
    /// The generated filename (e.g. `"3f2a...c1.jpg"`), usable to build a
    /// public URL and to later delete the file
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the write fails; callers
    /// surface this as a generic failure
    pub async fn store(&self, bytes: &[u8]) -> std::io::Result<String> {
        let filename = format!("{}.{}", Uuid::new_v4(), IMAGE_EXTENSION);
        let path = self.root.join(&filename);

        tokio::fs::write(&path, bytes).await?;

        debug!(filename = %filename, size = bytes.len(), "Stored image file");
        Ok(filename)
    }

    /// Deletes a stored image file, best-effort
    ///
    /// A missing file is treated as a no-op, and I/O errors are logged
    /// and swallowed. Callers must not depend on deletion succeeding.
    ///
    /// # Returns
    ///
    /// `true` if the file was removed, `false` if it was ignored
    pub async fn delete(&self, filename: &str) -> bool {
        // Stored filenames are generated by us; strip any path components
        // a stale database row could carry.
        let Some(name) = Path::new(filename).file_name() else {
            return false;
        };
        let path = self.root.join(name);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(filename = %filename, "Deleted image file");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(filename = %filename, error = %e, "Failed to delete image file");
                false
            }
        }
    }

    /// Deletes a batch of stored image files, best-effort
    pub async fn delete_all(&self, filenames: &[String]) {
        for filename in filenames {
            self.delete(filename).await;
        }
    }

    /// Builds the absolute public URL for a stored image
    ///
    /// Joins the request's observed base address with the static serving
    /// path and the stored filename.
    pub fn url_for(base: &str, filename: &str) -> String {
        format!(
            "{}{}/{}",
            base.trim_end_matches('/'),
            IMAGE_URL_PREFIX,
            filename
        )
    }
}
