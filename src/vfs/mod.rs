//! The virtual filesystem that backs every session: a view of one real
//! directory, addressed through POSIX-style FTP paths that are provably unable
//! to escape it.
//!
//! Path resolution is pure path arithmetic and never touches the disk; the
//! escape check therefore cannot be bypassed with dangling symlink tricks in
//! the client-supplied part of the path. Existence and type checks happen in
//! the individual operations afterwards.

mod error;
pub use error::{Error, ErrorKind, Result};

mod fileinfo;
pub use fileinfo::{Fileinfo, Meta};

use chrono::{DateTime, Utc};
use filetime::FileTime;
use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncRead, AsyncSeekExt};

/// A client-supplied path after validation: its normalized virtual form
/// (always absolute, always inside `/`) and the real path it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The normalized path as the client sees it, e.g. `/photos/cat.jpg`.
    pub virtual_path: PathBuf,
    /// The corresponding path on disk, inside the share root.
    pub real_path: PathBuf,
}

/// A single shared directory exposed over FTP.
///
/// One instance is created at server start and shared read-only between all
/// sessions; the root never changes while the server runs.
#[derive(Debug)]
pub struct VirtualFs {
    root: PathBuf,
}

impl VirtualFs {
    /// Creates a filesystem view rooted at `root`. The caller (the server
    /// builder) has already verified that the directory exists.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        VirtualFs { root: root.into() }
    }

    /// The real directory this filesystem serves.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `ftp_path` against the session working directory `cwd`.
    ///
    /// `cwd` must be an absolute virtual path (the session invariant). The
    /// input is interpreted POSIX-style: rooted at `/` when absolute,
    /// relative to `cwd` otherwise. `.` and `..` are collapsed lexically and
    /// any attempt to climb above `/` fails with [`ErrorKind::Escape`].
    pub fn resolve(&self, cwd: &Path, ftp_path: &str) -> Result<Resolved> {
        let joined = if ftp_path.starts_with('/') {
            PathBuf::from(ftp_path)
        } else {
            cwd.join(ftp_path)
        };

        let mut normalized = PathBuf::from("/");
        for component in joined.components() {
            match component {
                Component::RootDir => {}
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(ErrorKind::Escape.into());
                    }
                    if normalized.as_os_str().is_empty() {
                        return Err(ErrorKind::Escape.into());
                    }
                }
                Component::Normal(part) => normalized.push(part),
                Component::Prefix(_) => return Err(ErrorKind::Escape.into()),
            }
        }

        // Normalization always produces a path rooted at "/".
        let relative = normalized.strip_prefix("/").unwrap_or(&normalized);
        Ok(Resolved {
            real_path: self.root.join(relative),
            virtual_path: normalized,
        })
    }

    /// Returns the metadata of the given real path.
    #[tracing_attributes::instrument]
    pub async fn metadata(&self, real_path: &Path) -> Result<Meta> {
        let meta = tokio::fs::metadata(real_path).await?;
        Ok(meta.into())
    }

    /// Returns the entries of the given directory.
    #[tracing_attributes::instrument]
    pub async fn list(&self, real_path: &Path) -> Result<Vec<Fileinfo>> {
        let meta = tokio::fs::metadata(real_path).await?;
        if !meta.is_dir() {
            return Err(ErrorKind::NotADirectory.into());
        }
        let mut entries = tokio::fs::read_dir(real_path).await?;
        let mut listing = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            listing.push(Fileinfo {
                path: PathBuf::from(entry.file_name()),
                metadata: metadata.into(),
            });
        }
        listing.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(listing)
    }

    /// Returns the bytes of a `LIST` response for the given directory.
    pub async fn list_fmt(&self, real_path: &Path) -> Result<std::io::Cursor<Vec<u8>>> {
        let listing = self.list(real_path).await?;
        let lines: Vec<u8> = listing.iter().map(|fi| format!("{}\r\n", fi)).collect::<String>().into_bytes();
        Ok(std::io::Cursor::new(lines))
    }

    /// Returns the bytes of an `NLST` response (basenames only) for the given directory.
    pub async fn nlst(&self, real_path: &Path) -> Result<std::io::Cursor<Vec<u8>>> {
        let listing = self.list(real_path).await?;
        let lines: Vec<u8> = listing
            .iter()
            .map(|fi| format!("{}\r\n", fi.basename()))
            .collect::<String>()
            .into_bytes();
        Ok(std::io::Cursor::new(lines))
    }

    /// Opens the given file for reading, positioned at `start_pos`.
    #[tracing_attributes::instrument]
    pub async fn open_read(&self, real_path: &Path, start_pos: u64) -> Result<Box<dyn AsyncRead + Send + Sync + Unpin>> {
        let meta = tokio::fs::metadata(real_path).await?;
        if !meta.is_file() {
            return Err(ErrorKind::NotAFile.into());
        }
        let mut file = tokio::fs::File::open(real_path).await?;
        if start_pos > 0 {
            file.seek(SeekFrom::Start(start_pos)).await?;
        }
        Ok(Box::new(tokio::io::BufReader::with_capacity(4096, file)))
    }

    /// Writes `input` to the given path starting at `start_pos`, creating the
    /// file if needed and truncating anything past the offset. Returns the
    /// number of bytes written.
    pub async fn store<R>(&self, real_path: &Path, input: R, start_pos: u64) -> Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let mut file = tokio::fs::OpenOptions::new().write(true).create(true).open(real_path).await?;
        file.set_len(start_pos).await?;
        file.seek(SeekFrom::Start(start_pos)).await?;

        let mut reader = tokio::io::BufReader::with_capacity(4096, input);
        let mut writer = tokio::io::BufWriter::with_capacity(4096, file);
        let bytes_copied = tokio::io::copy(&mut reader, &mut writer).await?;
        tokio::io::AsyncWriteExt::flush(&mut writer).await?;
        Ok(bytes_copied)
    }

    /// Deletes the given file.
    #[tracing_attributes::instrument]
    pub async fn del(&self, real_path: &Path) -> Result<()> {
        let meta = tokio::fs::metadata(real_path).await?;
        if meta.is_dir() {
            return Err(ErrorKind::NotAFile.into());
        }
        tokio::fs::remove_file(real_path).await?;
        Ok(())
    }

    /// Creates the given directory.
    #[tracing_attributes::instrument]
    pub async fn mkd(&self, real_path: &Path) -> Result<()> {
        tokio::fs::create_dir(real_path).await?;
        Ok(())
    }

    /// Removes the given (empty) directory.
    #[tracing_attributes::instrument]
    pub async fn rmd(&self, real_path: &Path) -> Result<()> {
        let meta = tokio::fs::metadata(real_path).await?;
        if !meta.is_dir() {
            return Err(ErrorKind::NotADirectory.into());
        }
        tokio::fs::remove_dir(real_path).await?;
        Ok(())
    }

    /// Renames `from` to `to`. Both are real paths inside the root.
    #[tracing_attributes::instrument]
    pub async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        tokio::fs::metadata(from).await?;
        tokio::fs::rename(from, to).await?;
        Ok(())
    }

    /// Sets the modification time of the given path.
    #[tracing_attributes::instrument]
    pub async fn set_mtime(&self, real_path: &Path, mtime: DateTime<Utc>) -> Result<()> {
        tokio::fs::metadata(real_path).await?;
        let path = real_path.to_path_buf();
        let ft = FileTime::from_unix_time(mtime.timestamp(), mtime.timestamp_subsec_nanos());
        tokio::task::spawn_blocking(move || filetime::set_file_mtime(path, ft))
            .await
            .map_err(|e| Error::new(ErrorKind::LocalError, e))??;
        Ok(())
    }
}
