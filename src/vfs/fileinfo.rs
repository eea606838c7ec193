use chrono::prelude::{DateTime, Utc};
use std::fmt::{self, Formatter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Metadata of one directory entry, as needed for `LIST` output and the
/// existence/type checks that precede filesystem commands.
#[derive(Debug)]
pub struct Meta {
    inner: std::fs::Metadata,
}

impl From<std::fs::Metadata> for Meta {
    fn from(inner: std::fs::Metadata) -> Self {
        Meta { inner }
    }
}

impl Meta {
    /// Returns the length of the file in bytes.
    pub fn len(&self) -> u64 {
        self.inner.len()
    }

    /// Returns `self.len() == 0`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.inner.is_dir()
    }

    /// Returns true if the entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.inner.is_file()
    }

    /// Returns the last modification time, if the platform tracks one.
    pub fn modified(&self) -> Option<SystemTime> {
        self.inner.modified().ok()
    }

    fn uid(&self) -> u32 {
        cfg_if::cfg_if! {
            if #[cfg(unix)] {
                use std::os::unix::fs::MetadataExt;
                self.inner.uid()
            } else {
                0
            }
        }
    }

    fn gid(&self) -> u32 {
        cfg_if::cfg_if! {
            if #[cfg(unix)] {
                use std::os::unix::fs::MetadataExt;
                self.inner.gid()
            } else {
                0
            }
        }
    }

    fn links(&self) -> u64 {
        cfg_if::cfg_if! {
            if #[cfg(unix)] {
                use std::os::unix::fs::MetadataExt;
                self.inner.nlink()
            } else {
                1
            }
        }
    }

    fn mode(&self) -> u32 {
        cfg_if::cfg_if! {
            if #[cfg(unix)] {
                use std::os::unix::fs::MetadataExt;
                self.inner.mode()
            } else {
                0o755
            }
        }
    }
}

const PERM_READ: u32 = 0b100100100;
const PERM_WRITE: u32 = 0b010010010;
const PERM_EXEC: u32 = 0b001001001;
const PERM_USER: u32 = 0b111000000;
const PERM_GROUP: u32 = 0b000111000;
const PERM_OTHERS: u32 = 0b000000111;

// Renders a unix mode word as the "rwxr-xr-x" column of a LIST line.
struct ModeColumn(u32);

impl fmt::Display for ModeColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_char(if self.0 & PERM_USER & PERM_READ > 0 { 'r' } else { '-' })?;
        f.write_char(if self.0 & PERM_USER & PERM_WRITE > 0 { 'w' } else { '-' })?;
        f.write_char(if self.0 & PERM_USER & PERM_EXEC > 0 { 'x' } else { '-' })?;
        f.write_char(if self.0 & PERM_GROUP & PERM_READ > 0 { 'r' } else { '-' })?;
        f.write_char(if self.0 & PERM_GROUP & PERM_WRITE > 0 { 'w' } else { '-' })?;
        f.write_char(if self.0 & PERM_GROUP & PERM_EXEC > 0 { 'x' } else { '-' })?;
        f.write_char(if self.0 & PERM_OTHERS & PERM_READ > 0 { 'r' } else { '-' })?;
        f.write_char(if self.0 & PERM_OTHERS & PERM_WRITE > 0 { 'w' } else { '-' })?;
        f.write_char(if self.0 & PERM_OTHERS & PERM_EXEC > 0 { 'x' } else { '-' })?;
        Ok(())
    }
}

/// One directory entry: its basename plus [`Meta`].
#[derive(Debug)]
pub struct Fileinfo {
    /// The entry's name relative to the listed directory.
    pub path: PathBuf,
    /// The entry's metadata.
    pub metadata: Meta,
}

impl Fileinfo {
    /// The entry's basename as it appears in NLST output.
    pub fn basename(&self) -> &str {
        self.path
            .file_name()
            .map(|n| n.to_str().unwrap_or_default())
            .unwrap_or_default()
    }
}

impl fmt::Display for Fileinfo {
    // Formats the entry as a unix-style LIST line, the format FTP clients
    // have parsed since time immemorial.
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let modified: String = self
            .metadata
            .modified()
            .map(|x| DateTime::<Utc>::from(x).format("%b %d %H:%M").to_string())
            .unwrap_or_else(|| "--- -- --:--".to_string());
        let basename = match self.path.as_path().components().next_back() {
            Some(v) => v.as_os_str().to_string_lossy(),
            None => Path::new("").to_string_lossy(),
        };
        write!(
            f,
            "{filetype}{mode} {links:>5} {owner:>8} {group:>8} {size:>12} {modified} {basename}",
            filetype = if self.metadata.is_dir() { "d" } else { "-" },
            mode = ModeColumn(self.metadata.mode()),
            links = self.metadata.links(),
            owner = self.metadata.uid(),
            group = self.metadata.gid(),
            size = self.metadata.len(),
        )
    }
}
