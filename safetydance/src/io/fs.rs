//! Filesystem primitives that never fail loudly.
//!
//! Each function returns a sentinel (`None` or `false`) on failure and leaves
//! the underlying `std::io::Error` in the last-error slot.

use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::core::invoke::{call, call_or};

/// Open `path` with `fopen`-style `flags` (`r`, `r+`, `w`, `wx`, `w+`, `wx+`,
/// `a`, `ax`, `a+`, `ax+`).
pub fn open(path: impl AsRef<Path>, flags: &str) -> Option<File> {
    call(|| -> Result<File> { Ok(open_options(flags)?.open(path.as_ref())?) })
}

fn open_options(flags: &str) -> Result<OpenOptions> {
    let mut options = OpenOptions::new();
    match flags {
        "r" => options.read(true),
        "r+" => options.read(true).write(true),
        "w" => options.write(true).create(true).truncate(true),
        "wx" | "xw" => options.write(true).create_new(true),
        "w+" => options.read(true).write(true).create(true).truncate(true),
        "wx+" | "xw+" => options.read(true).write(true).create_new(true),
        "a" => options.append(true).create(true),
        "ax" | "xa" => options.append(true).create_new(true),
        "a+" => options.read(true).append(true).create(true),
        "ax+" | "xa+" => options.read(true).append(true).create_new(true),
        other => bail!("unknown file open flags {other:?}"),
    };
    Ok(options)
}

/// Flush `file` to disk and close it. `false` if the flush failed.
pub fn close(file: File) -> bool {
    call(|| file.sync_all()).is_some()
}

/// Read into `buf`, returning the number of bytes read.
pub fn read(file: &mut File, buf: &mut [u8]) -> Option<usize> {
    call(|| file.read(buf))
}

pub fn read_file(path: impl AsRef<Path>) -> Option<Vec<u8>> {
    call(|| fs::read(path.as_ref()))
}

pub fn read_to_string(path: impl AsRef<Path>) -> Option<String> {
    call(|| fs::read_to_string(path.as_ref()))
}

pub fn write_file(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> bool {
    call(|| fs::write(path.as_ref(), contents.as_ref())).is_some()
}

/// Append to `path`, creating it if missing.
pub fn append_file(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> bool {
    call(|| -> std::io::Result<()> {
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(path.as_ref())?
            .write_all(contents.as_ref())
    })
    .is_some()
}

pub fn stat(path: impl AsRef<Path>) -> Option<Metadata> {
    call(|| fs::metadata(path.as_ref()))
}

/// Like [`stat`] but does not follow a trailing symlink.
pub fn lstat(path: impl AsRef<Path>) -> Option<Metadata> {
    call(|| fs::symlink_metadata(path.as_ref()))
}

/// `false` both when `path` is missing and when existence cannot be checked.
pub fn exists(path: impl AsRef<Path>) -> bool {
    call_or(|| path.as_ref().try_exists(), false)
}

pub fn mkdir(path: impl AsRef<Path>) -> bool {
    call(|| fs::create_dir(path.as_ref())).is_some()
}

/// Create `path` and any missing parents.
pub fn mkdir_all(path: impl AsRef<Path>) -> bool {
    call(|| fs::create_dir_all(path.as_ref())).is_some()
}

pub fn rmdir(path: impl AsRef<Path>) -> bool {
    call(|| fs::remove_dir(path.as_ref())).is_some()
}

pub fn unlink(path: impl AsRef<Path>) -> bool {
    call(|| fs::remove_file(path.as_ref())).is_some()
}

pub fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> bool {
    call(|| fs::rename(from.as_ref(), to.as_ref())).is_some()
}

/// Entry names in `path`, sorted.
pub fn readdir(path: impl AsRef<Path>) -> Option<Vec<String>> {
    call(|| -> Result<Vec<String>> {
        let mut names = fs::read_dir(path.as_ref())?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    })
}

pub fn readlink(path: impl AsRef<Path>) -> Option<PathBuf> {
    call(|| fs::read_link(path.as_ref()))
}

/// Canonical absolute path with symlinks resolved.
pub fn realpath(path: impl AsRef<Path>) -> Option<PathBuf> {
    call(|| fs::canonicalize(path.as_ref()))
}

#[cfg(unix)]
pub fn chmod(path: impl AsRef<Path>, mode: u32) -> bool {
    use std::os::unix::fs::PermissionsExt;

    call(|| fs::set_permissions(path.as_ref(), fs::Permissions::from_mode(mode))).is_some()
}

/// Change owner and/or group; `None` leaves that id unchanged.
#[cfg(unix)]
pub fn chown(path: impl AsRef<Path>, uid: Option<u32>, gid: Option<u32>) -> bool {
    call(|| std::os::unix::fs::chown(path.as_ref(), uid, gid)).is_some()
}
