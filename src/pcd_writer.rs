use crate::error::Converter;
use crate::Header;
use crate::PointCloud;
use crate::PointRecord;
use crate::Result;
use log::{debug, trace};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// Main interface for writing PCD files.
///
/// Point data is always written with the binary encoding.
pub struct PcdWriter<W: Write> {
    writer: W,
}

impl<W: Write> PcdWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes header and packed binary records of the point cloud.
    pub fn write_cloud<T: PointRecord>(&mut self, cloud: &PointCloud<T>) -> Result<()> {
        let header = Header::new(T::FIELDS, cloud.width(), cloud.height());
        header.write(&mut self.writer)?;
        for point in cloud {
            point
                .write_binary(&mut self.writer)
                .io_err("Failed to write point record")?;
        }
        self.writer
            .flush()
            .io_err("Failed to flush writer at the end")?;
        debug!(
            "Wrote {} {} points with {} bytes per record",
            cloud.len(),
            T::SCHEMA_NAME,
            T::record_size()
        );
        Ok(())
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Writes a point cloud into a binary PCD file.
///
/// The data is written into a temporary file next to the destination which
/// then replaces the destination. An existing file stays untouched if
/// anything fails before that. Symbolic links are followed, the file they
/// point to is replaced and keeps its permissions.
pub fn write<T: PointRecord>(cloud: &PointCloud<T>, path: impl AsRef<Path>) -> Result<()> {
    let target = resolve_destination(path.as_ref())?;
    let file_name = target
        .file_name()
        .io_err(format!("Path {} does not name a file", target.display()))?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let existing = fs::metadata(&target).ok().map(|m| m.permissions());

    // Created like any other new file, so the umask applies
    let prefix = format!(".{}.", file_name.to_string_lossy());
    let temp = Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .make_in(dir, |temp_path| {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(temp_path)
        })
        .io_err(format!(
            "Unable to create temporary file in {}",
            dir.display()
        ))?;
    trace!("Writing PCD data to {}", temp.path().display());

    let mut writer = PcdWriter::new(BufWriter::new(temp.as_file()));
    writer.write_cloud(cloud)?;
    drop(writer);
    temp.as_file()
        .sync_all()
        .io_err("Failed to sync temporary file")?;

    if let Some(permissions) = existing {
        temp.as_file()
            .set_permissions(permissions)
            .io_err("Failed to copy permissions of the replaced file")?;
    }

    temp.persist(&target)
        .map_err(|err| err.error)
        .io_err(format!("Unable to replace file {}", target.display()))?;
    debug!("Saved PCD file {}", target.display());
    Ok(())
}

/// Returns the file that is actually written when writing to `path`.
fn resolve_destination(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(err) if err.kind() == ErrorKind::NotFound => match fs::read_link(path) {
            // Dangling link, the target will be created
            Ok(target) if target.is_relative() => Ok(path
                .parent()
                .map(|parent| parent.join(&target))
                .unwrap_or(target)),
            Ok(target) => Ok(target),
            Err(_) => Ok(path.to_path_buf()),
        },
        Err(err) => Err(err).io_err(format!("Unable to resolve path {}", path.display())),
    }
}
