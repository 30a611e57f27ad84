use std::fs;
use std::io::Write;
use std::path::Path;

use log::info;

use crate::document::Document;
use crate::error::PersistError;

/// Serialize `doc` as 2-space-indented JSON and replace `destination` with it.
///
/// The content is written to a temporary file next to the destination and
/// renamed over it, so the destination is either fully replaced or left as it
/// was. An existing destination keeps its permissions; a new one gets the
/// process umask applied, as a plain `fs::write` would.
pub fn write_document(doc: &Document, destination: &Path) -> Result<(), PersistError> {
    let content = doc.to_pretty_json()?;

    let parent = match destination.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => {
            return Err(PersistError::NoParent {
                path: destination.to_path_buf(),
            });
        }
    };

    let write_err = |source: std::io::Error| PersistError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(parent).map_err(write_err)?;
    if let Ok(existing) = fs::metadata(destination) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_err)?;
    }
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(destination).map_err(|e| write_err(e.error))?;

    info!("saved normalized document to {}", destination.display());
    Ok(())
}
