use std::fs::File;
use std::path::Path;

use zip::ZipArchive;

use crate::error::{LauncherError, LauncherResult};

/// Extracts a zip into `dest_dir`, replacing files that already exist.
///
/// Progress is emitted as `(done_entries, total_entries, entry_name)`.
/// Uses `enclosed_name()` to prevent Zip Slip (path traversal); unsafe entries are skipped.
///
/// Not transactional: an error midway leaves `dest_dir` with a mix of old and new files.
pub fn extract_zip_overwrite_with_progress<F>(
    zip_path: &Path,
    dest_dir: &Path,
    mut on_progress: F,
) -> LauncherResult<()>
where
    F: FnMut(u64, u64, Option<String>),
{
    let file = File::open(zip_path).map_err(|e| LauncherError::io(zip_path, e))?;
    let mut archive = ZipArchive::new(file)?;

    let total_files = archive.len() as u64;
    let mut extracted: u64 = 0;
    on_progress(0, total_files, None);

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let entry_name = entry.name().to_string();

        let Some(safe_rel) = entry.enclosed_name().map(|p| p.to_owned()) else {
            log::warn!("Skipped unsafe zip path: {entry_name}");
            extracted = extracted.saturating_add(1);
            on_progress(extracted, total_files, None);
            continue;
        };

        let out_path = dest_dir.join(safe_rel);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| LauncherError::io(&out_path, e))?;
            extracted = extracted.saturating_add(1);
            on_progress(extracted, total_files, Some(entry_name));
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }

        // Replace rather than truncate: a read-only file from the previous build
        // (restored unix mode) can't be opened for writing.
        match std::fs::remove_file(&out_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(LauncherError::io(&out_path, e)),
        }
        let mut out_file = File::create(&out_path).map_err(|e| LauncherError::io(&out_path, e))?;
        std::io::copy(&mut entry, &mut out_file).map_err(|e| LauncherError::io(&out_path, e))?;
        drop(out_file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))
                    .map_err(|e| LauncherError::io(&out_path, e))?;
            }
        }

        extracted = extracted.saturating_add(1);
        on_progress(extracted, total_files, Some(entry_name));
    }

    Ok(())
}
