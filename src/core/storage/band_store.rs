//! Atomic read/write of one band's `.band_metadata.json` (spec.md §4.6).

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::core::config::BAND_METADATA_FILENAME;
use crate::core::domain::band::Band;
use crate::core::domain::schema_version::{migrate_band_json, recompute_derived_fields};
use crate::core::errors::{BandVaultError, StorageError};

pub fn metadata_path(band_folder: &Path) -> PathBuf {
    band_folder.join(BAND_METADATA_FILENAME)
}

fn backup_path(metadata_path: &Path) -> PathBuf {
    let mut name = metadata_path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

fn tmp_path(metadata_path: &Path) -> PathBuf {
    let mut name = metadata_path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn read_and_parse(path: &Path) -> Result<Band, BandVaultError> {
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    let raw: serde_json::Value = serde_json::from_str(&contents)?;
    migrate_band_json(raw)
}

/// Loads a band's metadata file, falling back to `.bak` on a parse failure
/// of the primary file. Returns `Ok(None)` when neither file exists — a
/// missing metadata file is a first-save, not an error (spec.md §7).
pub fn load(band_folder: &Path) -> Result<Option<Band>, BandVaultError> {
    let path = metadata_path(band_folder);
    if !path.exists() {
        return Ok(None);
    }

    let band_name_hint = band_folder.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    let primary = read_and_parse(&path);
    let mut band = match primary {
        Ok(band) => band,
        Err(_) => {
            let bak = backup_path(&path);
            if !bak.exists() {
                let err = BandVaultError::Storage(StorageError::Corrupt(format!(
                    "both '{}' and its backup failed to parse",
                    path.display()
                )));
                crate::core::logging::log_metadata_read(&band_name_hint, false);
                crate::core::logging::log_error_with_context("band_store::load", &err);
                return Err(err);
            }
            read_and_parse(&bak).map_err(|e| {
                crate::core::logging::log_metadata_read(&band_name_hint, false);
                crate::core::logging::log_error_with_context("band_store::load backup", &e);
                BandVaultError::Storage(StorageError::Corrupt(format!(
                    "both '{}' and its backup failed to parse",
                    path.display()
                )))
            })?
        }
    };

    recompute_derived_fields(&mut band);
    crate::core::logging::log_metadata_read(&band_name_hint, true);
    Ok(Some(band))
}

/// Writes `band` to `<band_folder>/.band_metadata.json` atomically: the new
/// content lands in a `.tmp` file first, fsynced, the previous current file
/// (if any) is preserved as `.bak`, then the tmp file is renamed into place.
pub fn save(band_folder: &Path, band: &Band) -> Result<(), BandVaultError> {
    std::fs::create_dir_all(band_folder)?;
    let path = metadata_path(band_folder);
    let tmp = tmp_path(&path);
    let bak = backup_path(&path);

    let serialized = serde_json::to_string_pretty(band).map_err(|e| {
        let err = BandVaultError::Storage(StorageError::Write(e.to_string()));
        crate::core::logging::log_error_with_context("band_store::save serialize", &err);
        err
    })?;

    {
        let mut file = File::create(&tmp).map_err(|e| {
            let err = BandVaultError::Storage(StorageError::Write(e.to_string()));
            crate::core::logging::log_error_with_context("band_store::save create tmp", &err);
            err
        })?;
        file.write_all(serialized.as_bytes()).map_err(|e| {
            let err = BandVaultError::Storage(StorageError::Write(e.to_string()));
            crate::core::logging::log_error_with_context("band_store::save write tmp", &err);
            err
        })?;
        file.sync_all().map_err(|e| {
            let err = BandVaultError::Storage(StorageError::Write(e.to_string()));
            crate::core::logging::log_error_with_context("band_store::save sync tmp", &err);
            err
        })?;
    }

    if path.exists() {
        std::fs::copy(&path, &bak).map_err(|e| {
            let err = BandVaultError::Storage(StorageError::Write(e.to_string()));
            crate::core::logging::log_error_with_context("band_store::save backup copy", &err);
            err
        })?;
    }

    std::fs::rename(&tmp, &path).map_err(|e| {
        let err = BandVaultError::Storage(StorageError::Write(e.to_string()));
        crate::core::logging::log_error_with_context("band_store::save rename", &err);
        err
    })?;

    Ok(())
}

/// Restores `.bak` over the current file atomically.
pub fn rollback(band_folder: &Path) -> Result<(), BandVaultError> {
    let path = metadata_path(band_folder);
    let bak = backup_path(&path);
    if !bak.exists() {
        return Err(BandVaultError::Storage(StorageError::Corrupt(format!(
            "no backup exists for '{}'",
            path.display()
        ))));
    }
    std::fs::rename(&bak, &path).map_err(|e| BandVaultError::Storage(StorageError::Write(e.to_string())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn round_trips_a_saved_band() {
        let dir = tempfile::tempdir().unwrap();
        let band = Band::new("Pink Floyd");
        save(dir.path(), &band).unwrap();
        let loaded = load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.band_name, "Pink Floyd");
        assert!(backup_path(&metadata_path(dir.path())).exists() == false);
    }

    #[test]
    fn second_save_creates_backup_of_first() {
        let dir = tempfile::tempdir().unwrap();
        save(dir.path(), &Band::new("Pink Floyd")).unwrap();
        save(dir.path(), &Band::new("Pink Floyd II")).unwrap();
        let bak = backup_path(&metadata_path(dir.path()));
        assert!(bak.exists());
        let current = load(dir.path()).unwrap().unwrap();
        assert_eq!(current.band_name, "Pink Floyd II");
    }

    #[test]
    fn corrupt_primary_falls_back_to_backup() {
        let dir = tempfile::tempdir().unwrap();
        save(dir.path(), &Band::new("Pink Floyd")).unwrap();
        save(dir.path(), &Band::new("Pink Floyd II")).unwrap();
        std::fs::write(metadata_path(dir.path()), b"not json").unwrap();
        let recovered = load(dir.path()).unwrap().unwrap();
        assert_eq!(recovered.band_name, "Pink Floyd");
    }
}
