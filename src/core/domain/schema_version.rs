//! Schema version and separated-schema migration (spec.md §9).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::domain::album::{Album, AlbumType};
use crate::core::domain::band::Band;
use crate::core::errors::{BandVaultError, MigrationError};

/// The schema generation this crate reads and writes. Version 2 introduced
/// the separated `albums` / `albums_missing` arrays; version 1 stored a
/// single `albums` array with a per-entry `missing` boolean.
pub fn current_schema_version() -> u32 {
    2
}

/// Wrapper used when the caller wants the schema version alongside a
/// payload (e.g. bulk export), mirroring the teacher's
/// `SchemaVersionWrapper<T>` pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaVersionWrapper<T> {
    pub schema_version: u32,
    #[serde(flatten)]
    pub data: T,
}

impl<T> SchemaVersionWrapper<T> {
    pub fn new(data: T) -> Self {
        Self {
            schema_version: current_schema_version(),
            data,
        }
    }
}

pub fn with_schema_version<T>(data: T) -> SchemaVersionWrapper<T> {
    SchemaVersionWrapper::new(data)
}

/// Loads a `Band` from raw JSON, migrating it in-memory if its
/// `schema_version` predates the current schema. Never rewrites the file
/// itself — the caller decides whether/when to persist the migrated form.
pub fn migrate_band_json(mut raw: Value) -> Result<Band, BandVaultError> {
    let version = raw
        .get("schema_version")
        .and_then(Value::as_u64)
        .unwrap_or(1) as u32;

    if version < 2 {
        split_legacy_albums(&mut raw)?;
        if let Some(obj) = raw.as_object_mut() {
            obj.insert(
                "schema_version".to_string(),
                Value::from(current_schema_version()),
            );
        }
    }

    serde_json::from_value(raw).map_err(|e| {
        BandVaultError::Migration(MigrationError::Incompatible(format!(
            "failed to deserialize migrated band record: {e}"
        )))
    })
}

/// Splits a legacy (pre-v2) single `albums` array — where each entry carries
/// its own `missing` flag — into the separated `albums` / `albums_missing`
/// arrays, dropping filesystem-only fields (`folder_path`, `compliance`)
/// from entries that move to `albums_missing`.
fn split_legacy_albums(raw: &mut Value) -> Result<(), BandVaultError> {
    let Some(obj) = raw.as_object_mut() else {
        return Err(BandVaultError::Migration(MigrationError::Incompatible(
            "band record is not a JSON object".to_string(),
        )));
    };

    if obj.contains_key("albums_missing") {
        // Already separated; nothing to do even if schema_version is stale.
        return Ok(());
    }

    let Some(Value::Array(legacy)) = obj.remove("albums") else {
        obj.insert("albums".to_string(), Value::Array(Vec::new()));
        obj.insert("albums_missing".to_string(), Value::Array(Vec::new()));
        return Ok(());
    };

    let mut local = Vec::new();
    let mut missing = Vec::new();

    for mut entry in legacy {
        let is_missing = entry
            .get("missing")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if let Some(entry_obj) = entry.as_object_mut() {
            if is_missing {
                entry_obj.remove("folder_path");
                entry_obj.remove("compliance");
            }
            entry_obj.insert("missing".to_string(), Value::Bool(is_missing));
            entry_obj
                .entry("album_type")
                .or_insert_with(|| Value::String(AlbumType::Album.folder_name().to_string()));
        }

        if is_missing {
            missing.push(entry);
        } else {
            local.push(entry);
        }
    }

    obj.insert("albums".to_string(), Value::Array(local));
    obj.insert("albums_missing".to_string(), Value::Array(missing));
    Ok(())
}

/// Re-normalizes the derived fields of a freshly loaded/migrated `Band`
/// (currently: `edition_canonical`) so on-disk data that predates a derived
/// field still reads back consistently.
pub fn recompute_derived_fields(band: &mut Band) {
    for album in band.albums.iter_mut().chain(band.albums_missing.iter_mut()) {
        recompute_album_derived(album);
    }
}

fn recompute_album_derived(album: &mut Album) {
    album.edition_canonical = album
        .edition
        .as_ref()
        .and_then(|edition| crate::core::services::folder_parser::canonical_edition(edition));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn migrates_legacy_single_array() {
        let raw = json!({
            "band_name": "Test Band",
            "last_updated": "2024-01-01T00:00:00Z",
            "albums": [
                {"album_name": "A", "missing": false, "folder_path": "1999 - A"},
                {"album_name": "B", "missing": true}
            ]
        });

        let band = migrate_band_json(raw).unwrap();
        assert_eq!(band.albums.len(), 1);
        assert_eq!(band.albums_missing.len(), 1);
        assert_eq!(band.albums[0].album_name, "A");
        assert_eq!(band.albums_missing[0].album_name, "B");
        assert!(band.albums_missing[0].folder_path.is_none());
        assert_eq!(band.schema_version, 2);
    }

    #[test]
    fn passthrough_for_current_schema() {
        let raw = json!({
            "band_name": "Test Band",
            "last_updated": "2024-01-01T00:00:00Z",
            "schema_version": 2,
            "albums": [],
            "albums_missing": []
        });
        let band = migrate_band_json(raw).unwrap();
        assert_eq!(band.schema_version, 2);
    }
}
