use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    de::DeserializeOwned,
    Serialize,
};
use tracing::{
    debug,
    warn,
};

use crate::core::KikitoriError;

const APP_NAME: &str = "kikitori";

/// `<data_local_dir>/kikitori`, or the working directory when the platform
/// has no data directory.
pub fn get_app_data_dir() -> PathBuf {
    let Some(data_dir) = dirs::data_local_dir() else {
        return PathBuf::from(".");
    };

    let app_dir = data_dir.join(APP_NAME);
    if let Err(e) = fs::create_dir_all(&app_dir) {
        warn!("Could not create data directory {}: {}", app_dir.display(), e);
    }
    app_dir
}

pub fn get_data_file_path(filename: &str) -> PathBuf {
    get_app_data_dir().join(filename)
}

pub fn save_json_to<T: Serialize>(data: &T, file_path: &Path) -> Result<(), KikitoriError> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(data)?;
    fs::write(file_path, json)?;
    debug!("Data saved to: {}", file_path.display());
    Ok(())
}

/// A missing file is not an error and yields `T::default()`.
pub fn load_json_from<T: DeserializeOwned + Default>(file_path: &Path) -> Result<T, KikitoriError> {
    if !file_path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(file_path)?;
    let data: T = serde_json::from_str(&json)?;
    debug!("Data loaded from: {}", file_path.display());
    Ok(data)
}

pub fn load_json_or_default<T: DeserializeOwned + Default>(file_path: &Path) -> T {
    match load_json_from::<T>(file_path) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to load {}: {}. Using defaults.", file_path.display(), e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_json_round_trip_through_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let data = BTreeMap::from([("猫".to_string(), 2u8), ("犬".to_string(), 0u8)]);

        save_json_to(&data, &path).unwrap();
        assert_eq!(load_json_from::<BTreeMap<String, u8>>(&path).unwrap(), data);
    }

    #[test]
    fn test_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        assert!(load_json_from::<Vec<u32>>(&path).unwrap().is_empty());

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_json_from::<Vec<u32>>(&path), Err(KikitoriError::Json(_))));
        assert!(load_json_or_default::<Vec<u32>>(&path).is_empty());
    }

    #[test]
    fn test_save_into_file_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        assert!(matches!(save_json_to(&1u8, &blocker.join("data.json")), Err(KikitoriError::Io(_))));
    }
}
