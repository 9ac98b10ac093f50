/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::error::{NetworkError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// The image suffix carried by tile names from the sub-meter imagery
/// mosaics, e.g. `tile_07_u16rf3413_pansh`.
pub const DEFAULT_IMAGE_SUFFIX: &str = "_u16rf3413_pansh";

/// Settings shared by every stage of the trough network workflow. Loaded
/// from JSON with missing keys taking their defaults; tool flags override
/// individual fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub buffer_distance: f64,
    pub cell_size: f64,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub footprint_file: PathBuf,
    pub clipped_dir: PathBuf,
    pub image_suffix: String,
    pub keep_intermediates: bool,
    pub max_procs: isize,
}

impl Default for NetworkConfig {
    fn default() -> NetworkConfig {
        NetworkConfig {
            buffer_distance: 5.0,
            cell_size: 0.5,
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            footprint_file: PathBuf::new(),
            clipped_dir: PathBuf::new(),
            image_suffix: DEFAULT_IMAGE_SUFFIX.to_string(),
            keep_intermediates: false,
            max_procs: 1,
        }
    }
}

impl NetworkConfig {
    pub fn from_file(config_file: &Path) -> Result<NetworkConfig> {
        let contents = fs::read_to_string(config_file)?;
        serde_json::from_str(&contents).map_err(|e| {
            NetworkError::InvalidInput(format!(
                "Failed to parse {}: {}",
                config_file.display(),
                e
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.buffer_distance > 0f64) {
            return Err(NetworkError::InvalidInput(format!(
                "The buffer distance must be greater than zero ({}).",
                self.buffer_distance
            )));
        }
        if !(self.cell_size > 0f64) {
            return Err(NetworkError::InvalidInput(format!(
                "The cell size must be greater than zero ({}).",
                self.cell_size
            )));
        }
        Ok(())
    }

    /// The number of tiles processed at once. Non-positive values mean
    /// all available processors.
    pub fn num_workers(&self, num_tiles: usize) -> usize {
        let num_procs = num_cpus::get();
        let requested = if self.max_procs > 0 {
            (self.max_procs as usize).min(num_procs)
        } else {
            num_procs
        };
        requested.min(num_tiles).max(1)
    }
}

fn normalize_name(s: &str) -> String {
    s.replace('-', "_").replace(' ', "_")
}

/// The identity of one input tile, derived once from its file name. The
/// `name` fixes every intermediate and output file name; the
/// `footprint_key` matches the `Name` attribute of the image footprints.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TileId {
    pub name: String,
    pub footprint_key: String,
}

impl TileId {
    pub fn from_path(path: &Path, image_suffix: &str) -> TileId {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        TileId::from_stem(&stem, image_suffix)
    }

    pub fn from_stem(stem: &str, image_suffix: &str) -> TileId {
        let name = normalize_name(stem);
        let suffix = normalize_name(image_suffix);
        let footprint_key = if suffix.is_empty() {
            name.clone()
        } else {
            name.replace(&suffix, "")
        };
        TileId {
            name,
            footprint_key,
        }
    }

    pub fn buffer_shapefile(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_buffer.shp", self.name))
    }

    pub fn buffer_raster(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_buffer.asc", self.name))
    }

    pub fn skeleton_raster(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_skeleton.asc", self.name))
    }

    pub fn network_shapefile(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_IWP_net.shp", self.name))
    }
}

/// Recovers a footprint key from a network file stem written without a
/// `TILE` attribute, e.g. `tile_07_u16rf3413_pansh_IWP_net` -> `tile_07`.
pub fn footprint_key_from_filename(stem: &str, image_suffix: &str) -> String {
    let stem = normalize_name(stem);
    let full_suffix = format!("{}_IWP_net", normalize_name(image_suffix));
    let key = stem.replace(&full_suffix, "");
    match key.strip_suffix("_IWP_net") {
        Some(k) => k.to_string(),
        None => key,
    }
}

#[cfg(test)]
mod test {
    use super::{footprint_key_from_filename, NetworkConfig, TileId, DEFAULT_IMAGE_SUFFIX};
    use std::fs;
    use std::path::Path;

    #[test]
    fn test_tile_names() {
        let tile = TileId::from_path(
            Path::new("/data/WV02-2015 tile_07_u16rf3413_pansh.shp"),
            DEFAULT_IMAGE_SUFFIX,
        );
        assert_eq!(tile.name, "WV02_2015_tile_07_u16rf3413_pansh");
        assert_eq!(tile.footprint_key, "WV02_2015_tile_07");
        let out = Path::new("/out");
        assert_eq!(
            tile.network_shapefile(out),
            Path::new("/out/WV02_2015_tile_07_u16rf3413_pansh_IWP_net.shp")
        );
        assert_eq!(
            tile.buffer_raster(out),
            Path::new("/out/WV02_2015_tile_07_u16rf3413_pansh_buffer.asc")
        );

        let plain = TileId::from_stem("banks-01", DEFAULT_IMAGE_SUFFIX);
        assert_eq!(plain.name, "banks_01");
        assert_eq!(plain.footprint_key, "banks_01");
    }

    #[test]
    fn test_footprint_key_from_filename() {
        assert_eq!(
            footprint_key_from_filename("tile_07_u16rf3413_pansh_IWP_net", DEFAULT_IMAGE_SUFFIX),
            "tile_07"
        );
        assert_eq!(
            footprint_key_from_filename("tile-08_IWP_net", DEFAULT_IMAGE_SUFFIX),
            "tile_08"
        );
        let tile = TileId::from_stem("tile_07_u16rf3413_pansh", DEFAULT_IMAGE_SUFFIX);
        let stem = tile
            .network_shapefile(Path::new(""))
            .file_stem()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert_eq!(
            footprint_key_from_filename(&stem, DEFAULT_IMAGE_SUFFIX),
            tile.footprint_key
        );
    }

    #[test]
    fn test_config_defaults_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("network.json");
        fs::write(&file, "{\"cell_size\": 1.0, \"input_dir\": \"/data/iwp\"}").unwrap();
        let configs = NetworkConfig::from_file(&file).unwrap();
        assert_eq!(configs.cell_size, 1.0);
        assert_eq!(configs.buffer_distance, 5.0);
        assert_eq!(configs.image_suffix, DEFAULT_IMAGE_SUFFIX);
        assert_eq!(configs.input_dir, Path::new("/data/iwp"));
        assert!(configs.validate().is_ok());

        let mut bad = NetworkConfig::default();
        bad.buffer_distance = 0.0;
        assert!(bad.validate().is_err());

        fs::write(&file, "{\"cell_size\": \"fine\"}").unwrap();
        assert!(NetworkConfig::from_file(&file).is_err());
    }

    #[test]
    fn test_num_workers() {
        let mut configs = NetworkConfig::default();
        assert_eq!(configs.num_workers(10), 1);
        configs.max_procs = -1;
        assert!(configs.num_workers(10) >= 1);
        assert_eq!(configs.num_workers(1), 1);
    }
}
