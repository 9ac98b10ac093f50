// private sub-module defined in other files
mod clip_network_to_footprints;
mod config;
mod error;
mod extract_trough_network;
mod intermediate_files;
mod trough_network_length;

// exports identifiers from private sub-modules in the current module namespace
pub use self::clip_network_to_footprints::{clip_to_footprints, ClipNetworkToFootprints, ClipSummary};
pub use self::config::{footprint_key_from_filename, NetworkConfig, TileId, DEFAULT_IMAGE_SUFFIX};
pub use self::error::{NetworkError, Result};
pub use self::extract_trough_network::{
    extract_network, extract_tile, ExtractTroughNetwork, NetworkSummary, TileOutcome,
};
pub use self::intermediate_files::IntermediateFiles;
pub use self::trough_network_length::{
    measure_directory, polyline_length, LengthReport, TroughNetworkLength,
};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The `.shp` files directly within `dir`, sorted by file name.
fn list_shapefiles(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_shp = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("shp"))
            .unwrap_or(false);
        if is_shp && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod test {
    use super::list_shapefiles;
    use std::fs;

    #[test]
    fn test_list_shapefiles() {
        let dir = tempfile::tempdir().unwrap();
        for f in ["b.shp", "a.SHP", "a.dbf", "notes.txt"] {
            fs::write(dir.path().join(f), "").unwrap();
        }
        fs::create_dir(dir.path().join("c.shp")).unwrap();
        let names: Vec<String> = list_shapefiles(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.SHP".to_string(), "b.shp".to_string()]);
    }
}
