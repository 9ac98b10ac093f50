use iwp_vector::shapefile_components;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scratch files written while a tile is processed. Registered files, and
/// their sidecars, are deleted when the guard goes out of scope, on success
/// and failure alike, unless they are to be kept.
#[derive(Debug, Default)]
pub struct IntermediateFiles {
    files: Vec<PathBuf>,
    keep: bool,
}

impl IntermediateFiles {
    pub fn new(keep: bool) -> IntermediateFiles {
        IntermediateFiles {
            files: vec![],
            keep,
        }
    }

    /// Registers a file before it is written. Shapefiles bring their
    /// `.shx`, `.dbf`, and `.prj` files along; rasters their `.prj`.
    pub fn register(&mut self, file: &Path) {
        let is_shapefile = file
            .extension()
            .map(|e| e.eq_ignore_ascii_case("shp"))
            .unwrap_or(false);
        let components = if is_shapefile {
            shapefile_components(&file.to_string_lossy())
        } else {
            vec![file.to_path_buf(), file.with_extension("prj")]
        };
        for f in components {
            if !self.files.contains(&f) {
                self.files.push(f);
            }
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Drop for IntermediateFiles {
    fn drop(&mut self) {
        if self.keep {
            debug!("keeping {} intermediate files", self.files.len());
            return;
        }
        for file in &self.files {
            if !file.exists() {
                continue;
            }
            match fs::remove_file(file) {
                Ok(()) => debug!("deleted {}", file.display()),
                Err(e) => warn!("could not delete {}: {}", file.display(), e),
            }
        }
    }
}
