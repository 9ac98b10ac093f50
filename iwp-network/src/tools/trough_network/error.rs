use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, clipping, or measuring a trough network.
/// A failure is scoped to one tile; callers record it and move on.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{0}")]
    InvalidInput(String),

    #[error("intermediate file {} was not found", .0.display())]
    MissingIntermediate(PathBuf),

    #[error("{0} contains no usable features")]
    NoFeatures(String),

    #[error("{count} footprints are named '{key}'")]
    AmbiguousFootprint { key: String, count: usize },

    #[error("{} and {} are both tile '{}'", .first.display(), .second.display(), .name)]
    DuplicateTile {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl From<NetworkError> for io::Error {
    fn from(err: NetworkError) -> io::Error {
        match err {
            NetworkError::Io(e) => e,
            NetworkError::InvalidInput(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            e @ NetworkError::MissingIntermediate(_) => {
                io::Error::new(io::ErrorKind::NotFound, e.to_string())
            }
            e @ NetworkError::NoFeatures(_) => {
                io::Error::new(io::ErrorKind::InvalidData, e.to_string())
            }
            e @ NetworkError::AmbiguousFootprint { .. } => {
                io::Error::new(io::ErrorKind::Other, e.to_string())
            }
            e @ NetworkError::DuplicateTile { .. } => {
                io::Error::new(io::ErrorKind::AlreadyExists, e.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;

#[cfg(test)]
mod test {
    use super::NetworkError;
    use std::io;

    #[test]
    fn test_conversion_keeps_kind() {
        let e: io::Error = NetworkError::InvalidInput("bad distance".to_string()).into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidInput);

        let e: io::Error = NetworkError::AmbiguousFootprint {
            key: "tile_07".to_string(),
            count: 2,
        }
        .into();
        assert_eq!(e.to_string(), "2 footprints are named 'tile_07'");

        let e: io::Error = NetworkError::DuplicateTile {
            name: "tile_07".to_string(),
            first: "in/tile-07.shp".into(),
            second: "in/tile_07.shp".into(),
        }
        .into();
        assert_eq!(e.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(e.to_string(), "in/tile-07.shp and in/tile_07.shp are both tile 'tile_07'");

        let e: io::Error =
            NetworkError::from(io::Error::new(io::ErrorKind::PermissionDenied, "locked")).into();
        assert_eq!(e.kind(), io::ErrorKind::PermissionDenied);
    }
}
