use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

/// A structure to hold environment settings. Backed by a settings.json file
/// in the directory the tools are launched from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Configs {
    pub verbose_mode: bool,
    pub working_directory: String,
    pub max_procs: isize,
}

impl Default for Configs {
    fn default() -> Configs {
        Configs {
            verbose_mode: false,
            working_directory: String::new(),
            max_procs: 1,
        }
    }
}

impl Configs {
    pub fn new() -> Configs {
        Configs::default()
    }
}

fn settings_file() -> Result<PathBuf, Error> {
    Ok(std::env::current_dir()?.join("settings.json"))
}

/// Reads settings.json from the current directory, falling back to the
/// default settings when the file does not exist.
pub fn get_configs() -> Result<Configs, Error> {
    read_configs(&settings_file()?)
}

pub fn save_configs(configs: &Configs) -> Result<(), Error> {
    write_configs(&settings_file()?, configs)
}

pub fn read_configs(config_file: &Path) -> Result<Configs, Error> {
    match fs::read_to_string(config_file) {
        Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Failed to parse {}: {}", config_file.display(), e),
            )
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Configs::new()),
        Err(e) => Err(e),
    }
}

pub fn write_configs(config_file: &Path, configs: &Configs) -> Result<(), Error> {
    let configs_json = serde_json::to_string_pretty(configs)
        .map_err(|e| Error::new(ErrorKind::Other, format!("Error converting Configs to JSON: {}", e)))?;
    fs::write(config_file, configs_json)
}

#[cfg(test)]
mod test {
    use super::{read_configs, write_configs, Configs};
    use std::fs;

    #[test]
    fn test_configs_file() {
        let dir = std::env::temp_dir().join(format!("iwp_configs_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("settings.json");

        // a missing file yields the defaults
        assert_eq!(read_configs(&file).unwrap(), Configs::new());

        let mut configs = Configs::new();
        configs.verbose_mode = true;
        configs.working_directory = "/data/tiles".to_string();
        configs.max_procs = 4;
        write_configs(&file, &configs).unwrap();
        assert_eq!(read_configs(&file).unwrap(), configs);

        // older settings files without every key are still accepted
        fs::write(&file, r#"{"verbose_mode": true}"#).unwrap();
        let partial = read_configs(&file).unwrap();
        assert!(partial.verbose_mode);
        assert_eq!(partial.max_procs, 1);

        fs::write(&file, "not json").unwrap();
        assert!(read_configs(&file).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
