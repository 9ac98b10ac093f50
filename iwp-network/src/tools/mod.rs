pub mod data_tools;
pub mod gis_analysis;
pub mod image_analysis;
pub mod trough_network;

use iwp_common::utils::wrapped_text;
use serde_json;
use std::env;
use std::io::{Error, ErrorKind};
use std::path::{self, Path};

#[derive(Default)]
pub struct ToolManager {
    pub working_dir: String,
    pub verbose: bool,
    tool_names: Vec<String>,
}

impl ToolManager {
    pub fn new<'a>(
        working_directory: &'a str,
        verbose_mode: &'a bool,
    ) -> Result<ToolManager, Error> {
        let mut tool_names = vec![];
        // data_tools
        tool_names.push("RasterToVectorLines".to_string());
        tool_names.push("VectorPolygonsToRaster".to_string());

        // gis_analysis
        tool_names.push("PolygonAnnulusBuffer".to_string());

        // image_analysis
        tool_names.push("LineThinning".to_string());

        // trough_network
        tool_names.push("ClipNetworkToFootprints".to_string());
        tool_names.push("ExtractTroughNetwork".to_string());
        tool_names.push("TroughNetworkLength".to_string());

        tool_names.sort();

        let tm = ToolManager {
            working_dir: working_directory.to_string(),
            verbose: *verbose_mode,
            tool_names: tool_names,
        };
        Ok(tm)
    }

    fn get_tool(&self, tool_name: &str) -> Option<Box<dyn IwpTool + 'static>> {
        match tool_name.to_lowercase().replace("_", "").as_ref() {
            // data_tools
            "rastertovectorlines" => Some(Box::new(data_tools::RasterToVectorLines::new())),
            "vectorpolygonstoraster" => Some(Box::new(data_tools::VectorPolygonsToRaster::new())),

            // gis_analysis
            "polygonannulusbuffer" => Some(Box::new(gis_analysis::PolygonAnnulusBuffer::new())),

            // image_analysis
            "linethinning" => Some(Box::new(image_analysis::LineThinning::new())),

            // trough_network
            "clipnetworktofootprints" => {
                Some(Box::new(trough_network::ClipNetworkToFootprints::new()))
            }
            "extracttroughnetwork" => Some(Box::new(trough_network::ExtractTroughNetwork::new())),
            "troughnetworklength" => Some(Box::new(trough_network::TroughNetworkLength::new())),

            _ => None,
        }
    }

    fn unrecognized(tool_name: &str) -> Error {
        Error::new(
            ErrorKind::NotFound,
            format!("Unrecognized tool name {}.", tool_name),
        )
    }

    pub fn run_tool(&self, tool_name: String, args: Vec<String>) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => tool.run(args, &self.working_dir, self.verbose),
            None => Err(ToolManager::unrecognized(&tool_name)),
        }
    }

    pub fn tool_help(&self, tool_name: String) -> Result<(), Error> {
        if tool_name.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Tool name not specified; e.g. --toolhelp=ExtractTroughNetwork",
            ));
        }
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => {
                println!("{}", get_help(tool)?);
                Ok(())
            }
            None => Err(ToolManager::unrecognized(&tool_name)),
        }
    }

    pub fn tool_parameters(&self, tool_name: String) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => {
                println!("{}", tool.get_tool_parameters());
                Ok(())
            }
            None => Err(ToolManager::unrecognized(&tool_name)),
        }
    }

    pub fn toolbox(&self, tool_name: String) -> Result<(), Error> {
        if !tool_name.is_empty() {
            return match self.get_tool(tool_name.as_ref()) {
                Some(tool) => {
                    println!("{}", tool.get_toolbox());
                    Ok(())
                }
                None => Err(ToolManager::unrecognized(&tool_name)),
            };
        }

        let mut tool_details: Vec<(String, String)> = Vec::new();
        for val in &self.tool_names {
            if let Some(tool) = self.get_tool(val) {
                tool_details.push((val.to_string(), tool.get_toolbox()));
            }
        }
        tool_details.sort();
        for (tool, toolbox) in &tool_details {
            println!("{}: {}", tool, toolbox);
        }
        Ok(())
    }

    pub fn list_tools(&self) {
        let tool_details = self.get_name_and_descriptions(&[]);
        let mut ret = format!("All {} Available Tools:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }

    pub fn list_tools_with_keywords(&self, keywords: Vec<String>) {
        let tool_details = self.get_name_and_descriptions(&keywords);
        let mut ret = format!("All {} Tools containing keywords:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }

    /// Tool names and descriptions, filtered to those mentioning any of the
    /// keywords in their name, description, or toolbox.
    fn get_name_and_descriptions(&self, keywords: &[String]) -> Vec<(String, String)> {
        let mut tool_details = vec![];
        for val in &self.tool_names {
            let tool = match self.get_tool(val) {
                Some(t) => t,
                None => continue,
            };
            let toolbox = tool.get_toolbox().to_lowercase();
            let (nm, des) = (tool.get_tool_name(), tool.get_tool_description());
            let matched = keywords.is_empty()
                || keywords.iter().any(|kw| {
                    let kw = kw.to_lowercase();
                    nm.to_lowercase().contains(&kw)
                        || des.to_lowercase().contains(&kw)
                        || toolbox.contains(&kw)
                });
            if matched {
                tool_details.push((nm, des));
            }
        }
        tool_details.sort();
        tool_details
    }
}

pub trait IwpTool {
    fn get_tool_name(&self) -> String;
    fn get_tool_description(&self) -> String;
    fn get_tool_parameters(&self) -> String;
    fn get_example_usage(&self) -> String;
    fn get_toolbox(&self) -> String;
    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error>;
}

fn get_help<'a>(wt: Box<dyn IwpTool + 'a>) -> Result<String, Error> {
    let tool_name = wt.get_tool_name();
    let description = wrapped_text(&wt.get_tool_description(), 79);
    let parameters = wt.get_tool_parameters();
    let toolbox = wt.get_toolbox();
    let o: serde_json::Value = serde_json::from_str(&parameters)
        .map_err(|e| Error::new(ErrorKind::InvalidData, format!("{}", e)))?;
    let mut p = String::new();
    p.push_str("Flag               Description\n");
    p.push_str("-----------------  -----------\n");
    if let Some(a) = o["parameters"].as_array() {
        for d in a {
            let mut s = String::new();
            if let Some(flags) = d["flags"].as_array() {
                for f in flags.iter().filter_map(|f| f.as_str()) {
                    s.push_str(&format!("{}, ", f));
                }
            }
            p.push_str(&format!(
                "{:width$} {}\n",
                s.trim().trim_matches(','),
                d["description"].as_str().unwrap_or(""),
                width = 18
            ));
        }
    }
    let example = wt.get_example_usage();
    let s = if example.len() <= 1 {
        format!(
            "{}

Description:
{}
Toolbox: {}
Parameters:

{}
",
            tool_name, description, toolbox, p
        )
    } else {
        format!(
            "{}

Description:
{}
Toolbox: {}
Parameters:

{}

Example usage:
{}
",
            tool_name, description, toolbox, p, example
        )
    };
    Ok(s)
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ToolParameter {
    pub name: String,
    pub flags: Vec<String>,
    pub description: String,
    pub parameter_type: ParameterType,
    pub default_value: Option<String>,
    pub optional: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub enum ParameterType {
    Boolean,
    String,
    Integer,
    Float,
    VectorAttributeField(AttributeType, String),
    ExistingFile(ParameterFileType),
    NewFile(ParameterFileType),
    Directory,
}

#[derive(Serialize, Deserialize, Debug)]
pub enum ParameterFileType {
    Any,
    Raster,
    Vector(VectorGeometryType),
    Text,
}

#[derive(Serialize, Deserialize, Debug)]
pub enum VectorGeometryType {
    Any,
    Line,
    Polygon,
}

#[derive(Serialize, Deserialize, Debug)]
pub enum AttributeType {
    Any,
    Number,
    Text,
}

/// Serialises a tool's parameter list in the form printed by `--toolparameters`.
pub fn parameters_to_json(parameters: &[ToolParameter]) -> String {
    match serde_json::to_string(parameters) {
        Ok(json_str) => format!("{{\"parameters\":{}}}", json_str),
        Err(err) => format!("{:?}", err),
    }
}

/// Builds the example command line shown in a tool's help, using the
/// name of the running executable.
pub fn example_usage(tool_name: &str, args: &str) -> String {
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let short_exe = match env::current_exe() {
        Ok(exe) => exe
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "iwp_network".to_string()),
        Err(_) => "iwp_network".to_string(),
    };
    format!(
        ">>.*{} -r={} -v --wd=\"*path*to*data*\" {}",
        short_exe, tool_name, args
    )
    .replace("*", &sep)
}

pub fn print_welcome(tool_name: &str) {
    println!("***************{}", "*".repeat(tool_name.len()));
    println!("* Welcome to {} *", tool_name);
    println!("***************{}", "*".repeat(tool_name.len()));
}

/// Flag/value pairs taken from a tool's command line. Flags may be given
/// as `-flag=value`, `--flag=value`, or `-flag value`; a flag with no value
/// is a Boolean switch. Flag names are case-insensitive and `--` is
/// equivalent to `-`.
#[derive(Debug, Default, Clone)]
pub struct ToolArgs {
    values: Vec<(String, String)>,
}

impl ToolArgs {
    pub fn parse(args: &[String]) -> Result<ToolArgs, Error> {
        if args.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Tool run with no parameters.",
            ));
        }
        let mut values = vec![];
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].replace("\"", "").replace("\'", "");
            let (flag, value) = match arg.find('=') {
                Some(pos) => (arg[..pos].to_string(), Some(arg[pos + 1..].to_string())),
                None => (arg.clone(), None),
            };
            if !flag.starts_with('-') {
                i += 1;
                continue;
            }
            let flag_val = flag.to_lowercase().replace("--", "-");
            let value = match value {
                Some(v) => v,
                None => match args.get(i + 1) {
                    Some(next) if !next.starts_with('-') => {
                        i += 1;
                        next.replace("\"", "").replace("\'", "")
                    }
                    _ => String::new(),
                },
            };
            values.push((flag_val, value.trim().to_string()));
            i += 1;
        }
        Ok(ToolArgs { values })
    }

    /// Returns the value of the last occurrence of any of `flags`.
    pub fn get(&self, flags: &[&str]) -> Option<String> {
        self.values
            .iter()
            .rev()
            .find(|(f, _)| flags.contains(&f.as_str()))
            .map(|(_, v)| v.clone())
    }

    /// Returns the named file, resolved against the working directory
    /// when it is a bare file name.
    pub fn get_file(&self, flags: &[&str], working_directory: &str) -> Option<String> {
        self.get(flags)
            .filter(|v| !v.is_empty())
            .map(|v| resolve_file(&v, working_directory))
    }

    pub fn get_f64(&self, flags: &[&str]) -> Result<Option<f64>, Error> {
        match self.get(flags) {
            Some(v) => v.parse::<f64>().map(Some).map_err(|_| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Error parsing {} as a number ({}).", v, flags[0]),
                )
            }),
            None => Ok(None),
        }
    }

    pub fn get_isize(&self, flags: &[&str]) -> Result<Option<isize>, Error> {
        match self.get(flags) {
            Some(v) => v.parse::<isize>().map(Some).map_err(|_| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Error parsing {} as an integer ({}).", v, flags[0]),
                )
            }),
            None => Ok(None),
        }
    }

    /// A Boolean switch is on when present without a value or with any
    /// value other than `false`.
    pub fn is_set(&self, flags: &[&str]) -> bool {
        match self.get(flags) {
            Some(v) => !v.to_lowercase().contains("false"),
            None => false,
        }
    }
}

pub fn resolve_file(file_name: &str, working_directory: &str) -> String {
    let sep: String = path::MAIN_SEPARATOR.to_string();
    if file_name.contains(&sep) || file_name.contains('/') || working_directory.is_empty() {
        return file_name.to_string();
    }
    Path::new(working_directory)
        .join(file_name)
        .to_string_lossy()
        .to_string()
}

pub fn missing_parameter(name: &str) -> Error {
    Error::new(
        ErrorKind::InvalidInput,
        format!("The {} parameter was not specified.", name),
    )
}
