/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

/*!
`iwp_network` extracts the network of troughs between ice-wedge polygons (IWPs)
detected in sub-meter imagery, clips it to the image footprints, and reports
its length.

It is a command-line program. The following commands are recognized:

| Command           | Description                                                                      |
| ----------------- | -------------------------------------------------------------------------------- |
| --cd, --wd        | Changes the working directory; used in conjunction with --run flag.              |
| -h, --help        | Prints help information.                                                         |
| --listtools       | Lists all available tools. Keywords may also be used, --listtools raster.        |
| --max_procs       | Sets the maximum number of tiles processed at once. -1 = all processors.         |
| -r, --run         | Runs a tool; used in conjunction with --cd flag; -r="ExtractTroughNetwork".      |
| --toolbox         | Prints the toolbox associated with a tool; --toolbox=LineThinning.               |
| --toolhelp        | Prints the help associated with a tool; --toolhelp="ExtractTroughNetwork".       |
| --toolparameters  | Prints the parameters (in json form) for a specific tool.                        |
| -v                | Verbose mode. Without this flag, tool outputs will not be printed.               |
| --version         | Prints the version information.                                                  |

Diagnostics are written to stderr and filtered with the `RUST_LOG` environment
variable; by default only warnings, or information in verbose mode, are shown.
*/

pub mod tools;

use crate::tools::ToolManager;
use std::env;
use std::io::{Error, ErrorKind};
use std::path;
use tracing_subscriber::EnvFilter;

#[macro_use]
extern crate serde_derive;

/// # Examples
///
/// ```text
/// >>./iwp_network --wd='/data/iwp/' --run=ExtractTroughNetwork --input_dir=tiles --output_dir=networks -v
/// ```
fn main() {
    match run() {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}

/// Splits `--flag="value"` into the normalized flag (`-flag`) and its value.
fn split_flag(arg: &str) -> (String, String) {
    let (flag, value) = match arg.find('=') {
        Some(i) => (&arg[..i], &arg[i + 1..]),
        None => (arg, ""),
    };
    (
        flag.to_lowercase().replace("--", "-"),
        value.replace("\"", "").replace("\'", ""),
    )
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // a subscriber may already be installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<(), Error> {
    let sep: &str = &path::MAIN_SEPARATOR.to_string();
    let mut tool_name = String::new();
    let mut run_tool = false;
    let mut tool_help = false;
    let mut tool_parameters = false;
    let mut toolbox = false;
    let mut list_tools = false;
    let mut keywords: Vec<String> = vec![];
    let mut tool_args_vec: Vec<String> = vec![];
    let mut finding_working_dir = false;
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        version();
        help();
        let tm = ToolManager::new("", &false)?;
        tm.list_tools();

        return Ok(());
    }

    let mut configs = iwp_common::configs::get_configs()?;
    let mut configs_modified = false;

    for arg in args {
        let (flag, v) = split_flag(&arg);
        match flag.as_str() {
            "-h" | "-help" => {
                help();
                return Ok(());
            }
            "-version" => {
                version();
                return Ok(());
            }
            "-cd" | "-wd" | "-working_directory" => {
                if v.trim().is_empty() {
                    finding_working_dir = true;
                    continue;
                }
                let mut working_dir = v.trim().to_string();
                if !working_dir.ends_with(sep) {
                    working_dir.push_str(sep);
                }
                if configs.working_directory != working_dir {
                    configs.working_directory = working_dir;
                    configs_modified = true;
                }
            }
            "-r" | "-run" => {
                tool_name = v;
                run_tool = true;
            }
            "-toolhelp" => {
                tool_name = v;
                tool_help = true;
            }
            "-toolparameters" => {
                tool_name = v;
                tool_parameters = true;
            }
            "-toolbox" => {
                tool_name = v;
                toolbox = true;
            }
            "-listtools" | "-list_tools" => list_tools = true,
            "-v" | "-verbose" => {
                let verbose = v.is_empty() || v.to_lowercase().contains("t");
                if configs.verbose_mode != verbose {
                    configs.verbose_mode = verbose;
                    configs_modified = true;
                }
            }
            "-max_procs" => {
                let val = v.trim().parse::<isize>().map_err(|_| {
                    Error::new(
                        ErrorKind::InvalidInput,
                        format!("Error parsing --max_procs value '{}'.", v),
                    )
                })?;
                if val != configs.max_procs {
                    configs.max_procs = val;
                    configs_modified = true;
                }
            }
            _ if arg.starts_with("-") => {
                // it's an arg to be fed to the tool
                tool_args_vec.push(arg.trim().to_string());
            }
            _ => {
                let value = arg.trim().replace("\"", "").replace("\'", "");
                if finding_working_dir {
                    let mut working_dir = value;
                    if !working_dir.ends_with(sep) {
                        working_dir.push_str(sep);
                    }
                    configs.working_directory = working_dir;
                    configs_modified = true;
                    finding_working_dir = false;
                } else if !tool_args_vec.is_empty() {
                    // the value of a space-separated tool argument
                    tool_args_vec.push(arg.trim().to_string());
                } else {
                    keywords.push(value);
                }
            }
        }
    }

    if configs_modified {
        iwp_common::configs::save_configs(&configs)?;
    }

    init_logging(configs.verbose_mode);

    let tm = ToolManager::new(&configs.working_directory, &configs.verbose_mode)?;
    if (run_tool || tool_help || tool_parameters || toolbox) && tool_name.is_empty() {
        if let Some(k) = keywords.first() {
            tool_name = k.clone();
        }
    }
    if run_tool {
        return tm.run_tool(tool_name, tool_args_vec);
    } else if tool_help {
        return tm.tool_help(tool_name);
    } else if tool_parameters {
        return tm.tool_parameters(tool_name);
    } else if toolbox {
        return tm.toolbox(tool_name);
    } else if list_tools {
        if keywords.is_empty() {
            tm.list_tools();
        } else {
            tm.list_tools_with_keywords(keywords);
        }
    }

    Ok(())
}

fn help() {
    let mut ext = "";
    if cfg!(target_os = "windows") {
        ext = ".exe";
    }

    let exe_name = &format!("iwp_network{}", ext);
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = "iwp_network Help

The following commands are recognized:
--cd, --wd          Changes the working directory; used in conjunction with --run flag.
-h, --help          Prints help information.
--listtools         Lists all available tools. Keywords may also be used, --listtools raster.
--max_procs         Sets the maximum number of tiles processed at once. -1 = all available processors. e.g. --max_procs=2
-r, --run           Runs a tool; used in conjunction with --wd flag; -r=\"ExtractTroughNetwork\".
--toolbox           Prints the toolbox associated with a tool; --toolbox=LineThinning.
--toolhelp          Prints the help associated with a tool; --toolhelp=\"ExtractTroughNetwork\".
--toolparameters    Prints the parameters (in json form) for a specific tool; --toolparameters=\"TroughNetworkLength\".
-v                  Verbose mode. Without this flag, tool outputs will not be printed.
--version           Prints the version information.

Set RUST_LOG (e.g. RUST_LOG=debug) to control which diagnostics are written to stderr.

Example Usage:
>> .*EXE_NAME -r=ExtractTroughNetwork --cd=\"*path*to*data*\" --input_dir=tiles --output_dir=networks -v
"
    .replace("*", &sep)
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!(
        "iwp_network v{}

Extracts, clips, and measures the trough networks between ice-wedge polygons.",
        VERSION.unwrap_or("unknown")
    );
}

#[cfg(test)]
mod test {
    use super::split_flag;

    #[test]
    fn test_split_flag() {
        assert_eq!(
            split_flag("--Run=\"LineThinning\""),
            ("-run".to_string(), "LineThinning".to_string())
        );
        assert_eq!(split_flag("-v"), ("-v".to_string(), String::new()));
        assert_eq!(
            split_flag("--wd='/data/a=b/'"),
            ("-wd".to_string(), "/data/a=b/".to_string())
        );
    }
}
