use std::env;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use dotenvsh::{Binding, EnvLoader, HostEnv, Shell, parse_path, render};
use regex::Regex;

const AUTO_DETECT: &str = "auto-detect";

const HELP: &str = "\
dotenvsh - print dotenv files as shell statements

Usage:
  dotenvsh [OPTIONS]
  eval \"$(dotenvsh)\"

Options:
  -d, --dir <DIR>         Directory to search. Repeatable. Defaults to the
                          current directory.
  -f, --file <NAME>       File name to look for. Repeatable. Defaults to .env.
  -r, --recursive         Also search subdirectories.
  -s, --shell <SHELL>     Output syntax: bash, zsh, sh, fish, powershell, cmd,
                          none, value or auto-detect. Defaults to auto-detect.
      --filter <REGEX>    Only print variables whose name matches REGEX.
  -q, --quiet             Suppress diagnostics other than errors.
  -h, --help              Show this help text.
  -V, --version           Show the version.
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum CliCommand {
    Help,
    Version,
    Print(PrintOptions),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct PrintOptions {
    dirs: Vec<PathBuf>,
    names: Vec<String>,
    recursive: bool,
    /// `None` means detect from the environment.
    shell: Option<Shell>,
    filter: Option<String>,
    quiet: bool,
}

fn main() {
    process::exit(run(env::args_os()));
}

fn run(args: impl IntoIterator<Item = OsString>) -> i32 {
    let mut args = args.into_iter();
    let _bin = args.next();

    match parse_options(args.collect()) {
        Ok(CliCommand::Help) => {
            println!("{HELP}");
            0
        }
        Ok(CliCommand::Version) => {
            println!("dotenvsh {}", env!("CARGO_PKG_VERSION"));
            0
        }
        Ok(CliCommand::Print(options)) => match execute(&options, &HostEnv::process()) {
            Ok(output) => match write_output(&output) {
                Ok(()) => 0,
                Err(err) => {
                    eprintln!("dotenvsh: cannot write output: {err}");
                    1
                }
            },
            Err(err) => {
                eprintln!("dotenvsh: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("dotenvsh: {err}");
            eprintln!("Try `dotenvsh --help`.");
            1
        }
    }
}

fn parse_options(args: Vec<OsString>) -> Result<CliCommand, String> {
    let mut options = PrintOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        let token = args[index].to_string_lossy().into_owned();
        let (flag, inline) = match token.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => {
                (flag.to_owned(), Some(value.to_owned()))
            }
            _ => (token.clone(), None),
        };
        index += 1;

        let mut value_for = |name: &str| -> Result<String, String> {
            if let Some(value) = inline.clone() {
                return Ok(value);
            }
            let value = args
                .get(index)
                .ok_or_else(|| format!("missing value for `{name}`"))?;
            index += 1;
            Ok(value.to_string_lossy().into_owned())
        };

        match flag.as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-V" | "--version" => return Ok(CliCommand::Version),
            "-d" | "--dir" => options.dirs.push(PathBuf::from(value_for("-d/--dir")?)),
            "-f" | "--file" => options.names.push(value_for("-f/--file")?),
            "-s" | "--shell" => {
                let shell = value_for("-s/--shell")?;
                options.shell = if shell == AUTO_DETECT {
                    None
                } else {
                    Some(shell.parse().map_err(|err| format!("{err}"))?)
                };
            }
            "--filter" => options.filter = Some(value_for("--filter")?),
            "-r" | "--recursive" => options.recursive = true,
            "-q" | "--quiet" => options.quiet = true,
            unknown if unknown.starts_with('-') => {
                return Err(format!("unknown option `{unknown}`"));
            }
            unexpected => return Err(format!("unexpected argument `{unexpected}`")),
        }
    }

    Ok(CliCommand::Print(options))
}

fn execute(options: &PrintOptions, host: &HostEnv) -> Result<String, String> {
    let filter = options
        .filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|err| format!("invalid filter pattern: {err}"))?;

    let loader = EnvLoader::new()
        .dirs(&options.dirs)
        .names(options.names.iter().cloned())
        .recursive(options.recursive)
        .verbose(!options.quiet)
        .env(host.clone());
    let path = loader.find();
    if let Some(path) = &path {
        log(options, format_args!("using dotenv file {}", path.display()));
    }
    let bindings = parse_path(path.as_deref(), host).map_err(|err| err.to_string())?;

    let shell = match options.shell {
        Some(shell) => shell,
        None => {
            let shell = Shell::detect(host)
                .ok_or("cannot detect the current shell; pass --shell explicitly")?;
            log(options, format_args!("detected shell {shell}"));
            shell
        }
    };

    let selected: Vec<Binding> = bindings
        .into_iter()
        .filter(|binding| {
            filter
                .as_ref()
                .is_none_or(|pattern| pattern.is_match(&binding.name))
        })
        .collect();
    Ok(render(&selected, shell))
}

fn write_output(output: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()
}

fn log(options: &PrintOptions, message: std::fmt::Arguments<'_>) {
    if !options.quiet {
        eprintln!("dotenvsh: {message}");
    }
}
