//! # bundle-util
//!
//! Command line access to the bundle utilities:
//!
//! ```bash
//! bundle-util tokenize 'a;version="[1,2)", b' -d ','
//! bundle-util encode payload.jar -l 76
//! bundle-util resolve --graph services.toml --root org.acme.GreeterImpl org.acme.Greeter
//! bundle-util module-id 12.3
//! bundle-util class-name org.acme.Greeter
//! ```

use bundle_util::codec::{encode_stream_with_preferences, CodecError};
use bundle_util::config::runtime::{self, runtime_config};
use bundle_util::logging;
use bundle_util::manifest::{parse_delimited, TokenizerError, CLAUSE_DELIMITER};
use bundle_util::naming;
use bundle_util::resolution::{GraphError, ResolutionError, TypeGraph};
use bundle_util::utils::SourceMap;
use bundle_util::{log_debug, log_info};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "bundle-util",
    version,
    about = "Manifest tokenizing, Base64 encoding and type resolution for module bundles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit log events as JSON lines on stderr
    #[arg(long, global = true)]
    structured_logs: bool,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a header value on delimiter characters, honoring quotes
    Tokenize {
        value: String,

        /// Every character is a delimiter
        #[arg(short, long, default_value = CLAUSE_DELIMITER)]
        delimiters: String,
    },

    /// Base64 encode a file (or stdin) to stdout
    Encode {
        file: Option<PathBuf>,

        /// Characters per line, a multiple of 4; 0 disables wrapping
        #[arg(short, long)]
        line_length: Option<u32>,
    },

    /// Find the loader that supplies a type as seen from a root type
    Resolve {
        /// TOML type graph
        #[arg(long)]
        graph: PathBuf,

        /// Type whose hierarchy is searched
        #[arg(long)]
        root: String,

        /// Type name to resolve
        name: String,
    },

    /// Split a module id into bundle id and revision
    ModuleId { id: String },

    /// Split a fully qualified class name into package and simple name
    ClassName { name: String },

    /// Package a resource path belongs to
    ResourcePackage { path: String },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Already rendered with source context
    #[error("{0}")]
    Tokenize(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CliError {
    fn tokenize(value: &str, error: TokenizerError) -> Self {
        match error.position() {
            Some(position) => {
                let rendered = SourceMap::new(value).format_error(position, &error.to_string());
                CliError::Tokenize(rendered.trim_end().to_string())
            }
            None => CliError::Tokenize(format!("Error: {}", error)),
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            CliError::Resolution(e) if e.is_malformed() => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Serialize)]
struct ModuleIdReport<'a> {
    module_id: &'a str,
    bundle_id: Option<u64>,
    revision: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ClassNameReport<'a> {
    class_name: &'a str,
    package: &'a str,
    simple_name: &'a str,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }
    if cli.verbose {
        eprintln!("{}", logging::get_system_diagnostics());
    }
    log_debug!("bundle-util starting", "command" => format!("{:?}", cli.command));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = out.flush();
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(cli: &Cli) -> Result<(), String> {
    let mut preferences = runtime_config().logging.clone();
    if cli.verbose {
        preferences.min_log_level = runtime::LogLevel::Debug;
        preferences.enable_console_logging = true;
    }
    if cli.structured_logs {
        preferences.use_structured_logging = true;
    }

    logging::config::init_runtime_preferences(preferences)?;
    logging::init_global_logging()
}

fn run(cli: &Cli, out: &mut dyn Write) -> Result<(), CliError> {
    match &cli.command {
        Commands::Tokenize { value, delimiters } => tokenize(value, delimiters, cli.json, out),
        Commands::Encode { file, line_length } => encode(file.as_deref(), *line_length, out),
        Commands::Resolve { graph, root, name } => resolve(graph, root, name, cli.json, out),
        Commands::ModuleId { id } => module_id(id, cli.json, out),
        Commands::ClassName { name } => class_name(name, cli.json, out),
        Commands::ResourcePackage { path } => {
            let package = naming::resource_package(path);
            if cli.json {
                serde_json::to_writer(&mut *out, &package)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", package)?;
            }
            Ok(())
        }
    }
}

fn tokenize(value: &str, delimiters: &str, json: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let tokens = parse_delimited(value, delimiters).map_err(|e| CliError::tokenize(value, e))?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &tokens)?;
        writeln!(out)?;
    } else {
        for token in &tokens {
            writeln!(out, "{}", token)?;
        }
    }
    Ok(())
}

fn encode(file: Option<&Path>, line_length: Option<u32>, out: &mut dyn Write) -> Result<(), CliError> {
    let preferences = &runtime_config().codec;
    let line_length = line_length.unwrap_or(preferences.default_line_length);

    let source: Box<dyn Read> = match file {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            log_info!("Encoding file", "path" => path.display());
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    encode_stream_with_preferences(source, &mut *out, line_length, preferences)?;
    out.flush()?;
    Ok(())
}

fn resolve(
    graph_path: &Path,
    root: &str,
    name: &str,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let graph = TypeGraph::from_file(graph_path)?;
    let found = graph.resolve(root, name)??;

    if json {
        serde_json::to_writer_pretty(&mut *out, &found)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{} -> {}", found.name, found.loader)?;
    }
    Ok(())
}

fn module_id(id: &str, json: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let report = ModuleIdReport {
        module_id: id,
        bundle_id: naming::bundle_id_from_module_id(id),
        revision: naming::module_revision_from_module_id(id),
    };

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        let show = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
        writeln!(out, "bundle:   {}", show(report.bundle_id.map(|v| v.to_string())))?;
        writeln!(out, "revision: {}", show(report.revision.map(|v| v.to_string())))?;
    }
    Ok(())
}

fn class_name(name: &str, json: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let report = ClassNameReport {
        class_name: name,
        package: naming::class_package(name),
        simple_name: naming::class_simple_name(name),
    };

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "package:     {}", report.package)?;
        writeln!(out, "simple name: {}", report.simple_name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const GRAPH: &str = r#"
[loaders.api]
visible = ["org.acme.Greeter"]

[loaders.impl]
visible = ["org.acme.GreeterImpl"]

[types."org.acme.Greeter"]
loader = "api"

[types."org.acme.GreeterImpl"]
loader = "impl"
interfaces = ["org.acme.Greeter"]

[types.Loop]
loader = "impl"
superclass = "Loop"
"#;

    fn run_args(args: &[&str]) -> (Result<(), CliError>, String) {
        let cli = Cli::try_parse_from(std::iter::once("bundle-util").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        let result = run(&cli, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn graph_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GRAPH.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tokenize_default_delimiter() {
        let (result, out) = run_args(&["tokenize", "a;version=\"[1,2)\", b"]);
        assert!(result.is_ok());
        assert_eq!(out, "a;version=\"[1,2)\"\nb\n");
    }

    #[test]
    fn test_tokenize_json() {
        let (result, out) = run_args(&["tokenize", "x y", "-d", " ", "--json"]);
        assert!(result.is_ok());
        let tokens: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(tokens, vec!["x", "y"]);
    }

    #[test]
    fn test_tokenize_error_shows_position() {
        let (result, _) = run_args(&["tokenize", "a\"b", "-d", "\""]);
        let error = result.unwrap_err();

        assert_eq!(error.exit_code(), 1);
        let message = error.to_string();
        assert!(message.contains("--> 1:2"));
        assert!(message.contains("a\"b"));
    }

    #[test]
    fn test_encode_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Man").unwrap();
        let path = file.path().to_str().unwrap();

        let (result, out) = run_args(&["encode", path, "-l", "0"]);
        assert!(result.is_ok());
        assert_eq!(out, "TWFu");
    }

    #[test]
    fn test_encode_rejects_bad_line_length() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Man").unwrap();
        let path = file.path().to_str().unwrap();

        let (result, _) = run_args(&["encode", path, "-l", "10"]);
        assert!(matches!(result, Err(CliError::Codec(_))));
    }

    #[test]
    fn test_encode_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.bin");

        let (result, _) = run_args(&["encode", path.to_str().unwrap()]);
        assert!(matches!(result, Err(CliError::Open { .. })));
    }

    #[test]
    fn test_resolve_found() {
        let file = graph_file();
        let graph = file.path().to_str().unwrap();

        let (result, out) = run_args(&[
            "resolve", "--graph", graph, "--root", "org.acme.GreeterImpl", "org.acme.Greeter",
        ]);
        assert!(result.is_ok());
        assert_eq!(out, "org.acme.Greeter -> api\n");
    }

    #[test]
    fn test_resolve_exit_codes() {
        let file = graph_file();
        let graph = file.path().to_str().unwrap();

        let (not_found, _) = run_args(&[
            "resolve", "--graph", graph, "--root", "org.acme.GreeterImpl", "org.other.Api",
        ]);
        assert_eq!(not_found.unwrap_err().exit_code(), 1);

        let (malformed, _) = run_args(&["resolve", "--graph", graph, "--root", "Loop", "Missing"]);
        assert_eq!(malformed.unwrap_err().exit_code(), 2);
    }

    #[test]
    fn test_module_id() {
        let (result, out) = run_args(&["module-id", "12.3"]);
        assert!(result.is_ok());
        assert_eq!(out, "bundle:   12\nrevision: 3\n");

        let (_, out) = run_args(&["module-id", "abc", "--json"]);
        let report: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(report["bundle_id"].is_null());
        assert!(report["revision"].is_null());
    }

    #[test]
    fn test_class_name_and_resource_package() {
        let (_, out) = run_args(&["class-name", "org.acme.Greeter", "--json"]);
        let report: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(report["package"], "org.acme");
        assert_eq!(report["simple_name"], "Greeter");

        let (_, out) = run_args(&["resource-package", "/org/acme/messages.properties"]);
        assert_eq!(out, "org.acme\n");
    }
}
