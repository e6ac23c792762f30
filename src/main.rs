//! RoomLens native front end for the preprocessing and outline pipelines.
//!
//! ```text
//! roomlens-native prepare <input> <output> [--config <path>]
//! roomlens-native outline <mask> <output.png> [--config <path>]
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use roomlens::{AppConfig, ConfigError, ImageFile, ImagePreprocessor, PreprocessError};
use roomlens_raster::{AlphaRaster, RasterError, extract_outline};
use web_time::Instant;

const USAGE: &str = "Usage:
  roomlens-native prepare <input> <output> [--config <path>]
  roomlens-native outline <mask> <output.png> [--config <path>]";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

enum Command {
    Prepare { input: PathBuf, output: PathBuf },
    Outline { mask: PathBuf, output: PathBuf },
}

struct Args {
    command: Command,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, CliError> {
    let name = args
        .next()
        .ok_or_else(|| CliError::Usage("Missing command".to_string()))?;

    let mut positional = Vec::new();
    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--config needs a path".to_string()))?;
                config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("Unknown option {}", flag)));
            }
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let [first, second]: [PathBuf; 2] = positional.try_into().map_err(|_| {
        CliError::Usage(format!("'{}' takes exactly two paths", name))
    })?;
    let command = match name.as_str() {
        "prepare" => Command::Prepare {
            input: first,
            output: second,
        },
        "outline" => Command::Outline {
            mask: first,
            output: second,
        },
        other => return Err(CliError::Usage(format!("Unknown command '{}'", other))),
    };
    Ok(Args { command, config })
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    match path {
        Some(path) => Ok(AppConfig::load_from_file(path)?),
        None => Ok(AppConfig::load_or_default()),
    }
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, bytes).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// MIME type from the file extension, the way a browser file picker reports it.
fn guess_mime(path: &Path) -> String {
    match image::ImageFormat::from_path(path) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => "application/octet-stream".to_string(),
    }
}

fn prepare(config: &AppConfig, input: &Path, output: &Path) -> Result<(), CliError> {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = ImageFile::new(name, guess_mime(input), read(input)?);

    let mut preprocessor = ImagePreprocessor::new(config.limits)
        .on_validation_error(|kind| eprintln!("{}", kind));
    let prepared = preprocessor.prepare(file)?;
    write(output, &prepared.file.bytes)?;

    println!(
        "{}x{} -> {}x{} ({}, {} bytes)",
        prepared.original.width,
        prepared.original.height,
        prepared.dimensions.width,
        prepared.dimensions.height,
        prepared.file.mime_type,
        prepared.file.size()
    );
    Ok(())
}

fn outline(config: &AppConfig, mask: &Path, output: &Path) -> Result<(), CliError> {
    let started = Instant::now();
    let alpha = AlphaRaster::decode(&read(mask)?)?;
    let raster = extract_outline(&alpha, &config.outline);
    write(output, &raster.encode_png()?)?;

    log::info!(
        "Outlined {:?} in {:.0}ms",
        mask,
        started.elapsed().as_secs_f64() * 1000.0
    );
    println!(
        "{}x{} outline, {} boundary pixels",
        raster.width(),
        raster.height(),
        raster.painted_count()
    );
    Ok(())
}

/// Install the logger before anything else logs. `RUST_LOG`, when set, wins
/// over the config file for the whole run. Returns whether it was set.
fn init_logging() -> bool {
    let env_override = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Trace)
        .parse_default_env()
        .init();
    if let Some(level) = startup_level(env_override) {
        log::set_max_level(level);
    }
    env_override
}

/// Level used while the config file is being read.
fn startup_level(env_override: bool) -> Option<log::LevelFilter> {
    (!env_override).then_some(log::LevelFilter::Info)
}

/// Level from the config file, unless `RUST_LOG` took over.
fn configured_level(config: &AppConfig, env_override: bool) -> Option<log::LevelFilter> {
    (!env_override).then(|| config.preferences.log_level.to_level_filter())
}

fn run() -> Result<(), CliError> {
    let args = parse_args(std::env::args().skip(1))?;
    let env_override = init_logging();
    let config = load_config(args.config.as_deref())?;

    if let Some(level) = configured_level(&config, env_override) {
        log::set_max_level(level);
    }
    log::debug!("Using configuration version {}", config.version);

    match args.command {
        Command::Prepare { input, output } => prepare(&config, &input, &output),
        Command::Outline { mask, output } => outline(&config, &mask, &output),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if matches!(e, CliError::Usage(_)) {
                eprintln!("\n{}", USAGE);
            }
            ExitCode::FAILURE
        }
    }
}
