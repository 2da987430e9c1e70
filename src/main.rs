use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use framechain::{
    ComposeConfig, Pipeline, RotationNormPolicy, codec::DocumentFormat, resource::FileSystem,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    about = "Composes the transforms parent -> child and child -> grandchild into parent -> grandchild",
    long_about = None
)]
struct Cli {
    /// Transform document for the first link of the chain (parent -> child)
    first: PathBuf,
    /// Transform document for the second link of the chain (child -> grandchild)
    second: PathBuf,
    /// Path to write the composed transform document to
    output: PathBuf,
    /// Path to RON configuration file to use
    #[arg(short, long)]
    config_path: Option<PathBuf>,
    /// Normalize input rotations that are not of unit length instead of failing
    #[arg(long)]
    renormalize: bool,
    /// Format of the output document (inferred from the output extension if omitted)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
    /// Print debug messages
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_config(cli: &Cli) -> Result<ComposeConfig> {
    let mut config = match &cli.config_path {
        Some(path) => ComposeConfig::from_ron_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ComposeConfig::default(),
    };

    if cli.renormalize {
        config.rotation_norm_policy = RotationNormPolicy::Renormalize;
    }
    if let Some(format) = cli.format {
        config.output_format = Some(match format {
            OutputFormat::Yaml => DocumentFormat::Yaml,
            OutputFormat::Json => DocumentFormat::Json,
        });
    }
    Ok(config)
}

fn path_as_str<'a>(path: &'a Path, name: &str) -> Result<&'a str> {
    path.to_str()
        .with_context(|| format!("The {name} path {} is not valid UTF-8", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let pipeline = Pipeline::new(config);

    let first = path_as_str(&cli.first, "first input")?;
    let second = path_as_str(&cli.second, "second input")?;
    let output = path_as_str(&cli.output, "output")?;

    pipeline
        .run(&mut FileSystem, first, second, output)
        .with_context(|| format!("Failed to compose {first} with {second} into {output}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_path_is_passed_through() {
        assert_eq!(
            path_as_str(Path::new("out/world_sensor.yaml"), "output").unwrap(),
            "out/world_sensor.yaml"
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_path_is_rejected_instead_of_replaced() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let path = Path::new(OsStr::from_bytes(b"robot\xff.yaml"));
        let error = path_as_str(path, "first input").unwrap_err();

        assert!(error.to_string().contains("first input"));
    }
}
