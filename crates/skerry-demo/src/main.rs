//! Command-line island generator.
//!
//! Loads `config.ron` (creating it on first run), applies CLI overrides,
//! generates one island and logs a summary. With `--output` or
//! `output.island_path` set, the island is also written as RON.

mod delaunay;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use skerry_config::{CliArgs, Config, ConfigError, default_config_dir};
use skerry_terrain::{GenerationError, Island, IslandGenerator, PerlinNoise2D};

use crate::delaunay::DelaunayTriangulator;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("failed to serialize island: {0}")]
    Serialize(#[from] ron::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config
        .debug
        .log_dir
        .clone()
        .unwrap_or_else(|| config_dir.join("logs"));
    skerry_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), DemoError> {
    config.validate()?;

    let noise = PerlinNoise2D::new(config.island.noise.clone());
    let mut generator = IslandGenerator::new(noise, DelaunayTriangulator);
    let island = generator.generate(&config.island, None)?;
    log_summary(&island);

    if let Some(path) = &config.output.island_path {
        write_island(&island, path)?;
        tracing::info!(path = %path.display(), "island written");
    }
    Ok(())
}

fn log_summary(island: &Island) {
    let (low, high) = island.height_range().unwrap_or_default();
    tracing::info!(
        vertices = island.vertices.len(),
        edges = island.edges.len(),
        triangles = island.triangles.len(),
        roots = island.roots.len(),
        low,
        high,
        "island summary"
    );
}

fn write_island(island: &Island, path: &Path) -> Result<(), DemoError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(2)
        .enumerate_arrays(false);
    let serialized = ron::ser::to_string_pretty(island, pretty)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| DemoError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, serialized).map_err(|source| DemoError::Write {
        path: path.to_path_buf(),
        source,
    })
}
