//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use glam::DVec2;
use skerry_terrain::RootPlacement;

use crate::Config;

/// Island generator command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "skerry", about = "Grow a disk-graph island skeleton")]
pub struct CliArgs {
    /// Random seed for noise and sampling.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Number of root disks.
    #[arg(long)]
    pub roots: Option<u32>,

    /// Region width and height, e.g. `--region 20 12`. Also rescales the
    /// height falloff.
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    pub region: Option<Vec<f64>>,

    /// Smallest disk radius.
    #[arg(long)]
    pub min_radius: Option<f64>,

    /// Largest disk radius.
    #[arg(long)]
    pub max_radius: Option<f64>,

    /// Place the first root at the origin.
    #[arg(long)]
    pub origin_root: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the generated island to this RON file.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let island = &mut self.island;
        let poisson = &mut island.poisson;
        if let Some(seed) = args.seed {
            island.seed = seed;
        }
        if let Some(roots) = args.roots {
            poisson.root_count = roots;
        }
        if let Some([width, height]) = args.region.as_deref() {
            poisson.region_size = DVec2::new(*width, *height);
            island.heights.world_size = poisson.region_size;
        }
        if let Some(r) = args.min_radius {
            poisson.min_radius = r;
        }
        if let Some(r) = args.max_radius {
            poisson.max_radius = r;
        }
        if args.origin_root {
            poisson.root_placement = RootPlacement::Origin;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref path) = args.output {
            self.output.island_path = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(31),
            region: Some(vec![20.0, 12.0]),
            origin_root: true,
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.island.seed, 31);
        assert_eq!(config.island.poisson.region_size, DVec2::new(20.0, 12.0));
        assert_eq!(config.island.heights.world_size, DVec2::new(20.0, 12.0));
        assert_eq!(config.island.poisson.root_placement, RootPlacement::Origin);
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert_eq!(config.island.poisson.root_count, 1);
        assert_eq!(config.island.poisson.max_radius, 1.5);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_from_args() {
        let args = CliArgs::parse_from([
            "skerry",
            "--seed",
            "5",
            "--region",
            "8",
            "6",
            "--max-radius",
            "2.5",
            "--output",
            "island.ron",
        ]);
        assert_eq!(args.seed, Some(5));
        assert_eq!(args.region, Some(vec![8.0, 6.0]));
        assert_eq!(args.max_radius, Some(2.5));
        assert!(!args.origin_root);
        assert_eq!(args.output, Some(PathBuf::from("island.ron")));
    }
}
