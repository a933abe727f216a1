//! Octree build driver.
//!
//! Voxelizes a synthetic scene, builds the sparse voxel octree one or more
//! times through the double-buffered store, optionally injects light, and
//! prints per-level statistics.
//!
//! Usage:
//!   cargo run -p svo_cli --bin svo_build -- --config svo.toml
//!   cargo run -p svo_cli --bin svo_build -- --resolution 128 --report stats.json

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, LightMode};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use glam::Vec3;
use svo_core::synthetic::{top_down_light, uniform_light, FragmentSource};
use svo_core::{BuildStats, Channel, FragmentList, IrradianceList, OctreeBuilder, OctreeStore};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "svo_build")]
#[command(about = "Build sparse voxel octrees from synthetic scenes")]
struct Args {
	/// Path to configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Override the voxel grid resolution
	#[arg(short, long)]
	resolution: Option<u32>,

	/// Override the number of rebuilds
	#[arg(short, long)]
	frames: Option<u32>,

	/// Override the visualized level
	#[arg(short, long)]
	level: Option<u32>,

	/// Write build statistics as JSON
	#[arg(long)]
	report: Option<PathBuf>,
}

/// Everything written by `--report`.
#[derive(Serialize)]
struct Report<'a> {
	config: &'a Config,
	builds: Vec<BuildStats>,
	failed_builds: u64,
	light_updates: u32,
	visualized_level: u32,
	visualized_voxels: usize,
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();

	let mut config = match &args.config {
		Some(path) => Config::load(path)?,
		None => Config::default(),
	};
	if let Some(resolution) = args.resolution {
		config.build.voxel_grid_resolution = resolution;
	}
	if let Some(frames) = args.frames {
		config.run.frames = frames;
	}
	if let Some(level) = args.level {
		config.run.visualized_level = Some(level);
	}
	config.validate()?;

	let mut builder = OctreeBuilder::new(config.build.clone()).context("Invalid build configuration")?;
	let layout = *builder.layout();
	let visualized_level = builder.set_visualized_level(config.run.visualized_level.unwrap_or(layout.max_level));

	println!("Octree Builder");
	println!("==============");
	println!("Resolution: {} ({} levels)", layout.resolution, layout.max_level + 1);
	println!(
		"Node pool: {} tiles, brick pool: {} bricks of {}^3",
		layout.node_tile_capacity, layout.brick_capacity, layout.brick_size
	);
	println!("Scene: {:?}", config.scene);
	println!();

	let fragments = config.scene.fragments(layout.resolution);
	let list = Arc::new(FragmentList::from_fragments(layout.fragment_capacity, fragments.iter().copied()));
	info!(fragments = fragments.len(), appended = list.len(), "voxelized scene");

	let light = config.light.as_ref().map(|light| {
		let irradiance = Vec3::from_array(light.irradiance);
		let samples = match light.mode {
			LightMode::TopDown => top_down_light(&fragments, irradiance),
			LightMode::Uniform => uniform_light(&fragments, irradiance),
		};
		(light, Arc::new(IrradianceList::from_samples(&samples)))
	});

	let mut store = OctreeStore::new(builder);
	let mut builds = Vec::new();
	let mut light_updates = 0;

	for frame in 0..config.run.frames {
		let samples = light.as_ref().map(|(_, samples)| samples);
		let outcome = if config.run.background {
			store
				.rebuild_async(Arc::clone(&list), samples.cloned())
				.context("Failed to start background rebuild")?;
			store.wait().context("Background rebuild vanished")?.cloned()
		} else {
			store.rebuild(&list, samples.map(|s| &**s)).cloned()
		};

		match outcome {
			Ok(stats) => {
				print_stats(frame, &stats);
				builds.push(stats);
			}
			Err(err) => error!(%err, frame, "build failed"),
		}

		if let Some((settings, _)) = &light {
			for step in 1..=settings.updates {
				let scale = 1.0 - step as f32 / (settings.updates + 1) as f32;
				let irradiance = Vec3::from_array(settings.irradiance) * scale;
				let samples = match settings.mode {
					LightMode::TopDown => top_down_light(&fragments, irradiance),
					LightMode::Uniform => uniform_light(&fragments, irradiance),
				};
				if store.update_lighting(&IrradianceList::from_samples(&samples))? {
					light_updates += 1;
				}
			}
		}
	}

	let visualized_voxels = match store.current() {
		Some(view) => {
			let voxels = view.voxels_at_level(visualized_level, Channel::Albedo);
			println!("Level {}: {} occupied voxels", visualized_level, voxels.len());
			if config.light.is_some() {
				let lit = view
					.voxels_at_level(visualized_level, Channel::Radiance)
					.iter()
					.filter(|(_, rgba)| rgba[..3].iter().any(|&c| c > 0))
					.count();
				println!("Level {}: {} lit voxels", visualized_level, lit);
			}
			voxels.len()
		}
		None => {
			println!("No octree was built");
			0
		}
	};

	let metrics = store.metrics();
	println!();
	println!(
		"Builds: {} ok, {} failed, avg {:.0}us",
		metrics.builds,
		metrics.failed_builds,
		metrics.average_build_us()
	);

	if let Some(path) = &args.report {
		let report = Report {
			config: &config,
			builds,
			failed_builds: metrics.failed_builds,
			light_updates,
			visualized_level,
			visualized_voxels,
		};
		let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
		std::fs::write(path, json).with_context(|| format!("Failed to write report: {}", path.display()))?;
		println!("Report written to {}", path.display());
	}

	Ok(())
}

fn print_stats(frame: u32, stats: &BuildStats) {
	println!(
		"Build {}: {} fragments, {} nodes, {} bricks in {}us ({} dispatches, {} barriers)",
		frame,
		stats.fragments,
		stats.total_nodes(),
		stats.bricks_allocated,
		stats.elapsed_us,
		stats.dispatches,
		stats.barriers
	);
	for level in &stats.levels {
		if level.nodes == 0 {
			continue;
		}
		println!(
			"  level {:>2}: {:>8} nodes from {:>8}, {:>7} subdivided",
			level.level,
			level.nodes,
			level.first_node,
			stats.subdivided_at(level.level)
		);
	}
	if stats.fragments_dropped > 0 {
		println!("  fragment list full, {} dropped", stats.fragments_dropped);
	}
	if stats.node_pool_exhausted {
		println!("  node pool exhausted: {} of {} tiles requested", stats.tiles_requested, stats.tile_capacity);
	}
	if stats.brick_pool_exhausted {
		println!("  brick pool exhausted: {} of {} bricks requested", stats.bricks_requested, stats.brick_capacity);
	}
}
