//! Configuration parsing for octree build runs.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use svo_core::synthetic::Scene;
use svo_core::BuildConfig;

/// Root configuration for a build run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Octree and pool parameters.
	pub build: BuildConfig,
	/// Synthetic fragment source.
	pub scene: Scene,
	/// Light injection, absent for albedo-only builds.
	pub light: Option<LightConfig>,
	/// Run settings.
	pub run: RunConfig,
}

/// How irradiance samples are generated from the fragments.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightMode {
	/// Only the topmost fragment of each column is lit.
	#[default]
	TopDown,
	/// Every fragment is lit.
	Uniform,
}

/// Light injection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightConfig {
	#[serde(default)]
	pub mode: LightMode,
	/// Linear RGB irradiance, 0.0-1.0 per channel.
	#[serde(default = "default_irradiance")]
	pub irradiance: [f32; 3],
	/// Relight passes after each rebuild, dimming the light a step each time.
	#[serde(default)]
	pub updates: u32,
}

/// Run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
	/// Number of rebuilds.
	pub frames: u32,
	/// Rebuild on a background thread instead of the calling one.
	pub background: bool,
	/// Level whose voxels are counted for display.
	pub visualized_level: Option<u32>,
}

fn default_irradiance() -> [f32; 3] {
	[1.0, 1.0, 1.0]
}

impl Default for RunConfig {
	fn default() -> Self {
		Self {
			frames: 1,
			background: false,
			visualized_level: None,
		}
	}
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;

		let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;

		config.validate()?;
		Ok(config)
	}

	/// Validate run and light settings. Octree parameters are checked by the builder.
	pub fn validate(&self) -> Result<()> {
		if self.run.frames == 0 {
			bail!("run.frames must be at least 1");
		}

		if let Some(light) = &self.light {
			for (i, value) in light.irradiance.iter().enumerate() {
				if !(0.0..=1.0).contains(value) {
					bail!("light.irradiance[{}] = {} is outside 0.0-1.0", i, value);
				}
			}
		}

		if let Scene::Box { min, max } = self.scene {
			if (0..3).any(|axis| min[axis] >= max[axis]) {
				bail!("scene box min {:?} must be below max {:?} on every axis", min, max);
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_full_config() {
		let config: Config = toml::from_str(
			r#"
			[build]
			voxel_grid_resolution = 64
			brick_pool_resolution = 96
			on_node_pool_exhausted = "clamp"

			[scene.sphere]
			radius = 0.3

			[light]
			mode = "uniform"
			irradiance = [0.5, 0.5, 0.25]
			updates = 2

			[run]
			frames = 3
			background = true
			visualized_level = 4
			"#,
		)
		.unwrap();

		assert_eq!(config.build.voxel_grid_resolution, 64);
		assert_eq!(config.scene, Scene::Sphere { radius: 0.3 });
		let light = config.light.as_ref().unwrap();
		assert_eq!(light.mode, LightMode::Uniform);
		assert_eq!(light.updates, 2);
		assert_eq!(config.run.frames, 3);
		assert!(config.run.background);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_empty_config_uses_defaults() {
		let config: Config = toml::from_str("").unwrap();
		assert_eq!(config.build, BuildConfig::default());
		assert_eq!(config.scene, Scene::default());
		assert!(config.light.is_none());
		assert_eq!(config.run.frames, 1);
	}

	#[test]
	fn test_rejects_bad_values() {
		let mut config = Config::default();
		config.run.frames = 0;
		assert!(config.validate().is_err());

		let config: Config = toml::from_str("[light]\nirradiance = [2.0, 0.0, 0.0]").unwrap();
		assert!(config.validate().is_err());

		let config: Config = toml::from_str("[scene.box]\nmin = [4, 0, 0]\nmax = [2, 8, 8]").unwrap();
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_rejects_unknown_keys() {
		assert!(toml::from_str::<Config>("[run]\nframez = 2").is_err());
	}
}
