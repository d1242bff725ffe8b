//! Session settings
//!
//! Fixed for the lifetime of a session. Loaded once at startup from an
//! optional JSON file; anything missing falls back to the built-in layout.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_INSTANCES, MAX_PARTICLES, MIN_INSTANCES, MIN_PARTICLES};
use crate::error::SettingsError;
use crate::renderer::ShadingModel;

/// Lighting coefficients for the illumination shader
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialParams {
    pub ambient_color: Vec3,
    pub specular_color: Vec3,
    /// Diffuse weight
    pub kd: f32,
    /// Specular weight
    pub ks: f32,
    /// Ambient weight
    pub ka: f32,
    /// Blinn-Phong exponent
    pub shininess: f32,
    /// GGX roughness
    pub roughness: f32,
    /// Fresnel reflectance at normal incidence
    pub f0: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::splat(0.1),
            specular_color: Vec3::ONE,
            kd: 0.8,
            ks: 0.5,
            ka: 0.1,
            shininess: 25.0,
            roughness: 0.2,
            f0: 0.9,
        }
    }
}

impl MaterialParams {
    /// Mostly Lambertian variant used for the lane surfaces
    pub fn matte(&self) -> Self {
        Self {
            ka: 0.0,
            kd: 0.6,
            ks: 0.0,
            ..*self
        }
    }
}

/// Lane (plane) geometry. Lanes are static boxes laid out along +X.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneLayout {
    pub count: u32,
    /// X distance between neighbouring lanes
    pub spacing: f32,
    /// Center of the first lane
    pub position: Vec3,
    /// Half extents
    pub size: Vec3,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self {
            count: 3,
            spacing: 5.0,
            position: Vec3::new(0.0, -1.0, 4.0),
            size: Vec3::new(2.0, 0.1, 11.0),
            friction: 0.2,
            restitution: 0.2,
        }
    }
}

/// Pin rack geometry, repeated on every lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinLayout {
    /// Rows in the triangular rack (4 rows = 10 pins)
    pub rows: u32,
    /// Half extents
    pub size: Vec3,
    /// Mass of the pins on the first lane
    pub base_mass: f32,
    /// Extra mass per lane index
    pub mass_step: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for PinLayout {
    fn default() -> Self {
        Self {
            rows: 4,
            size: Vec3::new(0.12, 0.38, 0.12),
            base_mass: 1.5,
            mass_step: 1.0,
            friction: 0.5,
            restitution: 0.5,
        }
    }
}

impl PinLayout {
    /// Pins per lane
    pub fn pins_per_lane(&self) -> u32 {
        self.rows * (self.rows + 1) / 2
    }
}

/// Texture asset locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TexturePaths {
    pub pin: PathBuf,
    pub floor: PathBuf,
    pub ball: PathBuf,
}

impl Default for TexturePaths {
    fn default() -> Self {
        Self {
            pin: PathBuf::from("assets/textures/bowling_pin.jpg"),
            floor: PathBuf::from("assets/textures/bowling_floor.jpeg"),
            ball: PathBuf::from("assets/textures/bowling_ball.jpg"),
        }
    }
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window_width: u32,
    pub window_height: u32,
    pub title: String,

    /// RNG seed for particles and background; `None` = time based
    pub seed: Option<u64>,

    // === Lighting ===
    pub lights: [Vec3; 3],
    pub material: MaterialParams,
    /// Initial shading variant index
    pub shading: usize,

    // === Scene content ===
    pub lanes: LaneLayout,
    pub pins: PinLayout,
    /// Ball radius (uniform half extents)
    pub ball_size: Vec3,
    pub camera_start: Vec3,
    pub textures: TexturePaths,

    // === Overlay-adjustable, applied at scene init ===
    pub instance_count: u32,
    pub particle_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 1200,
            window_height: 900,
            title: "Space Bowling".to_string(),

            seed: None,

            lights: [
                Vec3::new(5.0, 10.0, 10.0),
                Vec3::new(-5.0, 10.0, 10.0),
                Vec3::new(5.0, 10.0, -10.0),
            ],
            material: MaterialParams::default(),
            shading: 0,

            lanes: LaneLayout::default(),
            pins: PinLayout::default(),
            ball_size: Vec3::splat(0.16),
            camera_start: Vec3::new(5.0, 1.0, 12.0),
            textures: TexturePaths::default(),

            instance_count: MAX_INSTANCES,
            particle_count: MAX_PARTICLES,
        }
    }
}

impl Settings {
    /// Default settings file name, looked up in the working directory
    const FILE_NAME: &'static str = "space_bowling.json";
    /// Environment variable overriding the settings path
    const PATH_ENV: &'static str = "SPACE_BOWLING_CONFIG";

    /// Load settings, falling back to defaults on any problem
    pub fn load() -> Self {
        let path = std::env::var_os(Self::PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::FILE_NAME));

        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e}");
                Self::default()
            }
        }
    }

    /// Read and validate a settings file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validated()
    }

    /// Clamp overlay counts into range and check the shading index
    pub fn validated(mut self) -> Result<Self, SettingsError> {
        if ShadingModel::from_index(self.shading).is_none() {
            return Err(SettingsError::UnknownShading(self.shading));
        }
        self.instance_count = self.instance_count.clamp(MIN_INSTANCES, MAX_INSTANCES);
        self.particle_count = self.particle_count.clamp(MIN_PARTICLES, MAX_PARTICLES);
        self.window_width = self.window_width.max(1);
        self.window_height = self.window_height.max(1);
        Ok(self)
    }

    /// Initial shading variant
    pub fn shading_model(&self) -> ShadingModel {
        ShadingModel::from_index(self.shading).unwrap_or_default()
    }
}
