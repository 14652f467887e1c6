#![forbid(unsafe_code)]

//! Tour-wide configuration.
//!
//! [`TourConfig`] groups every default a tour applies when a step does not
//! override it. It is a plain builder struct; with the `config` feature it can
//! also be loaded from TOML or JSON.
//!
//! # Loading
//!
//! ```toml
//! motion = "slide"
//! overlay_color = "#101820"
//! overlay_opacity = 0.6
//! backdrop = "continue"
//!
//! [shape]
//! shape = "rectangle"
//! padding = 8.0
//!
//! [floating]
//! placement = "top-start"
//! middleware = [{ type = "offset", distance = 6.0 }, { type = "flip", padding = 0.0 }]
//!
//! [native_driver]
//! ios = true
//! android = false
//! ```
//!
//! ```rust,ignore
//! let config = TourConfig::from_toml_file("tour.toml")?;
//! ```
//!
//! # Defaults
//!
//! Bounce motion, circle with 16px padding, black backdrop at 0.45 opacity,
//! tooltip below the spot with `offset(4) → shift(8) → flip`, no arrow, no
//! backdrop-press behavior.

use std::collections::BTreeMap;
#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use spotlight_core::color::Rgba;
use spotlight_core::motion::{Motion, MotionTiming};
use spotlight_core::shape::ShapeOptions;
use spotlight_layout::floating::{FloatingOptions, Middleware};

/// Default backdrop opacity.
pub const DEFAULT_OVERLAY_OPACITY: f64 = 0.45;

// ---------------------------------------------------------------------------
// Native driver
// ---------------------------------------------------------------------------

/// Operating system family, used to resolve [`NativeDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum Platform {
    Ios,
    Android,
    Web,
    Windows,
    Macos,
    Linux,
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub const fn current() -> Self {
        if cfg!(target_os = "ios") {
            Self::Ios
        } else if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_family = "wasm") {
            Self::Web
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Macos
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

/// Whether the host should run animations on its native driver.
///
/// Either one flag for every platform, or a per-platform map where missing
/// platforms resolve to `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(untagged))]
pub enum NativeDriver {
    All(bool),
    PerPlatform(BTreeMap<Platform, bool>),
}

impl Default for NativeDriver {
    fn default() -> Self {
        Self::All(true)
    }
}

impl NativeDriver {
    /// Resolve the flag for `platform`.
    pub fn resolve(&self, platform: Platform) -> bool {
        match self {
            Self::All(flag) => *flag,
            Self::PerPlatform(map) => map.get(&platform).copied().unwrap_or(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Tooltip
// ---------------------------------------------------------------------------

/// Tooltip arrow drawn on the edge facing the spot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ArrowOptions {
    pub size: f64,
    /// Also the minimum distance from the tooltip corners.
    pub corner_radius: f64,
    /// Arrow fill; `None` lets the host match the tooltip background.
    pub color: Option<Rgba>,
}

impl Default for ArrowOptions {
    fn default() -> Self {
        Self {
            size: 8.0,
            corner_radius: 2.0,
            color: None,
        }
    }
}

/// Tooltip fade timing.
///
/// On every step change the tooltip waits `delay`, then fades in over
/// `duration`. Hiding fades out over `duration` with no delay.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TooltipFade {
    #[cfg_attr(feature = "config", serde(with = "spotlight_core::motion::millis"))]
    pub delay: Duration,
    #[cfg_attr(feature = "config", serde(with = "spotlight_core::motion::millis"))]
    pub duration: Duration,
}

impl Default for TooltipFade {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(400),
            duration: Duration::from_millis(400),
        }
    }
}

/// Backdrop-press behavior that can be written down in a config file.
///
/// Custom callbacks are set in code with
/// [`SpotlightTourBuilder::on_backdrop_press`](crate::tour::SpotlightTourBuilder::on_backdrop_press).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum BackdropBehavior {
    /// Go to the next step, or stop on the last one.
    Continue,
    Stop,
}

// ---------------------------------------------------------------------------
// TourConfig
// ---------------------------------------------------------------------------

/// Tour-wide defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TourConfig {
    pub motion: Motion,
    pub shape: ShapeOptions,
    pub overlay_color: Rgba,
    pub overlay_opacity: f64,
    pub native_driver: NativeDriver,
    pub floating: FloatingOptions,
    pub arrow: Option<ArrowOptions>,
    pub tooltip: TooltipFade,
    pub motion_timing: MotionTiming,
    pub backdrop: Option<BackdropBehavior>,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            motion: Motion::Bounce,
            shape: ShapeOptions::default(),
            overlay_color: Rgba::BLACK,
            overlay_opacity: DEFAULT_OVERLAY_OPACITY,
            native_driver: NativeDriver::default(),
            floating: FloatingOptions::default(),
            arrow: None,
            tooltip: TooltipFade::default(),
            motion_timing: MotionTiming::default(),
            backdrop: None,
        }
    }
}

impl TourConfig {
    #[must_use]
    pub fn motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    #[must_use]
    pub fn shape(mut self, shape: impl Into<ShapeOptions>) -> Self {
        self.shape = shape.into();
        self
    }

    #[must_use]
    pub fn overlay_color(mut self, color: Rgba) -> Self {
        self.overlay_color = color;
        self
    }

    #[must_use]
    pub fn overlay_opacity(mut self, opacity: f64) -> Self {
        self.overlay_opacity = opacity;
        self
    }

    #[must_use]
    pub fn native_driver(mut self, native_driver: NativeDriver) -> Self {
        self.native_driver = native_driver;
        self
    }

    #[must_use]
    pub fn floating(mut self, floating: FloatingOptions) -> Self {
        self.floating = floating;
        self
    }

    #[must_use]
    pub fn arrow(mut self, arrow: ArrowOptions) -> Self {
        self.arrow = Some(arrow);
        self
    }

    #[must_use]
    pub fn tooltip(mut self, tooltip: TooltipFade) -> Self {
        self.tooltip = tooltip;
        self
    }

    #[must_use]
    pub fn motion_timing(mut self, timing: MotionTiming) -> Self {
        self.motion_timing = timing;
        self
    }

    #[must_use]
    pub fn backdrop(mut self, behavior: BackdropBehavior) -> Self {
        self.backdrop = Some(behavior);
        self
    }

    /// `options` with an arrow middleware appended when an arrow is
    /// configured and `options` does not already place one.
    pub fn with_arrow(&self, options: &FloatingOptions) -> FloatingOptions {
        match self.arrow {
            Some(arrow) if options.arrow_size().is_none() => {
                options.clone().arrow(arrow.size, arrow.corner_radius)
            }
            _ => options.clone(),
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            errors.push(format!(
                "overlay_opacity must be in [0, 1], got {}",
                self.overlay_opacity
            ));
        }

        if !self.shape.padding.is_finite() || self.shape.padding < 0.0 {
            errors.push(format!(
                "shape.padding must be finite and >= 0, got {}",
                self.shape.padding
            ));
        }

        let spring = self.motion_timing.spring;
        if spring.stiffness <= 0.0 {
            errors.push(format!(
                "motion_timing.spring.stiffness must be > 0, got {}",
                spring.stiffness
            ));
        }
        if spring.damping < 0.0 {
            errors.push(format!(
                "motion_timing.spring.damping must be >= 0, got {}",
                spring.damping
            ));
        }
        if spring.mass <= 0.0 {
            errors.push(format!(
                "motion_timing.spring.mass must be > 0, got {}",
                spring.mass
            ));
        }

        if let Some(arrow) = self.arrow
            && arrow.size <= 0.0
        {
            errors.push(format!("arrow.size must be > 0, got {}", arrow.size));
        }

        for (i, middleware) in self.floating.middleware.iter().enumerate() {
            let (name, value) = match *middleware {
                Middleware::Offset { distance } => ("offset.distance", distance),
                Middleware::Flip { padding } => ("flip.padding", padding),
                Middleware::Shift { padding } => ("shift.padding", padding),
                Middleware::Arrow { size, .. } => ("arrow.size", size),
            };
            if !value.is_finite() {
                errors.push(format!("floating.middleware[{i}].{name} must be finite"));
            } else if name != "offset.distance" && value < 0.0 {
                errors.push(format!(
                    "floating.middleware[{i}].{name} must be >= 0, got {value}"
                ));
            }
        }

        errors
    }

    /// Load, then reject the config if [`validate`](Self::validate) finds
    /// anything.
    #[cfg(feature = "config")]
    pub fn from_toml_str_validated(s: &str) -> Result<Self, ConfigError> {
        let config = Self::from_toml_str(s)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a tour configuration.
#[cfg(feature = "config")]
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

#[cfg(feature = "config")]
impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

#[cfg(feature = "config")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
