//! Generator configuration, in Rust types, convertible to the msdfgen mirrors.
//!
//! All types deserialize from TOML with every field optional, falling back to
//! msdfgen's own defaults:
//!
//! ```toml
//! overlap_support = true
//!
//! [error_correction]
//! mode = "edge-priority"
//! distance_check = "check-at-edge"
//! min_deviation_ratio = 1.1111111111111112
//! ```

use std::ptr;

use glam::DVec2;
use msdf_sys::config as sys;
use serde::{Deserialize, Serialize};

use crate::error::{MsdfError, Result};

/// Configuration for single-channel SDF generation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdfConfig {
    /// Use the variant of the algorithm that handles overlapping contours
    /// with the same winding. Can be turned off when the shape has none.
    pub overlap_support: bool,
}

impl Default for SdfConfig {
    fn default() -> Self {
        Self {
            overlap_support: true,
        }
    }
}

impl SdfConfig {
    pub fn to_raw(&self) -> sys::GeneratorConfig {
        sys::GeneratorConfig {
            overlap_support: self.overlap_support,
        }
    }
}

/// What the MSDF error correction pass is allowed to touch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCorrectionMode {
    /// Skip error correction.
    Disabled,
    /// Correct every discontinuity, even where edges get affected.
    Indiscriminate,
    /// Correct artifacts at edges and elsewhere, unless edges or corners
    /// would suffer.
    #[default]
    EdgePriority,
    /// Only correct artifacts at edges.
    EdgeOnly,
}

impl From<ErrorCorrectionMode> for sys::ErrorCorrectionMode {
    fn from(mode: ErrorCorrectionMode) -> Self {
        match mode {
            ErrorCorrectionMode::Disabled => sys::ERROR_CORRECTION_DISABLED,
            ErrorCorrectionMode::Indiscriminate => sys::ERROR_CORRECTION_INDISCRIMINATE,
            ErrorCorrectionMode::EdgePriority => sys::ERROR_CORRECTION_EDGE_PRIORITY,
            ErrorCorrectionMode::EdgeOnly => sys::ERROR_CORRECTION_EDGE_ONLY,
        }
    }
}

impl TryFrom<sys::ErrorCorrectionMode> for ErrorCorrectionMode {
    type Error = MsdfError;

    fn try_from(value: sys::ErrorCorrectionMode) -> Result<Self> {
        Ok(match value {
            sys::ERROR_CORRECTION_DISABLED => Self::Disabled,
            sys::ERROR_CORRECTION_INDISCRIMINATE => Self::Indiscriminate,
            sys::ERROR_CORRECTION_EDGE_PRIORITY => Self::EdgePriority,
            sys::ERROR_CORRECTION_EDGE_ONLY => Self::EdgeOnly,
            value => {
                return Err(MsdfError::UnknownMode {
                    kind: "error correction mode",
                    value,
                })
            }
        })
    }
}

/// Whether the exact shape distance is computed where artifacts are
/// suspected.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceCheckMode {
    /// Never.
    DoNotCheck,
    /// Only at edges; a good speed/precision balance.
    #[default]
    CheckAtEdge,
    /// For every suspected artifact.
    AlwaysCheck,
}

impl From<DistanceCheckMode> for sys::DistanceCheckMode {
    fn from(mode: DistanceCheckMode) -> Self {
        match mode {
            DistanceCheckMode::DoNotCheck => sys::DO_NOT_CHECK_DISTANCE,
            DistanceCheckMode::CheckAtEdge => sys::CHECK_DISTANCE_AT_EDGE,
            DistanceCheckMode::AlwaysCheck => sys::ALWAYS_CHECK_DISTANCE,
        }
    }
}

impl TryFrom<sys::DistanceCheckMode> for DistanceCheckMode {
    type Error = MsdfError;

    fn try_from(value: sys::DistanceCheckMode) -> Result<Self> {
        Ok(match value {
            sys::DO_NOT_CHECK_DISTANCE => Self::DoNotCheck,
            sys::CHECK_DISTANCE_AT_EDGE => Self::CheckAtEdge,
            sys::ALWAYS_CHECK_DISTANCE => Self::AlwaysCheck,
            value => {
                return Err(MsdfError::UnknownMode {
                    kind: "distance check mode",
                    value,
                })
            }
        })
    }
}

/// The MSDF error correction pass.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorCorrectionConfig {
    pub mode: ErrorCorrectionMode,
    pub distance_check: DistanceCheckMode,
    /// Minimum ratio between the actual and the maximum expected distance
    /// delta for a texel to count as an error.
    pub min_deviation_ratio: f64,
    /// Minimum ratio between the distance error before and after correction.
    /// Ignored with [`DistanceCheckMode::DoNotCheck`].
    pub min_improve_ratio: f64,
}

impl Default for ErrorCorrectionConfig {
    fn default() -> Self {
        Self {
            mode: ErrorCorrectionMode::default(),
            distance_check: DistanceCheckMode::default(),
            min_deviation_ratio: sys::DEFAULT_MIN_DEVIATION_RATIO,
            min_improve_ratio: sys::DEFAULT_MIN_IMPROVE_RATIO,
        }
    }
}

impl ErrorCorrectionConfig {
    /// Mirror with a null scratch buffer, letting msdfgen allocate its own.
    pub fn to_raw(&self) -> sys::ErrorCorrectionConfig {
        sys::ErrorCorrectionConfig {
            mode: self.mode.into(),
            distance_check_mode: self.distance_check.into(),
            min_deviation_ratio: self.min_deviation_ratio,
            min_improve_ratio: self.min_improve_ratio,
            buffer: ptr::null_mut(),
        }
    }

    pub fn from_raw(raw: &sys::ErrorCorrectionConfig) -> Result<Self> {
        Ok(Self {
            mode: raw.mode.try_into()?,
            distance_check: raw.distance_check_mode.try_into()?,
            min_deviation_ratio: raw.min_deviation_ratio,
            min_improve_ratio: raw.min_improve_ratio,
        })
    }
}

/// Configuration for multi-channel SDF generation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MsdfConfig {
    /// See [`SdfConfig::overlap_support`].
    pub overlap_support: bool,
    pub error_correction: ErrorCorrectionConfig,
}

impl Default for MsdfConfig {
    fn default() -> Self {
        Self {
            overlap_support: true,
            error_correction: ErrorCorrectionConfig::default(),
        }
    }
}

impl MsdfConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_raw(&self) -> sys::MSDFGeneratorConfig {
        sys::MSDFGeneratorConfig {
            base: sys::GeneratorConfig {
                overlap_support: self.overlap_support,
            },
            error_correction: self.error_correction.to_raw(),
        }
    }
}

/// Maps shape coordinates to pixels: `(p + translation) * scale`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    pub scale: DVec2,
    pub translation: DVec2,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            scale: DVec2::ONE,
            translation: DVec2::ZERO,
        }
    }
}

impl Projection {
    pub fn new(scale: DVec2, translation: DVec2) -> Self {
        Self { scale, translation }
    }

    /// Shape units to pixels.
    pub fn project(&self, p: DVec2) -> DVec2 {
        (p + self.translation) * self.scale
    }

    /// Pixels back to shape units.
    pub fn unproject(&self, p: DVec2) -> DVec2 {
        p / self.scale - self.translation
    }

    pub fn to_raw(&self) -> sys::Projection {
        sys::Projection {
            scale: sys::Vector2::new(self.scale.x, self.scale.y),
            translate: sys::Vector2::new(self.translation.x, self.translation.y),
        }
    }

    pub fn from_raw(raw: &sys::Projection) -> Self {
        Self {
            scale: DVec2::new(raw.scale.x, raw.scale.y),
            translation: DVec2::new(raw.translate.x, raw.translate.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_agree_with_native_defaults() {
        assert_eq!(MsdfConfig::default().to_raw(), sys::MSDFGeneratorConfig::default());
        assert_eq!(SdfConfig::default().to_raw(), sys::GeneratorConfig::default());
        assert_eq!(Projection::default().to_raw(), sys::Projection::default());
    }

    #[test]
    fn modes_map_both_ways() {
        for mode in [
            ErrorCorrectionMode::Disabled,
            ErrorCorrectionMode::Indiscriminate,
            ErrorCorrectionMode::EdgePriority,
            ErrorCorrectionMode::EdgeOnly,
        ] {
            let raw: sys::ErrorCorrectionMode = mode.into();
            assert_eq!(ErrorCorrectionMode::try_from(raw).unwrap(), mode);
        }
        assert_eq!(
            sys::DistanceCheckMode::from(DistanceCheckMode::AlwaysCheck),
            sys::ALWAYS_CHECK_DISTANCE
        );
    }

    #[test]
    fn unknown_native_mode_is_an_error() {
        let mut raw = ErrorCorrectionConfig::default().to_raw();
        raw.mode = 7;
        assert!(matches!(
            ErrorCorrectionConfig::from_raw(&raw),
            Err(MsdfError::UnknownMode { value: 7, .. })
        ));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = MsdfConfig::from_toml_str(
            r#"
            overlap_support = false

            [error_correction]
            mode = "edge-only"
            "#,
        )
        .unwrap();
        assert!(!cfg.overlap_support);
        assert_eq!(cfg.error_correction.mode, ErrorCorrectionMode::EdgeOnly);
        assert_eq!(cfg.error_correction.distance_check, DistanceCheckMode::CheckAtEdge);
        assert_eq!(
            cfg.error_correction.min_improve_ratio,
            sys::DEFAULT_MIN_IMPROVE_RATIO
        );

        let raw = cfg.to_raw();
        assert!(!raw.base.overlap_support);
        assert_eq!(raw.error_correction.mode, sys::ERROR_CORRECTION_EDGE_ONLY);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = MsdfConfig::from_toml_str("[error_correction]\nmode = \"sometimes\"").unwrap_err();
        assert!(matches!(err, MsdfError::Config(_)));
    }

    #[test]
    fn projection_round_trips_points() {
        let p = Projection::new(DVec2::splat(1.0 / 64.0), DVec2::new(128.0, 64.0));
        let px = p.project(DVec2::new(0.0, 0.0));
        assert_eq!(px, DVec2::new(2.0, 1.0));
        assert_eq!(p.unproject(px), DVec2::ZERO);
        assert_eq!(Projection::from_raw(&p.to_raw()), p);
    }
}
