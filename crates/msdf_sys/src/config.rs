//! Mirrors of the small value types msdfgen's generator entry points take
//! next to a bitmap: projection and generator configuration.

use std::os::raw::c_int;
use std::ptr;

/// `msdfgen::Vector2`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// `msdfgen::Projection`: shape coordinates are mapped to pixels as
/// `(p + translate) * scale`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Projection {
    pub scale: Vector2,
    pub translate: Vector2,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            scale: Vector2::new(1.0, 1.0),
            translate: Vector2::new(0.0, 0.0),
        }
    }
}

/// `msdfgen::GeneratorConfig`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, bytemuck::Zeroable)]
pub struct GeneratorConfig {
    pub overlap_support: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            overlap_support: true,
        }
    }
}

/// Values of `msdfgen::ErrorCorrectionConfig::Mode`.
///
/// Kept as plain integers: native code may hand back a value this crate
/// does not know about.
pub type ErrorCorrectionMode = c_int;
pub const ERROR_CORRECTION_DISABLED: ErrorCorrectionMode = 0;
pub const ERROR_CORRECTION_INDISCRIMINATE: ErrorCorrectionMode = 1;
pub const ERROR_CORRECTION_EDGE_PRIORITY: ErrorCorrectionMode = 2;
pub const ERROR_CORRECTION_EDGE_ONLY: ErrorCorrectionMode = 3;

/// Values of `msdfgen::ErrorCorrectionConfig::DistanceCheckMode`.
pub type DistanceCheckMode = c_int;
pub const DO_NOT_CHECK_DISTANCE: DistanceCheckMode = 0;
pub const CHECK_DISTANCE_AT_EDGE: DistanceCheckMode = 1;
pub const ALWAYS_CHECK_DISTANCE: DistanceCheckMode = 2;

/// `ErrorCorrectionConfig::defaultMinDeviationRatio`.
pub const DEFAULT_MIN_DEVIATION_RATIO: f64 = 1.111_111_111_111_111_2;
/// `ErrorCorrectionConfig::defaultMinImproveRatio`.
pub const DEFAULT_MIN_IMPROVE_RATIO: f64 = 1.111_111_111_111_111_2;

/// `msdfgen::ErrorCorrectionConfig`.
///
/// `buffer` is optional scratch memory of at least `w * h` bytes owned by
/// the caller; null lets msdfgen allocate its own.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Zeroable)]
pub struct ErrorCorrectionConfig {
    pub mode: ErrorCorrectionMode,
    pub distance_check_mode: DistanceCheckMode,
    pub min_deviation_ratio: f64,
    pub min_improve_ratio: f64,
    pub buffer: *mut u8,
}

impl Default for ErrorCorrectionConfig {
    fn default() -> Self {
        Self {
            mode: ERROR_CORRECTION_EDGE_PRIORITY,
            distance_check_mode: CHECK_DISTANCE_AT_EDGE,
            min_deviation_ratio: DEFAULT_MIN_DEVIATION_RATIO,
            min_improve_ratio: DEFAULT_MIN_IMPROVE_RATIO,
            buffer: ptr::null_mut(),
        }
    }
}

/// `msdfgen::MSDFGeneratorConfig`, which derives from `GeneratorConfig`.
/// The base subobject is laid out first.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Zeroable)]
pub struct MSDFGeneratorConfig {
    pub base: GeneratorConfig,
    pub error_correction: ErrorCorrectionConfig,
}
