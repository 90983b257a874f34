//! Safe ownership layer over the msdfgen bitmap mirrors in `msdf_sys`.
//!
//! Native code only ever sees pixel memory through the `#[repr(C)]` mirrors;
//! this crate decides who owns that memory and for how long:
//!
//! - [`BitmapBuffer`] owns its samples (Rust allocation, Rust release);
//! - [`BitmapView`] / [`BitmapViewMut`] borrow them, so the borrow checker
//!   keeps every view inside its buffer's lifetime;
//! - [`Sdf`], [`Msdf`] and [`Mtsdf`] pair a float buffer with the range and
//!   edge value needed to interpret it.
//!
//! # Example
//! ```rust
//! use msdf::{DistanceField, Msdf, MsdfConfig};
//!
//! let mut field = Msdf::new(32, 32, 4.0)?;
//! let config = MsdfConfig::default().to_raw();
//!
//! let mut out = field.view_mut();
//! let target = out.as_raw();
//! // target.as_ptr() and &config are what a native generator call takes.
//! assert_eq!((target.width(), target.height()), (32, 32));
//! assert!(config.base.overlap_support);
//! # Ok::<(), msdf::MsdfError>(())
//! ```

mod buffer;
mod config;
mod error;
mod field;

pub use buffer::{BitmapBuffer, BitmapView, BitmapViewMut, PixelImage};
pub use config::{
    DistanceCheckMode, ErrorCorrectionConfig, ErrorCorrectionMode, MsdfConfig, Projection,
    SdfConfig,
};
pub use error::{MsdfError, Result};
pub use field::{DistanceField, GrayFImage, Msdf, Mtsdf, Sdf, DEFAULT_MID_VALUE};

pub use msdf_sys;

/// Checks the mirrors against the layout manifest shipped for this target.
///
/// Returns `Ok(false)` when no manifest is pinned for the target's pointer
/// width; the compile-time size checks still apply there.
pub fn verify_layouts() -> Result<bool> {
    match msdf_sys::LayoutManifest::pinned() {
        Some(manifest) => {
            manifest?.verify()?;
            Ok(true)
        }
        None => {
            log::warn!("no pinned layout manifest for this target");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_layouts_verify() {
        let checked = verify_layouts().unwrap();
        assert_eq!(checked, cfg!(target_pointer_width = "64"));
    }
}
