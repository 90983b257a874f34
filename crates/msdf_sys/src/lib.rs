//! `#[repr(C)]` mirrors of msdfgen's bitmap types.
//!
//! msdfgen's `Bitmap`, `BitmapRef` and `BitmapConstRef` are class templates
//! bindgen cannot lay out on its own, so this crate declares their shape by
//! hand: a sample pointer followed by two `int` dimensions. The generator
//! configuration structs that travel next to them are mirrored as well.
//!
//! Every mirror is pinned twice: `const` assertions in [`upstream`] refuse to
//! compile a mirror whose size or alignment drifts from the C layout, and a
//! [`LayoutManifest`] checked into the crate records each field's offset for
//! the msdfgen release the mirrors were written against.
//!
//! ```rust
//! use msdf_sys::{Bitmap, BitmapConstRef};
//!
//! let mut samples = vec![0.0f32; 16 * 16 * 3];
//! let bitmap = Bitmap::from_raw_parts(samples.as_mut_ptr(), 16, 16);
//! let view: BitmapConstRef<f32> = bitmap.into();
//! assert_eq!(view.sample_count(3), Some(samples.len()));
//! ```

pub mod bitmap;
pub mod config;
pub mod error;
pub mod layout;
pub mod upstream;

pub use bitmap::{Bitmap, BitmapConstRef, BitmapRef};
pub use config::{
    ErrorCorrectionConfig, GeneratorConfig, MSDFGeneratorConfig, Projection, Vector2,
};
pub use error::LayoutError;
pub use layout::{all_layouts, FieldLayout, MirrorLayout, TypeLayout};
pub use upstream::{LayoutManifest, UPSTREAM_VERSION};
