//! What the native side looks like, and how drift from it is caught.
//!
//! Two layers guard the mirrors:
//!
//! * the constants below are derived from C layout rules for the current
//!   target and checked with `const` assertions, so a mirror that stops
//!   matching them does not compile;
//! * a [`LayoutManifest`] pins the full descriptor set for one msdfgen
//!   version. Bumping the vendored msdfgen means regenerating the manifest
//!   (`msdf_layout print`) after checking the new headers, and
//!   [`LayoutManifest::verify`] fails loudly when the two disagree.

use std::mem::{align_of, size_of};
use std::os::raw::c_int;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::bitmap::{Bitmap, BitmapConstRef, BitmapRef};
use crate::config::{
    ErrorCorrectionConfig, GeneratorConfig, MSDFGeneratorConfig, Projection, Vector2,
};
use crate::error::LayoutError;
use crate::layout::{all_layouts, TypeLayout};

/// msdfgen release whose headers the mirrors were checked against.
pub const UPSTREAM_VERSION: &str = "1.10";

/// Manifest pinned for 64-bit targets.
pub const PINNED_MANIFEST_64: &str = include_str!("../layouts/msdfgen-64.toml");

const fn round_up(n: usize, align: usize) -> usize {
    n.div_ceil(align) * align
}

const fn max(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}

const PTR_SIZE: usize = size_of::<*const u8>();
const PTR_ALIGN: usize = align_of::<*const u8>();
const INT_SIZE: usize = 4;
const DOUBLE_ALIGN: usize = align_of::<f64>();

/// `sizeof(Bitmap<T>)`, identical for every `T` and every view kind.
pub const BITMAP_SIZE: usize = round_up(PTR_SIZE + 2 * INT_SIZE, PTR_ALIGN);
pub const BITMAP_ALIGN: usize = PTR_ALIGN;

pub const VECTOR2_SIZE: usize = 16;
pub const PROJECTION_SIZE: usize = 2 * VECTOR2_SIZE;

pub const GENERATOR_CONFIG_SIZE: usize = 1;

pub const ERROR_CORRECTION_ALIGN: usize = max(DOUBLE_ALIGN, PTR_ALIGN);
pub const ERROR_CORRECTION_SIZE: usize = round_up(
    round_up(2 * INT_SIZE, DOUBLE_ALIGN) + 2 * 8 + PTR_SIZE,
    ERROR_CORRECTION_ALIGN,
);

pub const MSDF_GENERATOR_CONFIG_SIZE: usize = round_up(
    round_up(GENERATOR_CONFIG_SIZE, ERROR_CORRECTION_ALIGN) + ERROR_CORRECTION_SIZE,
    ERROR_CORRECTION_ALIGN,
);

const _: () = assert!(size_of::<c_int>() == INT_SIZE);

const _: () = assert!(size_of::<Bitmap<f32>>() == BITMAP_SIZE);
const _: () = assert!(size_of::<Bitmap<u8>>() == BITMAP_SIZE);
const _: () = assert!(size_of::<BitmapRef<f32>>() == BITMAP_SIZE);
const _: () = assert!(size_of::<BitmapRef<u8>>() == BITMAP_SIZE);
const _: () = assert!(size_of::<BitmapConstRef<f32>>() == BITMAP_SIZE);
const _: () = assert!(size_of::<BitmapConstRef<u8>>() == BITMAP_SIZE);
const _: () = assert!(align_of::<Bitmap<f32>>() == BITMAP_ALIGN);
const _: () = assert!(align_of::<Bitmap<u8>>() == BITMAP_ALIGN);
const _: () = assert!(align_of::<BitmapRef<f32>>() == BITMAP_ALIGN);
const _: () = assert!(align_of::<BitmapRef<u8>>() == BITMAP_ALIGN);
const _: () = assert!(align_of::<BitmapConstRef<f32>>() == BITMAP_ALIGN);
const _: () = assert!(align_of::<BitmapConstRef<u8>>() == BITMAP_ALIGN);

const _: () = assert!(size_of::<Vector2>() == VECTOR2_SIZE);
const _: () = assert!(size_of::<Projection>() == PROJECTION_SIZE);
const _: () = assert!(size_of::<GeneratorConfig>() == GENERATOR_CONFIG_SIZE);
const _: () = assert!(size_of::<ErrorCorrectionConfig>() == ERROR_CORRECTION_SIZE);
const _: () = assert!(align_of::<ErrorCorrectionConfig>() == ERROR_CORRECTION_ALIGN);
const _: () = assert!(size_of::<MSDFGeneratorConfig>() == MSDF_GENERATOR_CONFIG_SIZE);

/// The full descriptor set for one msdfgen version and pointer width.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutManifest {
    pub upstream_version: String,
    pub pointer_width: u32,
    #[serde(rename = "type")]
    pub types: Vec<TypeLayout>,
}

impl LayoutManifest {
    /// Manifest describing the mirrors as compiled for this target.
    pub fn current() -> Self {
        Self {
            upstream_version: UPSTREAM_VERSION.to_owned(),
            pointer_width: (PTR_SIZE * 8) as u32,
            types: all_layouts(),
        }
    }

    /// The manifest shipped with the crate for this target, if one exists.
    pub fn pinned() -> Option<Result<Self, LayoutError>> {
        if cfg!(target_pointer_width = "64") {
            Some(Self::from_toml_str(PINNED_MANIFEST_64))
        } else {
            None
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, LayoutError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, LayoutError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks that this (pinned) manifest describes exactly the mirrors
    /// compiled into the crate. Stops at the first disagreement.
    pub fn verify(&self) -> Result<(), LayoutError> {
        let current = Self::current();

        if self.upstream_version != current.upstream_version {
            warn!(
                "layout manifest pinned for msdfgen {} checked against mirrors for {}",
                self.upstream_version, current.upstream_version
            );
            return Err(LayoutError::UpstreamVersion {
                pinned: self.upstream_version.clone(),
                current: current.upstream_version,
            });
        }
        if self.pointer_width != current.pointer_width {
            return Err(LayoutError::PointerWidth {
                pinned: self.pointer_width,
                current: current.pointer_width,
            });
        }

        for ty in &current.types {
            let pinned = self
                .types
                .iter()
                .find(|p| p.name == ty.name)
                .ok_or_else(|| LayoutError::MissingType { ty: ty.name.clone() })?;
            compare_type(pinned, ty)?;
        }
        if let Some(stale) = self
            .types
            .iter()
            .find(|p| !current.types.iter().any(|c| c.name == p.name))
        {
            return Err(LayoutError::UnknownType {
                ty: stale.name.clone(),
            });
        }

        debug!(
            "layout manifest for msdfgen {} verified ({} types, {}-bit)",
            self.upstream_version,
            self.types.len(),
            self.pointer_width
        );
        Ok(())
    }
}

fn compare_type(pinned: &TypeLayout, current: &TypeLayout) -> Result<(), LayoutError> {
    let ty = || current.name.clone();

    for (index, field) in current.fields.iter().enumerate() {
        let Some(p) = pinned.fields.get(index) else {
            return Err(LayoutError::ExtraField {
                ty: ty(),
                field: field.name.clone(),
            });
        };
        if p.name != field.name {
            // a field inserted upstream shows up here first
            if current.field(&p.name).is_none() {
                return Err(LayoutError::MissingField {
                    ty: ty(),
                    field: p.name.clone(),
                });
            }
            if pinned.field(&field.name).is_none() {
                return Err(LayoutError::ExtraField {
                    ty: ty(),
                    field: field.name.clone(),
                });
            }
            return Err(LayoutError::FieldOrder {
                ty: ty(),
                index,
                pinned: p.name.clone(),
                current: field.name.clone(),
            });
        }
        if p.offset != field.offset {
            return Err(LayoutError::FieldOffset {
                ty: ty(),
                field: field.name.clone(),
                pinned: p.offset,
                current: field.offset,
            });
        }
        if p.size != field.size {
            return Err(LayoutError::FieldSize {
                ty: ty(),
                field: field.name.clone(),
                pinned: p.size,
                current: field.size,
            });
        }
    }
    if let Some(missing) = pinned.fields.get(current.fields.len()) {
        return Err(LayoutError::MissingField {
            ty: ty(),
            field: missing.name.clone(),
        });
    }

    if pinned.size != current.size {
        return Err(LayoutError::Size {
            ty: ty(),
            pinned: pinned.size,
            current: current.size,
        });
    }
    if pinned.align != current.align {
        return Err(LayoutError::Align {
            ty: ty(),
            pinned: pinned.align,
            current: current.align,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FieldLayout, MirrorLayout};

    #[test]
    fn current_manifest_verifies_itself() {
        assert!(LayoutManifest::current().verify().is_ok());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn pinned_64_bit_values() {
        assert_eq!(BITMAP_SIZE, 16);
        assert_eq!(BITMAP_ALIGN, 8);
        assert_eq!(ERROR_CORRECTION_SIZE, 32);
        assert_eq!(MSDF_GENERATOR_CONFIG_SIZE, 40);
        assert_eq!(PROJECTION_SIZE, 32);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn shipped_manifest_matches_mirrors() {
        let pinned = LayoutManifest::pinned()
            .expect("64-bit manifest ships with the crate")
            .expect("shipped manifest parses");
        pinned.verify().unwrap();
        assert_eq!(pinned, LayoutManifest::current());
    }

    #[test]
    fn manifest_survives_toml() {
        let current = LayoutManifest::current();
        let text = current.to_toml_string().unwrap();
        assert!(text.contains("[[type]]"));
        assert_eq!(LayoutManifest::from_toml_str(&text).unwrap(), current);
    }

    #[test]
    fn upstream_bump_is_rejected() {
        let mut m = LayoutManifest::current();
        m.upstream_version = "1.11".into();
        assert!(matches!(m.verify(), Err(LayoutError::UpstreamVersion { .. })));
    }

    #[test]
    fn other_pointer_width_is_rejected() {
        let mut m = LayoutManifest::current();
        m.pointer_width = if m.pointer_width == 64 { 32 } else { 64 };
        assert!(matches!(m.verify(), Err(LayoutError::PointerWidth { .. })));
    }

    fn bitmap_entry(m: &mut LayoutManifest) -> &mut TypeLayout {
        m.types
            .iter_mut()
            .find(|t| t.name == Bitmap::<f32>::NATIVE_NAME)
            .unwrap()
    }

    #[test]
    fn grown_native_type_is_caught() {
        // upstream adds a stride after `h`
        let mut m = LayoutManifest::current();
        let entry = bitmap_entry(&mut m);
        entry.fields.push(FieldLayout {
            name: "stride".into(),
            offset: PTR_SIZE + 8,
            size: 4,
        });
        entry.size += 8;
        match m.verify() {
            Err(LayoutError::MissingField { ty, field }) => {
                assert_eq!(ty, "msdfgen::Bitmap<float>");
                assert_eq!(field, "stride");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn field_inserted_mid_type_is_named() {
        // upstream inserts a stride between the pointer and the dimensions
        let mut m = LayoutManifest::current();
        let entry = bitmap_entry(&mut m);
        entry.fields.insert(
            1,
            FieldLayout {
                name: "stride".into(),
                offset: PTR_SIZE,
                size: 4,
            },
        );
        match m.verify() {
            Err(LayoutError::MissingField { ty, field }) => {
                assert_eq!(ty, "msdfgen::Bitmap<float>");
                assert_eq!(field, "stride");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reordered_fields_are_caught() {
        let mut m = LayoutManifest::current();
        bitmap_entry(&mut m).fields.swap(1, 2);
        assert!(matches!(
            m.verify(),
            Err(LayoutError::FieldOrder { index: 1, .. })
        ));
    }

    #[test]
    fn moved_field_is_caught() {
        let mut m = LayoutManifest::current();
        bitmap_entry(&mut m).fields[2].offset += 4;
        assert!(matches!(m.verify(), Err(LayoutError::FieldOffset { .. })));
    }

    #[test]
    fn size_and_alignment_are_pinned() {
        let mut m = LayoutManifest::current();
        bitmap_entry(&mut m).size += 8;
        assert!(matches!(m.verify(), Err(LayoutError::Size { .. })));

        let mut m = LayoutManifest::current();
        bitmap_entry(&mut m).align *= 2;
        assert!(matches!(m.verify(), Err(LayoutError::Align { .. })));
    }

    #[test]
    fn missing_and_stale_types_are_caught() {
        let mut m = LayoutManifest::current();
        m.types.retain(|t| t.name != "msdfgen::Projection");
        assert!(matches!(m.verify(), Err(LayoutError::MissingType { .. })));

        let mut m = LayoutManifest::current();
        let mut extra = Vector2::layout();
        extra.name = "msdfgen::Vector3".into();
        m.types.push(extra);
        assert!(matches!(m.verify(), Err(LayoutError::UnknownType { .. })));
    }

    #[test]
    fn garbage_manifest_is_a_parse_error() {
        assert!(matches!(
            LayoutManifest::from_toml_str("pointer_width = \"wide\""),
            Err(LayoutError::Parse(_))
        ));
    }
}
