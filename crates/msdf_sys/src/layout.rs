//! Runtime descriptors of the mirrored types.
//!
//! A [`TypeLayout`] records what a foreign-function bridge needs to know about
//! a mirror: its size, alignment and the offset and width of every field, in
//! declaration order. Descriptors are what layout manifests are made of.

use std::mem::{align_of, offset_of, size_of};
use std::os::raw::c_int;

use serde::{Deserialize, Serialize};

use crate::bitmap::{Bitmap, BitmapConstRef, BitmapRef};
use crate::config::{
    ErrorCorrectionConfig, GeneratorConfig, MSDFGeneratorConfig, Projection, Vector2,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    pub name: String,
    pub offset: usize,
    pub size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeLayout {
    /// Native type name, e.g. `msdfgen::Bitmap<float>`.
    pub name: String,
    pub size: usize,
    pub align: usize,
    pub fields: Vec<FieldLayout>,
}

impl TypeLayout {
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Bytes not covered by any field (interior and tail padding).
    ///
    /// `None` when the fields claim more bytes than the type has, which only
    /// a malformed manifest can describe.
    pub fn padding(&self) -> Option<usize> {
        let covered = self
            .fields
            .iter()
            .try_fold(0usize, |sum, f| sum.checked_add(f.size))?;
        self.size.checked_sub(covered)
    }
}

/// Implemented by every `#[repr(C)]` mirror in this crate.
pub trait MirrorLayout {
    /// Name of the native type this mirror stands in for.
    const NATIVE_NAME: &'static str;

    fn layout() -> TypeLayout;
}

macro_rules! field {
    ($ty:ty, $field:ident : $fty:ty, $native:literal) => {
        FieldLayout {
            name: $native.to_owned(),
            offset: offset_of!($ty, $field),
            size: size_of::<$fty>(),
        }
    };
}

macro_rules! bitmap_layouts {
    ($($mirror:ident < $t:ty > => $native:literal, $ptr:ty;)*) => {
        $(
            impl MirrorLayout for $mirror<$t> {
                const NATIVE_NAME: &'static str = $native;

                fn layout() -> TypeLayout {
                    TypeLayout {
                        name: Self::NATIVE_NAME.to_owned(),
                        size: size_of::<Self>(),
                        align: align_of::<Self>(),
                        fields: vec![
                            field!(Self, pixels: $ptr, "pixels"),
                            field!(Self, w: c_int, "w"),
                            field!(Self, h: c_int, "h"),
                        ],
                    }
                }
            }
        )*
    };
}

bitmap_layouts! {
    Bitmap<f32> => "msdfgen::Bitmap<float>", *mut f32;
    Bitmap<u8> => "msdfgen::Bitmap<unsigned char>", *mut u8;
    BitmapRef<f32> => "msdfgen::BitmapRef<float>", *mut f32;
    BitmapRef<u8> => "msdfgen::BitmapRef<unsigned char>", *mut u8;
    BitmapConstRef<f32> => "msdfgen::BitmapConstRef<float>", *const f32;
    BitmapConstRef<u8> => "msdfgen::BitmapConstRef<unsigned char>", *const u8;
}

impl MirrorLayout for Vector2 {
    const NATIVE_NAME: &'static str = "msdfgen::Vector2";

    fn layout() -> TypeLayout {
        TypeLayout {
            name: Self::NATIVE_NAME.to_owned(),
            size: size_of::<Self>(),
            align: align_of::<Self>(),
            fields: vec![field!(Self, x: f64, "x"), field!(Self, y: f64, "y")],
        }
    }
}

impl MirrorLayout for Projection {
    const NATIVE_NAME: &'static str = "msdfgen::Projection";

    fn layout() -> TypeLayout {
        TypeLayout {
            name: Self::NATIVE_NAME.to_owned(),
            size: size_of::<Self>(),
            align: align_of::<Self>(),
            fields: vec![
                field!(Self, scale: Vector2, "scale"),
                field!(Self, translate: Vector2, "translate"),
            ],
        }
    }
}

impl MirrorLayout for GeneratorConfig {
    const NATIVE_NAME: &'static str = "msdfgen::GeneratorConfig";

    fn layout() -> TypeLayout {
        TypeLayout {
            name: Self::NATIVE_NAME.to_owned(),
            size: size_of::<Self>(),
            align: align_of::<Self>(),
            fields: vec![field!(Self, overlap_support: bool, "overlapSupport")],
        }
    }
}

impl MirrorLayout for ErrorCorrectionConfig {
    const NATIVE_NAME: &'static str = "msdfgen::ErrorCorrectionConfig";

    fn layout() -> TypeLayout {
        TypeLayout {
            name: Self::NATIVE_NAME.to_owned(),
            size: size_of::<Self>(),
            align: align_of::<Self>(),
            fields: vec![
                field!(Self, mode: c_int, "mode"),
                field!(Self, distance_check_mode: c_int, "distanceCheckMode"),
                field!(Self, min_deviation_ratio: f64, "minDeviationRatio"),
                field!(Self, min_improve_ratio: f64, "minImproveRatio"),
                field!(Self, buffer: *mut u8, "buffer"),
            ],
        }
    }
}

impl MirrorLayout for MSDFGeneratorConfig {
    const NATIVE_NAME: &'static str = "msdfgen::MSDFGeneratorConfig";

    fn layout() -> TypeLayout {
        TypeLayout {
            name: Self::NATIVE_NAME.to_owned(),
            size: size_of::<Self>(),
            align: align_of::<Self>(),
            fields: vec![
                field!(Self, base: GeneratorConfig, "GeneratorConfig"),
                field!(Self, error_correction: ErrorCorrectionConfig, "errorCorrection"),
            ],
        }
    }
}

/// Descriptors of every mirror at every covered instantiation, in a fixed
/// order.
pub fn all_layouts() -> Vec<TypeLayout> {
    vec![
        Bitmap::<f32>::layout(),
        Bitmap::<u8>::layout(),
        BitmapRef::<f32>::layout(),
        BitmapRef::<u8>::layout(),
        BitmapConstRef::<f32>::layout(),
        BitmapConstRef::<u8>::layout(),
        Vector2::layout(),
        Projection::layout(),
        GeneratorConfig::layout(),
        ErrorCorrectionConfig::layout(),
        MSDFGeneratorConfig::layout(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_fields_are_in_declaration_order() {
        for layout in all_layouts().iter().filter(|l| l.name.contains("Bitmap")) {
            let names: Vec<_> = layout.fields.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, ["pixels", "w", "h"], "{}", layout.name);
            let offsets: Vec<_> = layout.fields.iter().map(|f| f.offset).collect();
            let ptr = size_of::<*mut u8>();
            assert_eq!(offsets, [0, ptr, ptr + 4], "{}", layout.name);
        }
    }

    #[test]
    fn sample_type_does_not_change_bitmap_shape() {
        let a = Bitmap::<f32>::layout();
        let b = Bitmap::<u8>::layout();
        assert_eq!((a.size, a.align, &a.fields), (b.size, b.align, &b.fields));
    }

    #[test]
    fn padding_accounts_for_base_subobject() {
        let layout = MSDFGeneratorConfig::layout();
        let ec = layout.field("errorCorrection").map(|f| f.offset);
        assert_eq!(ec, Some(align_of::<ErrorCorrectionConfig>()));
        assert!(layout.padding().unwrap() >= align_of::<ErrorCorrectionConfig>() - 1);
        assert_eq!(Vector2::layout().padding(), Some(0));
    }

    #[test]
    fn overlapping_fields_have_no_padding() {
        let manifest = crate::LayoutManifest::from_toml_str(
            r#"
            upstream_version = "1.10"
            pointer_width = 64

            [[type]]
            name = "msdfgen::Broken"
            size = 4
            align = 4

            [[type.fields]]
            name = "x"
            offset = 0
            size = 8
            "#,
        )
        .unwrap();
        assert_eq!(manifest.types[0].padding(), None);
    }

    #[test]
    fn names_are_unique() {
        let layouts = all_layouts();
        let mut names: Vec<_> = layouts.iter().map(|l| l.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), layouts.len());
    }
}
