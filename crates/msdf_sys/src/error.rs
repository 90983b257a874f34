use thiserror::Error;

/// A pinned layout manifest disagrees with the mirrors compiled into this
/// crate. Any of these means values can no longer cross the boundary safely.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("manifest was pinned for msdfgen {pinned}, mirrors track msdfgen {current}")]
    UpstreamVersion { pinned: String, current: String },
    #[error("manifest describes {pinned}-bit pointers, this target has {current}-bit pointers")]
    PointerWidth { pinned: u32, current: u32 },
    #[error("{ty} is mirrored but missing from the manifest")]
    MissingType { ty: String },
    #[error("{ty} is in the manifest but no longer mirrored")]
    UnknownType { ty: String },
    #[error("{ty}: size is {current} bytes, manifest pins {pinned}")]
    Size { ty: String, pinned: usize, current: usize },
    #[error("{ty}: alignment is {current}, manifest pins {pinned}")]
    Align { ty: String, pinned: usize, current: usize },
    #[error("{ty}: field `{field}` is pinned but not mirrored")]
    MissingField { ty: String, field: String },
    #[error("{ty}: field `{field}` is mirrored but not pinned")]
    ExtraField { ty: String, field: String },
    #[error("{ty}: field #{index} is `{current}`, manifest pins `{pinned}`")]
    FieldOrder {
        ty: String,
        index: usize,
        pinned: String,
        current: String,
    },
    #[error("{ty}.{field}: offset {current}, manifest pins {pinned}")]
    FieldOffset {
        ty: String,
        field: String,
        pinned: usize,
        current: usize,
    },
    #[error("{ty}.{field}: {current} bytes wide, manifest pins {pinned}")]
    FieldSize {
        ty: String,
        field: String,
        pinned: usize,
        current: usize,
    },
    #[error("malformed layout manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize layout manifest: {0}")]
    Serialize(#[from] toml::ser::Error),
}
