use msdf_sys::LayoutError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MsdfError {
    #[error("{width}x{height} does not fit msdfgen's int dimensions")]
    DimensionsTooLarge { width: u32, height: u32 },
    #[error("{width}x{height}x{channels} samples overflow the address space")]
    CapacityOverflow {
        width: u32,
        height: u32,
        channels: usize,
    },
    #[error("{width}x{height}x{channels} needs {expected} samples, got {actual}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        channels: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown {kind} value {value} from msdfgen")]
    UnknownMode { kind: &'static str, value: i32 },
    #[error("invalid generator config: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type Result<T, E = MsdfError> = std::result::Result<T, E>;
