pub mod compressed;
pub mod manual;
pub mod table;

pub const DEFAULT_MAX_BYTES: u64 = 32 * 1024 * 1024;
pub const DEFAULT_MAX_ROWS: usize = 200_000;

/// Failures reading one uploaded table. Reported per request; never fatal.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed table: {0}")]
    Malformed(#[from] csv::Error),
    #[error("empty input: {0}")]
    Empty(String),
    #[error("upload too large: {actual} {unit} exceeds the limit of {limit}")]
    TooLarge {
        unit: &'static str,
        actual: u64,
        limit: u64,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: u64,
    pub max_rows: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}
