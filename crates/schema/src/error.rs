#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema has no register list")]
    MissingRegisters,

    #[error("schema lists its registers more than once")]
    DuplicateRegisters,

    #[error("schema configures the instruction width more than once")]
    DuplicateConfig,

    #[error("invalid instruction width {0} (expected 1..=64)")]
    InvalidWidth(u8),

    #[error("`{label}` field {index}: {error}")]
    Field { label: String, index: usize, error: FieldError },

    #[error("`{label}` doesn't encode bit {bit}")]
    Gap { label: String, bit: u8 },

    #[error(
        "`{label}` has {count} permutations, more than the {max} that can be listed",
        max = crate::MAX_PERMUTATIONS
    )]
    TooManyPermutations { label: String, count: u128 },
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("hi ({hi}) is below lo ({lo})")]
    Reversed { hi: u8, lo: u8 },

    #[error("bit {hi} is outside of the {width} bit instruction")]
    OutOfRange { hi: u8, width: u8 },

    #[error("missing literal value")]
    MissingValue,

    #[error("`{value}` isn't a {width} bit binary literal")]
    InvalidValue { value: String, width: u8 },

    #[error("missing display position")]
    MissingPosition,

    #[error("display position {0} is already taken")]
    DuplicatePosition(u8),

    #[error("overlaps an earlier field at bit {0}")]
    Overlap(u8),

    #[error("{width} bit register field indexes past the {registers} listed registers")]
    TooFewRegisters { width: u8, registers: usize },

    #[error("{0} bit operands are too wide to enumerate")]
    TooWide(u8),
}
