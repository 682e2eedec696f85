#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("alternation has no branches")]
    EmptyAlternation,

    #[error("invalid field width {width} (expected 1..={max})")]
    InvalidWidth { width: u8, max: u8 },

    #[error("invalid bit literal `{0}`")]
    InvalidBits(String),

    /// a fixed field must contribute at least one bit.
    #[error("fixed field has no bits")]
    EmptyFixed,
}
