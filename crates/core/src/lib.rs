#![forbid(unsafe_code)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::match_bool
)]
#![warn(clippy::must_use_candidate)]

pub mod field;
pub mod grammar;
pub mod render;

mod error;

pub use error::GrammarError;
pub use field::{Bits, Field, Immediate, ImmediateStyle, Operand, Predicate, parse_immediate};
pub use grammar::Node;
pub use render::{Line, assembly_text, bit_text};

/// Largest width an immediate can be declared with.
///
/// Keeps both the signed and unsigned domain representable as an `i64`.
pub const MAX_IMMEDIATE_WIDTH: u8 = 63;

/// Largest width a register operand can be declared with.
pub const MAX_REGISTER_WIDTH: u8 = 8;

/// The low `width` bits set.
#[must_use]
pub const fn mask(width: u8) -> u64 {
    match width {
        0 => 0,
        64.. => u64::MAX,
        width => (1 << width) - 1,
    }
}

/// Sign extends the low `width` bits of `value`, `width` must be within `1..=64`.
#[must_use]
pub const fn sign_extend(value: u64, width: u8) -> i64 {
    let shift = u64::BITS - (width as u32);
    (value << shift).cast_signed() >> shift
}
