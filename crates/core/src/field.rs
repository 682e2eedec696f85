use core::fmt;
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::{GrammarError, MAX_IMMEDIATE_WIDTH, MAX_REGISTER_WIDTH, mask, sign_extend};


/// How many values an [`Immediate`] draws before giving up.
pub const RESOLVE_ATTEMPTS: u32 = 100;

/// A fixed-width bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bits {
    value: u64,
    width: u8,
}

impl Bits {
    /// Truncates `value` to its low `width` bits.
    #[must_use]
    pub const fn new(value: u64, width: u8) -> Self {
        debug_assert!(width <= 64);
        Self { value: value & mask(width), width }
    }

    /// Parses a string of `0`s and `1`s, most significant bit first.
    ///
    /// The empty string is a valid, zero-width, pattern.
    pub fn parse(literal: &str) -> Result<Self, GrammarError> {
        if literal.len() > 64 || !literal.bytes().all(|it| matches!(it, b'0' | b'1')) {
            return Err(GrammarError::InvalidBits(literal.to_owned()));
        }

        let value = literal.bytes().fold(0_u64, |acc, bit| (acc << 1) | u64::from(bit - b'0'));

        Ok(Self { value, width: literal.len() as u8 })
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.value
    }

    #[must_use]
    pub const fn width(self) -> u8 {
        self.width
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 0 {
            return Ok(());
        }

        write!(f, "{:0width$b}", self.value, width = usize::from(self.width))
    }
}

/// A named rejection test for immediates.
///
/// A value is rejected when the test returns `true`.
#[derive(Clone)]
pub struct Predicate {
    name: &'static str,
    rejects: Arc<dyn Fn(i64) -> bool + Send + Sync>,
}

impl Predicate {
    pub fn new(name: &'static str, rejects: impl Fn(i64) -> bool + Send + Sync + 'static) -> Self {
        Self { name, rejects: Arc::new(rejects) }
    }

    #[must_use]
    pub fn rejects(&self, value: i64) -> bool {
        (self.rejects)(value)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.name).finish()
    }
}

#[derive(Debug, Clone)]
pub struct Immediate {
    signed: bool,
    width: u8,
    predicates: Vec<Predicate>,
}

impl Immediate {
    fn new(signed: bool, width: u8) -> Result<Self, GrammarError> {
        if !(1..=MAX_IMMEDIATE_WIDTH).contains(&width) {
            return Err(GrammarError::InvalidWidth { width, max: MAX_IMMEDIATE_WIDTH });
        }

        Ok(Self { signed, width, predicates: Vec::new() })
    }

    pub fn signed(width: u8) -> Result<Self, GrammarError> {
        Self::new(true, width)
    }

    pub fn unsigned(width: u8) -> Result<Self, GrammarError> {
        Self::new(false, width)
    }

    #[must_use]
    pub fn reject(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    #[must_use]
    pub const fn min(&self) -> i64 {
        match self.signed {
            true => -(1 << (self.width - 1)),
            false => 0,
        }
    }

    #[must_use]
    pub const fn max(&self) -> i64 {
        match self.signed {
            true => (1 << (self.width - 1)) - 1,
            false => mask(self.width).cast_signed(),
        }
    }

    /// Whether `value` is in range and passes every predicate.
    #[must_use]
    pub fn accepts(&self, value: i64) -> bool {
        (self.min()..=self.max()).contains(&value)
            && !self.predicates.iter().any(|it| it.rejects(value))
    }

    /// Draws values until one is accepted, or until [`RESOLVE_ATTEMPTS`] runs out.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<i64> {
        (0..RESOLVE_ATTEMPTS)
            .map(|_| rng.random_range(self.min()..=self.max()))
            .find(|&value| !self.predicates.iter().any(|it| it.rejects(value)))
    }
}

/// Surface syntax of a rendered immediate.
///
/// Every style reads back as the same value, see [`parse_immediate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImmediateStyle {
    /// `x` followed by the hex of the value, `x-5` for negatives.
    Hex,
    /// `x` followed by the hex of the value truncated to the field width.
    HexMasked,
    /// `#` followed by the decimal value.
    Decimal,
    /// The bare decimal value.
    BareDecimal,
}

impl ImmediateStyle {
    pub const ALL: [Self; 4] = [Self::Hex, Self::HexMasked, Self::Decimal, Self::BareDecimal];
}

/// A field template: what an operand slot may hold and how wide it is.
///
/// Templates are never mutated; [`Field::resolve`] produces an [`Operand`].
#[derive(Debug, Clone)]
pub enum Field {
    /// A displayed keyword with a fixed encoding, like `add` or `.orig`.
    Mnemonic { text: String, bits: Bits },
    /// Constant bits that never show up in assembly text.
    Fixed(Bits),
    /// A register index.
    Register { width: u8 },
    Immediate(Immediate),
}

impl Field {
    pub fn mnemonic(text: impl Into<String>, bits: &str) -> Result<Self, GrammarError> {
        Ok(Self::Mnemonic { text: text.into(), bits: Bits::parse(bits)? })
    }

    pub fn fixed(bits: &str) -> Result<Self, GrammarError> {
        let bits = Bits::parse(bits)?;
        if bits.width() == 0 {
            return Err(GrammarError::EmptyFixed);
        }

        Ok(Self::Fixed(bits))
    }

    pub fn register(width: u8) -> Result<Self, GrammarError> {
        if !(1..=MAX_REGISTER_WIDTH).contains(&width) {
            return Err(GrammarError::InvalidWidth { width, max: MAX_REGISTER_WIDTH });
        }

        Ok(Self::Register { width })
    }

    pub fn signed(width: u8) -> Result<Self, GrammarError> {
        Immediate::signed(width).map(Self::Immediate)
    }

    pub fn unsigned(width: u8) -> Result<Self, GrammarError> {
        Immediate::unsigned(width).map(Self::Immediate)
    }

    /// Width of the field's encoding in bits.
    #[must_use]
    pub const fn width(&self) -> u8 {
        match self {
            Self::Mnemonic { bits, .. } | Self::Fixed(bits) => bits.width(),
            Self::Register { width } => *width,
            Self::Immediate(imm) => imm.width(),
        }
    }

    /// Picks a concrete value for this field.
    ///
    /// Only immediates can fail, when every draw within the retry budget is rejected.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Operand> {
        match self {
            Self::Mnemonic { text, bits } => {
                Some(Operand::Mnemonic { text: text.clone(), bits: *bits })
            }

            Self::Fixed(bits) => Some(Operand::Fixed(*bits)),

            &Self::Register { width } => {
                let index = rng.random_range(0..=mask(width)) as u8;
                Some(Operand::Register { index, width })
            }

            Self::Immediate(imm) => {
                let value = imm.sample(rng)?;
                let style = *ImmediateStyle::ALL.choose(rng)?;
                Some(Operand::Immediate { value, width: imm.width(), style })
            }
        }
    }
}

/// A resolved field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Mnemonic { text: String, bits: Bits },
    Fixed(Bits),
    Register { index: u8, width: u8 },
    Immediate { value: i64, width: u8, style: ImmediateStyle },
}

impl Operand {
    /// Whether the operand shows up in assembly text.
    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        !matches!(self, Self::Fixed(_))
    }

    /// The operand's encoding, exactly as wide as its field.
    #[must_use]
    pub const fn bits(&self) -> Bits {
        match self {
            Self::Mnemonic { bits, .. } | Self::Fixed(bits) => *bits,
            &Self::Register { index, width } => Bits::new(index as u64, width),
            &Self::Immediate { value, width, .. } => Bits::new(value.cast_unsigned(), width),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mnemonic { text, .. } => f.write_str(text),
            Self::Fixed(_) => Ok(()),
            Self::Register { index, .. } => write!(f, "r{index}"),
            &Self::Immediate { value, width, style } => match style {
                ImmediateStyle::Hex if value < 0 => write!(f, "x-{:x}", value.unsigned_abs()),
                ImmediateStyle::Hex => write!(f, "x{value:x}"),
                ImmediateStyle::HexMasked => {
                    write!(f, "x{:x}", value.cast_unsigned() & mask(width))
                }
                ImmediateStyle::Decimal => write!(f, "#{value}"),
                ImmediateStyle::BareDecimal => write!(f, "{value}"),
            },
        }
    }
}

/// Reads an immediate back from any of its [`ImmediateStyle`]s.
///
/// Hex digits are taken as a `width` bit pattern (sign extended when `signed`), decimals as the
/// value itself. Returns `None` if the text is malformed or the value doesn't fit.
#[must_use]
pub fn parse_immediate(text: &str, width: u8, signed: bool) -> Option<i64> {
    if !(1..=MAX_IMMEDIATE_WIDTH).contains(&width) {
        return None;
    }

    let (digits, radix) = match text.strip_prefix('x') {
        Some(digits) => (digits, 16),
        None => (text.strip_prefix('#').unwrap_or(text), 10),
    };

    let (digits, negative) = match digits.strip_prefix('-') {
        Some(digits) => (digits, true),
        None => (digits, false),
    };

    if digits.is_empty() || !digits.bytes().all(|it| it.is_ascii_hexdigit()) {
        return None;
    }

    let magnitude = u64::from_str_radix(digits, radix).ok()?;

    let (min, max) = match signed {
        true => (-(1_i64 << (width - 1)), (1_i64 << (width - 1)) - 1),
        false => (0, mask(width).cast_signed()),
    };

    let value = match (negative, radix) {
        (true, _) => -i64::try_from(magnitude).ok()?,
        (false, 16) if magnitude > mask(width) => return None,
        (false, 16) if signed => sign_extend(magnitude, width),
        (false, _) => i64::try_from(magnitude).ok()?,
    };

    (min..=max).contains(&value).then_some(value)
}
