use std::ops::RangeInclusive;

use isagen_core::{mask, sign_extend};
use serde::Deserialize;

/// What a bitfield holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum FieldKind {
    #[serde(rename = "OPCODE")]
    Opcode,
    #[serde(rename = "FIXED")]
    Fixed,
    #[serde(rename = "REG")]
    Register,
    #[serde(rename = "IMM")]
    Immediate,
    /// signed pc offset.
    #[serde(rename = "PCOFFS")]
    PcOffsetSigned,
    /// unsigned pc offset.
    #[serde(rename = "PCOFFU")]
    PcOffsetUnsigned,
}

impl FieldKind {
    /// Whether the field carries a literal value rather than an operand.
    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(self, Self::Opcode | Self::Fixed)
    }
}

/// One bitfield of an instruction.
///
/// Fields carry two independent orderings: their bit range (`hi..=lo`) and their position in the
/// mnemonic (`display`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    pub kind: FieldKind,
    pub hi: u8,
    pub lo: u8,
    /// Position among the mnemonic's operands, `None` for literal fields.
    pub display: Option<u8>,
    /// Every value the field takes.
    pub domain: RangeInclusive<i64>,
}

impl FieldLayout {
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.hi - self.lo + 1
    }

    #[must_use]
    pub const fn mask(&self) -> u64 {
        mask(self.width()) << self.lo
    }

    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        self.display.is_some()
    }

    /// Number of values in the domain.
    #[must_use]
    pub fn cardinality(&self) -> u64 {
        (*self.domain.end() - *self.domain.start()).cast_unsigned() + 1
    }

    /// `value` truncated to the field's width and moved into place.
    #[must_use]
    pub const fn encode(&self, value: i64) -> u64 {
        (value.cast_unsigned() & mask(self.width())) << self.lo
    }

    /// The raw bits of this field in `word`.
    #[must_use]
    pub const fn extract(&self, word: u64) -> u64 {
        (word >> self.lo) & mask(self.width())
    }

    /// Renders `value` as it appears in a mnemonic: a register name or a decimal.
    #[must_use]
    pub fn operand(&self, value: i64, registers: &[String]) -> String {
        let index = (value.cast_unsigned() & mask(self.width())) as usize;

        match (self.kind, registers.get(index)) {
            (FieldKind::Register, Some(name)) => name.clone(),
            _ => value.to_string(),
        }
    }
}

/// The layout of one instruction form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionLayout {
    pub label: String,
    /// Whether the instruction updates the condition codes.
    ///
    /// Carried through for harnesses that check flags, listing doesn't depend on it.
    pub setcc: bool,
    /// Fields sorted by display position, literal fields first.
    pub fields: Vec<FieldLayout>,
}

impl InstructionLayout {
    /// Size of the cross product of every field's domain.
    #[must_use]
    pub fn permutations(&self) -> u128 {
        self.fields.iter().map(|it| u128::from(it.cardinality())).fold(1, u128::saturating_mul)
    }

    /// Bits covered by any field.
    #[must_use]
    pub fn mask(&self) -> u64 {
        self.fields.iter().fold(0, |acc, it| acc | it.mask())
    }

    /// Decodes `word` as this instruction, rendering it as `label op0 op1 ...`.
    ///
    /// Returns `None` if any literal field disagrees with `word`, or `word` has bits set outside
    /// the instruction.
    #[must_use]
    pub fn decode(&self, word: u64, registers: &[String]) -> Option<String> {
        if word & !self.mask() != 0 {
            return None;
        }

        let mut text = self.label.clone();

        for field in &self.fields {
            let raw = field.extract(word);

            if field.is_displayed() {
                let value = sign_extend(raw, field.width());
                text.push(' ');
                text.push_str(&field.operand(value, registers));
            } else if field.encode(*field.domain.start()) != raw << field.lo {
                return None;
            }
        }

        Some(text)
    }
}
