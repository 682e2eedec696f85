//! Loader for declarative instruction encoding schemas.
//!
//! A schema is a JSON array of typed entries:
//!
//! ```json
//! [
//!     { "type": "CONF", "data": { "width": 16 } },
//!     { "type": "REGS", "data": { "reglist": ["R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7"] } },
//!     { "type": "INST", "data": { "label": "not", "setcc": true, "enc": [
//!         { "type": "OPCODE", "hi": 15, "lo": 12, "data": { "value": "1001" } },
//!         { "type": "REG", "hi": 11, "lo": 9, "data": { "pos": 0 } },
//!         { "type": "REG", "hi": 8, "lo": 6, "data": { "pos": 1 } },
//!         { "type": "FIXED", "hi": 5, "lo": 0, "data": { "value": "111111" } }
//!     ] } }
//! ]
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::cast_possible_truncation)]
#![warn(clippy::must_use_candidate)]

use isagen_core::mask;
use serde::Deserialize;

mod error;
mod layout;

pub use error::{FieldError, SchemaError};
pub use layout::{FieldKind, FieldLayout, InstructionLayout};

#[cfg(test)]
mod tests;

/// Instruction width used when the schema has no `CONF` entry.
pub const DEFAULT_WIDTH: u8 = 16;

/// Widest operand field that can be enumerated.
pub const MAX_OPERAND_WIDTH: u8 = 32;

/// Most words a single instruction may encode.
///
/// Every permutation is held in memory while the listing is built.
pub const MAX_PERMUTATIONS: u128 = 1 << 28;

#[derive(Deserialize)]
#[serde(tag = "type", content = "data")]
enum Entry {
    #[serde(rename = "CONF")]
    Conf { width: u8 },
    #[serde(rename = "REGS")]
    Regs { reglist: Vec<String> },
    #[serde(rename = "INST")]
    Inst(RawInstruction),
}

#[derive(Deserialize)]
struct RawInstruction {
    label: String,
    #[serde(default)]
    setcc: bool,
    enc: Vec<RawField>,
}

#[derive(Deserialize)]
struct RawField {
    #[serde(rename = "type")]
    kind: FieldKind,
    hi: u8,
    lo: u8,
    #[serde(default)]
    data: RawFieldData,
}

#[derive(Deserialize, Default)]
struct RawFieldData {
    value: Option<String>,
    pos: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Instruction width in bits.
    pub width: u8,
    /// Register names, in index order.
    pub registers: Vec<String>,
    /// Instruction forms, in schema order.
    pub instructions: Vec<InstructionLayout>,
}

impl Schema {
    /// Hex digits needed to print an instruction word.
    #[must_use]
    pub const fn hex_digits(&self) -> usize {
        (self.width as usize).div_ceil(4)
    }
}

/// Parses and validates a schema.
pub fn load(json: &str) -> Result<Schema, SchemaError> {
    let entries: Vec<Entry> = serde_json::from_str(json)?;

    let mut width = None;
    let mut registers = None;
    let mut raw_instructions = Vec::new();

    for entry in entries {
        match entry {
            Entry::Conf { width: it } => {
                if width.replace(it).is_some() {
                    return Err(SchemaError::DuplicateConfig);
                }
            }

            Entry::Regs { reglist } => {
                if registers.replace(reglist).is_some() {
                    return Err(SchemaError::DuplicateRegisters);
                }
            }

            Entry::Inst(inst) => raw_instructions.push(inst),
        }
    }

    let width = width.unwrap_or(DEFAULT_WIDTH);
    if !(1..=64).contains(&width) {
        return Err(SchemaError::InvalidWidth(width));
    }

    let registers = registers.ok_or(SchemaError::MissingRegisters)?;

    let instructions = raw_instructions
        .into_iter()
        .map(|raw| instruction_layout(raw, width, &registers))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        width,
        registers = registers.len(),
        instructions = instructions.len(),
        "loaded schema"
    );

    Ok(Schema { width, registers, instructions })
}

fn instruction_layout(
    raw: RawInstruction,
    width: u8,
    registers: &[String],
) -> Result<InstructionLayout, SchemaError> {
    let RawInstruction { label, setcc, enc } = raw;

    let mut covered = 0_u64;
    let mut fields: Vec<FieldLayout> = Vec::with_capacity(enc.len());

    for (index, raw) in enc.into_iter().enumerate() {
        let field_error = |error| SchemaError::Field { label: label.clone(), index, error };

        let field = field_layout(raw, width, registers).map_err(field_error)?;

        let overlap = covered & field.mask();
        if overlap != 0 {
            return Err(field_error(FieldError::Overlap(overlap.trailing_zeros() as u8)));
        }

        if let Some(pos) = field.display
            && fields.iter().any(|it| it.display == Some(pos))
        {
            return Err(field_error(FieldError::DuplicatePosition(pos)));
        }

        covered |= field.mask();
        fields.push(field);
    }

    let missing = !covered & mask(width);
    if missing != 0 {
        return Err(SchemaError::Gap { label, bit: missing.trailing_zeros() as u8 });
    }

    // literal fields have no position and sort first, the sort is stable so they keep schema order.
    fields.sort_by_key(|it| it.display);

    let layout = InstructionLayout { label, setcc, fields };

    let count = layout.permutations();
    if count > MAX_PERMUTATIONS {
        return Err(SchemaError::TooManyPermutations { label: layout.label, count });
    }

    Ok(layout)
}

fn field_layout(raw: RawField, width: u8, registers: &[String]) -> Result<FieldLayout, FieldError> {
    let RawField { kind, hi, lo, data } = raw;

    if hi < lo {
        return Err(FieldError::Reversed { hi, lo });
    }

    if hi >= width {
        return Err(FieldError::OutOfRange { hi, width });
    }

    let field_width = hi - lo + 1;

    if kind.is_literal() {
        let value = data.value.ok_or(FieldError::MissingValue)?;

        let literal = (value.len() == usize::from(field_width)
            && value.bytes().all(|it| matches!(it, b'0' | b'1')))
        .then(|| u64::from_str_radix(&value, 2).ok())
        .flatten()
        .ok_or_else(|| FieldError::InvalidValue { value: value.clone(), width: field_width })?
        .cast_signed();

        return Ok(FieldLayout { kind, hi, lo, display: None, domain: literal..=literal });
    }

    if field_width > MAX_OPERAND_WIDTH {
        return Err(FieldError::TooWide(field_width));
    }

    let pos = data.pos.ok_or(FieldError::MissingPosition)?;

    if kind == FieldKind::Register && (1_usize << field_width) > registers.len() {
        return Err(FieldError::TooFewRegisters { width: field_width, registers: registers.len() });
    }

    // every operand is enumerated as signed over its width, registers and unsigned offsets
    // included. the encoding is the same bits either way.
    let half = 1_i64 << (field_width - 1);

    Ok(FieldLayout { kind, hi, lo, display: Some(pos), domain: -half..=half - 1 })
}
