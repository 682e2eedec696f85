use core::fmt;

use crate::Operand;

/// Displayed operands, separated by single spaces.
#[must_use]
pub fn assembly_text(operands: &[Operand]) -> String {
    let displayed: Vec<_> =
        operands.iter().filter(|it| it.is_displayed()).map(ToString::to_string).collect();

    displayed.join(" ")
}

/// Every operand's encoding, concatenated in order.
#[must_use]
pub fn bit_text(operands: &[Operand]) -> String {
    operands.iter().map(|it| it.bits().to_string()).collect()
}

/// One generated line: `<assembly> => <bits>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    operands: Vec<Operand>,
}

impl Line {
    #[must_use]
    pub const fn new(operands: Vec<Operand>) -> Self {
        Self { operands }
    }

    #[must_use]
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    #[must_use]
    pub fn assembly_text(&self) -> String {
        assembly_text(&self.operands)
    }

    #[must_use]
    pub fn bit_text(&self) -> String {
        bit_text(&self.operands)
    }

    /// Total width of the line's encoding.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.operands.iter().map(|it| u32::from(it.bits().width())).sum()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.assembly_text(), self.bit_text())
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::Line;
    use crate::{Bits, ImmediateStyle, Operand};

    fn mnemonic(text: &str, bits: &str) -> Operand {
        Operand::Mnemonic { text: text.to_owned(), bits: Bits::parse(bits).unwrap() }
    }

    #[test]
    fn add_register_form() {
        let line = Line::new(Vec::from([
            mnemonic("add", "0001"),
            Operand::Register { index: 1, width: 3 },
            Operand::Register { index: 2, width: 3 },
            Operand::Fixed(Bits::parse("000").unwrap()),
            Operand::Register { index: 7, width: 3 },
        ]));

        assert_eq!(line.width(), 16);
        expect!["add r1 r2 r7 => 0001001010000111"].assert_eq(&line.to_string());
    }

    #[test]
    fn trailing_fixed_field() {
        let line = Line::new(Vec::from([
            mnemonic("jmp", "1100"),
            Operand::Fixed(Bits::parse("000").unwrap()),
            Operand::Register { index: 3, width: 3 },
            Operand::Fixed(Bits::parse("000000").unwrap()),
        ]));

        expect!["jmp r3 => 1100000011000000"].assert_eq(&line.to_string());
    }

    #[test]
    fn directives() {
        let orig = Line::new(Vec::from([
            mnemonic(".orig", ""),
            Operand::Immediate { value: 0x3000, width: 16, style: ImmediateStyle::Hex },
        ]));

        expect![".orig x3000 => 0011000000000000"].assert_eq(&orig.to_string());

        let end = Line::new(Vec::from([mnemonic(".end", "")]));
        assert_eq!(end.width(), 0);
        assert_eq!(end.to_string(), ".end => ");
    }
}
