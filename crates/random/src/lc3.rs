//! The LC-3 instruction set.
//!
//! Every instruction is 16 bits wide. Directives carry no encoding of their own, `.orig` only
//! encodes its address.

use isagen_core::{Field, GrammarError, Node};

use crate::Isa;


type NodeResult = Result<Node, GrammarError>;

pub const WORD_WIDTH: u32 = 16;

const REGISTER_WIDTH: u8 = 3;

/// `(mnemonic, n z p)` for every spelling of the conditional branch.
const BRANCHES: [(&str, &str); 8] = [
    ("br", "111"),
    ("brn", "100"),
    ("brz", "010"),
    ("brp", "001"),
    ("brnz", "110"),
    ("brnp", "101"),
    ("brzp", "011"),
    ("brnzp", "111"),
];

/// `(alias, trap vector)` for the trap aliases.
const TRAPS: [(&str, &str); 5] = [
    ("getc", "00100000"),
    ("out", "00100001"),
    ("puts", "00100010"),
    ("in", "00100011"),
    ("halt", "00100101"),
];

fn op(text: &str, bits: &str) -> NodeResult {
    Field::mnemonic(text, bits).map(Node::Leaf)
}

fn fixed(bits: &str) -> NodeResult {
    Field::fixed(bits).map(Node::Leaf)
}

fn reg() -> NodeResult {
    Field::register(REGISTER_WIDTH).map(Node::Leaf)
}

fn simm(width: u8) -> NodeResult {
    Field::signed(width).map(Node::Leaf)
}

fn uimm(width: u8) -> NodeResult {
    Field::unsigned(width).map(Node::Leaf)
}

fn seq<I: IntoIterator<Item = NodeResult>>(nodes: I) -> NodeResult {
    nodes.into_iter().collect::<Result<Vec<_>, _>>().map(Node::Sequence)
}

fn alt<I: IntoIterator<Item = NodeResult>>(nodes: I) -> NodeResult {
    Node::alternation(nodes.into_iter().collect::<Result<Vec<_>, _>>()?)
}

/// `add`/`and`: `op dr sr1 sr2` or `op dr sr1 imm5`.
fn operate(text: &str, opcode: &str) -> NodeResult {
    seq([
        op(text, opcode),
        reg(),
        reg(),
        alt([seq([fixed("000"), reg()]), seq([fixed("1"), simm(5)])]),
    ])
}

/// `op r pcoffset9`.
fn pc_relative(text: &str, opcode: &str) -> NodeResult {
    seq([op(text, opcode), reg(), simm(9)])
}

/// `op r base offset6`.
fn base_relative(text: &str, opcode: &str) -> NodeResult {
    seq([op(text, opcode), reg(), reg(), simm(6)])
}

/// One alternation per instruction type, each over that type's syntax forms.
pub fn instructions() -> NodeResult {
    let branch = alt(BRANCHES.iter().map(|(text, nzp)| op(text, &format!("0000{nzp}"))));
    let traps = TRAPS.iter().map(|(text, vector)| op(text, &format!("11110000{vector}")));

    alt([
        operate("add", "0001"),
        operate("and", "0101"),
        seq([branch, simm(9)]),
        alt([
            seq([op("jmp", "1100"), fixed("000"), reg(), fixed("000000")]),
            op("ret", "1100000111000000"),
        ]),
        alt([
            seq([op("jsr", "0100"), fixed("1"), simm(11)]),
            seq([op("jsrr", "0100"), fixed("000"), reg(), fixed("000000")]),
        ]),
        pc_relative("ld", "0010"),
        pc_relative("ldi", "1010"),
        base_relative("ldr", "0110"),
        pc_relative("lea", "1110"),
        seq([op("not", "1001"), reg(), reg(), fixed("111111")]),
        op("rti", "1000000000000000"),
        pc_relative("st", "0011"),
        pc_relative("sti", "1011"),
        base_relative("str", "0111"),
        alt(core::iter::once(seq([op("trap", "1111"), fixed("0000"), uimm(8)])).chain(traps)),
    ])
}

pub fn origin() -> NodeResult {
    seq([op(".orig", ""), uimm(16)])
}

pub fn end() -> NodeResult {
    op(".end", "")
}

pub fn isa() -> Result<Isa, GrammarError> {
    Isa::new(instructions()?, origin()?, end()?)
}
