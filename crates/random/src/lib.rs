#![forbid(unsafe_code)]
#![warn(clippy::must_use_candidate)]

use isagen_core::{Node, Operand};
use rand::Rng;
use rand::seq::IndexedRandom;

pub mod lc3;
pub mod program;

pub use program::{ConfigError, Isa, Program, ProgramConfig, generate};


/// Picks a random syntax form of `node` and resolves every field in it.
///
/// Alternations choose one branch and never fall back to another, so `None` means the chosen
/// path had a field that couldn't be resolved. Nothing partial is ever returned.
pub fn instantiate<R: Rng + ?Sized>(node: &Node, rng: &mut R) -> Option<Vec<Operand>> {
    let mut operands = Vec::new();
    instantiate_into(node, rng, &mut operands)?;
    Some(operands)
}

fn instantiate_into<R: Rng + ?Sized>(
    node: &Node,
    rng: &mut R,
    operands: &mut Vec<Operand>,
) -> Option<()> {
    match node {
        Node::Leaf(field) => operands.push(field.resolve(rng)?),

        Node::Sequence(children) => {
            for child in children {
                instantiate_into(child, rng, operands)?;
            }
        }

        Node::Alternation(branches) => instantiate_into(branches.choose(rng)?, rng, operands)?,
    }

    Some(())
}
