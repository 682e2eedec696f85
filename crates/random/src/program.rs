use core::fmt;

use isagen_core::{GrammarError, Line, Node};
use rand::Rng;
use rand::distr::{Bernoulli, Distribution};

use crate::instantiate;


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramConfig {
    /// How many steps the generator takes after the first origin directive.
    pub instruction_count: usize,
    /// Chance that a step closes the current load region and opens a new one instead of emitting
    /// an instruction.
    pub origin_probability: f64,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self { instruction_count: 100, origin_probability: 0.01 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("origin probability must be within 0..=1, found {0}")]
    OriginProbability(f64),
}

/// The grammar of an instruction set, plus its load region directives.
#[derive(Debug, Clone)]
pub struct Isa {
    instructions: Node,
    origin: Node,
    end: Node,
}

impl Isa {
    pub fn new(instructions: Node, origin: Node, end: Node) -> Result<Self, GrammarError> {
        instructions.validate()?;
        origin.validate()?;
        end.validate()?;

        Ok(Self { instructions, origin, end })
    }

    #[must_use]
    pub const fn instructions(&self) -> &Node {
        &self.instructions
    }

    #[must_use]
    pub const fn origin(&self) -> &Node {
        &self.origin
    }

    #[must_use]
    pub const fn end(&self) -> &Node {
        &self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    lines: Vec<Line>,
    skipped: usize,
}

impl Program {
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Lines that were dropped because a field couldn't be resolved.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    fn push<R: Rng + ?Sized>(&mut self, node: &Node, rng: &mut R) {
        match instantiate(node, rng) {
            Some(operands) => self.lines.push(Line::new(operands)),
            None => {
                tracing::debug!(line = self.lines.len(), "unresolvable draw, skipping line");
                self.skipped += 1;
            }
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}

/// Generates a random program for `isa`.
///
/// The program opens with an origin directive and closes with an end directive. Each step either
/// emits an instruction or, with `origin_probability`, starts a new load region.
pub fn generate<R: Rng + ?Sized>(
    isa: &Isa,
    config: &ProgramConfig,
    rng: &mut R,
) -> Result<Program, ConfigError> {
    let new_region = Bernoulli::new(config.origin_probability)
        .map_err(|_| ConfigError::OriginProbability(config.origin_probability))?;

    let mut program = Program::default();

    program.push(&isa.origin, rng);

    for _ in 0..config.instruction_count {
        if new_region.sample(rng) {
            program.push(&isa.end, rng);
            program.push(&isa.origin, rng);
        } else {
            program.push(&isa.instructions, rng);
        }
    }

    program.push(&isa.end, rng);

    tracing::info!(lines = program.lines.len(), skipped = program.skipped, "generated program");

    Ok(program)
}
