#![forbid(unsafe_code)]
#![warn(clippy::must_use_candidate)]

use core::fmt;

use isagen_schema::{FieldLayout, Schema};
use rayon::prelude::*;


/// An instruction word and the mnemonic it decodes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    pub encoded: u64,
    pub decoded: String,
}

/// Builds every combination of `fields`' values, in order.
///
/// Each field is folded into the partial results built so far: for every value in its domain,
/// every partial result gets the value's bits OR'd in and, if the field is displayed, the
/// rendered operand appended. The result has as many entries as the product of the domain sizes.
///
/// Fields must not overlap, the bits of overlapping fields are merged. The whole product is held
/// in memory, [`isagen_schema::load`] rejects layouts past [`isagen_schema::MAX_PERMUTATIONS`].
#[must_use]
pub fn construct(label: &str, registers: &[String], fields: &[FieldLayout]) -> Vec<Permutation> {
    let mut partials = Vec::from([Permutation { encoded: 0, decoded: label.to_owned() }]);

    for field in fields {
        let len = usize::try_from(field.cardinality()).unwrap_or(usize::MAX);
        let mut next = Vec::with_capacity(partials.len().saturating_mul(len));

        for value in field.domain.clone() {
            let bits = field.encode(value);
            let operand = field.is_displayed().then(|| field.operand(value, registers));

            for partial in &partials {
                let mut decoded = partial.decoded.clone();
                if let Some(operand) = &operand {
                    decoded.push(' ');
                    decoded.push_str(operand);
                }

                next.push(Permutation { encoded: partial.encoded | bits, decoded });
            }
        }

        partials = next;
    }

    partials
}

/// Every permutation of every instruction in `schema`, in schema order.
///
/// Instructions are independent of each other, so they're built in parallel.
#[must_use]
pub fn exhaustive(schema: &Schema) -> Vec<Permutation> {
    let per_instruction: Vec<_> = schema
        .instructions
        .par_iter()
        .map(|inst| {
            let permutations = construct(&inst.label, &schema.registers, &inst.fields);
            tracing::debug!(label = %inst.label, count = permutations.len(), "constructed");
            permutations
        })
        .collect();

    let permutations: Vec<_> = per_instruction.into_iter().flatten().collect();

    tracing::info!(
        instructions = schema.instructions.len(),
        permutations = permutations.len(),
        "exhaustive generation done"
    );

    permutations
}

/// Formats a permutation as `0x<word> <mnemonic>`, the word zero padded to `digits`.
pub struct Listing<'a> {
    permutation: &'a Permutation,
    digits: usize,
}

impl<'a> Listing<'a> {
    #[must_use]
    pub const fn new(permutation: &'a Permutation, digits: usize) -> Self {
        Self { permutation, digits }
    }
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Permutation { encoded, decoded } = self.permutation;
        write!(f, "{encoded:#0width$x} {decoded}", width = self.digits + 2)
    }
}

/// Writes every permutation of `schema`, one per line.
pub fn write_listing<W: std::io::Write + ?Sized>(
    out: &mut W,
    schema: &Schema,
    permutations: &[Permutation],
) -> std::io::Result<()> {
    let digits = schema.hex_digits();

    for permutation in permutations {
        writeln!(out, "{}", Listing::new(permutation, digits))?;
    }

    Ok(())
}
