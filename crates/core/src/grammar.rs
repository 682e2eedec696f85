use crate::{Field, GrammarError};


/// A tree describing the legal syntax forms of a line.
#[derive(Debug, Clone)]
pub enum Node {
    Leaf(Field),
    /// Every child, in order.
    Sequence(Vec<Node>),
    /// Exactly one of the branches.
    Alternation(Vec<Node>),
}

impl Node {
    #[must_use]
    pub fn sequence<I: IntoIterator<Item = Node>>(children: I) -> Self {
        Self::Sequence(children.into_iter().collect())
    }

    pub fn alternation<I: IntoIterator<Item = Node>>(branches: I) -> Result<Self, GrammarError> {
        let branches: Vec<_> = branches.into_iter().collect();
        if branches.is_empty() {
            return Err(GrammarError::EmptyAlternation);
        }

        Ok(Self::Alternation(branches))
    }

    /// Checks that every alternation in the tree has something to choose from.
    pub fn validate(&self) -> Result<(), GrammarError> {
        match self {
            Self::Leaf(_) => Ok(()),
            Self::Sequence(children) => children.iter().try_for_each(Self::validate),
            Self::Alternation(branches) if branches.is_empty() => {
                Err(GrammarError::EmptyAlternation)
            }
            Self::Alternation(branches) => branches.iter().try_for_each(Self::validate),
        }
    }

    /// Number of distinct syntax forms the node can produce, ignoring operand values.
    #[must_use]
    pub fn forms(&self) -> u64 {
        match self {
            Self::Leaf(_) => 1,
            Self::Sequence(children) => {
                children.iter().map(Self::forms).fold(1, u64::saturating_mul)
            }
            Self::Alternation(branches) => {
                branches.iter().map(Self::forms).fold(0, u64::saturating_add)
            }
        }
    }
}

impl From<Field> for Node {
    fn from(field: Field) -> Self {
        Self::Leaf(field)
    }
}
