#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Propositional symbols and literals.
//!
//! Two layers live here. [`Literal`] is the named proposition the knowledge base
//! speaks in ("P23" is "pit at (2, 3)"). [`PackedLiteral`] is the solver's
//! interned form: a dense variable index plus a polarity bit, produced when a set of
//! clauses is compiled into a [`Cnf`](crate::sat::cnf::Cnf).

use crate::world::components::Point;
use core::fmt::{self, Display};
use core::ops::Not;
use serde::Serialize;

/// Dense variable index inside one compiled formula.
pub type Variable = u32;

/// Which knowledge-base partition a proposition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Partition {
    /// Pits, breezes and (by convention) glitter.
    Pit,
    /// Wumpuses and stenches.
    Wumpus,
}

/// An atomic proposition about one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Symbol {
    Pit(Point),
    Wumpus(Point),
    Breeze(Point),
    Stench(Point),
    Glitter(Point),
}

impl Symbol {
    /// The cell the proposition talks about.
    #[must_use]
    pub const fn cell(self) -> Point {
        match self {
            Self::Pit(p) | Self::Wumpus(p) | Self::Breeze(p) | Self::Stench(p) | Self::Glitter(p) => p,
        }
    }

    #[must_use]
    pub const fn partition(self) -> Partition {
        match self {
            Self::Wumpus(_) | Self::Stench(_) => Partition::Wumpus,
            Self::Pit(_) | Self::Breeze(_) | Self::Glitter(_) => Partition::Pit,
        }
    }

    const fn prefix(self) -> char {
        match self {
            Self::Pit(_) => 'P',
            Self::Wumpus(_) => 'W',
            Self::Breeze(_) => 'B',
            Self::Stench(_) => 'S',
            Self::Glitter(_) => 'G',
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Point { x, y } = self.cell();
        if (0..10).contains(&x) && (0..10).contains(&y) {
            write!(f, "{}{x}{y}", self.prefix())
        } else {
            write!(f, "{}{x}_{y}", self.prefix())
        }
    }
}

/// A symbol with a polarity. Equal iff same symbol and same polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Literal {
    pub symbol: Symbol,
    pub negated: bool,
}

impl Literal {
    #[must_use]
    pub const fn new(symbol: Symbol, negated: bool) -> Self {
        Self { symbol, negated }
    }

    /// The symbol asserted true.
    #[must_use]
    pub const fn positive(symbol: Symbol) -> Self {
        Self::new(symbol, false)
    }

    /// The symbol asserted false.
    #[must_use]
    pub const fn negative(symbol: Symbol) -> Self {
        Self::new(symbol, true)
    }

    /// Same symbol, opposite polarity.
    #[must_use]
    pub const fn negate(self) -> Self {
        Self::new(self.symbol, !self.negated)
    }

    /// Truth value this literal takes when its symbol is `value`.
    #[must_use]
    pub const fn holds_when(self, value: bool) -> bool {
        value != self.negated
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "¬{}", self.symbol)
        } else {
            write!(f, "{}", self.symbol)
        }
    }
}

/// A solver literal: variable index in the low 31 bits, polarity in the top bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackedLiteral(u32);

impl PackedLiteral {
    #[must_use]
    pub const fn new(var: Variable, polarity: bool) -> Self {
        Self(var & 0x7FFF_FFFF | ((polarity as u32) << 31))
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0 & 0x7FFF_FFFF
    }

    /// `true` for the positive literal.
    #[must_use]
    pub const fn polarity(self) -> bool {
        (self.0 >> 31) != 0
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self(self.0 ^ 0x8000_0000)
    }

    /// Index usable for per-variable tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self.variable() as usize
    }
}

impl Not for PackedLiteral {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}
