//! The closed set of mouse chromosomes carried by the genetic map.
//!
//! The map covers the nineteen autosomes and X. Chromosome identity is a
//! fixed enumeration rather than a free-form string, so an out-of-set label
//! (Y, MT, unplaced scaffolds) is caught at parse time and the ordering
//! `1..19, X` used everywhere downstream is the declaration order.

use std::fmt;
use std::str::FromStr;

use crate::map::GridMapError;

/// A mouse chromosome: autosomes 1 through 19, then X.
///
/// `Ord` follows declaration order, which is the categorical level order
/// of every output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chrom {
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
    C7,
    C8,
    C9,
    C10,
    C11,
    C12,
    C13,
    C14,
    C15,
    C16,
    C17,
    C18,
    C19,
    X,
}

impl Chrom {
    /// All chromosomes in categorical level order.
    pub const ALL: [Chrom; 20] = [
        Chrom::C1,
        Chrom::C2,
        Chrom::C3,
        Chrom::C4,
        Chrom::C5,
        Chrom::C6,
        Chrom::C7,
        Chrom::C8,
        Chrom::C9,
        Chrom::C10,
        Chrom::C11,
        Chrom::C12,
        Chrom::C13,
        Chrom::C14,
        Chrom::C15,
        Chrom::C16,
        Chrom::C17,
        Chrom::C18,
        Chrom::C19,
        Chrom::X,
    ];

    /// The label used in marker identifiers and output tables.
    pub fn label(&self) -> &'static str {
        match self {
            Chrom::C1 => "1",
            Chrom::C2 => "2",
            Chrom::C3 => "3",
            Chrom::C4 => "4",
            Chrom::C5 => "5",
            Chrom::C6 => "6",
            Chrom::C7 => "7",
            Chrom::C8 => "8",
            Chrom::C9 => "9",
            Chrom::C10 => "10",
            Chrom::C11 => "11",
            Chrom::C12 => "12",
            Chrom::C13 => "13",
            Chrom::C14 => "14",
            Chrom::C15 => "15",
            Chrom::C16 => "16",
            Chrom::C17 => "17",
            Chrom::C18 => "18",
            Chrom::C19 => "19",
            Chrom::X => "X",
        }
    }

    /// Position of this chromosome in the categorical level order.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Chrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Chrom {
    type Err = GridMapError;

    /// Parse a chromosome label.
    ///
    /// Accepts `1`..`19` and `X`/`x`, with an optional `chr` prefix
    /// (UCSC-style inputs). The numeric code `20` used for X in the Liu
    /// map files is recoded to [`Chrom::X`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let label = label
            .strip_prefix("chr")
            .or_else(|| label.strip_prefix("Chr"))
            .unwrap_or(label);
        let chrom = match label {
            "1" => Chrom::C1,
            "2" => Chrom::C2,
            "3" => Chrom::C3,
            "4" => Chrom::C4,
            "5" => Chrom::C5,
            "6" => Chrom::C6,
            "7" => Chrom::C7,
            "8" => Chrom::C8,
            "9" => Chrom::C9,
            "10" => Chrom::C10,
            "11" => Chrom::C11,
            "12" => Chrom::C12,
            "13" => Chrom::C13,
            "14" => Chrom::C14,
            "15" => Chrom::C15,
            "16" => Chrom::C16,
            "17" => Chrom::C17,
            "18" => Chrom::C18,
            "19" => Chrom::C19,
            "X" | "x" | "20" => Chrom::X,
            _ => return Err(GridMapError::UnknownChrom(s.to_string())),
        };
        Ok(chrom)
    }
}
