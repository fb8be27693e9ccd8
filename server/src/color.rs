//! Color tag allocation for chat sessions
//!
//! Tags are markup understood by the presentation layer. They are purely
//! cosmetic: once the palette runs out, tags are reused round-robin and two
//! sessions may share one.

use std::collections::HashSet;
use std::fmt;

/// Palette handed out in this order
pub const PALETTE: [ColorTag; 13] = [
    ColorTag("[#FFC0CB]"),
    ColorTag("[#FD7E14]"),
    ColorTag("[#28A745]"),
    ColorTag("[#007BFF]"),
    ColorTag("[#DC3545]"),
    ColorTag("[#FFFF00]"),
    ColorTag("[#C0C0C0]"),
    ColorTag("[#3498DB]"),
    ColorTag("[#E74C3C]"),
    ColorTag("[#2ECC71]"),
    ColorTag("[#9B59B6]"),
    ColorTag("[#D39E00]"),
    ColorTag("[#000000]"),
];

/// Used for senders that are not (or no longer) registered
pub const NEUTRAL: ColorTag = ColorTag("[white]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorTag(&'static str);

impl ColorTag {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Result of an allocation
///
/// `exclusive` is false for round-robin fallbacks; those must not be
/// released, since the tag still belongs to its original holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub tag: ColorTag,
    pub exclusive: bool,
}

/// Tracks which palette entries are held by active sessions
#[derive(Debug, Default)]
pub struct ColorPool {
    in_use: HashSet<ColorTag>,
}

impl ColorPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the first free tag in palette order
    ///
    /// When every tag is taken, falls back to `PALETTE[active_count % len]`
    /// without claiming it, so the tag may already belong to someone else.
    pub fn allocate(&mut self, active_count: usize) -> Allocation {
        if let Some(tag) = PALETTE.iter().find(|tag| !self.in_use.contains(*tag)) {
            self.in_use.insert(*tag);
            return Allocation {
                tag: *tag,
                exclusive: true,
            };
        }

        Allocation {
            tag: PALETTE[active_count % PALETTE.len()],
            exclusive: false,
        }
    }

    /// Marks a tag free again; no-op if it was not held
    pub fn release(&mut self, tag: ColorTag) {
        self.in_use.remove(&tag);
    }

    pub fn is_in_use(&self, tag: ColorTag) -> bool {
        self.in_use.contains(&tag)
    }

    pub fn in_use_count(&self) -> usize {
        self.in_use.len()
    }
}
