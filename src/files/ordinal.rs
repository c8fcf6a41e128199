// Tue Jan 13 2026 - Alex

use serde::{Deserialize, Serialize};

/// Total-ordered identity assigned to every input file. The packing keeps
/// the four ranges disjoint while making comparison a plain integer
/// compare: partition in the top byte, the major (per-file) index in the
/// middle, and the archive-member index in the low bits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Ordinal(u64);

const PARTITION_SHIFT: u32 = 56;
const MAJOR_SHIFT: u32 = 24;
const MEMBER_MASK: u64 = 0x00ff_ffff;

const PARTITION_COMMAND_LINE: u64 = 1;
const PARTITION_INDIRECT_DYLIB: u64 = 2;
const PARTITION_LINKER_OPTION: u64 = 3;

impl Ordinal {
    pub fn invalid() -> Ordinal {
        Ordinal(0)
    }

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }

    fn pack(partition: u64, major: u32, member: u32) -> Ordinal {
        Ordinal(
            (partition << PARTITION_SHIFT)
                | ((major as u64) << MAJOR_SHIFT)
                | (member as u64 & MEMBER_MASK),
        )
    }

    /// Ordinal for the Nth file named on the command line.
    pub fn command_line(index: u32) -> Ordinal {
        Ordinal::pack(PARTITION_COMMAND_LINE, index, 0)
    }

    /// Ordinal for the Nth dylib pulled in while resolving indirect
    /// dependents.
    pub fn indirect_dylib(sequence: u32) -> Ordinal {
        Ordinal::pack(PARTITION_INDIRECT_DYLIB, sequence, 0)
    }

    /// Ordinal for the Nth library supplied by an object file's embedded
    /// linker options.
    pub fn linker_option(sequence: u32) -> Ordinal {
        Ordinal::pack(PARTITION_LINKER_OPTION, sequence, 0)
    }

    /// Sub-ordinal of this file for its Nth archive member (1-based).
    pub fn archive_member(self, member: u32) -> Ordinal {
        Ordinal((self.0 & !MEMBER_MASK) | (member as u64 & MEMBER_MASK))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_order() {
        assert!(Ordinal::command_line(0) < Ordinal::command_line(1));
        assert!(Ordinal::command_line(100) < Ordinal::command_line(101));
    }

    #[test]
    fn test_partitions_disjoint() {
        // every command-line ordinal sorts before every indirect-dylib
        // ordinal, which sorts before every linker-option ordinal
        assert!(Ordinal::command_line(u32::MAX) < Ordinal::indirect_dylib(0));
        assert!(Ordinal::indirect_dylib(u32::MAX) < Ordinal::linker_option(0));
    }

    #[test]
    fn test_archive_members_nest_under_archive() {
        let archive = Ordinal::command_line(3);
        let first = archive.archive_member(1);
        let second = archive.archive_member(2);
        assert!(archive < first);
        assert!(first < second);
        assert!(second < Ordinal::command_line(4));
    }

    #[test]
    fn test_invalid_sorts_first() {
        assert!(Ordinal::invalid() < Ordinal::command_line(0));
        assert!(!Ordinal::invalid().is_valid());
        assert!(Ordinal::command_line(0).is_valid());
    }
}
