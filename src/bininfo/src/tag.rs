//! Patch-table record tags

use std::fmt;

use serde::{Serialize, Serializer};

/// Directive kind of a patch-table record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    End,
    RelI0,
    ImmU0,
    RelI8,
    ImmU8,
    RelI16,
    ImmU16,
    RelI32,
    ImmU32,
    RelI64,
    ImmI64,
    Rel32Export,
    Imm32Export,
    Rel64Export,
    Imm64Export,
    AbsAddr,
    CodeHeap,
    ZeroedCodeHeap,
    DataHeap,
    ZeroedDataHeap,
    Main,
    /// Tag outside the known set, kept for newer files
    Unknown(u8),
}

/// How the decoder treats a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TagFamily {
    Terminator,
    /// Relocation/immediate records, grouped into import chains
    Import,
    Export,
    AbsoluteAddress,
    Allocation,
    Main,
    Unknown,
}

impl From<u8> for RecordTag {
    fn from(b: u8) -> Self {
        match b {
            0 => Self::End,
            2 => Self::RelI0,
            3 => Self::ImmU0,
            4 => Self::RelI8,
            5 => Self::ImmU8,
            6 => Self::RelI16,
            7 => Self::ImmU16,
            8 => Self::RelI32,
            9 => Self::ImmU32,
            10 => Self::RelI64,
            11 => Self::ImmI64,
            16 => Self::Rel32Export,
            17 => Self::Imm32Export,
            18 => Self::Rel64Export,
            19 => Self::Imm64Export,
            20 => Self::AbsAddr,
            21 => Self::CodeHeap,
            22 => Self::ZeroedCodeHeap,
            23 => Self::DataHeap,
            24 => Self::ZeroedDataHeap,
            25 => Self::Main,
            other => Self::Unknown(other),
        }
    }
}

impl RecordTag {
    /// Raw tag byte
    pub fn to_byte(self) -> u8 {
        match self {
            Self::End => 0,
            Self::RelI0 => 2,
            Self::ImmU0 => 3,
            Self::RelI8 => 4,
            Self::ImmU8 => 5,
            Self::RelI16 => 6,
            Self::ImmU16 => 7,
            Self::RelI32 => 8,
            Self::ImmU32 => 9,
            Self::RelI64 => 10,
            Self::ImmI64 => 11,
            Self::Rel32Export => 16,
            Self::Imm32Export => 17,
            Self::Rel64Export => 18,
            Self::Imm64Export => 19,
            Self::AbsAddr => 20,
            Self::CodeHeap => 21,
            Self::ZeroedCodeHeap => 22,
            Self::DataHeap => 23,
            Self::ZeroedDataHeap => 24,
            Self::Main => 25,
            Self::Unknown(b) => b,
        }
    }

    /// Loader name of the tag, `None` for unknown tags
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::End => "IET_END",
            Self::RelI0 => "IET_REL_I0",
            Self::ImmU0 => "IET_IMM_U0",
            Self::RelI8 => "IET_REL_I8",
            Self::ImmU8 => "IET_IMM_U8",
            Self::RelI16 => "IET_REL_I16",
            Self::ImmU16 => "IET_IMM_U16",
            Self::RelI32 => "IET_REL_I32",
            Self::ImmU32 => "IET_IMM_U32",
            Self::RelI64 => "IET_REL_I64",
            Self::ImmI64 => "IET_IMM_I64",
            Self::Rel32Export => "IET_REL32_EXPORT",
            Self::Imm32Export => "IET_IMM32_EXPORT",
            Self::Rel64Export => "IET_REL64_EXPORT",
            Self::Imm64Export => "IET_IMM64_EXPORT",
            Self::AbsAddr => "IET_ABS_ADDR",
            Self::CodeHeap => "IET_CODE_HEAP",
            Self::ZeroedCodeHeap => "IET_ZEROED_CODE_HEAP",
            Self::DataHeap => "IET_DATA_HEAP",
            Self::ZeroedDataHeap => "IET_ZEROED_DATA_HEAP",
            Self::Main => "IET_MAIN",
            Self::Unknown(_) => return None,
        };
        Some(name)
    }

    pub fn family(self) -> TagFamily {
        match self {
            Self::End => TagFamily::Terminator,
            Self::RelI0
            | Self::ImmU0
            | Self::RelI8
            | Self::ImmU8
            | Self::RelI16
            | Self::ImmU16
            | Self::RelI32
            | Self::ImmU32
            | Self::RelI64
            | Self::ImmI64 => TagFamily::Import,
            Self::Rel32Export | Self::Imm32Export | Self::Rel64Export | Self::Imm64Export => {
                TagFamily::Export
            }
            Self::AbsAddr => TagFamily::AbsoluteAddress,
            Self::CodeHeap | Self::ZeroedCodeHeap | Self::DataHeap | Self::ZeroedDataHeap => {
                TagFamily::Allocation
            }
            Self::Main => TagFamily::Main,
            Self::Unknown(_) => TagFamily::Unknown,
        }
    }

    #[inline]
    pub fn is_import(self) -> bool {
        self.family() == TagFamily::Import
    }

    /// Patched operand width in bits, for relocation and export tags
    pub fn operand_width(self) -> Option<u8> {
        match self {
            Self::RelI0 | Self::ImmU0 => Some(0),
            Self::RelI8 | Self::ImmU8 => Some(8),
            Self::RelI16 | Self::ImmU16 => Some(16),
            Self::RelI32 | Self::ImmU32 | Self::Rel32Export | Self::Imm32Export => Some(32),
            Self::RelI64 | Self::ImmI64 | Self::Rel64Export | Self::Imm64Export => Some(64),
            _ => None,
        }
    }

    /// True when the patched value is relative to the patch site
    pub fn is_relative(self) -> bool {
        matches!(
            self,
            Self::RelI0
                | Self::RelI8
                | Self::RelI16
                | Self::RelI32
                | Self::RelI64
                | Self::Rel32Export
                | Self::Rel64Export
        )
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "IET_#{}", self.to_byte()),
        }
    }
}

impl Serialize for RecordTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
