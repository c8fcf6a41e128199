// Tue Jan 13 2026 - Alex

// Mach-O magic numbers
pub const MH_MAGIC: u32 = 0xfeedface;
pub const MH_CIGAM: u32 = 0xcefaedfe;
pub const MH_MAGIC_64: u32 = 0xfeedfacf;
pub const MH_CIGAM_64: u32 = 0xcffaedfe;

// Universal (fat) wrapper, always big-endian on disk
pub const FAT_MAGIC: u32 = 0xcafebabe;
pub const FAT_CIGAM: u32 = 0xbebafeca;
pub const FAT_HEADER_SIZE: usize = 8;
pub const FAT_ARCH_SIZE: usize = 20;

// CPU types
pub const CPU_ARCH_ABI64: u32 = 0x01000000;
pub const CPU_TYPE_I386: u32 = 7;
pub const CPU_TYPE_X86_64: u32 = CPU_TYPE_I386 | CPU_ARCH_ABI64;
pub const CPU_TYPE_ARM: u32 = 12;
pub const CPU_TYPE_ARM64: u32 = CPU_TYPE_ARM | CPU_ARCH_ABI64;

// CPU subtypes
pub const CPU_SUBTYPE_X86_ALL: u32 = 3;
pub const CPU_SUBTYPE_X86_64_ALL: u32 = 3;
pub const CPU_SUBTYPE_ARM_V6: u32 = 6;
pub const CPU_SUBTYPE_ARM_V7: u32 = 9;
pub const CPU_SUBTYPE_ARM_V7F: u32 = 10;
pub const CPU_SUBTYPE_ARM_V7S: u32 = 11;
pub const CPU_SUBTYPE_ARM_V7K: u32 = 12;
pub const CPU_SUBTYPE_ARM64_ALL: u32 = 0;

// File types
pub const MH_OBJECT: u32 = 0x1;
pub const MH_EXECUTE: u32 = 0x2;
pub const MH_DYLIB: u32 = 0x6;
pub const MH_DYLINKER: u32 = 0x7;
pub const MH_BUNDLE: u32 = 0x8;
pub const MH_DYLIB_STUB: u32 = 0x9;

// Header flags
pub const MH_TWOLEVEL: u32 = 0x80;
pub const MH_WEAK_DEFINES: u32 = 0x8000;
pub const MH_NO_REEXPORTED_DYLIBS: u32 = 0x100000;
pub const MH_DEAD_STRIPPABLE_DYLIB: u32 = 0x400000;
pub const MH_APP_EXTENSION_SAFE: u32 = 0x02000000;

// Load command types
pub const LC_REQ_DYLD: u32 = 0x80000000;
pub const LC_SEGMENT: u32 = 0x1;
pub const LC_SYMTAB: u32 = 0x2;
pub const LC_DYSYMTAB: u32 = 0xb;
pub const LC_LOAD_DYLIB: u32 = 0xc;
pub const LC_ID_DYLIB: u32 = 0xd;
pub const LC_SUB_FRAMEWORK: u32 = 0x12;
pub const LC_SUB_UMBRELLA: u32 = 0x13;
pub const LC_SUB_CLIENT: u32 = 0x14;
pub const LC_SUB_LIBRARY: u32 = 0x15;
pub const LC_LOAD_WEAK_DYLIB: u32 = 0x18 | LC_REQ_DYLD;
pub const LC_SEGMENT_64: u32 = 0x19;
pub const LC_UUID: u32 = 0x1b;
pub const LC_CODE_SIGNATURE: u32 = 0x1d;
pub const LC_REEXPORT_DYLIB: u32 = 0x1f | LC_REQ_DYLD;
pub const LC_DYLD_INFO: u32 = 0x22;
pub const LC_DYLD_INFO_ONLY: u32 = 0x22 | LC_REQ_DYLD;
pub const LC_VERSION_MIN_MACOSX: u32 = 0x24;
pub const LC_VERSION_MIN_IPHONEOS: u32 = 0x25;
pub const LC_LINKER_OPTION: u32 = 0x2d;
pub const LC_VERSION_MIN_TVOS: u32 = 0x2f;
pub const LC_VERSION_MIN_WATCHOS: u32 = 0x30;

// Header and entry sizes
pub const MACHO_HEADER_SIZE_32: usize = 28;
pub const MACHO_HEADER_SIZE_64: usize = 32;
pub const NLIST_SIZE_32: usize = 12;
pub const NLIST_SIZE_64: usize = 16;
pub const SEGMENT_CMD_SIZE_32: usize = 56;
pub const SEGMENT_CMD_SIZE_64: usize = 72;
pub const SECTION_SIZE_32: usize = 68;
pub const SECTION_SIZE_64: usize = 80;
pub const TOC_ENTRY_SIZE: usize = 8;

// nlist n_type / n_desc masks
pub const N_EXT: u8 = 0x01;
pub const N_TYPE: u8 = 0x0e;
pub const N_UNDF: u8 = 0x0;
pub const N_SECT: u8 = 0xe;
pub const N_WEAK_REF: u16 = 0x0040;
pub const N_WEAK_DEF: u16 = 0x0080;

// Export trie flags
pub const EXPORT_SYMBOL_FLAGS_KIND_MASK: u64 = 0x03;
pub const EXPORT_SYMBOL_FLAGS_KIND_REGULAR: u64 = 0x00;
pub const EXPORT_SYMBOL_FLAGS_KIND_THREAD_LOCAL: u64 = 0x01;
pub const EXPORT_SYMBOL_FLAGS_WEAK_DEFINITION: u64 = 0x04;
pub const EXPORT_SYMBOL_FLAGS_REEXPORT: u64 = 0x08;
pub const EXPORT_SYMBOL_FLAGS_STUB_AND_RESOLVER: u64 = 0x10;

// objc_image_info flags
pub const OBJC_IMAGE_SUPPORTS_GC: u32 = 2;
pub const OBJC_IMAGE_GC_ONLY: u32 = 4;
pub const OBJC_IMAGE_IS_SIMULATED: u32 = 32;

// Static archives
pub const ARCHIVE_MAGIC: &[u8; 8] = b"!<arch>\n";
pub const ARCHIVE_HEADER_SIZE: usize = 60;

// LLVM bitcode: raw magic and the wrapper magic (little-endian on disk)
pub const BITCODE_MAGIC: &[u8; 4] = b"BC\xc0\xde";
pub const BITCODE_WRAPPER_MAGIC: u32 = 0x0b17c0de;

// The dylib that gets the dyld_stub_binder fast stub synthesized
pub const LIBSYSTEM_INSTALL_PATH: &str = "/usr/lib/libSystem.B.dylib";

/// Architecture name for an (cputype, cpusubtype) pair, used in
/// mismatched-file diagnostics.
pub fn arch_name_for(cpu_type: u32, cpu_subtype: u32) -> &'static str {
    match cpu_type {
        CPU_TYPE_I386 => "i386",
        CPU_TYPE_X86_64 => "x86_64",
        CPU_TYPE_ARM64 => "arm64",
        CPU_TYPE_ARM => match cpu_subtype {
            CPU_SUBTYPE_ARM_V6 => "armv6",
            CPU_SUBTYPE_ARM_V7 => "armv7",
            CPU_SUBTYPE_ARM_V7F => "armv7f",
            CPU_SUBTYPE_ARM_V7S => "armv7s",
            CPU_SUBTYPE_ARM_V7K => "armv7k",
            _ => "arm???",
        },
        _ => "unknown",
    }
}
