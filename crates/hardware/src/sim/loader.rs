//! ELF loader.
//!
//! Parses a statically linked RV32 ELF executable and initialises the DRAM
//! image: every section with a nonzero load address is copied byte-wise.
//! The entry point is the `_start` symbol, the initial heap top is the
//! highest end address of any non-text section, and the compliance-test
//! signature symbols are picked up when present.

use std::fs;
use std::path::Path;

use object::elf;
use object::read::elf::{FileHeader, SectionHeader, Sym};
use object::Endianness;

use crate::common::error::{ElfError, SimResult};
use crate::mem::Dram;

/// Result of loading an executable into DRAM.
#[derive(Clone, Debug, Default)]
pub struct LoadedProgram {
    /// Address of `_start`; the initial program counter.
    pub entry: u32,
    /// First free address above the loaded data; initial `brk` value.
    pub heap_top: u32,
    /// Address of the `begin_signature` symbol, when present.
    pub begin_signature: Option<u32>,
    /// Address of the `end_signature` symbol, when present.
    pub end_signature: Option<u32>,
}

/// Loads an ELF executable into the DRAM image.
///
/// # Arguments
///
/// * `dram` - Destination memory image.
/// * `path` - Path of the statically linked RV32 ELF binary.
///
/// # Returns
///
/// The entry point, heap top, and signature symbol addresses.
pub fn load_elf(dram: &mut Dram, path: &Path) -> SimResult<LoadedProgram> {
    let data = fs::read(path).map_err(|e| ElfError::FileRead(path.to_path_buf(), e))?;

    let header = elf::FileHeader32::<Endianness>::parse(&*data)
        .map_err(|e| ElfError::Parse(path.to_path_buf(), e.to_string()))?;
    let endian = header
        .endian()
        .map_err(|e| ElfError::Parse(path.to_path_buf(), e.to_string()))?;

    let machine = header.e_machine(endian);
    if machine != elf::EM_RISCV {
        return Err(ElfError::InvalidMachine(machine).into());
    }

    let sections = header
        .sections(endian, &*data)
        .map_err(|e| ElfError::Parse(path.to_path_buf(), e.to_string()))?;

    let mut loaded = LoadedProgram::default();
    let mut entry = None;

    for section in sections.iter() {
        let addr = section.sh_addr(endian);
        if addr == 0 {
            continue;
        }
        let size = section.sh_size(endian);

        if section.sh_type(endian) != elf::SHT_NOBITS {
            let offset = section.sh_offset(endian) as usize;
            let bytes = data
                .get(offset..offset + size as usize)
                .ok_or(ElfError::Truncated)?;
            for (i, byte) in bytes.iter().enumerate() {
                dram.write_byte(addr + i as u32, *byte);
            }
        }

        let name = sections.section_name(endian, section).unwrap_or(b"");
        if name != b".text" && name != b".text.init" {
            loaded.heap_top = loaded.heap_top.max(addr.wrapping_add(size));
        }
    }

    let symbols = sections
        .symbols(endian, &*data, elf::SHT_SYMTAB)
        .map_err(|e| ElfError::Parse(path.to_path_buf(), e.to_string()))?;
    for symbol in symbols.iter() {
        let Ok(name) = symbols.symbol_name(endian, symbol) else {
            continue;
        };
        match name {
            b"_start" => entry = Some(symbol.st_value(endian)),
            b"begin_signature" => loaded.begin_signature = Some(symbol.st_value(endian)),
            b"end_signature" => loaded.end_signature = Some(symbol.st_value(endian)),
            _ => {}
        }
    }

    loaded.entry = entry.ok_or(ElfError::MissingSymbol("_start"))?;
    Ok(loaded)
}
