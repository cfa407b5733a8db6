//! Minimal ELF32 image builder.
//!
//! Assembles just enough of an executable for the loader and the end-to-end
//! tests: a `.text` section, an optional `.data` section, and a symbol table
//! holding `_start` plus any extra symbols (signature markers). Everything
//! is little-endian ELF32 for EM_RISCV.

/// Builder for a minimal RV32 executable image.
pub struct ElfBuilder {
    text_addr: u32,
    text: Vec<u8>,
    data_addr: u32,
    data: Vec<u8>,
    symbols: Vec<(String, u32)>,
}

impl ElfBuilder {
    /// Starts an image whose `.text` (and entry point) sits at `text_addr`.
    pub fn new(text_addr: u32) -> Self {
        Self {
            text_addr,
            text: Vec::new(),
            data_addr: 0,
            data: Vec::new(),
            symbols: Vec::new(),
        }
    }

    /// Sets the program text.
    pub fn text(mut self, instructions: &[u32]) -> Self {
        self.text = instructions.iter().flat_map(|w| w.to_le_bytes()).collect();
        self
    }

    /// Adds a `.data` section.
    pub fn data(mut self, addr: u32, bytes: &[u8]) -> Self {
        self.data_addr = addr;
        self.data = bytes.to_vec();
        self
    }

    /// Adds an absolute symbol.
    pub fn symbol(mut self, name: &str, value: u32) -> Self {
        self.symbols.push((name.to_string(), value));
        self
    }

    /// Serialises the image.
    pub fn build(&self) -> Vec<u8> {
        const EHSIZE: usize = 52;
        const SHENTSIZE: usize = 40;
        const SYMSIZE: usize = 16;

        let align4 = |n: usize| (n + 3) & !3;

        // String and symbol tables; _start is always symbol 1.
        let mut strtab = vec![0u8];
        let mut all_symbols = vec![("_start".to_string(), self.text_addr)];
        all_symbols.extend(self.symbols.iter().cloned());

        let mut sym_entries = vec![0u8; SYMSIZE];
        for (name, value) in &all_symbols {
            let name_off = strtab.len() as u32;
            strtab.extend_from_slice(name.as_bytes());
            strtab.push(0);

            sym_entries.extend_from_slice(&name_off.to_le_bytes());
            sym_entries.extend_from_slice(&value.to_le_bytes());
            sym_entries.extend_from_slice(&0u32.to_le_bytes());
            sym_entries.push(0x10); // STB_GLOBAL, STT_NOTYPE
            sym_entries.push(0);
            sym_entries.extend_from_slice(&0xFFF1u16.to_le_bytes()); // SHN_ABS
        }

        let shstrtab: &[u8] = b"\0.text\0.data\0.symtab\0.strtab\0.shstrtab\0";

        let text_off = EHSIZE;
        let data_off = text_off + self.text.len();
        let symtab_off = align4(data_off + self.data.len());
        let strtab_off = symtab_off + sym_entries.len();
        let shstrtab_off = strtab_off + strtab.len();
        let shoff = align4(shstrtab_off + shstrtab.len());

        let mut image = Vec::new();

        // ELF header.
        image.extend_from_slice(&[0x7F, b'E', b'L', b'F', 1, 1, 1]);
        image.extend_from_slice(&[0; 9]);
        image.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
        image.extend_from_slice(&243u16.to_le_bytes()); // EM_RISCV
        image.extend_from_slice(&1u32.to_le_bytes());
        image.extend_from_slice(&self.text_addr.to_le_bytes()); // e_entry
        image.extend_from_slice(&0u32.to_le_bytes()); // e_phoff
        image.extend_from_slice(&(shoff as u32).to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes()); // e_flags
        image.extend_from_slice(&(EHSIZE as u16).to_le_bytes());
        image.extend_from_slice(&32u16.to_le_bytes()); // e_phentsize
        image.extend_from_slice(&0u16.to_le_bytes()); // e_phnum
        image.extend_from_slice(&(SHENTSIZE as u16).to_le_bytes());
        image.extend_from_slice(&6u16.to_le_bytes()); // e_shnum
        image.extend_from_slice(&5u16.to_le_bytes()); // e_shstrndx

        image.extend_from_slice(&self.text);
        image.extend_from_slice(&self.data);
        image.resize(symtab_off, 0);
        image.extend_from_slice(&sym_entries);
        image.extend_from_slice(&strtab);
        image.extend_from_slice(shstrtab);
        image.resize(shoff, 0);

        // (name, type, flags, addr, offset, size, link, info, align, entsize)
        let headers: [(u32, u32, u32, u32, u32, u32, u32, u32, u32, u32); 6] = [
            (0, 0, 0, 0, 0, 0, 0, 0, 0, 0),
            (
                1,
                1, // SHT_PROGBITS
                0x6,
                self.text_addr,
                text_off as u32,
                self.text.len() as u32,
                0,
                0,
                4,
                0,
            ),
            (
                7,
                1,
                0x3,
                self.data_addr,
                data_off as u32,
                self.data.len() as u32,
                0,
                0,
                4,
                0,
            ),
            (
                13,
                2, // SHT_SYMTAB
                0,
                0,
                symtab_off as u32,
                sym_entries.len() as u32,
                4, // link: .strtab
                1,
                4,
                SYMSIZE as u32,
            ),
            (
                21,
                3, // SHT_STRTAB
                0,
                0,
                strtab_off as u32,
                strtab.len() as u32,
                0,
                0,
                1,
                0,
            ),
            (
                29,
                3,
                0,
                0,
                shstrtab_off as u32,
                shstrtab.len() as u32,
                0,
                0,
                1,
                0,
            ),
        ];
        for h in headers {
            for field in [h.0, h.1, h.2, h.3, h.4, h.5, h.6, h.7, h.8, h.9] {
                image.extend_from_slice(&field.to_le_bytes());
            }
        }

        image
    }

    /// Serialises the image into a file on disk.
    pub fn write_to(&self, path: &std::path::Path) {
        std::fs::write(path, self.build()).expect("write test ELF");
    }
}
