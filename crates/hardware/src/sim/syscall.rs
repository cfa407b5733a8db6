//! Host-side syscall emulation.
//!
//! Implements the Linux-like ABI hosted programs expect: argument registers
//! are read at the Memory stage, the call runs against host files here, and
//! the result lands in x10. Guest buffers are moved byte by byte through the
//! data port, so syscall traffic stays coherent with the D-cache.
//!
//! Host errors are returned to the guest as -1; errno is not translated.
//! Unimplemented and unknown syscall ids abort the simulation.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::unix::fs::{MetadataExt, OpenOptionsExt};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::pipeline::{EcallArgs, EcallHandler};
use crate::core::Core;

/// RISC-V newlib syscall numbers.
pub mod numbers {
    pub const SYS_GETCWD: i32 = 17;
    pub const SYS_DUP: i32 = 23;
    pub const SYS_FCNTL: i32 = 25;
    pub const SYS_CHDIR: i32 = 49;
    pub const SYS_OPENAT: i32 = 56;
    pub const SYS_CLOSE: i32 = 57;
    pub const SYS_GETDENTS: i32 = 61;
    pub const SYS_LSEEK: i32 = 62;
    pub const SYS_READ: i32 = 63;
    pub const SYS_WRITE: i32 = 64;
    pub const SYS_WRITEV: i32 = 66;
    pub const SYS_PREAD: i32 = 67;
    pub const SYS_PWRITE: i32 = 68;
    pub const SYS_FSTATAT: i32 = 79;
    pub const SYS_FSTAT: i32 = 80;
    pub const SYS_EXIT: i32 = 93;
    pub const SYS_EXIT_GROUP: i32 = 94;
    pub const SYS_KILL: i32 = 129;
    pub const SYS_RT_SIGACTION: i32 = 134;
    pub const SYS_TIMES: i32 = 153;
    pub const SYS_UNAME: i32 = 160;
    pub const SYS_GETTIMEOFDAY: i32 = 169;
    pub const SYS_GETPID: i32 = 172;
    pub const SYS_GETUID: i32 = 174;
    pub const SYS_GETEUID: i32 = 175;
    pub const SYS_GETGID: i32 = 176;
    pub const SYS_GETEGID: i32 = 177;
    pub const SYS_BRK: i32 = 214;
    pub const SYS_MUNMAP: i32 = 215;
    pub const SYS_MREMAP: i32 = 216;
    pub const SYS_MMAP: i32 = 222;
    pub const SYS_OPEN: i32 = 1024;
    pub const SYS_LINK: i32 = 1025;
    pub const SYS_UNLINK: i32 = 1026;
    pub const SYS_MKDIR: i32 = 1030;
    pub const SYS_ACCESS: i32 = 1033;
    pub const SYS_FACCESSAT: i32 = 48;
    pub const SYS_STAT: i32 = 1038;
    pub const SYS_LSTAT: i32 = 1039;
    pub const SYS_TIME: i32 = 1062;
    pub const SYS_GETMAINVARS: i32 = 2011;

    /// Custom ids used by the threading shim of hosted programs.
    pub const SYS_THREADSTART: i32 = 2000;
    pub const SYS_NBCORE: i32 = 2001;
}

/// RISC-V newlib `open` flag bits.
pub mod open_flags {
    pub const SYS_O_WRONLY: i32 = 0x0001;
    pub const SYS_O_RDWR: i32 = 0x0002;
    pub const SYS_O_APPEND: i32 = 0x0008;
    pub const SYS_O_CREAT: i32 = 0x0200;
    pub const SYS_O_TRUNC: i32 = 0x0400;
    pub const SYS_O_EXCL: i32 = 0x0800;
    pub const SYS_O_SYNC: i32 = 0x2000;
    pub const SYS_O_NONBLOCK: i32 = 0x4000;
    pub const SYS_O_NOCTTY: i32 = 0x8000;
}

use self::numbers::*;
use self::open_flags::*;

/// First descriptor handed out for guest-opened files.
const FIRST_GUEST_FD: i32 = 3;

/// Host-side state of the syscall layer.
#[derive(Debug)]
pub struct SyscallHost {
    /// Redirect for guest fd 0, `None` meaning host stdin.
    input: Option<File>,
    /// Redirect for guest fd 1, `None` meaning host stdout.
    output: Option<File>,
    /// Files the guest opened itself.
    files: HashMap<i32, File>,
    /// Next descriptor to hand out.
    next_fd: i32,
    /// Current `brk` value.
    heap_address: u32,
}

impl SyscallHost {
    /// Creates the syscall layer.
    ///
    /// # Arguments
    ///
    /// * `input` - File backing guest fd 0, or `None` for host stdin.
    /// * `output` - File backing guest fd 1, or `None` for host stdout.
    /// * `heap_address` - Initial heap top recorded by the ELF loader.
    pub fn new(input: Option<File>, output: Option<File>, heap_address: u32) -> Self {
        Self {
            input,
            output,
            files: HashMap::new(),
            next_fd: FIRST_GUEST_FD,
            heap_address,
        }
    }

    /// Flushes the redirected output file, if any.
    pub fn flush(&mut self) -> io::Result<()> {
        if let Some(f) = &mut self.output {
            f.flush()?;
        }
        io::stdout().flush()
    }

    /// Reads the NUL-terminated string at `addr` out of guest memory.
    fn read_guest_string(&self, core: &mut Core, addr: u32) -> String {
        let mut bytes = Vec::new();
        let mut offset = 0;
        loop {
            let byte = core.mem_load_byte(addr.wrapping_add(offset));
            if byte == 0 {
                break;
            }
            bytes.push(byte);
            offset += 1;
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn do_read(&mut self, core: &mut Core, fd: i32, buf: u32, size: i32) -> i32 {
        let mut local = vec![0u8; size.max(0) as usize];
        let count = if fd == 0 {
            match &mut self.input {
                Some(f) => f.read(&mut local),
                None => io::stdin().read(&mut local),
            }
        } else if let Some(f) = self.files.get_mut(&fd) {
            f.read(&mut local)
        } else {
            return -1;
        };

        match count {
            Ok(n) => {
                for (i, byte) in local[..n].iter().enumerate() {
                    core.mem_store_byte(buf.wrapping_add(i as u32), *byte);
                }
                n as i32
            }
            Err(_) => -1,
        }
    }

    fn do_write(&mut self, core: &mut Core, fd: i32, buf: u32, size: i32) -> i32 {
        let mut local = Vec::with_capacity(size.max(0) as usize);
        for i in 0..size.max(0) as u32 {
            local.push(core.mem_load_byte(buf.wrapping_add(i)));
        }

        let result = if fd == 1 {
            match &mut self.output {
                Some(f) => f.write_all(&local),
                None => {
                    let mut out = io::stdout().lock();
                    out.write_all(&local).and_then(|_| out.flush())
                }
            }
        } else if fd == 2 {
            let mut err = io::stderr().lock();
            err.write_all(&local).and_then(|_| err.flush())
        } else if let Some(f) = self.files.get_mut(&fd) {
            f.write_all(&local)
        } else {
            return -1;
        };

        match result {
            Ok(()) => local.len() as i32,
            Err(_) => -1,
        }
    }

    fn do_open(&mut self, core: &mut Core, path_addr: u32, flags: i32, mode: i32) -> i32 {
        let path = self.read_guest_string(core, path_addr);

        let mut opts = OpenOptions::new();
        match flags & 3 {
            SYS_O_WRONLY => opts.write(true),
            SYS_O_RDWR => opts.read(true).write(true),
            _ => opts.read(true),
        };
        if flags & SYS_O_APPEND != 0 {
            opts.append(true);
        }
        if flags & SYS_O_CREAT != 0 {
            if flags & SYS_O_EXCL != 0 {
                opts.create_new(true);
            } else {
                opts.create(true);
            }
        }
        if flags & SYS_O_TRUNC != 0 {
            opts.truncate(true);
        }

        let mut host_flags = 0;
        if flags & SYS_O_SYNC != 0 {
            host_flags |= libc::O_SYNC;
        }
        if flags & SYS_O_NONBLOCK != 0 {
            host_flags |= libc::O_NONBLOCK;
        }
        if flags & SYS_O_NOCTTY != 0 {
            host_flags |= libc::O_NOCTTY;
        }
        if host_flags != 0 {
            opts.custom_flags(host_flags);
        }
        opts.mode(mode as u32);

        match opts.open(&path) {
            Ok(file) => {
                let fd = self.next_fd;
                self.next_fd += 1;
                self.files.insert(fd, file);
                fd
            }
            Err(_) => -1,
        }
    }

    fn do_close(&mut self, fd: i32) -> i32 {
        // Never close the simulator's stdin, stdout, or stderr.
        if fd <= 2 {
            return 0;
        }
        match self.files.remove(&fd) {
            Some(_) => 0,
            None => -1,
        }
    }

    fn do_lseek(&mut self, fd: i32, offset: i32, whence: i32) -> i32 {
        let Some(f) = self.files.get_mut(&fd) else {
            return -1;
        };
        let pos = match whence {
            0 => SeekFrom::Start(offset as u64),
            1 => SeekFrom::Current(offset as i64),
            2 => SeekFrom::End(offset as i64),
            _ => return -1,
        };
        match f.seek(pos) {
            Ok(p) => p as i32,
            Err(_) => -1,
        }
    }

    fn do_stat(&mut self, core: &mut Core, path_addr: u32, stat_addr: u32) -> i32 {
        let path = self.read_guest_string(core, path_addr);
        match std::fs::metadata(&path) {
            Ok(meta) => {
                write_stat(core, stat_addr, Some(&meta));
                0
            }
            Err(_) => {
                write_stat(core, stat_addr, None);
                -1
            }
        }
    }

    fn do_fstat(&mut self, core: &mut Core, fd: i32, stat_addr: u32) -> i32 {
        if let Some(f) = self.files.get(&fd) {
            match f.metadata() {
                Ok(meta) => {
                    write_stat(core, stat_addr, Some(&meta));
                    return 0;
                }
                Err(_) => {
                    write_stat(core, stat_addr, None);
                    return -1;
                }
            }
        }
        // The standard descriptors report a zeroed record.
        write_stat(core, stat_addr, None);
        0
    }

    fn do_brk(&mut self, value: u32) -> i32 {
        if value == 0 {
            self.heap_address as i32
        } else {
            self.heap_address = value;
            value as i32
        }
    }

    fn do_gettimeofday(&mut self, core: &mut Core, tv_addr: u32) -> i32 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(now) => {
                core.mem_store_word(tv_addr, now.as_secs() as u32);
                core.mem_store_word(tv_addr.wrapping_add(4), now.subsec_micros());
                0
            }
            Err(_) => -1,
        }
    }

    fn do_unlink(&mut self, core: &mut Core, path_addr: u32) -> i32 {
        let path = self.read_guest_string(core, path_addr);
        match std::fs::remove_file(&path) {
            Ok(()) => 0,
            Err(_) => -1,
        }
    }

    /// Logs a recognised-but-unimplemented syscall and aborts.
    fn unimplemented(&mut self, core: &mut Core, name: &str) -> i32 {
        eprintln!("Syscall : {}", name);
        core.abort(format!("unimplemented system call {}", name));
        0
    }
}

impl EcallHandler for SyscallHost {
    /// Dispatches one intercepted `ECALL`.
    fn handle_ecall(&mut self, core: &mut Core, args: EcallArgs) -> i32 {
        match args.id {
            SYS_EXIT => {
                core.exit_flag = true;
                0
            }
            SYS_EXIT_GROUP => {
                eprintln!("Syscall : SYS_exit_group");
                core.exit_flag = true;
                0
            }
            SYS_READ => self.do_read(core, args.a0, args.a1 as u32, args.a2),
            SYS_WRITE => self.do_write(core, args.a0, args.a1 as u32, args.a2),
            SYS_BRK => self.do_brk(args.a0 as u32),
            SYS_OPEN => self.do_open(core, args.a0 as u32, args.a1, args.a2),
            SYS_OPENAT => {
                eprintln!("Syscall : SYS_openat not implemented yet...");
                core.abort("unimplemented system call SYS_openat".to_string());
                0
            }
            SYS_LSEEK => self.do_lseek(args.a0, args.a1, args.a2),
            SYS_CLOSE => self.do_close(args.a0),
            SYS_FSTAT => self.do_fstat(core, args.a0, args.a1 as u32),
            SYS_STAT => self.do_stat(core, args.a0 as u32, args.a1 as u32),
            SYS_GETTIMEOFDAY => self.do_gettimeofday(core, args.a0 as u32),
            SYS_UNLINK => self.do_unlink(core, args.a0 as u32),

            SYS_THREADSTART => 0,
            SYS_NBCORE => 1,

            SYS_GETPID => self.unimplemented(core, "SYS_getpid"),
            SYS_KILL => self.unimplemented(core, "SYS_kill"),
            SYS_LINK => self.unimplemented(core, "SYS_link"),
            SYS_MKDIR => self.unimplemented(core, "SYS_mkdir"),
            SYS_CHDIR => self.unimplemented(core, "SYS_chdir"),
            SYS_GETCWD => self.unimplemented(core, "SYS_getcwd"),
            SYS_LSTAT => self.unimplemented(core, "SYS_lstat"),
            SYS_FSTATAT => self.unimplemented(core, "SYS_fstatat"),
            SYS_ACCESS => self.unimplemented(core, "SYS_access"),
            SYS_FACCESSAT => self.unimplemented(core, "SYS_faccessat"),
            SYS_PREAD => self.unimplemented(core, "SYS_pread"),
            SYS_PWRITE => self.unimplemented(core, "SYS_pwrite"),
            SYS_UNAME => self.unimplemented(core, "SYS_uname"),
            SYS_GETUID => self.unimplemented(core, "SYS_getuid"),
            SYS_GETEUID => self.unimplemented(core, "SYS_geteuid"),
            SYS_GETGID => self.unimplemented(core, "SYS_getgid"),
            SYS_GETEGID => self.unimplemented(core, "SYS_getegid"),
            SYS_MMAP => self.unimplemented(core, "SYS_mmap"),
            SYS_MUNMAP => self.unimplemented(core, "SYS_munmap"),
            SYS_MREMAP => self.unimplemented(core, "SYS_mremap"),
            SYS_TIME => self.unimplemented(core, "SYS_time"),
            SYS_GETMAINVARS => self.unimplemented(core, "SYS_getmainvars"),
            SYS_RT_SIGACTION => self.unimplemented(core, "SYS_rt_sigaction"),
            SYS_WRITEV => self.unimplemented(core, "SYS_writev"),
            SYS_TIMES => self.unimplemented(core, "SYS_times"),
            SYS_FCNTL => self.unimplemented(core, "SYS_fcntl"),
            SYS_GETDENTS => self.unimplemented(core, "SYS_getdents"),
            SYS_DUP => self.unimplemented(core, "SYS_dup"),

            id => {
                eprintln!(
                    "Syscall : Unknown system call, {} ({:#x}) with arguments :",
                    id, id
                );
                eprintln!(
                    "{} ({:#x})\n{} ({:#x})\n{} ({:#x})\n{} ({:#x})",
                    args.a0, args.a0, args.a1, args.a1, args.a2, args.a2, args.a3, args.a3
                );
                core.abort(format!("unknown system call {}", id));
                0
            }
        }
    }
}

/// Marshals host file metadata into the guest's 104-byte stat record.
///
/// Layout (byte offsets): dev 0, ino 8, mode 16, nlink 20, uid 24, gid 28,
/// rdev 32, pad 40, size 48, blksize 56, pad 60, blocks 64, atim 72,
/// mtim 80, ctim 88, pad 96.
fn write_stat(core: &mut Core, addr: u32, meta: Option<&std::fs::Metadata>) {
    let (dev, ino, mode, nlink, uid, gid, rdev, size, blksize, blocks) = match meta {
        Some(m) => (
            m.dev(),
            m.ino(),
            m.mode(),
            m.nlink() as u32,
            m.uid(),
            m.gid(),
            m.rdev(),
            m.size(),
            m.blksize() as u32,
            m.blocks(),
        ),
        None => (0, 0, 0, 0, 0, 0, 0, 0, 0, 0),
    };

    core.mem_store_dword(addr, dev);
    core.mem_store_dword(addr.wrapping_add(8), ino);
    core.mem_store_word(addr.wrapping_add(16), mode);
    core.mem_store_word(addr.wrapping_add(20), nlink);
    core.mem_store_word(addr.wrapping_add(24), uid);
    core.mem_store_word(addr.wrapping_add(28), gid);
    core.mem_store_dword(addr.wrapping_add(32), rdev);
    core.mem_store_dword(addr.wrapping_add(40), 0);
    core.mem_store_dword(addr.wrapping_add(48), size);
    core.mem_store_word(addr.wrapping_add(56), blksize);
    core.mem_store_word(addr.wrapping_add(60), 0);
    core.mem_store_dword(addr.wrapping_add(64), blocks);

    let times = match meta {
        Some(m) => [
            (m.atime() as u32, m.atime_nsec() as u32),
            (m.mtime() as u32, m.mtime_nsec() as u32),
            (m.ctime() as u32, m.ctime_nsec() as u32),
        ],
        None => [(0, 0); 3],
    };
    for (i, (sec, nsec)) in times.iter().enumerate() {
        let base = addr.wrapping_add(72 + 8 * i as u32);
        core.mem_store_word(base, *sec);
        core.mem_store_word(base.wrapping_add(4), *nsec);
    }
    core.mem_store_dword(addr.wrapping_add(96), 0);
}
