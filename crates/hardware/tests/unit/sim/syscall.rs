//! Host syscall emulation tests.
//!
//! Drives `SyscallHost::handle_ecall` directly against a core, with real
//! host files in a temporary directory.

use std::fs::{self, File};
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use rv32_core::config::Config;
use rv32_core::core::pipeline::{EcallArgs, EcallHandler};
use rv32_core::core::Core;
use rv32_core::sim::syscall::numbers::*;
use rv32_core::sim::syscall::open_flags::*;
use rv32_core::sim::syscall::SyscallHost;

fn core() -> Core {
    let mut config = Config::default();
    config.memory.icache = false;
    config.memory.dcache = false;
    Core::new(&config)
}

fn args(id: i32, a0: i32, a1: i32, a2: i32) -> EcallArgs {
    EcallArgs {
        id,
        a0,
        a1,
        a2,
        a3: 0,
    }
}

/// Copies a NUL-terminated string into guest memory.
fn store_guest_string(core: &mut Core, addr: u32, s: &str) {
    for (i, byte) in s.as_bytes().iter().enumerate() {
        core.mem_store_byte(addr + i as u32, *byte);
    }
    core.mem_store_byte(addr + s.len() as u32, 0);
}

// ══════════════════════════════════════════════════════════
// 1. read / write
// ══════════════════════════════════════════════════════════

/// `write` to fd 1 moves guest bytes into the configured output file.
#[test]
fn write_fd1_goes_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("out.txt");

    let mut core = core();
    let mut host = SyscallHost::new(None, Some(File::create(&out_path).unwrap()), 0);

    for (i, b) in b"payload".iter().enumerate() {
        core.mem_store_byte(0x2000 + i as u32, *b);
    }
    let written = host.handle_ecall(&mut core, args(SYS_WRITE, 1, 0x2000, 7));
    host.flush().unwrap();

    assert_eq!(written, 7);
    assert_eq!(fs::read(&out_path).unwrap(), b"payload");
}

/// `read` from fd 0 moves file bytes into guest memory.
#[test]
fn read_fd0_comes_from_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let in_path = dir.path().join("in.txt");
    fs::write(&in_path, b"abc").unwrap();

    let mut core = core();
    let mut host = SyscallHost::new(Some(File::open(&in_path).unwrap()), None, 0);

    let count = host.handle_ecall(&mut core, args(SYS_READ, 0, 0x3000, 16));
    assert_eq!(count, 3);
    assert_eq!(core.mem_load_byte(0x3000), b'a');
    assert_eq!(core.mem_load_byte(0x3001), b'b');
    assert_eq!(core.mem_load_byte(0x3002), b'c');
}

/// `write` to an unknown descriptor fails with -1.
#[test]
fn write_to_unknown_fd_fails() {
    let mut core = core();
    let mut host = SyscallHost::new(None, None, 0);
    assert_eq!(host.handle_ecall(&mut core, args(SYS_WRITE, 9, 0x2000, 1)), -1);
}

// ══════════════════════════════════════════════════════════
// 2. open / lseek / close / unlink
// ══════════════════════════════════════════════════════════

/// A guest file round trip: create, write, reopen, seek, read, unlink.
#[test]
fn guest_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("guest.dat");
    let path_str = file_path.to_str().unwrap();

    let mut core = core();
    let mut host = SyscallHost::new(None, None, 0);
    store_guest_string(&mut core, 0x1000, path_str);

    // open(path, WRONLY|CREAT|TRUNC, 0644)
    let flags = SYS_O_WRONLY | SYS_O_CREAT | SYS_O_TRUNC;
    let fd = host.handle_ecall(&mut core, args(SYS_OPEN, 0x1000, flags, 0o644));
    assert_eq!(fd, 3, "first guest descriptor");

    for (i, b) in b"0123456789".iter().enumerate() {
        core.mem_store_byte(0x2000 + i as u32, *b);
    }
    assert_eq!(
        host.handle_ecall(&mut core, args(SYS_WRITE, fd, 0x2000, 10)),
        10
    );
    assert_eq!(host.handle_ecall(&mut core, args(SYS_CLOSE, fd, 0, 0)), 0);

    // Reopen read-only; descriptors keep counting up.
    let fd = host.handle_ecall(&mut core, args(SYS_OPEN, 0x1000, 0, 0));
    assert_eq!(fd, 4);

    // Seek to the tail and read it back.
    assert_eq!(host.handle_ecall(&mut core, args(SYS_LSEEK, fd, 6, 0)), 6);
    assert_eq!(
        host.handle_ecall(&mut core, args(SYS_READ, fd, 0x3000, 16)),
        4
    );
    assert_eq!(core.mem_load_byte(0x3000), b'6');
    assert_eq!(core.mem_load_byte(0x3003), b'9');
    assert_eq!(host.handle_ecall(&mut core, args(SYS_CLOSE, fd, 0, 0)), 0);

    // unlink removes the host file.
    assert_eq!(host.handle_ecall(&mut core, args(SYS_UNLINK, 0x1000, 0, 0)), 0);
    assert!(fs::metadata(&file_path).is_err());
}

/// Opening a missing file without CREAT fails with -1, not an abort.
#[test]
fn open_missing_file_fails_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing");

    let mut core = core();
    let mut host = SyscallHost::new(None, None, 0);
    store_guest_string(&mut core, 0x1000, path.to_str().unwrap());

    assert_eq!(host.handle_ecall(&mut core, args(SYS_OPEN, 0x1000, 0, 0)), -1);
    assert!(!core.exit_flag);
}

/// Closing the standard descriptors is a no-op.
#[test]
fn close_standard_fds_is_noop() {
    let mut core = core();
    let mut host = SyscallHost::new(None, None, 0);
    for fd in 0..=2 {
        assert_eq!(host.handle_ecall(&mut core, args(SYS_CLOSE, fd, 0, 0)), 0);
    }
}

// ══════════════════════════════════════════════════════════
// 3. stat / fstat
// ══════════════════════════════════════════════════════════

/// `stat` marshals the host size into offset 48 of the guest record.
#[test]
fn stat_marshals_size_and_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eleven");
    let mut f = File::create(&path).unwrap();
    f.write_all(b"hello world").unwrap();
    drop(f);

    let mut core = core();
    let mut host = SyscallHost::new(None, None, 0);
    store_guest_string(&mut core, 0x1000, path.to_str().unwrap());

    let result = host.handle_ecall(&mut core, args(SYS_STAT, 0x1000, 0x4000, 0));
    assert_eq!(result, 0);
    assert_eq!(core.mem_load_word(0x4000 + 48), 11, "st_size low word");
    assert_eq!(core.mem_load_word(0x4000 + 52), 0, "st_size high word");
    assert_ne!(core.mem_load_word(0x4000 + 16), 0, "st_mode");
}

/// `fstat` on fd 1 reports success with a zeroed record.
#[test]
fn fstat_fd1_zeroed_success() {
    let mut core = core();
    let mut host = SyscallHost::new(None, None, 0);

    // Pre-dirty the record to prove it is overwritten.
    core.mem_store_word(0x4000 + 16, 0xFFFF_FFFF);
    let result = host.handle_ecall(&mut core, args(SYS_FSTAT, 1, 0x4000, 0));
    assert_eq!(result, 0);
    assert_eq!(core.mem_load_word(0x4000 + 16), 0);
}

// ══════════════════════════════════════════════════════════
// 4. brk / gettimeofday / custom / termination
// ══════════════════════════════════════════════════════════

/// `brk(0)` reports the current heap; nonzero moves it.
#[test]
fn brk_queries_and_moves_heap() {
    let mut core = core();
    let mut host = SyscallHost::new(None, None, 0x2010);

    assert_eq!(host.handle_ecall(&mut core, args(SYS_BRK, 0, 0, 0)), 0x2010);
    assert_eq!(
        host.handle_ecall(&mut core, args(SYS_BRK, 0x5000, 0, 0)),
        0x5000
    );
    assert_eq!(host.handle_ecall(&mut core, args(SYS_BRK, 0, 0, 0)), 0x5000);
}

/// `gettimeofday` stores seconds and microseconds at the guest pointer.
#[test]
fn gettimeofday_stores_host_clock() {
    let mut core = core();
    let mut host = SyscallHost::new(None, None, 0);

    let before = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as u32;
    let result = host.handle_ecall(&mut core, args(SYS_GETTIMEOFDAY, 0x6000, 0, 0));
    let after = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as u32;

    assert_eq!(result, 0);
    let sec = core.mem_load_word(0x6000);
    let usec = core.mem_load_word(0x6004);
    assert!(sec >= before && sec <= after);
    assert!(usec < 1_000_000);
}

/// The custom threading shims answer without host involvement.
#[test]
fn custom_thread_shims() {
    let mut core = core();
    let mut host = SyscallHost::new(None, None, 0);
    assert_eq!(host.handle_ecall(&mut core, args(SYS_THREADSTART, 0, 0, 0)), 0);
    assert_eq!(host.handle_ecall(&mut core, args(SYS_NBCORE, 0, 0, 0)), 1);
    assert!(!core.exit_flag);
}

/// `exit` raises the exit flag without marking the run fatal.
#[test]
fn exit_is_clean() {
    let mut core = core();
    let mut host = SyscallHost::new(None, None, 0);
    host.handle_ecall(&mut core, args(SYS_EXIT, 0, 0, 0));
    assert!(core.exit_flag);
    assert!(core.fatal.is_none());
}

/// Unknown ids and recognised-but-unimplemented ids are fatal.
#[test]
fn unknown_and_unimplemented_are_fatal() {
    let mut core1 = core();
    let mut host = SyscallHost::new(None, None, 0);
    host.handle_ecall(&mut core1, args(555, 1, 2, 3));
    assert!(core1.exit_flag);
    assert!(core1.fatal.is_some());

    let mut core2 = core();
    host.handle_ecall(&mut core2, args(SYS_MMAP, 0, 0, 0));
    assert!(core2.exit_flag);
    assert!(core2.fatal.is_some());
}
