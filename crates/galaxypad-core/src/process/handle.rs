#![cfg_attr(
    not(any(target_os = "windows", target_os = "linux")),
    allow(dead_code, unused_variables, unused_imports)
)]

use crate::error::{Error, Result};

use crate::process::layout::emu;

#[cfg(target_os = "windows")]
use tracing::warn;

#[cfg(target_os = "windows")]
use std::ffi::{OsString, c_void};
#[cfg(target_os = "windows")]
use std::os::windows::ffi::OsStringExt;
#[cfg(target_os = "windows")]
use windows::Win32::Foundation::{CloseHandle, HANDLE};
#[cfg(target_os = "windows")]
use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
#[cfg(target_os = "windows")]
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW, TH32CS_SNAPPROCESS,
};
#[cfg(target_os = "windows")]
use windows::Win32::System::Memory::{MEM_MAPPED, MEMORY_BASIC_INFORMATION, VirtualQueryEx};
#[cfg(target_os = "windows")]
use windows::Win32::System::ProcessStatus::{
    PSAPI_WORKING_SET_EX_BLOCK, PSAPI_WORKING_SET_EX_INFORMATION, QueryWorkingSetEx,
};
#[cfg(target_os = "windows")]
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};

#[cfg(target_os = "windows")]
const PROCESS_NAMES: &[&str] = &[
    "Dolphin.exe",
    "DolphinQt2.exe",
    "DolphinWx.exe",
    "Slippi Dolphin.exe",
];

#[cfg(target_os = "linux")]
const PROCESS_NAMES: &[&str] = &["dolphin-emu", "dolphin-emu-qt2", "dolphin-emu-nogui"];

/// Host addresses of the emulated RAM regions inside the Dolphin process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmulatedRam {
    pub mem1: u64,
    pub mem2: Option<u64>,
}

#[cfg(target_os = "windows")]
pub struct DolphinProcess {
    handle: HANDLE,
    pub pid: u32,
    pub ram: EmulatedRam,
}

#[cfg(target_os = "linux")]
pub struct DolphinProcess {
    mem: std::fs::File,
    pub pid: u32,
    pub ram: EmulatedRam,
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub struct DolphinProcess {
    pub pid: u32,
    pub ram: EmulatedRam,
}

#[cfg(target_os = "windows")]
impl DolphinProcess {
    pub fn find_and_open() -> Result<Self> {
        let pid = find_process_id(PROCESS_NAMES)?;
        tracing::debug!("Found Dolphin with PID {}", pid);
        Self::open(pid)
    }

    pub fn open(pid: u32) -> Result<Self> {
        // SAFETY: OpenProcess is called with valid access flags and a PID from a
        // ToolHelp snapshot. The handle is owned by this struct and closed in Drop.
        let handle = unsafe {
            OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, false, pid)
                .map_err(|e| Error::ProcessOpenFailed(e.to_string()))?
        };

        let Some(ram) = find_emulated_ram(handle) else {
            // SAFETY: handle was just returned by OpenProcess and is not used afterwards
            let _ = unsafe { CloseHandle(handle) };
            return Err(Error::ProcessOpenFailed(
                "Emulated RAM not mapped yet (no game running?)".to_string(),
            ));
        };

        tracing::debug!("MEM1 at {:#x}, MEM2 at {:?}", ram.mem1, ram.mem2);
        Ok(Self { handle, pid, ram })
    }

    /// Check if the process is still running
    pub fn is_alive(&self) -> bool {
        const STILL_ACTIVE: u32 = 259;

        let mut exit_code: u32 = 0;
        // SAFETY: self.handle is a valid process handle and exit_code outlives the call.
        unsafe {
            GetExitCodeProcess(self.handle, &mut exit_code).is_ok() && exit_code == STILL_ACTIVE
        }
    }

    /// Read raw bytes at a host address inside the Dolphin process
    pub fn read_host(&self, host_address: u64, buffer: &mut [u8]) -> std::result::Result<(), String> {
        let mut bytes_read = 0usize;

        // SAFETY: the handle was opened with PROCESS_VM_READ, the buffer is a valid
        // mutable slice of the requested size and bytes_read outlives the call.
        unsafe {
            ReadProcessMemory(
                self.handle,
                host_address as *const c_void,
                buffer.as_mut_ptr() as *mut c_void,
                buffer.len(),
                Some(&mut bytes_read),
            )
            .map_err(|e| e.to_string())?;
        }

        if bytes_read != buffer.len() {
            return Err(format!("Expected {} bytes, read {}", buffer.len(), bytes_read));
        }
        Ok(())
    }
}

#[cfg(target_os = "windows")]
impl Drop for DolphinProcess {
    fn drop(&mut self) {
        if !self.handle.is_invalid() {
            // SAFETY: self.handle came from OpenProcess and has not been closed yet.
            if let Err(e) = unsafe { CloseHandle(self.handle) } {
                warn!("Failed to close process handle: {}", e);
            }
        }
    }
}

#[cfg(target_os = "windows")]
fn find_process_id(names: &[&str]) -> Result<u32> {
    // SAFETY: CreateToolhelp32Snapshot with TH32CS_SNAPPROCESS is safe to call.
    // The returned handle is closed at the end of this function.
    let snapshot = unsafe {
        CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)
            .map_err(|e| Error::ProcessNotFound(e.to_string()))?
    };

    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut found = None;

    // SAFETY: snapshot is a valid handle and entry is properly initialized.
    unsafe {
        if Process32FirstW(snapshot, &mut entry).is_ok() {
            loop {
                let len = entry
                    .szExeFile
                    .iter()
                    .position(|&c| c == 0)
                    .unwrap_or(entry.szExeFile.len());
                let exe_name = OsString::from_wide(&entry.szExeFile[..len]);
                let exe_name = exe_name.to_string_lossy();

                if names.iter().any(|n| exe_name.eq_ignore_ascii_case(n)) {
                    found = Some(entry.th32ProcessID);
                    break;
                }

                if Process32NextW(snapshot, &mut entry).is_err() {
                    break;
                }
            }
        }
    }

    // SAFETY: snapshot is a valid handle from CreateToolhelp32Snapshot
    let _ = unsafe { CloseHandle(snapshot) };

    found.ok_or_else(|| Error::ProcessNotFound("Dolphin is not running".to_string()))
}

/// Locate Dolphin's fastmem views of MEM1 and MEM2.
///
/// Dolphin maps the console RAM as file-backed views: MEM1 is a 32 MiB mapped
/// region, MEM2 the next 64 MiB mapped region. Only resident views count,
/// which filters out reserved placeholders.
#[cfg(target_os = "windows")]
fn find_emulated_ram(handle: HANDLE) -> Option<EmulatedRam> {
    let mut info = MEMORY_BASIC_INFORMATION::default();
    let info_size = std::mem::size_of::<MEMORY_BASIC_INFORMATION>();
    let mut address: usize = 0;
    let mut mem1 = None;
    let mut mem2 = None;

    // SAFETY: VirtualQueryEx only writes into `info`, which is sized correctly.
    while unsafe { VirtualQueryEx(handle, Some(address as *const c_void), &mut info, info_size) }
        == info_size
    {
        if info.Type == MEM_MAPPED && is_resident(handle, info.BaseAddress) {
            if mem1.is_none() && info.RegionSize == emu::MEM1_SIZE {
                mem1 = Some(info.BaseAddress as u64);
            } else if mem1.is_some() && info.RegionSize == emu::MEM2_SIZE {
                mem2 = Some(info.BaseAddress as u64);
                break;
            }
        }

        match (info.BaseAddress as usize).checked_add(info.RegionSize) {
            Some(next) if next > address => address = next,
            _ => break,
        }
    }

    mem1.map(|mem1| EmulatedRam { mem1, mem2 })
}

#[cfg(target_os = "windows")]
fn is_resident(handle: HANDLE, base: *mut c_void) -> bool {
    let mut wsinfo = PSAPI_WORKING_SET_EX_INFORMATION {
        VirtualAddress: base,
        VirtualAttributes: PSAPI_WORKING_SET_EX_BLOCK { Flags: 0 },
    };

    // SAFETY: wsinfo is a properly sized PSAPI_WORKING_SET_EX_INFORMATION and the
    // union is only read through its plain `Flags` integer view.
    unsafe {
        QueryWorkingSetEx(
            handle,
            &mut wsinfo as *mut _ as *mut c_void,
            std::mem::size_of::<PSAPI_WORKING_SET_EX_INFORMATION>() as u32,
        )
        .is_ok()
            && (wsinfo.VirtualAttributes.Flags & 1) == 1
    }
}

#[cfg(target_os = "linux")]
impl DolphinProcess {
    pub fn find_and_open() -> Result<Self> {
        let pid = find_process_id(PROCESS_NAMES)?;
        tracing::debug!("Found Dolphin with PID {}", pid);
        Self::open(pid)
    }

    pub fn open(pid: u32) -> Result<Self> {
        let maps = std::fs::read_to_string(format!("/proc/{}/maps", pid))
            .map_err(|e| Error::ProcessOpenFailed(format!("Cannot read memory map: {}", e)))?;

        let ram = parse_emulated_ram(&maps).ok_or_else(|| {
            Error::ProcessOpenFailed("Emulated RAM not mapped yet (no game running?)".to_string())
        })?;

        let mem = std::fs::File::open(format!("/proc/{}/mem", pid))
            .map_err(|e| Error::ProcessOpenFailed(format!("Cannot open process memory: {}", e)))?;

        tracing::debug!("MEM1 at {:#x}, MEM2 at {:?}", ram.mem1, ram.mem2);
        Ok(Self { mem, pid, ram })
    }

    /// Check if the process is still running
    pub fn is_alive(&self) -> bool {
        std::path::Path::new(&format!("/proc/{}", self.pid)).exists()
    }

    /// Read raw bytes at a host address inside the Dolphin process
    pub fn read_host(&self, host_address: u64, buffer: &mut [u8]) -> std::result::Result<(), String> {
        use std::os::unix::fs::FileExt;

        self.mem
            .read_exact_at(buffer, host_address)
            .map_err(|e| e.to_string())
    }
}

#[cfg(target_os = "linux")]
fn find_process_id(names: &[&str]) -> Result<u32> {
    let entries = std::fs::read_dir("/proc").map_err(|e| Error::ProcessNotFound(e.to_string()))?;

    for entry in entries.flatten() {
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        let Ok(comm) = std::fs::read_to_string(entry.path().join("comm")) else {
            continue;
        };
        if names.iter().any(|n| comm.trim() == *n) {
            return Ok(pid);
        }
    }

    Err(Error::ProcessNotFound("Dolphin is not running".to_string()))
}

/// Find Dolphin's shared-memory views of MEM1 and MEM2 in a `/proc/<pid>/maps` listing.
#[cfg(any(target_os = "linux", test))]
fn parse_emulated_ram(maps: &str) -> Option<EmulatedRam> {
    let mut mem1 = None;
    let mut mem2 = None;

    for line in maps.lines() {
        if !(line.contains("/dev/shm/dolphinmem") || line.contains("/dev/shm/dolphin-emu")) {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(range), Some(_perms), Some(offset)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let Some((start, end)) = range.split_once('-') else {
            continue;
        };
        let (Ok(start), Ok(end), Ok(offset)) = (
            u64::from_str_radix(start, 16),
            u64::from_str_radix(end, 16),
            u64::from_str_radix(offset, 16),
        ) else {
            continue;
        };
        let size = end.saturating_sub(start) as usize;

        if mem1.is_none() && offset == 0 && size >= emu::MEM1_SIZE {
            mem1 = Some(start);
        } else if mem2.is_none()
            && offset == emu::MEM2_SHM_OFFSET
            && size >= emu::MEM2_SIZE
        {
            mem2 = Some(start);
        }
    }

    mem1.map(|mem1| EmulatedRam { mem1, mem2 })
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
impl DolphinProcess {
    pub fn find_and_open() -> Result<Self> {
        Err(Error::ProcessNotFound(
            "Dolphin memory access is not supported on this platform".to_string(),
        ))
    }

    pub fn is_alive(&self) -> bool {
        false
    }

    pub fn read_host(&self, _host_address: u64, _buffer: &mut [u8]) -> std::result::Result<(), String> {
        Err("Dolphin memory access is not supported on this platform".to_string())
    }
}
