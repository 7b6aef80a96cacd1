use std::ffi::CString;

use windows::core::{s, Interface, Result, PCSTR};
use windows::Win32::Graphics::Direct3D12::ID3D12GraphicsCommandList;
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryA};

// WinPixEventRuntime
// https://devblogs.microsoft.com/pix/winpixeventruntime/
//
// Loaded dynamically; when the DLL is absent the renderer simply runs
// without markers.
pub struct Pix {
    begin_event: BeginEventOnCommandList,
    end_event: EndEventOnCommandList,
    _set_marker: SetMarkerOnCommandList,
}

impl Pix {
    pub fn build() -> Result<Self> {
        let module = unsafe { LoadLibraryA(s!("WinPixEventRuntime.dll")) }?;

        let begin_event = load_proc(module, s!("PIXBeginEventOnCommandList"))?;
        let end_event = load_proc(module, s!("PIXEndEventOnCommandList"))?;
        let set_marker = load_proc(module, s!("PIXSetMarkerOnCommandList"))?;

        Ok(Self {
            begin_event: unsafe {
                std::mem::transmute::<ProcAddress, BeginEventOnCommandList>(begin_event)
            },
            end_event: unsafe {
                std::mem::transmute::<ProcAddress, EndEventOnCommandList>(end_event)
            },
            _set_marker: unsafe {
                std::mem::transmute::<ProcAddress, SetMarkerOnCommandList>(set_marker)
            },
        })
    }

    /// Opens a named region on the command list; the region closes when the
    /// returned guard drops.
    pub fn begin_event<'a>(
        &'a self,
        command_list: &'a ID3D12GraphicsCommandList,
        color: u64,
        name: &str,
    ) -> PixEvent<'a> {
        let name = CString::new(name).unwrap_or_default();
        (self.begin_event)(command_list.as_raw(), color, PCSTR(name.as_ptr().cast()));

        PixEvent {
            end_event: self.end_event,
            command_list,
        }
    }
}

pub struct PixEvent<'a> {
    end_event: EndEventOnCommandList,
    command_list: &'a ID3D12GraphicsCommandList,
}

impl Drop for PixEvent<'_> {
    fn drop(&mut self) {
        (self.end_event)(self.command_list.as_raw());
    }
}

pub fn pix_color(r: u8, g: u8, b: u8) -> u64 {
    0xff00_0000 | ((r as u64) << 16) | ((g as u64) << 8) | (b as u64)
}

fn load_proc(
    module: windows::Win32::Foundation::HMODULE,
    name: PCSTR,
) -> Result<ProcAddress> {
    let Some(proc) = (unsafe { GetProcAddress(module, name) }) else {
        return Err(windows::core::Error::new(
            windows::Win32::Foundation::E_FAIL,
            format!("missing PIX entry point {:?}", unsafe { name.to_string() }),
        ));
    };
    Ok(proc)
}

type ProcAddress = unsafe extern "system" fn() -> isize;

type BeginEventOnCommandList =
    extern "system" fn(command_list: *mut core::ffi::c_void, color: u64, string: PCSTR);
type EndEventOnCommandList = extern "system" fn(command_list: *mut core::ffi::c_void);
type SetMarkerOnCommandList =
    extern "system" fn(command_list: *mut core::ffi::c_void, color: u64, string: PCSTR);
