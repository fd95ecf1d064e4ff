//! Win32 window focus helpers.
//!
//! On non-Windows platforms there is no window to focus: the game is treated
//! as always foregrounded and activation is a no-op.

use crate::errors::EfClawResult;
use crate::executor::input::WindowHandle;

#[cfg(target_os = "windows")]
mod win {
    use super::*;
    use crate::errors::EfClawError;
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        GetForegroundWindow, SetForegroundWindow, ShowWindow, SW_SHOW,
    };

    fn hwnd(handle: WindowHandle) -> HWND {
        HWND(handle.0 as *mut core::ffi::c_void)
    }

    pub fn is_foreground(handle: WindowHandle) -> EfClawResult<bool> {
        let current = unsafe { GetForegroundWindow() };
        Ok(current.0 as isize == handle.0)
    }

    pub fn bring_to_foreground(handle: WindowHandle) -> EfClawResult<()> {
        let target = hwnd(handle);
        unsafe {
            // ShowWindow reports the previous visibility, not success.
            let _ = ShowWindow(target, SW_SHOW);
            if !SetForegroundWindow(target).as_bool() {
                return Err(EfClawError::Executor(format!(
                    "SetForegroundWindow refused window {:#x}",
                    handle.0
                )));
            }
        }
        Ok(())
    }
}

#[cfg(target_os = "windows")]
pub use win::{bring_to_foreground, is_foreground};

#[cfg(not(target_os = "windows"))]
pub fn is_foreground(_handle: WindowHandle) -> EfClawResult<bool> {
    Ok(true)
}

#[cfg(not(target_os = "windows"))]
pub fn bring_to_foreground(_handle: WindowHandle) -> EfClawResult<()> {
    Ok(())
}
