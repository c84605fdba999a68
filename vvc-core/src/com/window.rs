//! Host window lookup via the Win32 window manager.
//!
//! The automation object exposes window verbs but no window-state getter,
//! so the adapter reads minimized/maximized/visible straight from the
//! window manager.  The host's main window is found by title.

use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;

use windows::Win32::Foundation::{HWND, LPARAM, TRUE};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowTextLengthW, GetWindowTextW, IsIconic, IsWindowVisible, IsZoomed,
};

use crate::errors::VvError;
use crate::types::WindowState;

/// Title fragment identifying the host's main window.
const WINDOW_TITLE_MARKER: &str = "VibrationVIEW";

/// Read the window title (up to its reported length).
fn read_window_title(hwnd: HWND) -> String {
    let len = unsafe { GetWindowTextLengthW(hwnd) };
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u16; (len + 1) as usize];
    let copied = unsafe { GetWindowTextW(hwnd, &mut buf) };
    if copied <= 0 {
        return String::new();
    }
    OsString::from_wide(&buf[..copied as usize])
        .to_string_lossy()
        .into_owned()
}

/// Callback for EnumWindows that records the first window whose title
/// contains the host marker.
unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> windows::Win32::Foundation::BOOL {
    let found = unsafe { &mut *(lparam.0 as *mut Option<HWND>) };

    let title = read_window_title(hwnd);
    if title.contains(WINDOW_TITLE_MARKER) {
        *found = Some(hwnd);
        return windows::Win32::Foundation::BOOL(0); // stop enumeration
    }

    TRUE // continue enumeration
}

/// Snapshot the host's main window state.
///
/// Fails with a connectivity error when no window carries the host title
/// marker -- the process is gone or has no UI yet.
pub fn host_window_state() -> Result<WindowState, VvError> {
    let mut found: Option<HWND> = None;
    let result = unsafe {
        EnumWindows(
            Some(enum_callback),
            LPARAM(&mut found as *mut Option<HWND> as isize),
        )
    };
    // EnumWindows reports failure when the callback stops it early; only
    // a failure with nothing found is a real error.
    if let Err(e) = result {
        if found.is_none() {
            return Err(VvError::invocation(
                "WindowState",
                format!("EnumWindows failed: {e}"),
            ));
        }
    }

    let hwnd = found.ok_or_else(|| {
        VvError::Connectivity(format!("no window titled *{WINDOW_TITLE_MARKER}* found"))
    })?;

    Ok(WindowState {
        title: read_window_title(hwnd),
        is_minimized: unsafe { IsIconic(hwnd) }.as_bool(),
        is_maximized: unsafe { IsZoomed(hwnd) }.as_bool(),
        is_visible: unsafe { IsWindowVisible(hwnd) }.as_bool(),
    })
}
