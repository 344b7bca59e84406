use std::collections::VecDeque;
use std::ffi::c_void;
use std::time::Duration;

use picfly_types::{OverlayEvent, Point, ScreenBounds, SelectionRect};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BeginPaint, DIB_RGB_COLORS, EndPaint, InvalidateRect,
    PAINTSTRUCT, SetDIBitsToDevice, UpdateWindow,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture, SetFocus, VK_ESCAPE};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GWLP_USERDATA,
    GetWindowLongPtrW, IDC_CROSS, LoadCursorW, MSG, MsgWaitForMultipleObjects, PM_REMOVE,
    PeekMessageW, QS_ALLINPUT, RegisterClassExW, SW_SHOW, SetForegroundWindow,
    SetWindowLongPtrW, ShowWindow, TranslateMessage, WM_CLOSE, WM_ERASEBKGND, WM_KEYDOWN,
    WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE, WM_PAINT, WM_RBUTTONDOWN, WNDCLASSEXW,
    WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};
use windows::core::w;

use crate::CaptureError;
use crate::overlay::{OverlayFrames, OverlaySession, OverlaySurface};

const CLASS_NAME: windows::core::PCWSTR = w!("PicflyRegionOverlay");

/// Topmost popup window covering the whole virtual screen.
pub struct WinOverlay;

struct OverlayState {
    frames: OverlayFrames,
    selection: Option<SelectionRect>,
    events: VecDeque<OverlayEvent>,
}

struct WinOverlaySession {
    hwnd: HWND,
    state: Box<OverlayState>,
}

impl OverlaySurface for WinOverlay {
    fn open(
        &self,
        bounds: ScreenBounds,
        frames: OverlayFrames,
    ) -> Result<Box<dyn OverlaySession>, CaptureError> {
        let mut state = Box::new(OverlayState {
            frames,
            selection: None,
            events: VecDeque::new(),
        });

        unsafe {
            let module = GetModuleHandleW(None)
                .map_err(|e| CaptureError::Overlay(format!("GetModuleHandleW: {e}")))?;
            let cursor = LoadCursorW(None, IDC_CROSS)
                .map_err(|e| CaptureError::Overlay(format!("LoadCursorW: {e}")))?;

            let class = WNDCLASSEXW {
                cbSize: size_of::<WNDCLASSEXW>() as u32,
                lpfnWndProc: Some(overlay_proc),
                hInstance: module.into(),
                hCursor: cursor,
                lpszClassName: CLASS_NAME,
                ..Default::default()
            };
            // Fails harmlessly once the class exists from an earlier session
            let _ = RegisterClassExW(&class);

            let hwnd = CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
                CLASS_NAME,
                w!("picfly"),
                WS_POPUP,
                bounds.x,
                bounds.y,
                bounds.width as i32,
                bounds.height as i32,
                None,
                None,
                Some(module.into()),
                None,
            )
            .map_err(|e| CaptureError::Overlay(format!("CreateWindowExW: {e}")))?;

            SetWindowLongPtrW(hwnd, GWLP_USERDATA, &mut *state as *mut OverlayState as isize);
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = SetForegroundWindow(hwnd);
            let _ = SetFocus(Some(hwnd));
            let _ = UpdateWindow(hwnd);

            tracing::debug!(?bounds, "overlay shown");
            Ok(Box::new(WinOverlaySession { hwnd, state }))
        }
    }
}

impl WinOverlaySession {
    fn pump(&mut self) {
        let mut msg = MSG::default();
        unsafe {
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

impl OverlaySession for WinOverlaySession {
    fn next_event(&mut self, timeout: Duration) -> Option<OverlayEvent> {
        if let Some(event) = self.state.events.pop_front() {
            return Some(event);
        }

        self.pump();
        if self.state.events.is_empty() {
            let millis = timeout.as_millis().min(u128::from(u32::MAX)) as u32;
            unsafe {
                let _ = MsgWaitForMultipleObjects(None, false, millis, QS_ALLINPUT);
            }
            self.pump();
        }
        self.state.events.pop_front()
    }

    fn render(&mut self, selection: Option<SelectionRect>, damage: SelectionRect) {
        self.state.selection = selection;
        let rect = RECT {
            left: damage.x0,
            top: damage.y0,
            right: damage.x1,
            bottom: damage.y1,
        };
        unsafe {
            let _ = InvalidateRect(Some(self.hwnd), Some(&rect as *const RECT), false);
            let _ = UpdateWindow(self.hwnd);
        }
    }
}

impl Drop for WinOverlaySession {
    fn drop(&mut self) {
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            if let Err(e) = DestroyWindow(self.hwnd) {
                tracing::warn!("failed to destroy overlay window: {e}");
            }
        }
        // Flush WM_DESTROY and friends so nothing reaches the proc after the state is gone
        self.pump();
        tracing::debug!("overlay closed");
    }
}

fn point_from(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xFFFF) as u16 as i16;
    let y = ((lparam.0 >> 16) & 0xFFFF) as u16 as i16;
    Point::new(i32::from(x), i32::from(y))
}

unsafe fn paint(hwnd: HWND, state: &OverlayState) {
    let mut ps = PAINTSTRUCT::default();
    let hdc = unsafe { BeginPaint(hwnd, &mut ps) };
    let dirty = SelectionRect {
        x0: ps.rcPaint.left,
        y0: ps.rcPaint.top,
        x1: ps.rcPaint.right,
        y1: ps.rcPaint.bottom,
    };

    if let Some(patch) = state.frames.compose(state.selection, dirty) {
        let width = patch.rect.width();
        let height = patch.rect.height();
        let info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width as i32,
                // Negative height: rows are top-down
                biHeight: -(height as i32),
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };
        unsafe {
            SetDIBitsToDevice(
                hdc,
                patch.rect.x0,
                patch.rect.y0,
                width,
                height,
                0,
                0,
                0,
                height,
                patch.pixels.as_ptr() as *const c_void,
                &info,
                DIB_RGB_COLORS,
            );
        }
    }

    let _ = unsafe { EndPaint(hwnd, &ps) };
}

unsafe extern "system" fn overlay_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut OverlayState;
    if ptr.is_null() {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }
    let state = unsafe { &mut *ptr };

    let event = match msg {
        WM_PAINT => {
            unsafe { paint(hwnd, state) };
            return LRESULT(0);
        }
        WM_ERASEBKGND => return LRESULT(1),
        WM_LBUTTONDOWN => {
            let _ = unsafe { SetCapture(hwnd) };
            OverlayEvent::PointerDown(point_from(lparam))
        }
        WM_MOUSEMOVE => OverlayEvent::PointerMove(point_from(lparam)),
        WM_LBUTTONUP => {
            let _ = unsafe { ReleaseCapture() };
            OverlayEvent::PointerUp(point_from(lparam))
        }
        WM_RBUTTONDOWN => OverlayEvent::Cancel,
        WM_KEYDOWN if wparam.0 == usize::from(VK_ESCAPE.0) => OverlayEvent::Cancel,
        // The session owns the window; closing just ends the selection
        WM_CLOSE => OverlayEvent::Closed,
        _ => return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    };

    state.events.push_back(event);
    LRESULT(0)
}
