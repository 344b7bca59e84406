use std::cell::RefCell;
use std::time::Instant;

use picfly_types::{KeyAction, KeyEvent};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, HHOOK, KBDLLHOOKSTRUCT, MSG, PM_NOREMOVE,
    PeekMessageW, PostThreadMessageW, SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx,
    WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP, WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP, WM_USER,
};

use crate::listener::{Disposition, EventSink, InputEventSource, Stopper};
use crate::vk::key_from_vk;
use crate::InputError;

thread_local! {
    // The low-level hook proc runs on the thread that installed it
    static SINK: RefCell<Option<EventSink>> = const { RefCell::new(None) };
}

/// Global `WH_KEYBOARD_LL` hook.
///
/// Sees every key event system-wide without taking focus. Events are passed on to the
/// next hook unless the sink asks for suppression.
#[derive(Default)]
pub struct KeyboardHook {
    hook: Option<HHOOK>,
}

impl KeyboardHook {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct HookStopper {
    thread_id: u32,
}

impl Stopper for HookStopper {
    fn stop(&self) {
        if let Err(e) = unsafe { PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) } {
            tracing::warn!("failed to stop keyboard hook thread: {e}");
        }
    }
}

impl InputEventSource for KeyboardHook {
    type Stopper = HookStopper;

    fn install(&mut self, sink: EventSink) -> Result<HookStopper, InputError> {
        SINK.with(|slot| *slot.borrow_mut() = Some(sink));

        unsafe {
            // Make sure this thread owns a message queue before anyone posts WM_QUIT to it
            let mut msg = MSG::default();
            let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);

            let module = GetModuleHandleW(None)
                .map_err(|e| InputError::Unavailable(format!("GetModuleHandleW: {e}")))?;
            let hook = SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), Some(module.into()), 0)
                .map_err(|e| InputError::Unavailable(format!("SetWindowsHookExW: {e}")))?;
            self.hook = Some(hook);

            Ok(HookStopper {
                thread_id: GetCurrentThreadId(),
            })
        }
    }

    fn pump(&mut self) -> Result<(), InputError> {
        let mut msg = MSG::default();
        loop {
            let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match ret.0 {
                0 => return Ok(()),
                -1 => {
                    return Err(InputError::Unavailable(
                        "GetMessageW failed on hook thread".into(),
                    ));
                }
                _ => unsafe {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                },
            }
        }
    }
}

impl Drop for KeyboardHook {
    fn drop(&mut self) {
        if let Some(hook) = self.hook.take()
            && let Err(e) = unsafe { UnhookWindowsHookEx(hook) }
        {
            tracing::warn!("failed to remove keyboard hook: {e}");
        }
        SINK.with(|slot| slot.borrow_mut().take());
    }
}

unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 {
        let data = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
        let action = match wparam.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => Some(KeyAction::Down),
            WM_KEYUP | WM_SYSKEYUP => Some(KeyAction::Up),
            _ => None,
        };

        if let Some(action) = action {
            let event = KeyEvent {
                key: key_from_vk(data.vkCode),
                action,
                at: Instant::now(),
            };
            let disposition = SINK.with(|slot| {
                slot.try_borrow_mut()
                    .ok()
                    .and_then(|mut sink| sink.as_mut().map(|sink| sink(event)))
            });
            if disposition == Some(Disposition::Suppress) {
                return LRESULT(1);
            }
        }
    }
    unsafe { CallNextHookEx(None, code, wparam, lparam) }
}
