use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};

/// Opt the process into per-monitor DPI awareness.
///
/// Without it Windows scales the overlay window and reports mouse positions in logical
/// pixels, while xcap captures device pixels. Call once, before any window is created.
pub fn enable_dpi_awareness() {
    match unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
        Ok(()) => tracing::debug!("per-monitor DPI awareness enabled"),
        // Already fixed by a manifest or an earlier call
        Err(e) => tracing::debug!("DPI awareness left unchanged: {e}"),
    }
}
