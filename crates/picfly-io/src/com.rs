use windows::Win32::System::Com::{COINIT_MULTITHREADED, CoInitializeEx, CoUninitialize};

use crate::IoError;

/// Keeps COM initialized on the current thread for as long as it lives.
pub struct ComGuard;

impl ComGuard {
    pub fn initialize() -> Result<Self, IoError> {
        unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) }
            .ok()
            .map_err(|e| IoError::Notify(format!("failed to initialize COM: {e}")))?;
        Ok(ComGuard)
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}
