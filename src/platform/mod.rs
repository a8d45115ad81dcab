//! Seam between the portable core and the OS-specific property transport.
//!
//! Everything above this module is written once against these traits:
//! [`PropertyTransport`] moves raw vendor payloads, [`StandardControls`]
//! reads and writes the cross-vendor properties, and [`DeviceEnumerator`]
//! is the device facility the backends expose for callers.

pub mod hresult;

#[cfg(target_os = "windows")]
pub mod windows;

use crate::errors::{ControlError, ControlResult};
use crate::logging::{emit, LogLevel};
use crate::types::{
    Device, PropRange, PropSetting, PropertyAddress, PropertyPayload, StandardProperty,
    SupportFlags,
};
use std::sync::Arc;

/// Raw access to GUID-addressed property sets.
pub trait PropertyTransport: Send + Sync {
    /// Read the payload stored at `address`.
    fn get_raw(&self, device: &Device, address: &PropertyAddress)
        -> ControlResult<PropertyPayload>;

    /// Write `payload` to `address` in a single OS call.
    fn set_raw(&self, device: &Device, address: &PropertyAddress, payload: &[u8])
        -> ControlResult<()>;

    /// Get/set support for `address`. Absence of support is `SupportFlags::NONE`,
    /// never an error.
    fn support_flags(&self, device: &Device, address: &PropertyAddress)
        -> ControlResult<SupportFlags>;

    /// True when the device supports reading or writing `address`.
    fn query_support(&self, device: &Device, address: &PropertyAddress) -> ControlResult<bool> {
        self.support_flags(device, address).map(|flags| flags.any())
    }
}

/// Standard (cross-vendor) property access.
pub trait StandardControls: Send + Sync {
    fn get_setting(&self, device: &Device, prop: StandardProperty) -> ControlResult<PropSetting>;

    fn set_setting(
        &self,
        device: &Device,
        prop: StandardProperty,
        setting: PropSetting,
    ) -> ControlResult<()>;

    fn get_range(&self, device: &Device, prop: StandardProperty) -> ControlResult<PropRange>;
}

/// Device listing and liveness checks provided by a backend.
pub trait DeviceEnumerator: Send + Sync {
    fn list_devices(&self) -> ControlResult<Vec<Device>>;

    fn is_device_connected(&self, device: &Device) -> ControlResult<bool>;
}

/// A complete platform backend.
pub trait Backend: PropertyTransport + StandardControls + DeviceEnumerator {
    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Current OS family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
    Unknown,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOS => "macos",
            Platform::Linux => "linux",
            Platform::Unknown => "unknown",
        }
    }

    /// Whether a native property-set backend exists for this platform.
    pub fn has_native_backend(&self) -> bool {
        matches!(self, Platform::Windows)
    }
}

/// Native backend for the current platform.
pub fn create_backend() -> ControlResult<Arc<dyn Backend>> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::DirectShowBackend::new()))
    }

    #[cfg(not(target_os = "windows"))]
    {
        emit!(
            LogLevel::Warning,
            "No native camera control backend for platform {}",
            Platform::current().as_str()
        );
        Err(ControlError::not_supported(format!(
            "No native camera control backend for platform {}",
            Platform::current().as_str()
        )))
    }
}

/// Debug-level trace of one transport call and its outcome.
pub(crate) fn trace_call<T>(
    op: &str,
    device: &Device,
    address: &PropertyAddress,
    result: &ControlResult<T>,
) {
    match result {
        Ok(_) => emit!(LogLevel::Debug, "{} {} on '{}': ok", op, address, device),
        Err(e) => emit!(
            LogLevel::Debug,
            "{} {} on '{}': {}",
            op,
            address,
            device,
            e.description()
        ),
    }
}

/// Debug-level trace of one standard property call and its outcome.
pub(crate) fn trace_standard<T>(
    op: &str,
    device: &Device,
    prop: StandardProperty,
    result: &ControlResult<T>,
) {
    match result {
        Ok(_) => emit!(LogLevel::Debug, "{} {} on '{}': ok", op, prop, device),
        Err(e) => emit!(
            LogLevel::Debug,
            "{} {} on '{}': {}",
            op,
            prop,
            device,
            e.description()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let platform = Platform::current();
        assert_ne!(platform, Platform::Unknown);
        assert!(!platform.as_str().is_empty());
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_create_backend_without_native_support() {
        let err = create_backend().err().expect("no backend off Windows");
        assert_eq!(err.kind(), crate::errors::ErrorKind::NotSupported);
    }
}
