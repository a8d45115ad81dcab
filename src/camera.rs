//! Device-bound control handle.
//!
//! [`Camera`] pairs a [`Device`] with the backend that reaches it so callers
//! do not have to thread both through every call. It holds no cached state;
//! each method is one round-trip through the backend.

use crate::capability::{self, CapabilityInfo, DeviceCapabilities};
use crate::config::ProbingConfig;
use crate::errors::{ControlError, ControlResult, ErrorKind};
use crate::logging::{emit, LogLevel};
use crate::platform::Backend;
use crate::types::{
    CamMode, Device, PropRange, PropSetting, PropertyAddress, PropertyPayload, PropertySetId,
    StandardProperty, SupportFlags,
};
use crate::vendor::{self, named, NamedProperty, PayloadCodec};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Camera {
    device: Device,
    backend: Arc<dyn Backend>,
}

impl fmt::Debug for Camera {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Camera")
            .field("device", &self.device)
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Open a control handle for `device`.
///
/// Fails with `InvalidArgument` for an empty handle and `DeviceUnavailable`
/// when the backend does not see the device.
pub fn open_camera(backend: Arc<dyn Backend>, device: &Device) -> ControlResult<Camera> {
    if !device.is_valid() {
        return Err(ControlError::invalid_argument("Invalid device"));
    }
    if !backend.is_device_connected(device)? {
        return Err(ControlError::device_unavailable(format!(
            "Device '{}' not connected",
            device
        )));
    }

    emit!(LogLevel::Info, "Opened camera '{}' via {}", device, backend.name());
    Ok(Camera {
        device: device.clone(),
        backend,
    })
}

/// Open the `index`-th device reported by the backend.
pub fn open_camera_by_index(backend: Arc<dyn Backend>, index: usize) -> ControlResult<Camera> {
    let devices = backend.list_devices()?;
    let device = devices.get(index).ok_or_else(|| {
        ControlError::device_unavailable(format!(
            "Invalid device index {} ({} device(s) present)",
            index,
            devices.len()
        ))
    })?;
    open_camera(Arc::clone(&backend), device)
}

impl Camera {
    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn is_connected(&self) -> ControlResult<bool> {
        self.backend.is_device_connected(&self.device)
    }

    /// Connected and identifiable; transport failures count as invalid.
    pub fn is_valid(&self) -> bool {
        self.device.is_valid() && self.is_connected().unwrap_or(false)
    }

    // Standard properties

    pub fn get(&self, prop: impl Into<StandardProperty>) -> ControlResult<PropSetting> {
        self.backend.get_setting(&self.device, prop.into())
    }

    pub fn set(&self, prop: impl Into<StandardProperty>, setting: PropSetting) -> ControlResult<()> {
        self.backend.set_setting(&self.device, prop.into(), setting)
    }

    pub fn get_range(&self, prop: impl Into<StandardProperty>) -> ControlResult<PropRange> {
        self.backend.get_range(&self.device, prop.into())
    }

    /// Clamp `setting.value` to the property's range and step, then write it.
    /// Returns the setting actually written.
    pub fn set_clamped(
        &self,
        prop: impl Into<StandardProperty>,
        setting: PropSetting,
    ) -> ControlResult<PropSetting> {
        let prop = prop.into();
        let range = self.get_range(prop)?;
        let applied = PropSetting::new(range.clamp(setting.value), setting.mode);
        if applied.value != setting.value {
            emit!(
                LogLevel::Debug,
                "{} value {} clamped to {}",
                prop,
                setting.value,
                applied.value
            );
        }
        self.set(prop, applied)?;
        Ok(applied)
    }

    /// Write each supported property's default value and mode.
    ///
    /// Relative controls and properties the device does not expose are
    /// skipped. Per-property failures are reported in the returned list
    /// rather than aborting the pass; a missing device fails up front.
    pub fn reset_to_defaults(&self) -> ControlResult<Vec<(StandardProperty, ControlResult<PropSetting>)>> {
        if !self.is_connected()? {
            return Err(ControlError::device_unavailable(format!(
                "Device '{}' not connected",
                self.device
            )));
        }

        let mut outcomes = Vec::new();
        for prop in StandardProperty::all().filter(|p| !p.is_relative()) {
            let range = match self.get_range(prop) {
                Ok(range) => range,
                Err(e) if e.is(ErrorKind::NotSupported) => continue,
                Err(e) => {
                    outcomes.push((prop, Err(e)));
                    continue;
                }
            };
            let setting = range.default_setting();
            outcomes.push((prop, self.set(prop, setting).map(|_| setting)));
        }

        let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            emit!(
                LogLevel::Warning,
                "Reset '{}': {} of {} properties failed",
                self.device,
                failed,
                outcomes.len()
            );
        }
        Ok(outcomes)
    }

    /// Switch a property to automatic control, keeping its current value.
    pub fn set_auto(&self, prop: impl Into<StandardProperty>) -> ControlResult<()> {
        let prop = prop.into();
        let current = self.get(prop)?;
        self.set(prop, PropSetting::new(current.value, CamMode::Auto))
    }

    // Capabilities

    pub fn capability(&self, prop: impl Into<StandardProperty>) -> ControlResult<CapabilityInfo> {
        capability::probe_standard(self.backend.as_ref(), &self.device, prop.into())
    }

    pub fn vendor_capability(&self, address: &PropertyAddress) -> ControlResult<CapabilityInfo> {
        capability::probe_vendor(self.backend.as_ref(), &self.device, address)
    }

    pub fn capabilities(&self) -> ControlResult<DeviceCapabilities> {
        self.capabilities_with(&ProbingConfig::default())
    }

    pub fn capabilities_with(&self, options: &ProbingConfig) -> ControlResult<DeviceCapabilities> {
        DeviceCapabilities::scan(Arc::clone(&self.backend), &self.device, options)
    }

    // Vendor properties

    pub fn get_vendor(&self, set: PropertySetId, id: u32) -> ControlResult<PropertyPayload> {
        vendor::get_vendor_property(self.backend.as_ref(), &self.device, set, id)
    }

    pub fn set_vendor(&self, set: PropertySetId, id: u32, payload: &[u8]) -> ControlResult<()> {
        vendor::set_vendor_property(self.backend.as_ref(), &self.device, set, id, payload)
    }

    pub fn supports_vendor(&self, set: PropertySetId, id: u32) -> ControlResult<bool> {
        vendor::query_vendor_property_support(self.backend.as_ref(), &self.device, set, id)
    }

    pub fn vendor_support_flags(&self, set: PropertySetId, id: u32) -> ControlResult<SupportFlags> {
        vendor::vendor_support_flags(self.backend.as_ref(), &self.device, set, id)
    }

    pub fn get_vendor_typed<T: PayloadCodec>(&self, set: PropertySetId, id: u32) -> ControlResult<T> {
        vendor::get_typed(self.backend.as_ref(), &self.device, set, id)
    }

    pub fn set_vendor_typed<T: PayloadCodec>(
        &self,
        set: PropertySetId,
        id: u32,
        value: &T,
    ) -> ControlResult<()> {
        vendor::set_typed(self.backend.as_ref(), &self.device, set, id, value)
    }

    pub fn get_named<P: NamedProperty>(&self, prop: P) -> ControlResult<PropertyPayload> {
        named::get(self.backend.as_ref(), &self.device, prop)
    }

    pub fn set_named<P: NamedProperty>(&self, prop: P, payload: &[u8]) -> ControlResult<()> {
        named::set(self.backend.as_ref(), &self.device, prop, payload)
    }

    pub fn supports_named<P: NamedProperty>(&self, prop: P) -> ControlResult<bool> {
        named::supports(self.backend.as_ref(), &self.device, prop)
    }

    pub fn get_named_typed<T: PayloadCodec, P: NamedProperty>(&self, prop: P) -> ControlResult<T> {
        named::get_typed(self.backend.as_ref(), &self.device, prop)
    }

    pub fn set_named_typed<T: PayloadCodec, P: NamedProperty>(
        &self,
        prop: P,
        value: &T,
    ) -> ControlResult<()> {
        named::set_typed(self.backend.as_ref(), &self.device, prop, value)
    }
}
