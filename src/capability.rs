//! Capability probing for standard and vendor properties.
//!
//! A property the device does not expose probes as an unsupported
//! [`CapabilityInfo`]; only transport failures come back as errors.

use crate::config::ProbingConfig;
use crate::errors::{ControlError, ControlResult, ErrorKind};
use crate::logging::{emit, LogLevel};
use crate::platform::{Backend, PropertyTransport, StandardControls};
use crate::types::{
    CamMode, CamProp, Device, PropRange, PropertyAddress, StandardProperty, SupportFlags, VidProp,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Get/set support and, for standard properties, range and current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilityInfo {
    pub supported_get: bool,
    pub supported_set: bool,
    pub range: Option<PropRange>,
    pub mode: Option<CamMode>,
    pub current_value: Option<i32>,
}

static UNSUPPORTED: CapabilityInfo = CapabilityInfo::UNSUPPORTED;

impl CapabilityInfo {
    pub const UNSUPPORTED: CapabilityInfo = CapabilityInfo {
        supported_get: false,
        supported_set: false,
        range: None,
        mode: None,
        current_value: None,
    };

    /// Vendor capability: the support pair and nothing else.
    pub fn from_flags(flags: SupportFlags) -> Self {
        Self {
            supported_get: flags.get,
            supported_set: flags.set,
            ..Self::UNSUPPORTED
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported_get || self.supported_set
    }

    pub fn flags(&self) -> SupportFlags {
        SupportFlags {
            get: self.supported_get,
            set: self.supported_set,
        }
    }
}

/// `Ok(None)` for NotSupported, errors otherwise.
fn optional<T>(result: ControlResult<T>) -> ControlResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is(ErrorKind::NotSupported) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Probe one standard property: range, current value and mode.
pub fn probe_standard<C: StandardControls + ?Sized>(
    controls: &C,
    device: &Device,
    prop: StandardProperty,
) -> ControlResult<CapabilityInfo> {
    let range = optional(controls.get_range(device, prop))?;
    let current = optional(controls.get_setting(device, prop))?;

    Ok(CapabilityInfo {
        supported_get: range.is_some() || current.is_some(),
        supported_set: range.is_some(),
        range,
        mode: current.map(|s| s.mode),
        current_value: current.map(|s| s.value),
    })
}

/// Probe one vendor address. No range semantics are assumed.
pub fn probe_vendor<T: PropertyTransport + ?Sized>(
    transport: &T,
    device: &Device,
    address: &PropertyAddress,
) -> ControlResult<CapabilityInfo> {
    transport
        .support_flags(device, address)
        .map(CapabilityInfo::from_flags)
}

/// Capability snapshot of one device.
pub struct DeviceCapabilities {
    backend: Arc<dyn Backend>,
    device: Device,
    options: ProbingConfig,
    accessible: bool,
    camera: BTreeMap<CamProp, CapabilityInfo>,
    video: BTreeMap<VidProp, CapabilityInfo>,
    vendor: BTreeMap<PropertyAddress, CapabilityInfo>,
}

impl std::fmt::Debug for DeviceCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("DeviceCapabilities")
            .field("backend", &self.backend.name())
            .field("device", &self.device)
            .field("accessible", &self.accessible)
            .field("camera", &self.camera)
            .field("video", &self.video)
            .field("vendor", &self.vendor)
            .finish()
    }
}

impl DeviceCapabilities {
    /// Scan every standard property (and configured vendor addresses) of
    /// `device`. A disconnected device yields an empty, inaccessible snapshot.
    pub fn scan(
        backend: Arc<dyn Backend>,
        device: &Device,
        options: &ProbingConfig,
    ) -> ControlResult<Self> {
        if !device.is_valid() {
            return Err(ControlError::invalid_argument("Invalid device"));
        }

        let mut caps = Self {
            backend,
            device: device.clone(),
            options: options.clone(),
            accessible: false,
            camera: BTreeMap::new(),
            video: BTreeMap::new(),
            vendor: BTreeMap::new(),
        };

        caps.accessible = caps.backend.is_device_connected(&caps.device)?;
        if caps.accessible {
            caps.scan_all()?;
        } else {
            emit!(
                LogLevel::Warning,
                "Device '{}' is not connected; capability snapshot is empty",
                caps.device
            );
        }
        Ok(caps)
    }

    fn scan_all(&mut self) -> ControlResult<()> {
        let backend = Arc::clone(&self.backend);

        for prop in CamProp::ALL {
            if prop.is_relative() && !self.options.include_relative_controls {
                continue;
            }
            let info = probe_standard(backend.as_ref(), &self.device, prop.into())?;
            if info.is_supported() {
                self.camera.insert(prop, info);
            }
        }

        for prop in VidProp::ALL {
            let info = probe_standard(backend.as_ref(), &self.device, prop.into())?;
            if info.is_supported() {
                self.video.insert(prop, info);
            }
        }

        for address in self.options.vendor_addresses()? {
            let info = probe_vendor(backend.as_ref(), &self.device, &address)?;
            self.vendor.insert(address, info);
        }

        emit!(
            LogLevel::Info,
            "Scanned '{}': {} camera, {} video properties supported",
            self.device,
            self.camera.len(),
            self.video.len()
        );
        Ok(())
    }

    /// Re-scan the device. Fails with `DeviceUnavailable` when it is gone.
    pub fn refresh(&mut self) -> ControlResult<()> {
        self.accessible = self.backend.is_device_connected(&self.device)?;
        if !self.accessible {
            return Err(ControlError::device_unavailable(format!(
                "Device '{}' not connected",
                self.device
            )));
        }

        self.camera.clear();
        self.video.clear();
        self.vendor.clear();
        self.scan_all()
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn is_device_accessible(&self) -> bool {
        self.accessible
    }

    pub fn camera_capability(&self, prop: CamProp) -> &CapabilityInfo {
        self.camera.get(&prop).unwrap_or(&UNSUPPORTED)
    }

    pub fn video_capability(&self, prop: VidProp) -> &CapabilityInfo {
        self.video.get(&prop).unwrap_or(&UNSUPPORTED)
    }

    pub fn capability(&self, prop: StandardProperty) -> &CapabilityInfo {
        match prop {
            StandardProperty::Camera(p) => self.camera_capability(p),
            StandardProperty::Video(p) => self.video_capability(p),
        }
    }

    /// Capability of a configured vendor address; unsupported when it was not probed.
    pub fn vendor_capability(&self, address: &PropertyAddress) -> &CapabilityInfo {
        self.vendor.get(address).unwrap_or(&UNSUPPORTED)
    }

    pub fn supports_camera_property(&self, prop: CamProp) -> bool {
        self.camera_capability(prop).is_supported()
    }

    pub fn supports_video_property(&self, prop: VidProp) -> bool {
        self.video_capability(prop).is_supported()
    }

    pub fn supported_camera_properties(&self) -> Vec<CamProp> {
        self.camera.keys().copied().collect()
    }

    pub fn supported_video_properties(&self) -> Vec<VidProp> {
        self.video.keys().copied().collect()
    }

    /// All supported standard properties, camera controls first.
    pub fn supported_properties(&self) -> Vec<StandardProperty> {
        self.camera
            .keys()
            .map(|p| StandardProperty::Camera(*p))
            .chain(self.video.keys().map(|p| StandardProperty::Video(*p)))
            .collect()
    }
}
