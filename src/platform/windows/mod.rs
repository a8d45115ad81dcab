// Windows backend: DirectShow capture filters, IKsPropertySet for vendor
// property sets, IAMCameraControl / IAMVideoProcAmp for standard controls.

pub mod com;

use self::com::{map_error, open_filter, ComApartment};
use crate::errors::{ControlError, ControlResult, ErrorKind};
use crate::platform::{
    hresult, trace_call, trace_standard, Backend, DeviceEnumerator, PropertyTransport,
    StandardControls,
};
use crate::types::{
    CamMode, Device, PropRange, PropSetting, PropertyAddress, PropertyPayload, StandardProperty,
    SupportFlags,
};
use std::ffi::c_void;
use windows::core::{Interface, GUID};
use windows::Win32::Media::DirectShow::{IAMCameraControl, IAMVideoProcAmp, IBaseFilter};
use windows::Win32::Media::KernelStreaming::IKsPropertySet;

const FLAG_AUTO: i32 = 0x1;
const FLAG_MANUAL: i32 = 0x2;

fn mode_to_flags(mode: CamMode) -> i32 {
    match mode {
        CamMode::Auto => FLAG_AUTO,
        CamMode::Manual => FLAG_MANUAL,
    }
}

fn flags_to_mode(flags: i32) -> CamMode {
    if flags & FLAG_AUTO != 0 {
        CamMode::Auto
    } else {
        CamMode::Manual
    }
}

fn to_guid(address: &PropertyAddress) -> GUID {
    GUID::from_u128(address.set.as_u128())
}

/// DirectShow property backend. Holds no device state; every call binds the
/// capture filter afresh so values are never cached.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectShowBackend;

impl DirectShowBackend {
    pub fn new() -> Self {
        Self
    }

    fn property_set(filter: &IBaseFilter) -> Option<IKsPropertySet> {
        filter.cast::<IKsPropertySet>().ok()
    }

    fn with_property_set<T>(
        device: &Device,
        address: &PropertyAddress,
        op: impl FnOnce(&IKsPropertySet, &GUID) -> ControlResult<T>,
    ) -> ControlResult<T> {
        let _com = ComApartment::enter()?;
        let filter = open_filter(device)?;
        let props = Self::property_set(&filter).ok_or_else(|| {
            ControlError::not_supported(format!(
                "Device '{}' does not expose IKsPropertySet",
                device
            ))
        })?;
        op(&props, &to_guid(address))
    }

    fn read_payload(props: &IKsPropertySet, set: &GUID, id: u32) -> ControlResult<PropertyPayload> {
        let mut needed = 0u32;
        let probe = unsafe {
            props.Get(
                set,
                id,
                std::ptr::null(),
                0,
                std::ptr::null_mut(),
                0,
                &mut needed,
            )
        };
        if let Err(e) = probe {
            let code = e.code().0;
            if code != hresult::ERROR_MORE_DATA && code != hresult::ERROR_INSUFFICIENT_BUFFER {
                return Err(map_error(e, "IKsPropertySet::Get(size)"));
            }
        }
        if needed == 0 {
            return Err(ControlError::not_supported(
                "Property returned an empty payload",
            ));
        }

        let mut data = vec![0u8; needed as usize];
        let mut returned = 0u32;
        unsafe {
            props.Get(
                set,
                id,
                std::ptr::null(),
                0,
                data.as_mut_ptr() as *mut c_void,
                needed,
                &mut returned,
            )
        }
        .map_err(|e| map_error(e, "IKsPropertySet::Get"))?;

        data.truncate(returned as usize);
        Ok(data)
    }

    fn camera_control(filter: &IBaseFilter, device: &Device) -> ControlResult<IAMCameraControl> {
        filter.cast::<IAMCameraControl>().map_err(|_| {
            ControlError::not_supported(format!("Device '{}' has no IAMCameraControl", device))
        })
    }

    fn video_proc_amp(filter: &IBaseFilter, device: &Device) -> ControlResult<IAMVideoProcAmp> {
        filter.cast::<IAMVideoProcAmp>().map_err(|_| {
            ControlError::not_supported(format!("Device '{}' has no IAMVideoProcAmp", device))
        })
    }
}

impl PropertyTransport for DirectShowBackend {
    fn get_raw(&self, device: &Device, address: &PropertyAddress) -> ControlResult<PropertyPayload> {
        let result = Self::with_property_set(device, address, |props, set| {
            Self::read_payload(props, set, address.id)
        });
        trace_call("get", device, address, &result);
        result
    }

    fn set_raw(&self, device: &Device, address: &PropertyAddress, payload: &[u8]) -> ControlResult<()> {
        let result = Self::with_property_set(device, address, |props, set| {
            unsafe {
                props.Set(
                    set,
                    address.id,
                    std::ptr::null(),
                    0,
                    payload.as_ptr() as *const c_void,
                    payload.len() as u32,
                )
            }
            .map_err(|e| map_error(e, "IKsPropertySet::Set"))
        });
        trace_call("set", device, address, &result);
        result
    }

    fn support_flags(&self, device: &Device, address: &PropertyAddress) -> ControlResult<SupportFlags> {
        let result = Self::with_property_set(device, address, |props, set| {
            match unsafe { props.QuerySupported(set, address.id) } {
                Ok(bits) => Ok(SupportFlags::from_bits(bits)),
                Err(e) => {
                    let err = map_error(e, "IKsPropertySet::QuerySupported");
                    if err.is(ErrorKind::NotSupported) {
                        Ok(SupportFlags::NONE)
                    } else {
                        Err(err)
                    }
                }
            }
        });
        // A filter without IKsPropertySet supports no vendor sets at all.
        let result = match result {
            Err(e) if e.is(ErrorKind::NotSupported) => Ok(SupportFlags::NONE),
            other => other,
        };
        trace_call("query", device, address, &result);
        result
    }
}

impl StandardControls for DirectShowBackend {
    fn get_setting(&self, device: &Device, prop: StandardProperty) -> ControlResult<PropSetting> {
        let result = (|| {
            let _com = ComApartment::enter()?;
            let filter = open_filter(device)?;
            let mut value = 0i32;
            let mut flags = 0i32;
            match prop {
                StandardProperty::Camera(p) => {
                    let ctl = Self::camera_control(&filter, device)?;
                    unsafe { ctl.Get(p.index(), &mut value, &mut flags) }
                        .map_err(|e| map_error(e, "IAMCameraControl::Get"))?;
                }
                StandardProperty::Video(p) => {
                    let amp = Self::video_proc_amp(&filter, device)?;
                    unsafe { amp.Get(p.index(), &mut value, &mut flags) }
                        .map_err(|e| map_error(e, "IAMVideoProcAmp::Get"))?;
                }
            }
            Ok(PropSetting::new(value, flags_to_mode(flags)))
        })();
        trace_standard("get", device, prop, &result);
        result
    }

    fn set_setting(&self, device: &Device, prop: StandardProperty, setting: PropSetting) -> ControlResult<()> {
        let result = (|| {
            let _com = ComApartment::enter()?;
            let filter = open_filter(device)?;
            let flags = mode_to_flags(setting.mode);
            match prop {
                StandardProperty::Camera(p) => {
                    let ctl = Self::camera_control(&filter, device)?;
                    unsafe { ctl.Set(p.index(), setting.value, flags) }
                        .map_err(|e| map_error(e, "IAMCameraControl::Set"))
                }
                StandardProperty::Video(p) => {
                    let amp = Self::video_proc_amp(&filter, device)?;
                    unsafe { amp.Set(p.index(), setting.value, flags) }
                        .map_err(|e| map_error(e, "IAMVideoProcAmp::Set"))
                }
            }
        })();
        trace_standard("set", device, prop, &result);
        result
    }

    fn get_range(&self, device: &Device, prop: StandardProperty) -> ControlResult<PropRange> {
        let result = (|| {
            let _com = ComApartment::enter()?;
            let filter = open_filter(device)?;
            let (mut min, mut max, mut step, mut default_value, mut flags) = (0, 0, 0, 0, 0);
            match prop {
                StandardProperty::Camera(p) => {
                    let ctl = Self::camera_control(&filter, device)?;
                    unsafe {
                        ctl.GetRange(
                            p.index(),
                            &mut min,
                            &mut max,
                            &mut step,
                            &mut default_value,
                            &mut flags,
                        )
                    }
                    .map_err(|e| map_error(e, "IAMCameraControl::GetRange"))?;
                }
                StandardProperty::Video(p) => {
                    let amp = Self::video_proc_amp(&filter, device)?;
                    unsafe {
                        amp.GetRange(
                            p.index(),
                            &mut min,
                            &mut max,
                            &mut step,
                            &mut default_value,
                            &mut flags,
                        )
                    }
                    .map_err(|e| map_error(e, "IAMVideoProcAmp::GetRange"))?;
                }
            }
            Ok(PropRange {
                min,
                max,
                step,
                default_value,
                default_mode: flags_to_mode(flags),
            })
        })();
        trace_standard("range", device, prop, &result);
        result
    }
}

impl DeviceEnumerator for DirectShowBackend {
    fn list_devices(&self) -> ControlResult<Vec<Device>> {
        let _com = ComApartment::enter()?;
        let devices: Vec<Device> = com::enumerate_video_inputs()?
            .into_iter()
            .map(|input| input.device)
            .collect();
        log::debug!("DirectShow enumerated {} video input(s)", devices.len());
        Ok(devices)
    }

    fn is_device_connected(&self, device: &Device) -> ControlResult<bool> {
        let _com = ComApartment::enter()?;
        Ok(com::enumerate_video_inputs()?
            .iter()
            .any(|input| input.device.matches(device)))
    }
}

impl Backend for DirectShowBackend {
    fn name(&self) -> &'static str {
        "directshow"
    }
}
