//! COM plumbing for the DirectShow backend: apartment lifetime, video input
//! enumeration and filter lookup by device identity.

use crate::errors::{ControlError, ControlResult};
use crate::logging::{emit, LogLevel};
use crate::platform::hresult;
use crate::types::Device;
use windows::core::{w, BSTR, PCWSTR, VARIANT};
use windows::Win32::Media::DirectShow::{
    IBaseFilter, ICreateDevEnum, CLSID_SystemDeviceEnum, CLSID_VideoInputDeviceCategory,
};
use windows::Win32::System::Com::StructuredStorage::IPropertyBag;
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoTaskMemFree, CoUninitialize, IBindCtx, IEnumMoniker,
    IErrorLog, IMoniker, CLSCTX_INPROC_SERVER, COINIT_MULTITHREADED,
};

/// Keeps COM initialized on the current thread for its lifetime.
///
/// A thread already initialized in a different apartment model is accepted
/// as-is and left alone on drop.
pub struct ComApartment {
    owns_init: bool,
}

impl ComApartment {
    pub fn enter() -> ControlResult<Self> {
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if hr.is_ok() {
            return Ok(Self { owns_init: true });
        }
        if hr.0 == hresult::RPC_E_CHANGED_MODE {
            return Ok(Self { owns_init: false });
        }
        Err(hresult::to_error(hr.0, "CoInitializeEx", &hr.message()))
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.owns_init {
            unsafe { CoUninitialize() };
        }
    }
}

/// Convert a `windows` crate error into the crate error taxonomy.
pub fn map_error(err: windows::core::Error, context: &str) -> ControlError {
    hresult::to_error(err.code().0, context, &err.message())
}

/// One video input device as seen by the system device enumerator.
pub struct VideoInput {
    pub device: Device,
    pub moniker: IMoniker,
}

/// Every video input device currently registered with the system.
pub fn enumerate_video_inputs() -> ControlResult<Vec<VideoInput>> {
    let dev_enum: ICreateDevEnum =
        unsafe { CoCreateInstance(&CLSID_SystemDeviceEnum, None, CLSCTX_INPROC_SERVER) }
            .map_err(|e| map_error(e, "CoCreateInstance(SystemDeviceEnum)"))?;

    let mut class_enum: Option<IEnumMoniker> = None;
    unsafe { dev_enum.CreateClassEnumerator(&CLSID_VideoInputDeviceCategory, &mut class_enum, 0) }
        .map_err(|e| map_error(e, "CreateClassEnumerator"))?;

    // S_FALSE with no enumerator means the category is empty.
    let Some(class_enum) = class_enum else {
        return Ok(Vec::new());
    };

    let mut inputs = Vec::new();
    loop {
        let mut slot: [Option<IMoniker>; 1] = [None];
        let mut fetched = 0u32;
        let hr = unsafe { class_enum.Next(&mut slot, Some(&mut fetched)) };
        if hr.is_err() || fetched == 0 {
            break;
        }
        let Some(moniker) = slot[0].take() else {
            break;
        };

        let name = read_bag_string(&moniker, w!("FriendlyName")).unwrap_or_default();
        let path = read_bag_string(&moniker, w!("DevicePath"))
            .or_else(|| display_name(&moniker))
            .unwrap_or_default();

        let device = Device::new(name, path);
        if device.is_valid() {
            inputs.push(VideoInput { device, moniker });
        }
    }

    Ok(inputs)
}

fn read_bag_string(moniker: &IMoniker, property: PCWSTR) -> Option<String> {
    let bag: IPropertyBag =
        unsafe { moniker.BindToStorage(None::<&IBindCtx>, None::<&IMoniker>) }.ok()?;
    let mut value = VARIANT::default();
    unsafe { bag.Read(property, &mut value, None::<&IErrorLog>) }.ok()?;
    let text = BSTR::try_from(&value).ok()?.to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn display_name(moniker: &IMoniker) -> Option<String> {
    let raw = unsafe { moniker.GetDisplayName(None::<&IBindCtx>, None::<&IMoniker>) }.ok()?;
    if raw.is_null() {
        return None;
    }
    let text = unsafe { raw.to_string() }.ok();
    unsafe { CoTaskMemFree(Some(raw.0 as *const _)) };
    text.filter(|t| !t.is_empty())
}

/// Bind the capture filter for `device`. A device no longer present in the
/// enumeration is reported as unavailable.
pub fn open_filter(device: &Device) -> ControlResult<IBaseFilter> {
    if !device.is_valid() {
        return Err(ControlError::invalid_argument(
            "Device handle has neither name nor path",
        ));
    }

    let input = enumerate_video_inputs()?
        .into_iter()
        .find(|input| input.device.matches(device))
        .ok_or_else(|| {
            ControlError::device_unavailable(format!("Device '{}' is not connected", device))
        })?;

    unsafe { input.moniker.BindToObject(None::<&IBindCtx>, None::<&IMoniker>) }.map_err(|e| {
        emit!(
            LogLevel::Warning,
            "Failed to bind capture filter for '{}': {}",
            device,
            e
        );
        map_error(e, "IMoniker::BindToObject")
    })
}
