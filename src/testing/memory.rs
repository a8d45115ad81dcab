//! In-memory platform backend for testing without hardware.

use crate::errors::{ControlError, ControlResult};
use crate::platform::{
    trace_call, trace_standard, Backend, DeviceEnumerator, PropertyTransport, StandardControls,
};
use crate::types::{
    Device, PropRange, PropSetting, PropertyAddress, PropertyPayload, StandardProperty,
    SupportFlags,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Platform operation, used to target fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetRaw,
    SetRaw,
    QuerySupport,
    GetSetting,
    SetSetting,
    GetRange,
}

/// Per-address counts of transport calls that reached the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get: usize,
    pub set: usize,
    pub query: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.get + self.set + self.query
    }
}

#[derive(Debug, Clone)]
struct VendorSlot {
    flags: SupportFlags,
    payload: PropertyPayload,
    fixed_len: Option<usize>,
}

#[derive(Debug, Clone)]
struct StandardSlot {
    range: PropRange,
    setting: PropSetting,
}

#[derive(Debug, Default)]
struct DeviceEntry {
    device: Device,
    connected: bool,
    vendor: HashMap<PropertyAddress, VendorSlot>,
    standard: HashMap<StandardProperty, StandardSlot>,
}

#[derive(Debug, Default)]
struct State {
    devices: Vec<DeviceEntry>,
    faults: HashMap<Operation, ControlError>,
    calls: HashMap<PropertyAddress, CallCounts>,
}

impl State {
    fn entry(&self, device: &Device) -> Option<&DeviceEntry> {
        self.devices.iter().find(|e| e.device.matches(device))
    }

    fn entry_mut(&mut self, device: &Device) -> Option<&mut DeviceEntry> {
        self.devices.iter_mut().find(|e| e.device.matches(device))
    }

    fn live_entry_mut(&mut self, device: &Device) -> ControlResult<&mut DeviceEntry> {
        match self.entry_mut(device) {
            Some(entry) if entry.connected => Ok(entry),
            Some(_) => Err(ControlError::device_unavailable(format!(
                "Device '{}' is disconnected",
                device
            ))),
            None => Err(ControlError::device_unavailable(format!(
                "Device '{}' not found",
                device
            ))),
        }
    }

    fn take_fault(&mut self, op: Operation) -> ControlResult<()> {
        match self.faults.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn count(&mut self, address: &PropertyAddress) -> &mut CallCounts {
        self.calls.entry(*address).or_default()
    }
}

/// Thread-safe in-memory implementation of every platform trait.
///
/// Devices, vendor addresses and standard properties are registered up
/// front; calls then behave like a real device: unknown addresses are
/// `NotSupported`, disconnected devices are `DeviceUnavailable` and
/// fixed-size vendor properties reject payloads of the wrong length.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    state: Mutex<State>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a connected device and return its handle.
    pub fn add_device(&self, name: &str, path: &str) -> Device {
        let device = Device::new(name, path);
        let mut state = self.lock();
        if state.entry(&device).is_none() {
            state.devices.push(DeviceEntry {
                device: device.clone(),
                connected: true,
                ..DeviceEntry::default()
            });
        }
        device
    }

    pub fn disconnect(&self, device: &Device) {
        if let Some(entry) = self.lock().entry_mut(device) {
            entry.connected = false;
        }
    }

    pub fn reconnect(&self, device: &Device) {
        if let Some(entry) = self.lock().entry_mut(device) {
            entry.connected = true;
        }
    }

    /// Read/write vendor property of any payload length.
    pub fn add_vendor_property(
        &self,
        device: &Device,
        address: PropertyAddress,
        initial: PropertyPayload,
    ) {
        self.add_vendor_property_with(device, address, SupportFlags::READ_WRITE, initial, None);
    }

    /// Vendor property with explicit support flags and, optionally, a
    /// payload length every write must match.
    pub fn add_vendor_property_with(
        &self,
        device: &Device,
        address: PropertyAddress,
        flags: SupportFlags,
        initial: PropertyPayload,
        fixed_len: Option<usize>,
    ) {
        if let Some(entry) = self.lock().entry_mut(device) {
            entry.vendor.insert(
                address,
                VendorSlot {
                    flags,
                    payload: initial,
                    fixed_len,
                },
            );
        }
    }

    pub fn add_standard_property(
        &self,
        device: &Device,
        prop: StandardProperty,
        range: PropRange,
        setting: PropSetting,
    ) {
        if let Some(entry) = self.lock().entry_mut(device) {
            entry.standard.insert(prop, StandardSlot { range, setting });
        }
    }

    /// Fail the next call of `op` (on any device) with `error`.
    pub fn inject_fault(&self, op: Operation, error: ControlError) {
        self.lock().faults.insert(op, error);
    }

    /// Change a vendor payload behind the library's back, as a physical
    /// control or another application would.
    pub fn set_payload_out_of_band(
        &self,
        device: &Device,
        address: &PropertyAddress,
        payload: PropertyPayload,
    ) {
        if let Some(slot) = self
            .lock()
            .entry_mut(device)
            .and_then(|e| e.vendor.get_mut(address))
        {
            slot.payload = payload;
        }
    }

    /// Stored vendor payload, without counting as a call.
    pub fn payload(&self, device: &Device, address: &PropertyAddress) -> Option<PropertyPayload> {
        self.lock()
            .entry(device)
            .and_then(|e| e.vendor.get(address))
            .map(|slot| slot.payload.clone())
    }

    /// Stored standard setting, without counting as a call.
    pub fn setting(&self, device: &Device, prop: StandardProperty) -> Option<PropSetting> {
        self.lock()
            .entry(device)
            .and_then(|e| e.standard.get(&prop))
            .map(|slot| slot.setting)
    }

    pub fn call_counts(&self, address: &PropertyAddress) -> CallCounts {
        self.lock().calls.get(address).copied().unwrap_or_default()
    }

    fn get_raw_inner(&self, device: &Device, address: &PropertyAddress) -> ControlResult<PropertyPayload> {
        let mut state = self.lock();
        state.count(address).get += 1;
        state.take_fault(Operation::GetRaw)?;
        let entry = state.live_entry_mut(device)?;
        match entry.vendor.get(address) {
            Some(slot) if slot.flags.get => Ok(slot.payload.clone()),
            _ => Err(ControlError::not_supported(format!(
                "Property {} not exposed by '{}'",
                address, device
            ))),
        }
    }

    fn set_raw_inner(&self, device: &Device, address: &PropertyAddress, payload: &[u8]) -> ControlResult<()> {
        let mut state = self.lock();
        state.count(address).set += 1;
        state.take_fault(Operation::SetRaw)?;
        let entry = state.live_entry_mut(device)?;
        let slot = match entry.vendor.get_mut(address) {
            Some(slot) if slot.flags.set => slot,
            _ => {
                return Err(ControlError::not_supported(format!(
                    "Property {} not writable on '{}'",
                    address, device
                )))
            }
        };
        if payload.is_empty() {
            return Err(ControlError::invalid_argument("Empty payload"));
        }
        if let Some(len) = slot.fixed_len {
            if payload.len() != len {
                return Err(ControlError::invalid_argument(format!(
                    "Payload for {} must be {} bytes, got {}",
                    address,
                    len,
                    payload.len()
                )));
            }
        }
        slot.payload = payload.to_vec();
        Ok(())
    }

    fn support_flags_inner(&self, device: &Device, address: &PropertyAddress) -> ControlResult<SupportFlags> {
        let mut state = self.lock();
        state.count(address).query += 1;
        state.take_fault(Operation::QuerySupport)?;
        let entry = state.live_entry_mut(device)?;
        Ok(entry
            .vendor
            .get(address)
            .map(|slot| slot.flags)
            .unwrap_or(SupportFlags::NONE))
    }

    fn standard_slot(
        &self,
        op: Operation,
        device: &Device,
        prop: StandardProperty,
    ) -> ControlResult<StandardSlot> {
        let mut state = self.lock();
        state.take_fault(op)?;
        let entry = state.live_entry_mut(device)?;
        entry.standard.get(&prop).cloned().ok_or_else(|| {
            ControlError::not_supported(format!("{} not exposed by '{}'", prop, device))
        })
    }
}

impl PropertyTransport for MemoryPlatform {
    fn get_raw(&self, device: &Device, address: &PropertyAddress) -> ControlResult<PropertyPayload> {
        let result = self.get_raw_inner(device, address);
        trace_call("get", device, address, &result);
        result
    }

    fn set_raw(&self, device: &Device, address: &PropertyAddress, payload: &[u8]) -> ControlResult<()> {
        let result = self.set_raw_inner(device, address, payload);
        trace_call("set", device, address, &result);
        result
    }

    fn support_flags(&self, device: &Device, address: &PropertyAddress) -> ControlResult<SupportFlags> {
        let result = self.support_flags_inner(device, address);
        trace_call("query", device, address, &result);
        result
    }
}

impl StandardControls for MemoryPlatform {
    fn get_setting(&self, device: &Device, prop: StandardProperty) -> ControlResult<PropSetting> {
        let result = self
            .standard_slot(Operation::GetSetting, device, prop)
            .map(|slot| slot.setting);
        trace_standard("get", device, prop, &result);
        result
    }

    fn set_setting(&self, device: &Device, prop: StandardProperty, setting: PropSetting) -> ControlResult<()> {
        let result = (|| {
            let mut state = self.lock();
            state.take_fault(Operation::SetSetting)?;
            let entry = state.live_entry_mut(device)?;
            let slot = entry.standard.get_mut(&prop).ok_or_else(|| {
                ControlError::not_supported(format!("{} not exposed by '{}'", prop, device))
            })?;
            if !slot.range.is_valid(setting.value) {
                return Err(ControlError::invalid_argument(format!(
                    "{} value {} outside [{}, {}] step {}",
                    prop, setting.value, slot.range.min, slot.range.max, slot.range.step
                )));
            }
            slot.setting = setting;
            Ok(())
        })();
        trace_standard("set", device, prop, &result);
        result
    }

    fn get_range(&self, device: &Device, prop: StandardProperty) -> ControlResult<PropRange> {
        let result = self
            .standard_slot(Operation::GetRange, device, prop)
            .map(|slot| slot.range);
        trace_standard("range", device, prop, &result);
        result
    }
}

impl DeviceEnumerator for MemoryPlatform {
    fn list_devices(&self) -> ControlResult<Vec<Device>> {
        Ok(self
            .lock()
            .devices
            .iter()
            .filter(|e| e.connected)
            .map(|e| e.device.clone())
            .collect())
    }

    fn is_device_connected(&self, device: &Device) -> ControlResult<bool> {
        Ok(self.lock().entry(device).map(|e| e.connected).unwrap_or(false))
    }
}

impl Backend for MemoryPlatform {
    fn name(&self) -> &'static str {
        "memory"
    }
}
