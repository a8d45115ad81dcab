//! Saved control profiles.
//!
//! A profile is a snapshot of a camera's standard settings plus any vendor
//! payloads the caller asked for. It round-trips through TOML so settings can
//! be stored and re-applied later, possibly on another unit of the same model.
//!
//! ```toml
//! name = "studio"
//! device = "HD Pro Webcam C920"
//! created_at = "2026-10-16T09:30:00Z"
//!
//! [camera.Zoom]
//! value = 120
//! mode = "Manual"
//!
//! [vendor]
//! "{82066163-7BD0-43EF-8A6F-5B8905C9A64C}#1" = "01000000"
//! ```

use crate::camera::Camera;
use crate::errors::{ControlError, ControlResult, ErrorKind};
use crate::logging::{emit, LogLevel};
use crate::types::{CamProp, PropSetting, PropertyAddress, PropertyPayload, StandardProperty, VidProp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlProfile {
    pub name: String,
    /// Name of the device the profile was captured from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub camera: BTreeMap<String, PropSetting>,
    #[serde(default)]
    pub video: BTreeMap<String, PropSetting>,
    /// `{GUID}#id` to lower-case hex payload
    #[serde(default)]
    pub vendor: BTreeMap<String, String>,
}

/// Result of applying one profile entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    pub key: String,
    pub result: ControlResult<()>,
}

/// One entry that differs between two profiles. `None` means the entry is
/// absent on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDifference {
    pub key: String,
    pub left: Option<String>,
    pub right: Option<String>,
}

impl fmt::Display for ProfileDifference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.key,
            self.left.as_deref().unwrap_or("<absent>"),
            self.right.as_deref().unwrap_or("<absent>")
        )
    }
}

pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn decode_hex(text: &str) -> ControlResult<PropertyPayload> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return Err(ControlError::decode(format!(
            "Hex payload '{}' has odd length",
            text
        )));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .filter(|pair| pair.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| ControlError::decode(format!("Invalid hex payload '{}'", text)))
        })
        .collect()
}

fn setting_text(setting: &PropSetting) -> String {
    format!("{} ({})", setting.value, setting.mode)
}

impl ControlProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Snapshot every readable non-relative standard property of `camera`,
    /// plus the payloads at `vendor_addresses`.
    ///
    /// Properties the device does not expose are left out; any other
    /// failure aborts the capture.
    pub fn capture(
        camera: &Camera,
        name: impl Into<String>,
        vendor_addresses: &[PropertyAddress],
    ) -> ControlResult<Self> {
        let mut profile = Self::new(name);
        profile.device = Some(camera.device().name.clone());
        profile.created_at = Some(Utc::now());

        for prop in StandardProperty::all().filter(|p| !p.is_relative()) {
            let setting = match camera.get(prop) {
                Ok(setting) => setting,
                Err(e) if e.is(ErrorKind::NotSupported) => continue,
                Err(e) => return Err(e),
            };
            profile.insert_setting(prop, setting);
        }

        for address in vendor_addresses {
            match camera.get_vendor(address.set, address.id) {
                Ok(payload) => profile.insert_vendor(address, &payload),
                Err(e) if e.is(ErrorKind::NotSupported) => continue,
                Err(e) => return Err(e),
            }
        }

        emit!(
            LogLevel::Info,
            "Captured profile '{}' from '{}' ({} entries)",
            profile.name,
            camera.device(),
            profile.len()
        );
        Ok(profile)
    }

    pub fn insert_setting(&mut self, prop: StandardProperty, setting: PropSetting) {
        match prop {
            StandardProperty::Camera(p) => self.camera.insert(p.name().to_string(), setting),
            StandardProperty::Video(p) => self.video.insert(p.name().to_string(), setting),
        };
    }

    pub fn insert_vendor(&mut self, address: &PropertyAddress, payload: &[u8]) {
        self.vendor.insert(address.to_string(), encode_hex(payload));
    }

    pub fn len(&self) -> usize {
        self.camera.len() + self.video.len() + self.vendor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write every entry to `camera`, one OS call each.
    ///
    /// Entries are independent: a failing entry is recorded and the rest are
    /// still applied. Only a disconnected device fails the whole call.
    pub fn apply(&self, camera: &Camera) -> ControlResult<Vec<ApplyOutcome>> {
        if !camera.is_connected()? {
            return Err(ControlError::device_unavailable(format!(
                "Device '{}' not connected",
                camera.device()
            )));
        }

        let mut outcomes = Vec::with_capacity(self.len());

        for (key, setting) in &self.camera {
            let result = key
                .parse::<CamProp>()
                .and_then(|prop| camera.set(prop, *setting));
            outcomes.push(ApplyOutcome {
                key: format!("camera.{}", key),
                result,
            });
        }

        for (key, setting) in &self.video {
            let result = key
                .parse::<VidProp>()
                .and_then(|prop| camera.set(prop, *setting));
            outcomes.push(ApplyOutcome {
                key: format!("video.{}", key),
                result,
            });
        }

        for (key, hex) in &self.vendor {
            let result = key.parse::<PropertyAddress>().and_then(|address| {
                let payload = decode_hex(hex)?;
                camera.set_vendor(address.set, address.id, &payload)
            });
            outcomes.push(ApplyOutcome {
                key: format!("vendor.{}", key),
                result,
            });
        }

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        let level = if failed > 0 {
            LogLevel::Warning
        } else {
            LogLevel::Info
        };
        emit!(
            level,
            "Applied profile '{}' to '{}': {} ok, {} failed",
            self.name,
            camera.device(),
            outcomes.len() - failed,
            failed
        );
        Ok(outcomes)
    }

    /// Entries whose presence or value differ, ordered by key.
    pub fn diff(&self, other: &ControlProfile) -> Vec<ProfileDifference> {
        let mut out = Vec::new();
        diff_maps("camera", &self.camera, &other.camera, setting_text, &mut out);
        diff_maps("video", &self.video, &other.video, setting_text, &mut out);
        diff_maps("vendor", &self.vendor, &other.vendor, |s| s.clone(), &mut out);
        out
    }

    pub fn to_toml(&self) -> ControlResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ControlError::invalid_argument(format!("Failed to serialize profile: {}", e))
        })
    }

    pub fn from_toml(text: &str) -> ControlResult<Self> {
        toml::from_str(text)
            .map_err(|e| ControlError::decode(format!("Failed to parse profile: {}", e)))
    }

    /// JSON form, for handing a profile to non-Rust tooling.
    pub fn to_json(&self) -> ControlResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ControlError::invalid_argument(format!("Failed to serialize profile: {}", e))
        })
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ControlResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ControlError::platform(format!("Failed to create profile directory: {}", e))
            })?;
        }
        fs::write(path, self.to_toml()?)
            .map_err(|e| ControlError::platform(format!("Failed to write profile: {}", e)))?;
        log::info!("Saved profile '{}' to {:?}", self.name, path);
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ControlResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ControlError::invalid_argument(format!("Failed to read profile {:?}: {}", path, e))
        })?;
        let profile = Self::from_toml(&text)?;
        log::info!("Loaded profile '{}' from {:?}", profile.name, path);
        Ok(profile)
    }
}

fn diff_maps<V: PartialEq>(
    section: &str,
    left: &BTreeMap<String, V>,
    right: &BTreeMap<String, V>,
    render: impl Fn(&V) -> String,
    out: &mut Vec<ProfileDifference>,
) {
    let keys: std::collections::BTreeSet<&String> = left.keys().chain(right.keys()).collect();
    for key in keys {
        let (l, r) = (left.get(key), right.get(key));
        if l != r {
            out.push(ProfileDifference {
                key: format!("{}.{}", section, key),
                left: l.map(&render),
                right: r.map(&render),
            });
        }
    }
}
