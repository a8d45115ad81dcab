//! Core value types shared by every layer: devices, property addresses,
//! standard property enumerations and their range/setting shapes.

use crate::errors::ControlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque handle for one physical capture device.
///
/// Two handles are equal when they refer to the same platform identity
/// (device path, or friendly name when no path is known), compared with
/// ASCII case folding. Backends locate a caller's handle with
/// [`Device::matches`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Device {
    /// Human-readable device name
    pub name: String,
    /// Unique platform device path
    pub path: String,
}

impl Device {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// A device is usable when it carries at least one identifying field.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() || !self.path.is_empty()
    }

    /// Stable identifier: the path when available, otherwise the name.
    pub fn id(&self) -> &str {
        if self.path.is_empty() {
            &self.name
        } else {
            &self.path
        }
    }

    fn identity_key(&self) -> String {
        self.id().to_ascii_lowercase()
    }

    /// Whether this (enumerated) device is the one `handle` refers to.
    ///
    /// Equal identities always match. A handle that carries no path also
    /// matches any device with the same friendly name.
    pub fn matches(&self, handle: &Device) -> bool {
        if self == handle {
            return true;
        }
        handle.path.is_empty()
            && !handle.name.is_empty()
            && self.name.eq_ignore_ascii_case(&handle.name)
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for Device {}

impl Hash for Device {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_key().hash(state);
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// 128-bit property-set identifier (a COM-style GUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySetId(pub Uuid);

impl PropertySetId {
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Build from the four GUID fields as they appear in C headers.
    pub const fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self(Uuid::from_fields(data1, data2, data3, &data4))
    }

    /// Parse braced, hyphenated or simple GUID text.
    pub fn parse(text: &str) -> Result<Self, ControlError> {
        Uuid::parse_str(text.trim())
            .map(Self)
            .map_err(|e| ControlError::invalid_argument(format!("Invalid GUID '{}': {}", text, e)))
    }

    /// The 16-byte in-memory form used by the Windows `GUID` struct
    /// (first three fields little-endian).
    pub fn to_bytes_le(&self) -> [u8; 16] {
        self.0.to_bytes_le()
    }

    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }
}

impl fmt::Display for PropertySetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{:X}}}", self.0)
    }
}

impl FromStr for PropertySetId {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for PropertySetId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// (property set, property id) pair. Only meaningful together with a [`Device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyAddress {
    pub set: PropertySetId,
    pub id: u32,
}

impl PropertyAddress {
    pub const fn new(set: PropertySetId, id: u32) -> Self {
        Self { set, id }
    }
}

impl fmt::Display for PropertyAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}#{}", self.set, self.id)
    }
}

/// Parses the `{GUID}#id` form produced by `Display`.
impl FromStr for PropertyAddress {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (set, id) = s.trim().rsplit_once('#').ok_or_else(|| {
            ControlError::invalid_argument(format!("Property address '{}' lacks '#id'", s))
        })?;
        let id = id.trim().parse::<u32>().map_err(|e| {
            ControlError::invalid_argument(format!("Invalid property id in '{}': {}", s, e))
        })?;
        Ok(Self::new(PropertySetId::parse(set)?, id))
    }
}

/// Raw vendor-defined payload bytes.
pub type PropertyPayload = Vec<u8>;

/// Get/set support reported by the OS for a property address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportFlags {
    pub get: bool,
    pub set: bool,
}

impl SupportFlags {
    pub const GET_BIT: u32 = 0x1;
    pub const SET_BIT: u32 = 0x2;

    pub const NONE: SupportFlags = SupportFlags {
        get: false,
        set: false,
    };
    pub const READ_WRITE: SupportFlags = SupportFlags {
        get: true,
        set: true,
    };

    /// Decode a `KSPROPERTY_SUPPORT_*` bit mask.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            get: bits & Self::GET_BIT != 0,
            set: bits & Self::SET_BIT != 0,
        }
    }

    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.get {
            bits |= Self::GET_BIT;
        }
        if self.set {
            bits |= Self::SET_BIT;
        }
        bits
    }

    pub fn any(&self) -> bool {
        self.get || self.set
    }
}

/// Camera-control properties. Discriminants are the platform property indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CamProp {
    Pan = 0,
    Tilt = 1,
    Roll = 2,
    Zoom = 3,
    Exposure = 4,
    Iris = 5,
    Focus = 6,
    ScanMode = 7,
    Privacy = 8,
    PanRelative = 9,
    TiltRelative = 10,
    RollRelative = 11,
    ZoomRelative = 12,
    ExposureRelative = 13,
    IrisRelative = 14,
    FocusRelative = 15,
    PanTilt = 16,
    PanTiltRelative = 17,
    FocusSimple = 18,
    DigitalZoom = 19,
    DigitalZoomRelative = 20,
    BacklightCompensation = 21,
    Lamp = 22,
}

impl CamProp {
    pub const ALL: [CamProp; 23] = [
        CamProp::Pan,
        CamProp::Tilt,
        CamProp::Roll,
        CamProp::Zoom,
        CamProp::Exposure,
        CamProp::Iris,
        CamProp::Focus,
        CamProp::ScanMode,
        CamProp::Privacy,
        CamProp::PanRelative,
        CamProp::TiltRelative,
        CamProp::RollRelative,
        CamProp::ZoomRelative,
        CamProp::ExposureRelative,
        CamProp::IrisRelative,
        CamProp::FocusRelative,
        CamProp::PanTilt,
        CamProp::PanTiltRelative,
        CamProp::FocusSimple,
        CamProp::DigitalZoom,
        CamProp::DigitalZoomRelative,
        CamProp::BacklightCompensation,
        CamProp::Lamp,
    ];

    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            CamProp::Pan => "Pan",
            CamProp::Tilt => "Tilt",
            CamProp::Roll => "Roll",
            CamProp::Zoom => "Zoom",
            CamProp::Exposure => "Exposure",
            CamProp::Iris => "Iris",
            CamProp::Focus => "Focus",
            CamProp::ScanMode => "ScanMode",
            CamProp::Privacy => "Privacy",
            CamProp::PanRelative => "PanRelative",
            CamProp::TiltRelative => "TiltRelative",
            CamProp::RollRelative => "RollRelative",
            CamProp::ZoomRelative => "ZoomRelative",
            CamProp::ExposureRelative => "ExposureRelative",
            CamProp::IrisRelative => "IrisRelative",
            CamProp::FocusRelative => "FocusRelative",
            CamProp::PanTilt => "PanTilt",
            CamProp::PanTiltRelative => "PanTiltRelative",
            CamProp::FocusSimple => "FocusSimple",
            CamProp::DigitalZoom => "DigitalZoom",
            CamProp::DigitalZoomRelative => "DigitalZoomRelative",
            CamProp::BacklightCompensation => "BacklightCompensation",
            CamProp::Lamp => "Lamp",
        }
    }

    /// Relative controls are motion commands rather than stored values.
    pub fn is_relative(self) -> bool {
        matches!(
            self,
            CamProp::PanRelative
                | CamProp::TiltRelative
                | CamProp::RollRelative
                | CamProp::ZoomRelative
                | CamProp::ExposureRelative
                | CamProp::IrisRelative
                | CamProp::FocusRelative
                | CamProp::PanTiltRelative
                | CamProp::DigitalZoomRelative
        )
    }
}

impl fmt::Display for CamProp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CamProp {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CamProp::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ControlError::invalid_argument(format!("Unknown camera property: {}", s)))
    }
}

/// Video-processing properties. Discriminants are the platform property indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VidProp {
    Brightness = 0,
    Contrast = 1,
    Hue = 2,
    Saturation = 3,
    Sharpness = 4,
    Gamma = 5,
    ColorEnable = 6,
    WhiteBalance = 7,
    BacklightCompensation = 8,
    Gain = 9,
}

impl VidProp {
    pub const ALL: [VidProp; 10] = [
        VidProp::Brightness,
        VidProp::Contrast,
        VidProp::Hue,
        VidProp::Saturation,
        VidProp::Sharpness,
        VidProp::Gamma,
        VidProp::ColorEnable,
        VidProp::WhiteBalance,
        VidProp::BacklightCompensation,
        VidProp::Gain,
    ];

    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            VidProp::Brightness => "Brightness",
            VidProp::Contrast => "Contrast",
            VidProp::Hue => "Hue",
            VidProp::Saturation => "Saturation",
            VidProp::Sharpness => "Sharpness",
            VidProp::Gamma => "Gamma",
            VidProp::ColorEnable => "ColorEnable",
            VidProp::WhiteBalance => "WhiteBalance",
            VidProp::BacklightCompensation => "BacklightCompensation",
            VidProp::Gain => "Gain",
        }
    }
}

impl fmt::Display for VidProp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VidProp {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VidProp::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ControlError::invalid_argument(format!("Unknown video property: {}", s)))
    }
}

/// Any property from the fixed cross-vendor enumerations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StandardProperty {
    Camera(CamProp),
    Video(VidProp),
}

impl StandardProperty {
    /// Every standard property, camera controls first.
    pub fn all() -> impl Iterator<Item = StandardProperty> {
        CamProp::ALL
            .into_iter()
            .map(StandardProperty::Camera)
            .chain(VidProp::ALL.into_iter().map(StandardProperty::Video))
    }

    pub fn name(self) -> &'static str {
        match self {
            StandardProperty::Camera(p) => p.name(),
            StandardProperty::Video(p) => p.name(),
        }
    }

    pub fn index(self) -> i32 {
        match self {
            StandardProperty::Camera(p) => p.index(),
            StandardProperty::Video(p) => p.index(),
        }
    }

    pub fn is_relative(self) -> bool {
        match self {
            StandardProperty::Camera(p) => p.is_relative(),
            StandardProperty::Video(_) => false,
        }
    }
}

impl From<CamProp> for StandardProperty {
    fn from(prop: CamProp) -> Self {
        StandardProperty::Camera(prop)
    }
}

impl From<VidProp> for StandardProperty {
    fn from(prop: VidProp) -> Self {
        StandardProperty::Video(prop)
    }
}

impl fmt::Display for StandardProperty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StandardProperty::Camera(p) => write!(f, "camera.{}", p),
            StandardProperty::Video(p) => write!(f, "video.{}", p),
        }
    }
}

/// Automatic vs manual control of a standard property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CamMode {
    Auto,
    Manual,
}

impl CamMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CamMode::Auto => "AUTO",
            CamMode::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for CamMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value plus control mode of a standard property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropSetting {
    pub value: i32,
    pub mode: CamMode,
}

impl PropSetting {
    pub fn new(value: i32, mode: CamMode) -> Self {
        Self { value, mode }
    }

    pub fn manual(value: i32) -> Self {
        Self::new(value, CamMode::Manual)
    }

    pub fn auto(value: i32) -> Self {
        Self::new(value, CamMode::Auto)
    }
}

/// Supported range and defaults of a standard property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropRange {
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub default_value: i32,
    pub default_mode: CamMode,
}

impl PropRange {
    /// True when `value` lies within [min, max] and on a step boundary.
    /// A non-positive step only checks the bounds.
    pub fn is_valid(&self, value: i32) -> bool {
        if value < self.min || value > self.max {
            return false;
        }
        if self.step <= 0 {
            return true;
        }
        (i64::from(value) - i64::from(self.min)) % i64::from(self.step) == 0
    }

    /// Highest value that is both within range and on a step boundary.
    pub fn top(&self) -> i32 {
        if self.step <= 0 || self.max <= self.min {
            return self.max;
        }
        let span = i64::from(self.max) - i64::from(self.min);
        let step = i64::from(self.step);
        (i64::from(self.min) + span / step * step) as i32
    }

    /// Clamp to the range and round to the nearest step. The result always
    /// satisfies [`PropRange::is_valid`] when `min <= max`.
    pub fn clamp(&self, value: i32) -> i32 {
        if value <= self.min {
            return self.min;
        }
        let top = self.top();
        if value >= top {
            return top;
        }
        if self.step <= 0 {
            return value;
        }

        let min = i64::from(self.min);
        let step = i64::from(self.step);
        let steps = (i64::from(value) - min + step / 2) / step;
        let snapped = min + steps * step;
        snapped.min(i64::from(top)) as i32
    }

    pub fn default_setting(&self) -> PropSetting {
        PropSetting::new(self.default_value, self.default_mode)
    }

    /// Whether the device reports automatic control for this property.
    pub fn supports_auto(&self) -> bool {
        self.default_mode == CamMode::Auto
    }
}
