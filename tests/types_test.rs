//! Tests for camctl core types
//!
//! Ensures type safety and correct behavior of fundamental data structures.

use camctl::types::{
    CamMode, CamProp, Device, PropRange, PropSetting, PropertyAddress, PropertySetId,
    StandardProperty, SupportFlags, VidProp,
};
use camctl::Platform;
use std::collections::HashSet;

#[cfg(test)]
mod platform_tests {
    use super::*;

    #[test]
    fn test_platform_current_detection() {
        let platform = Platform::current();
        assert_ne!(platform, Platform::Unknown, "Platform should be detected");
    }

    #[test]
    fn test_platform_as_str() {
        assert_eq!(Platform::Windows.as_str(), "windows");
        assert_eq!(Platform::MacOS.as_str(), "macos");
        assert_eq!(Platform::Linux.as_str(), "linux");
        assert_eq!(Platform::Unknown.as_str(), "unknown");
    }

    #[test]
    fn test_native_backend_only_on_windows() {
        assert!(Platform::Windows.has_native_backend());
        assert!(!Platform::Linux.has_native_backend());
    }
}

#[cfg(test)]
mod device_tests {
    use super::*;

    #[test]
    fn test_device_equality_ignores_name_and_case() {
        let a = Device::new("Logitech BRIO", "\\\\?\\USB#VID_046D&PID_085E#1");
        let b = Device::new("BRIO 4K", "\\\\?\\usb#vid_046d&pid_085e#1");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_device_without_path_uses_name() {
        let a = Device::new("Integrated Webcam", "");
        let b = Device::new("integrated webcam", "");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Integrated Webcam");
    }

    #[test]
    fn test_device_serialization() {
        let device = Device::new("Cam", "path");
        let json = serde_json::to_string(&device).unwrap();
        let back: Device = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "Cam");
        assert_eq!(back.path, "path");
    }
}

#[cfg(test)]
mod address_tests {
    use super::*;

    #[test]
    fn test_property_set_id_from_fields_matches_text() {
        let from_fields = PropertySetId::from_fields(
            0x8206_6163,
            0x7BD0,
            0x43EF,
            [0x8A, 0x6F, 0x5B, 0x89, 0x05, 0xC9, 0xA6, 0x4C],
        );
        let parsed: PropertySetId = "{82066163-7BD0-43EF-8A6F-5B8905C9A64C}".parse().unwrap();
        assert_eq!(from_fields, parsed);
    }

    #[test]
    fn test_addresses_order_by_set_then_id() {
        let set = PropertySetId::from_u128(1);
        let mut addresses = vec![
            PropertyAddress::new(set, 3),
            PropertyAddress::new(set, 1),
            PropertyAddress::new(PropertySetId::from_u128(0), 9),
        ];
        addresses.sort();
        assert_eq!(addresses[0].id, 9);
        assert_eq!(addresses[1].id, 1);
    }

    #[test]
    fn test_support_flags_from_kernel_bits() {
        let flags = SupportFlags::from_bits(SupportFlags::SET_BIT);
        assert!(!flags.get);
        assert!(flags.set);
        assert!(flags.any());
        assert_eq!(SupportFlags::default(), SupportFlags::NONE);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    #[test]
    fn test_standard_property_listing() {
        let all: Vec<StandardProperty> = StandardProperty::all().collect();
        assert_eq!(all.len(), CamProp::ALL.len() + VidProp::ALL.len());
        assert_eq!(all[0], StandardProperty::Camera(CamProp::Pan));
        assert_eq!(
            all.last().copied(),
            Some(StandardProperty::Video(VidProp::Gain))
        );
    }

    #[test]
    fn test_relative_controls() {
        assert!(CamProp::ZoomRelative.is_relative());
        assert!(!CamProp::Zoom.is_relative());
        assert!(!StandardProperty::Video(VidProp::Gain).is_relative());
    }

    #[test]
    fn test_standard_property_display() {
        assert_eq!(StandardProperty::from(CamProp::Focus).to_string(), "camera.Focus");
        assert_eq!(StandardProperty::from(VidProp::Gamma).to_string(), "video.Gamma");
    }

    #[test]
    fn test_prop_setting_constructors() {
        assert_eq!(PropSetting::auto(5), PropSetting::new(5, CamMode::Auto));
        assert_eq!(PropSetting::manual(5).mode, CamMode::Manual);
    }

    #[test]
    fn test_range_defaults() {
        let range = PropRange {
            min: -180,
            max: 180,
            step: 1,
            default_value: 0,
            default_mode: CamMode::Manual,
        };
        assert_eq!(range.default_setting(), PropSetting::manual(0));
        assert!(!range.supports_auto());
        assert_eq!(range.clamp(-200), -180);
    }
}
