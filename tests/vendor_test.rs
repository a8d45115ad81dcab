//! Tests for the vendor property layer and vendor tables
//!
//! Runs entirely against the in-memory platform.

use camctl::testing::MemoryPlatform;
use camctl::types::{Device, PropertyAddress, PropertySetId, SupportFlags};
use camctl::vendor::logitech::{self, LogitechProperty, LOGITECH_PROPERTY_SET};
use camctl::vendor::{self, named, NamedProperty};
use camctl::{ControlError, ErrorKind};

const SET_X: PropertySetId = PropertySetId::from_u128(0x0badf00d_0000_4000_8000_00000000abcd);

fn platform_with_device() -> (MemoryPlatform, Device) {
    let platform = MemoryPlatform::new();
    let device = platform.add_device("Test Cam", "usb#vid_046d&pid_0000");
    (platform, device)
}

#[cfg(test)]
mod raw_access_tests {
    use super::*;

    #[test]
    fn test_set_then_get_returns_same_payload() {
        let (platform, device) = platform_with_device();
        let address = PropertyAddress::new(SET_X, 2);
        platform.add_vendor_property(&device, address, vec![0; 3]);

        vendor::set_vendor_property(&platform, &device, SET_X, 2, &[0xDE, 0xAD, 0x01]).unwrap();
        let payload = vendor::get_vendor_property(&platform, &device, SET_X, 2).unwrap();
        assert_eq!(payload, vec![0xDE, 0xAD, 0x01]);
    }

    #[test]
    fn test_unsupported_address_scenario() {
        let (platform, device) = platform_with_device();

        assert!(!vendor::query_vendor_property_support(&platform, &device, SET_X, 7).unwrap());

        let get = vendor::get_vendor_property(&platform, &device, SET_X, 7).unwrap_err();
        assert_eq!(get.kind(), ErrorKind::NotSupported);

        let set = vendor::set_vendor_property(&platform, &device, SET_X, 7, &[1]).unwrap_err();
        assert_eq!(set.kind(), ErrorKind::NotSupported);
    }

    #[test]
    fn test_get_only_property_keeps_flags_apart() {
        let (platform, device) = platform_with_device();
        let address = PropertyAddress::new(SET_X, 4);
        platform.add_vendor_property_with(
            &device,
            address,
            SupportFlags::from_bits(SupportFlags::GET_BIT),
            vec![5],
            None,
        );

        let flags = vendor::vendor_support_flags(&platform, &device, SET_X, 4).unwrap();
        assert!(flags.get);
        assert!(!flags.set);
        assert!(vendor::query_vendor_property_support(&platform, &device, SET_X, 4).unwrap());

        let err = vendor::set_vendor_property(&platform, &device, SET_X, 4, &[6]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
        assert_eq!(platform.payload(&device, &address), Some(vec![5]));
    }

    #[test]
    fn test_disconnected_device_is_unavailable_not_unsupported() {
        let (platform, device) = platform_with_device();
        platform.add_vendor_property(&device, PropertyAddress::new(SET_X, 1), vec![1]);
        platform.disconnect(&device);

        let query = vendor::query_vendor_property_support(&platform, &device, SET_X, 1).unwrap_err();
        assert_eq!(query.kind(), ErrorKind::DeviceUnavailable);
        let get = vendor::get_vendor_property(&platform, &device, SET_X, 1).unwrap_err();
        assert_eq!(get.kind(), ErrorKind::DeviceUnavailable);
    }

    #[test]
    fn test_platform_error_passes_through_unchanged() {
        let (platform, device) = platform_with_device();
        platform.add_vendor_property(&device, PropertyAddress::new(SET_X, 1), vec![1]);
        let injected =
            ControlError::with_os_code(ErrorKind::PlatformError, 0x8000_4005_u32 as i32, "E_FAIL");
        platform.inject_fault(camctl::testing::Operation::GetRaw, injected.clone());

        let err = vendor::get_vendor_property(&platform, &device, SET_X, 1).unwrap_err();
        assert_eq!(err, injected);
    }

    #[test]
    fn test_no_caching_between_calls() {
        let (platform, device) = platform_with_device();
        let address = PropertyAddress::new(SET_X, 3);
        platform.add_vendor_property(&device, address, vec![1]);

        assert_eq!(vendor::get_vendor_property(&platform, &device, SET_X, 3).unwrap(), vec![1]);
        platform.set_payload_out_of_band(&device, &address, vec![2]);
        assert_eq!(vendor::get_vendor_property(&platform, &device, SET_X, 3).unwrap(), vec![2]);
        assert_eq!(platform.call_counts(&address).get, 2);
    }

    #[test]
    fn test_fixed_length_write_rejected_as_invalid_argument() {
        let (platform, device) = platform_with_device();
        platform.add_vendor_property_with(
            &device,
            PropertyAddress::new(SET_X, 5),
            SupportFlags::READ_WRITE,
            vec![0; 4],
            Some(4),
        );
        let err = vendor::set_vendor_property(&platform, &device, SET_X, 5, &[1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}

#[cfg(test)]
mod typed_access_tests {
    use super::*;

    #[test]
    fn test_four_byte_little_endian_one() {
        let (platform, device) = platform_with_device();
        platform.add_vendor_property(&device, PropertyAddress::new(SET_X, 8), vec![0; 4]);

        vendor::set_vendor_property(&platform, &device, SET_X, 8, &[0x01, 0x00, 0x00, 0x00])
            .unwrap();
        let value: u32 = vendor::get_typed(&platform, &device, SET_X, 8).unwrap();
        assert_eq!(value, 1);
        let signed: i32 = vendor::get_typed(&platform, &device, SET_X, 8).unwrap();
        assert_eq!(signed, 1);
    }

    #[test]
    fn test_typed_set_writes_encoded_bytes() {
        let (platform, device) = platform_with_device();
        let address = PropertyAddress::new(SET_X, 9);
        platform.add_vendor_property(&device, address, vec![0; 2]);

        vendor::set_typed(&platform, &device, SET_X, 9, &(-2i16)).unwrap();
        assert_eq!(platform.payload(&device, &address), Some(vec![0xFE, 0xFF]));
    }

    #[test]
    fn test_length_mismatch_is_decode_error() {
        let (platform, device) = platform_with_device();
        platform.add_vendor_property(&device, PropertyAddress::new(SET_X, 10), vec![1, 0]);

        let err = vendor::get_typed::<u32, _>(&platform, &device, SET_X, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
        let ok = vendor::get_typed::<u16, _>(&platform, &device, SET_X, 10).unwrap();
        assert_eq!(ok, 1);
    }
}

#[cfg(test)]
mod logitech_tests {
    use super::*;

    fn logitech_device() -> (MemoryPlatform, Device) {
        let (platform, device) = platform_with_device();
        for prop in LogitechProperty::ALL {
            platform.add_vendor_property(&device, prop.address(), vec![0, 0, 0, 0]);
        }
        (platform, device)
    }

    #[test]
    fn test_module_call_equals_generic_call() {
        let (platform, device) = logitech_device();
        platform.set_payload_out_of_band(
            &device,
            &LogitechProperty::RightLight.address(),
            vec![3, 0, 0, 0],
        );

        let via_module = logitech::get(&platform, &device, LogitechProperty::RightLight).unwrap();
        let via_generic =
            vendor::get_vendor_property(&platform, &device, LOGITECH_PROPERTY_SET, 1).unwrap();
        assert_eq!(via_module, via_generic);

        let counts = platform.call_counts(&PropertyAddress::new(LOGITECH_PROPERTY_SET, 1));
        assert_eq!(counts.get, 2);
    }

    #[test]
    fn test_every_table_entry_addresses_the_logitech_set() {
        let (platform, device) = logitech_device();
        for prop in LogitechProperty::ALL {
            logitech::set(&platform, &device, *prop, &[prop.id() as u8, 0, 0, 0]).unwrap();
            let generic =
                vendor::get_vendor_property(&platform, &device, LOGITECH_PROPERTY_SET, prop.id())
                    .unwrap();
            assert_eq!(generic[0] as u32, prop.id(), "{}", prop);
        }
    }

    #[test]
    fn test_typed_helpers() {
        let (platform, device) = logitech_device();
        logitech::set_typed(&platform, &device, LogitechProperty::FaceTracking, &1u32).unwrap();
        let value: u32 =
            logitech::get_typed(&platform, &device, LogitechProperty::FaceTracking).unwrap();
        assert_eq!(value, 1);

        let err = logitech::get_typed::<bool, _>(&platform, &device, LogitechProperty::FaceTracking)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
    }

    #[test]
    fn test_supports_logitech_properties() {
        let (platform, device) = logitech_device();
        assert!(logitech::supports_logitech_properties(&platform, &device).unwrap());

        let (plain, other) = platform_with_device();
        assert!(!logitech::supports_logitech_properties(&plain, &other).unwrap());

        plain.disconnect(&other);
        assert_eq!(
            logitech::supports_logitech_properties(&plain, &other)
                .unwrap_err()
                .kind(),
            ErrorKind::DeviceUnavailable
        );
    }

    #[test]
    fn test_named_capability_is_boolean_pair() {
        let (platform, device) = logitech_device();
        let info = named::capability(&platform, &device, LogitechProperty::LedIndicator).unwrap();
        assert!(info.supported_get && info.supported_set);
        assert!(info.range.is_none());
        assert!(named::supports(&platform, &device, LogitechProperty::TiltPan).unwrap());
    }
}
