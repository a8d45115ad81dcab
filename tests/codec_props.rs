//! Property-Based Tests for payload codecs and the vendor transport
//!
//! Run with: cargo test --test codec_props

use camctl::testing::MemoryPlatform;
use camctl::types::{PropRange, PropertyAddress, PropertySetId, CamMode};
use camctl::vendor::{self, PayloadCodec};
use camctl::ErrorKind;
use proptest::prelude::*;

const SET: PropertySetId = PropertySetId::from_u128(0x5e7a_1111_2222_3333_4444_555566667777);

fn length_mismatch<T: PayloadCodec>(len: usize) -> bool {
    let bytes = vec![0xA5u8; len];
    match T::decode(&bytes) {
        Ok(_) => len == T::ENCODED_LEN,
        Err(e) => len != T::ENCODED_LEN && e.kind() == ErrorKind::DecodeError,
    }
}

proptest! {
    /// INVARIANT: decode fails with DecodeError exactly when the length is wrong
    #[test]
    fn decode_rejects_every_wrong_length(len in 0usize..16) {
        prop_assert!(length_mismatch::<u8>(len));
        prop_assert!(length_mismatch::<i16>(len));
        prop_assert!(length_mismatch::<u32>(len));
        prop_assert!(length_mismatch::<i64>(len));
        prop_assert!(length_mismatch::<f32>(len));
        prop_assert!(length_mismatch::<bool>(len));
        prop_assert!(length_mismatch::<[u8; 6]>(len));
    }

    /// INVARIANT: set_raw then get_raw returns the payload that was written
    #[test]
    fn raw_round_trip(id in 0u32..64, payload in proptest::collection::vec(any::<u8>(), 1..64)) {
        let platform = MemoryPlatform::new();
        let device = platform.add_device("Prop Cam", "prop-path");
        platform.add_vendor_property(&device, PropertyAddress::new(SET, id), vec![0]);

        vendor::set_vendor_property(&platform, &device, SET, id, &payload).unwrap();
        let read = vendor::get_vendor_property(&platform, &device, SET, id).unwrap();
        prop_assert_eq!(read, payload);
    }

    /// INVARIANT: unsupported addresses fail get and set with NotSupported
    #[test]
    fn unsupported_addresses_fail_both_ways(id in any::<u32>()) {
        let platform = MemoryPlatform::new();
        let device = platform.add_device("Prop Cam", "prop-path");

        prop_assert!(!vendor::query_vendor_property_support(&platform, &device, SET, id).unwrap());
        let get = vendor::get_vendor_property(&platform, &device, SET, id).unwrap_err();
        let set = vendor::set_vendor_property(&platform, &device, SET, id, &[1]).unwrap_err();
        prop_assert_eq!(get.kind(), ErrorKind::NotSupported);
        prop_assert_eq!(set.kind(), ErrorKind::NotSupported);
    }

    /// INVARIANT: typed i32 values survive the little-endian encoding
    #[test]
    fn typed_i32_through_transport(value in any::<i32>()) {
        let platform = MemoryPlatform::new();
        let device = platform.add_device("Prop Cam", "prop-path");
        platform.add_vendor_property(&device, PropertyAddress::new(SET, 1), vec![0; 4]);

        vendor::set_typed(&platform, &device, SET, 1, &value).unwrap();
        let read: i32 = vendor::get_typed(&platform, &device, SET, 1).unwrap();
        prop_assert_eq!(read, value);
    }

    /// INVARIANT: clamp always lands inside the range and on a valid value
    #[test]
    fn clamp_stays_in_range(
        min in -1000i32..1000,
        span in 0i32..2000,
        step in 1i32..50,
        value in any::<i32>(),
    ) {
        let range = PropRange {
            min,
            max: min + span,
            step,
            default_value: min,
            default_mode: CamMode::Manual,
        };
        let clamped = range.clamp(value);
        prop_assert!(clamped >= range.min && clamped <= range.max);
        prop_assert!(range.is_valid(clamped));
    }
}
