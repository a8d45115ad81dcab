//! AsyncCamera wrapper tests (requires the `tokio` feature)

use camctl::asynchronous::AsyncCamera;
use camctl::testing::MemoryPlatform;
use camctl::types::{CamMode, PropRange, PropSetting, PropertyAddress, PropertySetId, VidProp};
use camctl::{open_camera, ErrorKind};
use std::sync::Arc;

const SET: PropertySetId = PropertySetId::from_u128(0xa5a5_0000_0000_4000_8000_0000_0000_0001);

fn async_camera() -> (Arc<MemoryPlatform>, AsyncCamera) {
    let platform = Arc::new(MemoryPlatform::new());
    let device = platform.add_device("Async Cam", "async-path");
    platform.add_standard_property(
        &device,
        VidProp::Gain.into(),
        PropRange {
            min: 0,
            max: 100,
            step: 1,
            default_value: 0,
            default_mode: CamMode::Manual,
        },
        PropSetting::manual(10),
    );
    platform.add_vendor_property(&device, PropertyAddress::new(SET, 1), vec![7, 0]);
    let camera = open_camera(platform.clone(), &device).unwrap();
    (platform, AsyncCamera::new(camera))
}

#[cfg(test)]
mod async_tests {
    use super::*;

    #[tokio::test]
    async fn test_standard_round_trip() {
        let (_platform, camera) = async_camera();
        camera.set(VidProp::Gain, PropSetting::manual(42)).await.unwrap();
        assert_eq!(camera.get(VidProp::Gain).await.unwrap().value, 42);
        assert_eq!(camera.get_range(VidProp::Gain).await.unwrap().max, 100);
        assert!(camera.capability(VidProp::Gain).await.unwrap().supported_set);
    }

    #[tokio::test]
    async fn test_vendor_access() {
        let (platform, camera) = async_camera();
        assert!(camera.supports_vendor(SET, 1).await.unwrap());
        camera.set_vendor(SET, 1, vec![9, 1]).await.unwrap();
        assert_eq!(camera.get_vendor(SET, 1).await.unwrap(), vec![9, 1]);

        let value: u16 = camera.get_vendor_typed(SET, 1).await.unwrap();
        assert_eq!(value, 0x0109);

        let device = camera.blocking().device().clone();
        assert_eq!(
            platform.payload(&device, &PropertyAddress::new(SET, 1)),
            Some(vec![9, 1])
        );
    }

    #[tokio::test]
    async fn test_errors_cross_the_boundary_unchanged() {
        let (platform, camera) = async_camera();
        let err = camera.get_vendor(SET, 99).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);

        platform.disconnect(camera.blocking().device());
        let err = camera.get(VidProp::Gain).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
    }

    #[test]
    fn test_block_on_outside_runtime() {
        let (_platform, camera) = async_camera();
        let setting = tokio_test::block_on(camera.get(VidProp::Gain)).unwrap();
        assert_eq!(setting, PropSetting::manual(10));
        assert_eq!(camera.into_inner().device().name, "Async Cam");
    }
}
