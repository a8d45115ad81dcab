//! Async boundary for executor-based callers.
//!
//! The control stack is blocking; [`AsyncCamera`] moves each call onto
//! tokio's blocking pool so it never stalls a runtime worker.

use crate::camera::Camera;
use crate::capability::CapabilityInfo;
use crate::errors::{ControlError, ControlResult};
use crate::types::{PropRange, PropSetting, PropertyPayload, PropertySetId, StandardProperty};
use crate::vendor::PayloadCodec;

#[derive(Debug, Clone)]
pub struct AsyncCamera {
    inner: Camera,
}

impl AsyncCamera {
    pub fn new(camera: Camera) -> Self {
        Self { inner: camera }
    }

    pub fn blocking(&self) -> &Camera {
        &self.inner
    }

    pub fn into_inner(self) -> Camera {
        self.inner
    }

    async fn run<T, F>(&self, op: F) -> ControlResult<T>
    where
        T: Send + 'static,
        F: FnOnce(Camera) -> ControlResult<T> + Send + 'static,
    {
        let camera = self.inner.clone();
        tokio::task::spawn_blocking(move || op(camera))
            .await
            .map_err(|e| ControlError::platform(format!("Blocking task failed: {}", e)))?
    }

    pub async fn get(&self, prop: impl Into<StandardProperty>) -> ControlResult<PropSetting> {
        let prop = prop.into();
        self.run(move |cam| cam.get(prop)).await
    }

    pub async fn set(
        &self,
        prop: impl Into<StandardProperty>,
        setting: PropSetting,
    ) -> ControlResult<()> {
        let prop = prop.into();
        self.run(move |cam| cam.set(prop, setting)).await
    }

    pub async fn get_range(&self, prop: impl Into<StandardProperty>) -> ControlResult<PropRange> {
        let prop = prop.into();
        self.run(move |cam| cam.get_range(prop)).await
    }

    pub async fn capability(
        &self,
        prop: impl Into<StandardProperty>,
    ) -> ControlResult<CapabilityInfo> {
        let prop = prop.into();
        self.run(move |cam| cam.capability(prop)).await
    }

    pub async fn get_vendor(&self, set: PropertySetId, id: u32) -> ControlResult<PropertyPayload> {
        self.run(move |cam| cam.get_vendor(set, id)).await
    }

    pub async fn set_vendor(
        &self,
        set: PropertySetId,
        id: u32,
        payload: PropertyPayload,
    ) -> ControlResult<()> {
        self.run(move |cam| cam.set_vendor(set, id, &payload)).await
    }

    pub async fn supports_vendor(&self, set: PropertySetId, id: u32) -> ControlResult<bool> {
        self.run(move |cam| cam.supports_vendor(set, id)).await
    }

    pub async fn get_vendor_typed<T>(&self, set: PropertySetId, id: u32) -> ControlResult<T>
    where
        T: PayloadCodec + Send + 'static,
    {
        self.run(move |cam| cam.get_vendor_typed::<T>(set, id)).await
    }
}

impl From<Camera> for AsyncCamera {
    fn from(camera: Camera) -> Self {
        Self::new(camera)
    }
}
