//! camctl: camera property control with vendor extension support
//!
//! This crate reads and writes camera controls through a small, typed API:
//! the standard UVC-style properties (brightness, zoom, pan/tilt, ...) and
//! vendor extension properties addressed by property-set GUID and numeric id.
//!
//! # Features
//! - Standard camera-control and video-processing properties with ranges
//! - Raw and typed access to vendor property sets
//! - Vendor tables (Logitech RightLight, face tracking, ...)
//! - Capability probing per device and per property
//! - Process-wide callback logging with a minimum level
//! - Saved control profiles in TOML
//! - Optional tokio wrapper (`tokio` feature)
//!
//! # Usage
//! ```rust,ignore
//! use camctl::{open_camera_by_index, create_backend, CamProp, PropSetting};
//! use camctl::vendor::logitech::{self, LogitechProperty};
//!
//! let backend = create_backend()?;
//! let camera = open_camera_by_index(backend, 0)?;
//! camera.set_clamped(CamProp::Zoom, PropSetting::manual(150))?;
//!
//! if logitech::supports_logitech_properties(camera.backend().as_ref(), camera.device())? {
//!     let on: bool = camera.get_named_typed(LogitechProperty::FaceTracking)?;
//! }
//! ```
pub mod camera;
pub mod capability;
pub mod config;
pub mod errors;
pub mod logging;
pub mod platform;
pub mod profile;
pub mod types;
pub mod vendor;

#[cfg(feature = "tokio")]
pub mod asynchronous;

// Testing utilities - in-memory platform for offline testing
pub mod testing;

// Re-exports for convenience
pub use camera::{open_camera, open_camera_by_index, Camera};
pub use capability::{CapabilityInfo, DeviceCapabilities};
pub use config::CamCtlConfig;
pub use errors::{ControlError, ControlResult, ErrorKind};
pub use logging::{LogLevel, LoggingSession};
pub use platform::{create_backend, Backend, Platform, PropertyTransport};
pub use profile::ControlProfile;
pub use types::{
    CamMode, CamProp, Device, PropRange, PropSetting, PropertyAddress, PropertyPayload,
    PropertySetId, StandardProperty, SupportFlags, VidProp,
};
pub use vendor::{
    get_vendor_property, query_vendor_property_support, set_vendor_property, PayloadCodec,
    VendorProperty,
};

/// Detect the current platform using the Platform enum
pub fn current_platform() -> Platform {
    Platform::current()
}

/// Initialize `env_logger` for the `log` facade side of library events
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "camctl=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        platform: Platform::current(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub platform: Platform,
}

/// Human-readable environment report for bug reports.
pub fn diagnostic_info() -> String {
    let info = get_info();
    let backend = match create_backend() {
        Ok(backend) => match backend.list_devices() {
            Ok(devices) => format!("{} ({} device(s))", backend.name(), devices.len()),
            Err(e) => format!("{} (enumeration failed: {})", backend.name(), e),
        },
        Err(e) => format!("unavailable ({})", e.message()),
    };

    let mut report = String::new();
    report.push_str(&format!("{} {}\n", info.name, info.version));
    report.push_str(&format!("Platform: {}\n", info.platform.as_str()));
    report.push_str(&format!("Backend: {}\n", backend));
    report.push_str(&format!("Log level: {}\n", logging::get_log_level()));
    report.push_str(&format!(
        "Log callback: {}\n",
        if logging::has_log_callback() {
            "installed"
        } else {
            "none"
        }
    ));
    report
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let platform = current_platform();
        assert_ne!(platform, Platform::Unknown);
    }

    #[test]
    fn test_crate_info() {
        let info = get_info();
        assert_eq!(info.name, "camctl");
        assert!(!info.version.is_empty());
        assert!(!info.description.is_empty());
    }

    #[test]
    fn test_crate_info_serializes() {
        let json = serde_json::to_string(&get_info()).unwrap();
        assert!(json.contains("\"name\":\"camctl\""));
    }

    #[test]
    fn test_diagnostic_report_sections() {
        let report = diagnostic_info();
        assert!(report.starts_with("camctl "));
        assert!(report.contains("Platform: "));
        assert!(report.contains("Backend: "));
        assert!(report.contains("Log level: "));
    }
}
