use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of failure categories reported by every fallible operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The device does not expose the requested property or property set.
    NotSupported,
    /// The device handle is stale or the device is disconnected.
    DeviceUnavailable,
    /// A write was rejected because of a malformed payload or address.
    InvalidArgument,
    /// A payload could not be decoded into the requested type.
    DecodeError,
    /// Any other OS-level failure. Carries the OS status code when one exists.
    PlatformError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotSupported => "Property not supported by device",
            ErrorKind::DeviceUnavailable => "Device unavailable or disconnected",
            ErrorKind::InvalidArgument => "Invalid argument",
            ErrorKind::DecodeError => "Payload decode error",
            ErrorKind::PlatformError => "Platform error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error half of the result channel: a kind, a human-readable message and,
/// for platform failures, the OS status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ControlError {
    pub kind: ErrorKind,
    pub message: String,
    pub os_code: Option<i32>,
}

/// Result channel used by every fallible operation in this crate.
pub type ControlResult<T> = std::result::Result<T, ControlError>;

impl ControlError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            os_code: None,
        }
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotSupported, message)
    }

    pub fn device_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeviceUnavailable, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DecodeError, message)
    }

    /// Platform failure without a specific OS status code.
    pub fn platform(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PlatformError, message)
    }

    /// Error of the given kind that also records the OS status code it came from.
    pub fn with_os_code(kind: ErrorKind, code: i32, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            os_code: Some(code),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn os_code(&self) -> Option<i32> {
        self.os_code
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Full description including the OS status code, for diagnostics.
    pub fn description(&self) -> String {
        match self.os_code {
            Some(code) => format!("{} (0x{:08X})", self, code as u32),
            None => self.to_string(),
        }
    }
}
