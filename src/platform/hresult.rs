//! HRESULT classification and formatting.
//!
//! Kept free of OS bindings so the mapping from status codes to
//! [`ErrorKind`] is the same everywhere and testable off Windows.

use crate::errors::{ControlError, ErrorKind};

const fn hresult_from_win32(code: u32) -> i32 {
    ((code & 0x0000_FFFF) | (7 << 16) | 0x8000_0000) as i32
}

pub const S_OK: i32 = 0;
pub const E_NOTIMPL: i32 = 0x8000_4001_u32 as i32;
pub const E_NOINTERFACE: i32 = 0x8000_4002_u32 as i32;
pub const E_POINTER: i32 = 0x8000_4003_u32 as i32;
pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;
pub const E_ACCESSDENIED: i32 = 0x8007_0005_u32 as i32;
pub const E_INVALIDARG: i32 = 0x8007_0057_u32 as i32;
pub const RPC_E_CHANGED_MODE: i32 = 0x8001_0106_u32 as i32;

pub const ERROR_FILE_NOT_FOUND: i32 = hresult_from_win32(2);
pub const ERROR_BAD_LENGTH: i32 = hresult_from_win32(24);
pub const ERROR_GEN_FAILURE: i32 = hresult_from_win32(31);
pub const ERROR_INSUFFICIENT_BUFFER: i32 = hresult_from_win32(122);
pub const ERROR_MORE_DATA: i32 = hresult_from_win32(234);
pub const ERROR_DEVICE_NOT_CONNECTED: i32 = hresult_from_win32(1167);
pub const ERROR_DEVICE_IN_USE: i32 = hresult_from_win32(2404);

/// `HRESULT_FROM_WIN32(ERROR_NOT_FOUND)`: unknown property id in a known set.
pub const E_PROP_ID_UNSUPPORTED: i32 = hresult_from_win32(1168);
/// `HRESULT_FROM_WIN32(ERROR_SET_NOT_FOUND)`: property set not exposed.
pub const E_PROP_SET_UNSUPPORTED: i32 = hresult_from_win32(1170);

pub const VFW_E_CANNOT_CONNECT: i32 = 0x8004_0217_u32 as i32;
pub const VFW_E_CANNOT_RENDER: i32 = 0x8004_0218_u32 as i32;
pub const VFW_E_DEVICE_IN_USE: i32 = 0x8004_0228_u32 as i32;

pub fn failed(hr: i32) -> bool {
    hr < 0
}

pub fn facility(hr: i32) -> u16 {
    ((hr as u32 >> 16) & 0x1FFF) as u16
}

pub fn code(hr: i32) -> u16 {
    (hr as u32 & 0xFFFF) as u16
}

/// Map an HRESULT to the error taxonomy.
pub fn classify(hr: i32) -> ErrorKind {
    match hr {
        E_PROP_ID_UNSUPPORTED | E_PROP_SET_UNSUPPORTED | E_NOTIMPL | E_NOINTERFACE => {
            ErrorKind::NotSupported
        }
        ERROR_DEVICE_NOT_CONNECTED
        | ERROR_GEN_FAILURE
        | ERROR_FILE_NOT_FOUND
        | ERROR_DEVICE_IN_USE
        | E_ACCESSDENIED
        | VFW_E_CANNOT_CONNECT
        | VFW_E_CANNOT_RENDER
        | VFW_E_DEVICE_IN_USE => ErrorKind::DeviceUnavailable,
        E_INVALIDARG | ERROR_BAD_LENGTH | ERROR_INSUFFICIENT_BUFFER | E_POINTER => {
            ErrorKind::InvalidArgument
        }
        _ => ErrorKind::PlatformError,
    }
}

/// `HRESULT: 0x80070490 (Facility: 7, Code: 1168) [FAILURE]`
pub fn describe(hr: i32) -> String {
    format!(
        "HRESULT: 0x{:08X} (Facility: {}, Code: {}) [{}]",
        hr as u32,
        facility(hr),
        code(hr),
        if failed(hr) { "FAILURE" } else { "SUCCESS" }
    )
}

/// Build a [`ControlError`] for a failed OS call, keeping the status code.
pub fn to_error(hr: i32, context: &str, os_message: &str) -> ControlError {
    let message = if os_message.trim().is_empty() {
        format!("{}: {}", context, describe(hr))
    } else {
        format!("{}: {} - {}", context, describe(hr), os_message.trim())
    };
    ControlError::with_os_code(classify(hr), hr, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win32_conversion() {
        assert_eq!(E_PROP_ID_UNSUPPORTED as u32, 0x8007_0490);
        assert_eq!(E_PROP_SET_UNSUPPORTED as u32, 0x8007_0492);
        assert_eq!(ERROR_DEVICE_NOT_CONNECTED as u32, 0x8007_048F);
        assert_eq!(ERROR_MORE_DATA as u32, 0x8007_00EA);
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify(E_PROP_SET_UNSUPPORTED), ErrorKind::NotSupported);
        assert_eq!(classify(E_PROP_ID_UNSUPPORTED), ErrorKind::NotSupported);
        assert_eq!(classify(ERROR_DEVICE_NOT_CONNECTED), ErrorKind::DeviceUnavailable);
        assert_eq!(classify(VFW_E_DEVICE_IN_USE), ErrorKind::DeviceUnavailable);
        assert_eq!(classify(E_INVALIDARG), ErrorKind::InvalidArgument);
        assert_eq!(classify(E_FAIL), ErrorKind::PlatformError);
    }

    #[test]
    fn test_describe_fields() {
        assert_eq!(
            describe(E_PROP_ID_UNSUPPORTED),
            "HRESULT: 0x80070490 (Facility: 7, Code: 1168) [FAILURE]"
        );
        assert!(describe(S_OK).ends_with("[SUCCESS]"));
    }

    #[test]
    fn test_to_error_keeps_code() {
        let err = to_error(E_FAIL, "IKsPropertySet::Set", "Unspecified error\r\n");
        assert_eq!(err.kind(), ErrorKind::PlatformError);
        assert_eq!(err.os_code(), Some(E_FAIL));
        assert!(err.message().ends_with("- Unspecified error"));
    }
}
