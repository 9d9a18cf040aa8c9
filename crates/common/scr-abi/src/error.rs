use core::fmt;

/// Error codes shared with the boot runtime. The numeric values are part of
/// the calling contract and are returned verbatim to the runtime.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(i32)]
pub enum SbiError {
    Failed = -1,
    NotSupported = -2,
    InvalidParam = -3,
    Denied = -4,
    InvalidAddress = -5,
    AlreadyAvailable = -6,
    AlreadyStarted = -7,
    AlreadyStopped = -8,
}

pub type SbiResult<T> = Result<T, SbiError>;

assert_eq_size!(i32, SbiError);

impl SbiError {
    /// Raw error code as seen by the runtime.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Decode a raw runtime return value. `0` is success and has no error.
    pub fn from_code(code: i32) -> Option<SbiError> {
        Some(match code {
            -1 => SbiError::Failed,
            -2 => SbiError::NotSupported,
            -3 => SbiError::InvalidParam,
            -4 => SbiError::Denied,
            -5 => SbiError::InvalidAddress,
            -6 => SbiError::AlreadyAvailable,
            -7 => SbiError::AlreadyStarted,
            -8 => SbiError::AlreadyStopped,
            _ => return None,
        })
    }

    /// Fold a result into the runtime's integer convention.
    pub fn into_code(result: SbiResult<()>) -> i32 {
        match result {
            Ok(()) => 0,
            Err(e) => e.code(),
        }
    }
}

impl fmt::Display for SbiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SbiError::Failed => "failed",
            SbiError::NotSupported => "not supported",
            SbiError::InvalidParam => "invalid parameter",
            SbiError::Denied => "denied",
            SbiError::InvalidAddress => "invalid address",
            SbiError::AlreadyAvailable => "already available",
            SbiError::AlreadyStarted => "already started",
            SbiError::AlreadyStopped => "already stopped",
        };
        write!(f, "{} ({})", msg, self.code())
    }
}
