use crate::{Capability, Wanted};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("The provided interface \"{0}\" is invalid!")]
    UnknownInterface(String),
    #[error("Interface {name} doesn't support {mode} mode")]
    IncapableInterface { name: String, mode: Capability },
    #[error("{0} interface is not acceptable as an internet interface")]
    NotWiredInterface(String),
    #[error("Failed to find an interface with {0} mode")]
    InterfaceNotFound(Wanted),
    #[error("The provided MAC address {0} is invalid")]
    InvalidMacAddress(String),
    #[error("Expected value type to be {expected} while got `{value}`")]
    InvalidValue { value: String, expected: &'static str },
    #[error("Interface {0} is managed by NetworkManager, deauthentication would be unreliable")]
    DeauthManagedExternally(String),
    #[error("Interface {0} is managed by NetworkManager, the access point would be unreliable")]
    ApManagedExternally(String),
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error("{}", _0)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Failure reported by a [`RadioControl`](crate::RadioControl) implementation.
///
/// The distinguished variants are the codes callers react to, everything
/// else passes through as [`ControlError::Os`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("device does not support the required protocol")]
    Unsupported,
    #[error("no such device")]
    NoDevice,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("radio control failed({code}): {message}")]
    Os { code: i32, message: String },
}

impl ControlError {
    pub const EPROTONOSUPPORT: i32 = 93;
    pub const ENODEV: i32 = 19;
    pub const EINVAL: i32 = 22;

    pub fn from_code<T: Into<String>>(code: i32, message: T) -> Self {
        match code {
            Self::EPROTONOSUPPORT => Self::Unsupported,
            Self::ENODEV => Self::NoDevice,
            Self::EINVAL => Self::InvalidArgument,
            _ => Self::Os { code, message: message.into() },
        }
    }

    #[inline]
    pub fn code(&self) -> i32 {
        match self {
            Self::Unsupported => Self::EPROTONOSUPPORT,
            Self::NoDevice => Self::ENODEV,
            Self::InvalidArgument => Self::EINVAL,
            Self::Os { code, .. } => *code,
        }
    }

    /// Errors that [`RadioManager::discover`](crate::RadioManager::discover) tolerates.
    #[inline]
    pub fn is_incompatible(&self) -> bool {
        matches!(self, Self::Unsupported | Self::NoDevice)
    }
}

impl From<std::io::Error> for ControlError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            return Self::NoDevice;
        }
        match e.raw_os_error() {
            Some(code) => Self::from_code(code, e.to_string()),
            None => Self::Os { code: -1, message: e.to_string() },
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Other(format!("IO error: {}", e).into())
    }
}

#[cfg(target_os = "linux")]
impl From<nix::errno::Errno> for ControlError {
    #[inline]
    fn from(e: nix::errno::Errno) -> Self {
        Self::from_code(e as i32, e.desc())
    }
}

#[cfg(target_os = "linux")]
impl From<zbus::Error> for Error {
    #[inline]
    fn from(e: zbus::Error) -> Self {
        Self::Other(format!("D-Bus error: {}", e).into())
    }
}
