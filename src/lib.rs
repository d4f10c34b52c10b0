mod adapter;
mod config;
mod error;
mod manager;
mod platform;

pub use adapter::*;
pub use config::*;
pub use error::*;
pub use manager::*;
pub use platform::*;

pub type Result<T, E = error::Error> = std::result::Result<T, E>;

/// The MAC prefix used for generated addresses unless configured otherwise.
pub const DEFAULT_OUI: &str = "00:00:00";

/// Radio modes a role can require.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum Capability {
    Monitor,
    AccessPoint,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Monitor => write!(f, "monitor"),
            Capability::AccessPoint => write!(f, "AP"),
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "monitor" => Ok(Self::Monitor),
            "AP" | "ap" => Ok(Self::AccessPoint),
            _ => Err(Error::InvalidValue { value: s.into(), expected: "monitor or AP" }),
        }
    }
}

/// The capabilities an allocation request asked for.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Wanted {
    pub monitor: bool,
    pub ap: bool,
}

impl std::fmt::Display for Wanted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.monitor, self.ap) {
            (true, true) => write!(f, "monitor and AP"),
            (true, false) => write!(f, "monitor"),
            (false, true) => write!(f, "AP"),
            (false, false) => write!(f, "no"),
        }
    }
}

#[derive(Debug, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum Role {
    #[default]
    Unassigned,
    Monitor,
    AccessPoint,
    Internet,
}

/// Operating modes as nl80211 numbers them.
#[derive(Debug, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum IfMode {
    Unspecified,
    Adhoc,
    #[default]
    Managed,
    Ap,
    ApVlan,
    Wds,
    Monitor,
    Mesh,
    P2pClient,
    P2pGo,
    P2pDevice,
    Ocb,
    Nan,
}

impl IfMode {
    pub fn from_iftype(v: u32) -> Option<Self> {
        Some(match v {
            0 => Self::Unspecified,
            1 => Self::Adhoc,
            2 => Self::Managed,
            3 => Self::Ap,
            4 => Self::ApVlan,
            5 => Self::Wds,
            6 => Self::Monitor,
            7 => Self::Mesh,
            8 => Self::P2pClient,
            9 => Self::P2pGo,
            10 => Self::P2pDevice,
            11 => Self::Ocb,
            12 => Self::Nan,
            _ => return None,
        })
    }

    #[inline]
    pub fn iftype(&self) -> u32 {
        *self as u32
    }
}

impl std::fmt::Display for IfMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unspecified => "unspecified",
            Self::Adhoc => "ibss",
            Self::Managed => "managed",
            Self::Ap => "AP",
            Self::ApVlan => "AP VLAN",
            Self::Wds => "wds",
            Self::Monitor => "monitor",
            Self::Mesh => "mesh",
            Self::P2pClient => "p2p-client",
            Self::P2pGo => "p2p-GO",
            Self::P2pDevice => "p2p-device",
            Self::Ocb => "ocb",
            Self::Nan => "nan",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for IfMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "unspecified" => Self::Unspecified,
            "ibss" | "adhoc" => Self::Adhoc,
            "managed" | "station" => Self::Managed,
            "AP" | "ap" => Self::Ap,
            "AP VLAN" => Self::ApVlan,
            "wds" => Self::Wds,
            "monitor" => Self::Monitor,
            "mesh" => Self::Mesh,
            "p2p-client" => Self::P2pClient,
            "p2p-GO" => Self::P2pGo,
            "p2p-device" => Self::P2pDevice,
            "ocb" => Self::Ocb,
            "nan" => Self::Nan,
            _ => return Err(Error::InvalidValue { value: s.into(), expected: "an interface mode" }),
        })
    }
}

/// Parses an operator supplied boolean flag.
pub fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(Error::InvalidValue { value: value.into(), expected: "bool" }),
    }
}
