#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::*;
#[cfg(test)]
pub(crate) mod mock;

use crate::{ControlError, IfMode, Result};

/// Low level radio primitives the manager drives.
///
/// Every call blocks until the device has answered.
pub trait RadioControl {
    /// Control handle of one device, opened once at discovery.
    type Handle;

    fn interfaces(&self) -> Result<Vec<String>, ControlError>;
    fn open(&self, name: &str) -> Result<Self::Handle, ControlError>;
    fn supported_modes(&self, handle: &Self::Handle) -> Result<Vec<IfMode>, ControlError>;
    fn is_wireless(&self, name: &str) -> Result<bool, ControlError>;
    fn mac_address(&self, handle: &Self::Handle) -> Result<String, ControlError>;
    fn set_mac_address(&self, handle: &Self::Handle, mac_address: &str) -> Result<(), ControlError>;
    fn mode(&self, handle: &Self::Handle) -> Result<IfMode, ControlError>;
    fn set_mode(&self, handle: &Self::Handle, mode: IfMode) -> Result<(), ControlError>;
    fn down(&self, handle: &Self::Handle) -> Result<(), ControlError>;
    fn up(&self, handle: &Self::Handle) -> Result<(), ControlError>;
    fn set_channel(&self, handle: &Self::Handle, channel: u8) -> Result<(), ControlError>;
    fn is_blocked(&self, handle: &Self::Handle) -> Result<bool, ControlError>;
    fn unblock(&self, handle: &Self::Handle) -> Result<(), ControlError>;
}

/// Answers whether a system network daemon currently manages a device.
pub trait OwnershipProbe {
    fn is_externally_managed(&self, name: &str) -> Result<bool>;
}

/// Probe for hosts without a network daemon.
#[derive(Debug, Default, Copy, Clone)]
pub struct Unmanaged;

impl OwnershipProbe for Unmanaged {
    #[inline]
    fn is_externally_managed(&self, _: &str) -> Result<bool> {
        Ok(false)
    }
}
