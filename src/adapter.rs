use getset::{CopyGetters, Getters, Setters, WithSetters};
use crate::{Capability, IfMode, Role};


/// One wireless (or wired) device found at discovery time.
///
/// The adapter is plain bookkeeping: it never talks to the hardware.
/// [`RadioManager`](crate::RadioManager) performs the device I/O and then
/// brings these fields in line with what the device reports.
///
/// - `original_mac_address` is the address read at discovery and never
///   changes, it is what [`RadioManager::on_exit`](crate::RadioManager::on_exit)
///   restores.
/// - `mac_address` is the last address successfully written to the device.
/// - `role` can only be changed by the manager's allocation methods.
#[derive(Debug, Clone, Eq, PartialEq, CopyGetters, Getters, Setters, WithSetters)]
pub struct RadioAdapter {
    #[getset(get = "pub")]
    pub(crate) name: String,
    #[getset(get_copy = "pub", set = "pub", set_with = "pub")]
    pub(crate) has_ap_mode: bool,
    #[getset(get_copy = "pub", set = "pub", set_with = "pub")]
    pub(crate) has_monitor_mode: bool,
    #[getset(get_copy = "pub", set = "pub", set_with = "pub")]
    pub(crate) is_wireless: bool,
    #[getset(get = "pub")]
    pub(crate) original_mac_address: String,
    #[getset(get = "pub", set = "pub(crate)")]
    pub(crate) mac_address: String,
    #[getset(get_copy = "pub", set = "pub(crate)")]
    pub(crate) role: Role,
}

impl RadioAdapter {
    pub fn new<N: Into<String>, M: Into<String>>(name: N, mac_address: M) -> Self {
        let mac_address = mac_address.into();
        Self {
            name: name.into(),
            has_ap_mode: false,
            has_monitor_mode: false,
            is_wireless: false,
            original_mac_address: mac_address.clone(),
            mac_address,
            role: Role::Unassigned,
        }
    }

    #[inline]
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Monitor => self.has_monitor_mode,
            Capability::AccessPoint => self.has_ap_mode,
        }
    }

    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.role != Role::Unassigned
    }

    #[inline]
    pub fn is_address_changed(&self) -> bool {
        self.mac_address != self.original_mac_address
    }
}

/// Fills the capability flags of `adapter` from what the device reported.
pub fn detect_properties(adapter: &mut RadioAdapter, supported_modes: &[IfMode], is_wireless: bool) {
    if supported_modes.contains(&IfMode::Monitor) {
        adapter.has_monitor_mode = true;
    }
    if supported_modes.contains(&IfMode::Ap) {
        adapter.has_ap_mode = true;
    }
    if is_wireless {
        adapter.is_wireless = true;
    }
    rsutil::trace!("{} properties: monitor={}, AP={}, wireless={}",
        adapter.name, adapter.has_monitor_mode, adapter.has_ap_mode, adapter.is_wireless);
}
