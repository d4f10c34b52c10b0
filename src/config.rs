use getset::{Getters, WithSetters};
use crate::DEFAULT_OUI;


/// Settings for a [`RadioManager`](crate::RadioManager).
///
/// The interface fields are manual overrides: when set,
/// [`RadioManager::select_interfaces`](crate::RadioManager::select_interfaces)
/// uses that device for the role instead of picking one.
#[derive(Debug, Clone, Eq, PartialEq, Getters, WithSetters)]
pub struct ManagerConfig {
    #[getset(get = "pub", set_with = "pub")]
    pub(crate) oui: String,
    #[getset(get = "pub", set_with = "pub")]
    pub(crate) monitor_interface: Option<String>,
    #[getset(get = "pub", set_with = "pub")]
    pub(crate) ap_interface: Option<String>,
    #[getset(get = "pub", set_with = "pub")]
    pub(crate) internet_interface: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            oui: DEFAULT_OUI.into(),
            monitor_interface: None,
            ap_interface: None,
            internet_interface: None,
        }
    }
}

impl ManagerConfig {
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }
}
