use std::collections::{BTreeMap, BTreeSet, HashMap};
use getset::Getters;
use crate::{
    Capability, ControlError, Error, IfMode, ManagerConfig, Result, Role, Wanted,
    adapter::{RadioAdapter, detect_properties},
    platform::{OwnershipProbe, RadioControl, Unmanaged},
};


/// Owns every discovered radio and hands them out to roles.
///
/// The pool is filled once by [`discover`](Self::discover). Roles are given
/// out either by name ([`assign`](Self::assign)) or automatically
/// ([`allocate`](Self::allocate), [`allocate_pair`](Self::allocate_pair)).
/// A radio holding a role is never handed out again until it is
/// [`release`](Self::release)d. Before the process ends
/// [`on_exit`](Self::on_exit) must run to put modes and addresses back.
#[derive(Getters)]
pub struct RadioManager<C: RadioControl, P: OwnershipProbe = Unmanaged> {
    control: C,
    probe: P,
    #[getset(get = "pub")]
    config: ManagerConfig,
    pool: BTreeMap<String, RadioAdapter>,
    handles: HashMap<String, C::Handle>,
    active: BTreeSet<String>,
    #[getset(get = "pub")]
    monitor_interface: Option<String>,
    #[getset(get = "pub")]
    ap_interface: Option<String>,
    #[getset(get = "pub")]
    internet_interface: Option<String>,
}

/// Interfaces chosen by [`RadioManager::select_interfaces`].
#[derive(Debug, Clone, Eq, PartialEq, Getters)]
pub struct Selection {
    #[getset(get = "pub")]
    pub(crate) monitor: String,
    #[getset(get = "pub")]
    pub(crate) ap: String,
    #[getset(get = "pub")]
    pub(crate) internet: Option<String>,
}

/// What [`RadioManager::on_exit`] could not restore.
#[derive(Debug, Default, Getters)]
pub struct ExitReport {
    #[getset(get = "pub")]
    pub(crate) failures: Vec<(String, Error)>,
}

impl ExitReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<C: RadioControl> RadioManager<C> {
    #[inline]
    pub fn new(control: C) -> Self {
        Self::with_probe(control, Unmanaged)
    }
}

impl<C: RadioControl, P: OwnershipProbe> RadioManager<C, P> {
    pub fn with_probe(control: C, probe: P) -> Self {
        Self {
            control,
            probe,
            config: Default::default(),
            pool: Default::default(),
            handles: Default::default(),
            active: Default::default(),
            monitor_interface: None,
            ap_interface: None,
            internet_interface: None,
        }
    }

    #[inline]
    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Fills the pool with every device the radio control reports.
    ///
    /// Devices that do not speak the wireless protocol or vanished while
    /// being probed are skipped, any other failure is returned as is.
    pub fn discover(&mut self) -> Result<()> {
        for name in self.control.interfaces()? {
            match self.probe_device(&name) {
                Ok((adapter, handle)) => {
                    rsutil::debug!("Discovered {} ({})", name, adapter.mac_address());
                    self.handles.insert(name.clone(), handle);
                    self.pool.insert(name, adapter);
                },
                Err(e) if e.is_incompatible() => {
                    rsutil::debug!("Skipping {}: {}", name, e);
                },
                Err(e) => return Err(e.into()),
            }
        }
        rsutil::info!("Found {} compatible interface(s)", self.pool.len());

        Ok(())
    }

    fn probe_device(&self, name: &str) -> Result<(RadioAdapter, C::Handle), ControlError> {
        let handle = self.control.open(name)?;
        let mac_address = self.control.mac_address(&handle)?;
        let modes = self.control.supported_modes(&handle)?;
        let wireless = self.control.is_wireless(name)?;

        let mut adapter = RadioAdapter::new(name, mac_address);
        detect_properties(&mut adapter, &modes, wireless);

        Ok((adapter, handle))
    }

    #[inline]
    pub fn adapter(&self, name: &str) -> Option<&RadioAdapter> {
        self.pool.get(name)
    }

    /// Mutable access for capability overrides, roles and addresses stay
    /// under the manager's control.
    #[inline]
    pub fn adapter_mut(&mut self, name: &str) -> Option<&mut RadioAdapter> {
        self.pool.get_mut(name)
    }

    #[inline]
    pub fn adapters(&self) -> impl Iterator<Item = &RadioAdapter> {
        self.pool.values()
    }

    #[inline]
    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains(name)
    }

    fn lookup(&self, name: &str) -> Result<&RadioAdapter> {
        self.pool.get(name)
            .ok_or(Error::UnknownInterface(name.into()))
    }

    fn handle(&self, name: &str) -> Result<&C::Handle> {
        self.handles.get(name)
            .ok_or(Error::UnknownInterface(name.into()))
    }

    pub fn validate_capability(&self, name: &str, mode: Capability) -> Result<()> {
        if !self.lookup(name)?.supports(mode) {
            return Err(Error::IncapableInterface { name: name.into(), mode });
        }

        Ok(())
    }

    pub fn validate_wired(&self, name: &str) -> Result<()> {
        if self.lookup(name)?.is_wireless() {
            return Err(Error::NotWiredInterface(name.into()));
        }

        Ok(())
    }

    /// Picks an unused radio covering the requested modes.
    ///
    /// A radio with exactly the requested modes wins over one that can do
    /// more, so dual mode radios stay available for the other role. Ties go
    /// to the lowest name. Fails while another radio holds the role.
    pub fn allocate(&mut self, require_ap: bool, require_monitor: bool) -> Result<String> {
        let wanted = Wanted { monitor: require_monitor, ap: require_ap };
        let role = if require_monitor { Role::Monitor } else { Role::AccessPoint };
        if let Some(holder) = self.holder(role) {
            rsutil::debug!("{:?} role is already held by {}", role, holder);
            return Err(Error::InterfaceNotFound(wanted));
        }

        let mut chosen: Option<(u8, &str)> = None;
        if wanted.monitor || wanted.ap {
            for adapter in self.pool.values() {
                if self.active.contains(adapter.name()) {
                    continue;
                }
                if let Some(score) = match_score(adapter, wanted) {
                    if chosen.is_none_or(|(best, _)| score > best) {
                        chosen = Some((score, adapter.name()));
                    }
                }
            }
        }

        let name = chosen.map(|(_, n)| n.to_string())
            .ok_or(Error::InterfaceNotFound(wanted))?;
        self.mark(&name, role);

        Ok(name)
    }

    /// Allocates a monitor radio and then an AP radio.
    ///
    /// Nothing is rolled back when the second allocation fails, the caller
    /// either releases the first radio or runs [`on_exit`](Self::on_exit).
    pub fn allocate_pair(&mut self) -> Result<(String, String)> {
        let monitor = self.allocate(false, true)?;
        let ap = self.allocate(true, false)?;

        Ok((monitor, ap))
    }

    /// Gives `name` the role directly, as for an interface the operator picked.
    ///
    /// The radio must be unused and the role free.
    pub fn assign(&mut self, name: &str, role: Role) -> Result<()> {
        let wanted = match role {
            Role::Monitor => {
                self.validate_capability(name, Capability::Monitor)?;
                Wanted { monitor: true, ap: false }
            },
            Role::AccessPoint => {
                self.validate_capability(name, Capability::AccessPoint)?;
                Wanted { monitor: false, ap: true }
            },
            Role::Internet => {
                self.validate_wired(name)?;
                Wanted::default()
            },
            Role::Unassigned => return self.release(name),
        };
        if self.active.contains(name) || self.holder(role).is_some() {
            return Err(Error::InterfaceNotFound(wanted));
        }
        self.mark(name, role);

        Ok(())
    }

    pub fn release(&mut self, name: &str) -> Result<()> {
        let adapter = self.pool.get_mut(name)
            .ok_or(Error::UnknownInterface(name.into()))?;
        adapter.set_role(Role::Unassigned);
        self.active.remove(name);
        for slot in [&mut self.monitor_interface, &mut self.ap_interface, &mut self.internet_interface] {
            if slot.as_deref() == Some(name) {
                *slot = None;
            }
        }

        Ok(())
    }

    /// The radio currently holding `role`, each role has at most one.
    fn holder(&self, role: Role) -> Option<&str> {
        match role {
            Role::Monitor => self.monitor_interface.as_deref(),
            Role::AccessPoint => self.ap_interface.as_deref(),
            Role::Internet => self.internet_interface.as_deref(),
            Role::Unassigned => None,
        }
    }

    fn mark(&mut self, name: &str, role: Role) {
        if let Some(adapter) = self.pool.get_mut(name) {
            adapter.set_role(role);
        }
        self.active.insert(name.into());
        match role {
            Role::Monitor => self.monitor_interface = Some(name.into()),
            Role::AccessPoint => self.ap_interface = Some(name.into()),
            Role::Internet => self.internet_interface = Some(name.into()),
            Role::Unassigned => {},
        }
        rsutil::info!("Using {} as {:?} interface", name, role);
    }

    /// Resolves the monitor, AP and internet interfaces from the
    /// configuration, choosing automatically where no override is set.
    pub fn select_interfaces(&mut self) -> Result<Selection> {
        let config = self.config.clone();
        if let Some(name) = config.internet_interface() {
            self.assign(name, Role::Internet)?;
        }

        let (monitor, ap) = match (config.monitor_interface(), config.ap_interface()) {
            (Some(monitor), Some(ap)) => {
                self.assign(monitor, Role::Monitor)?;
                self.assign(ap, Role::AccessPoint)?;
                (monitor.clone(), ap.clone())
            },
            (Some(monitor), None) => {
                self.assign(monitor, Role::Monitor)?;
                (monitor.clone(), self.allocate(true, false)?)
            },
            (None, Some(ap)) => {
                self.assign(ap, Role::AccessPoint)?;
                (self.allocate(false, true)?, ap.clone())
            },
            (None, None) => self.allocate_pair()?,
        };

        Ok(Selection {
            monitor,
            ap,
            internet: self.internet_interface.clone(),
        })
    }

    /// Switches the operating mode; the device is taken down for the change.
    pub fn set_mode(&self, name: &str, mode: IfMode) -> Result<()> {
        let handle = self.handle(name)?;
        rsutil::debug!("Setting {} to {} mode", name, mode);
        self.control.down(handle)?;
        self.control.set_mode(handle, mode)?;
        self.control.up(handle)?;

        Ok(())
    }

    pub fn set_channel(&self, name: &str, channel: u8) -> Result<()> {
        let handle = self.handle(name)?;
        self.control.set_channel(handle, channel)?;

        Ok(())
    }

    #[inline]
    pub fn mac_address(&self, name: &str) -> Result<&str> {
        Ok(self.lookup(name)?.mac_address())
    }

    /// Writes a new hardware address. The device is left in managed mode.
    pub fn set_mac_address(&mut self, name: &str, mac_address: &str) -> Result<()> {
        self.set_mode(name, IfMode::Managed)?;
        self.write_mac_address(name, mac_address)
    }

    /// Applies a random address under the configured OUI and returns it.
    pub fn set_random_mac_address(&mut self, name: &str) -> Result<String> {
        let mac_address = generate_random_address(self.config.oui());
        self.set_mac_address(name, &mac_address)?;

        Ok(mac_address)
    }

    fn write_mac_address(&mut self, name: &str, mac_address: &str) -> Result<()> {
        let handle = self.handle(name)?;
        self.control.set_mac_address(handle, mac_address)
            .map_err(|e| match e {
                ControlError::InvalidArgument => Error::InvalidMacAddress(mac_address.into()),
                e => e.into(),
            })?;
        if let Some(adapter) = self.pool.get_mut(name) {
            adapter.set_mac_address(mac_address.into());
        }
        rsutil::debug!("{} now uses {}", name, mac_address);

        Ok(())
    }

    /// Lifts a soft RF block, only touching the device when it is blocked.
    pub fn unblock(&self, name: &str) -> Result<()> {
        let handle = self.handle(name)?;
        if self.control.is_blocked(handle)? {
            rsutil::info!("Unblocking {}", name);
            self.control.unblock(handle)?;
        }

        Ok(())
    }

    /// Fails when the monitor or AP radio `name` is under the control of a
    /// system network daemon.
    pub fn check_uncontrolled(&self, name: &str) -> Result<()> {
        let error = match self.lookup(name)?.role() {
            Role::Monitor => Error::DeauthManagedExternally(name.into()),
            Role::AccessPoint => Error::ApManagedExternally(name.into()),
            _ => return Ok(()),
        };
        if self.probe.is_externally_managed(name)? {
            return Err(error);
        }

        Ok(())
    }

    /// Puts every radio this process touched back the way it was found.
    ///
    /// Radios given a role go back to managed mode and changed addresses
    /// are restored, the internet interface is left alone. A failure on one
    /// radio does not stop the others, it ends up in the report.
    pub fn on_exit(&mut self) -> ExitReport {
        let mut report = ExitReport::default();
        let internet = self.internet_interface.clone();
        let is_internet = |name: &str| internet.as_deref() == Some(name);

        let active: Vec<String> = self.active.iter()
            .filter(|n| !is_internet(n))
            .cloned()
            .collect();
        let mut failed = BTreeSet::new();
        for name in active {
            if let Err(e) = self.restore_mode(&name) {
                rsutil::error!("Failed to restore mode of {}: {}", name, e);
                failed.insert(name.clone());
                report.failures.push((name, e));
            }
        }

        // radios whose mode restore failed are reported once
        let changed: Vec<(String, String)> = self.pool.values()
            .filter(|a| a.is_address_changed() && !is_internet(a.name()))
            .filter(|a| !failed.contains(a.name()))
            .map(|a| (a.name().clone(), a.original_mac_address().clone()))
            .collect();
        for (name, mac_address) in changed {
            let ret = self.restore_mode(&name)
                .and_then(|_| self.write_mac_address(&name, &mac_address));
            if let Err(e) = ret {
                rsutil::error!("Failed to restore MAC address of {}: {}", name, e);
                report.failures.push((name, e));
            }
        }

        report
    }

    fn restore_mode(&self, name: &str) -> Result<()> {
        let handle = self.handle(name)?;
        if self.control.mode(handle)? != IfMode::Managed {
            self.set_mode(name, IfMode::Managed)?;
        }

        Ok(())
    }
}

/// 2 for an exact match, 1 when the radio can do more than asked.
fn match_score(adapter: &RadioAdapter, wanted: Wanted) -> Option<u8> {
    if (wanted.monitor && !adapter.has_monitor_mode()) || (wanted.ap && !adapter.has_ap_mode()) {
        return None;
    }
    if adapter.has_monitor_mode() == wanted.monitor && adapter.has_ap_mode() == wanted.ap {
        Some(2)
    }
    else {
        Some(1)
    }
}

/// Random address under `oui`, formatted `oui:xx:xx:xx`.
#[inline]
pub fn generate_random_address(oui: &str) -> String {
    generate_address_with(oui, rand::random::<u8>)
}

pub fn generate_address_with<F: FnMut() -> u8>(oui: &str, mut next: F) -> String {
    let (a, b, c) = (next(), next(), next());
    format!("{}:{:02x}:{:02x}:{:02x}", oui, a, b, c)
}
