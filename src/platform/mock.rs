use std::{cell::RefCell, collections::HashMap};
use crate::{ControlError, IfMode, Result, platform::{OwnershipProbe, RadioControl}};

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum Call {
    Down(String),
    Up(String),
    SetMode(String, IfMode),
    SetMac(String, String),
    SetChannel(String, u8),
    Unblock(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Device {
    pub modes: Vec<IfMode>,
    pub wireless: bool,
    pub mac: String,
    pub mode: IfMode,
    pub blocked: bool,
    pub open_error: Option<ControlError>,
}

impl Device {
    pub fn wireless(modes: &[IfMode]) -> Self {
        Self {
            modes: modes.to_vec(),
            wireless: true,
            mac: "00:11:22:33:44:55".into(),
            mode: IfMode::Managed,
            blocked: false,
            open_error: None,
        }
    }

    pub fn failing(e: ControlError) -> Self {
        Self {
            open_error: Some(e),
            ..Self::wireless(&[])
        }
    }
}

/// Records every mutating call instead of touching hardware.
#[derive(Debug, Default)]
pub(crate) struct MockRadio {
    pub devices: RefCell<HashMap<String, Device>>,
    pub calls: RefCell<Vec<Call>>,
    pub mac_error: Option<ControlError>,
    pub mode_error: Option<ControlError>,
}

impl MockRadio {
    pub fn with(devices: Vec<(&str, Device)>) -> Self {
        Self {
            devices: RefCell::new(devices.into_iter()
                .map(|(n, d)| (n.to_string(), d))
                .collect()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn device<T>(&self, name: &str, f: impl FnOnce(&mut Device) -> T) -> Result<T, ControlError> {
        self.devices.borrow_mut()
            .get_mut(name)
            .map(f)
            .ok_or(ControlError::NoDevice)
    }
}

impl RadioControl for MockRadio {
    type Handle = String;

    fn interfaces(&self) -> Result<Vec<String>, ControlError> {
        let mut names: Vec<_> = self.devices.borrow().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn open(&self, name: &str) -> Result<String, ControlError> {
        match self.device(name, |d| d.open_error.clone())? {
            Some(e) => Err(e),
            None => Ok(name.to_string()),
        }
    }

    fn supported_modes(&self, handle: &String) -> Result<Vec<IfMode>, ControlError> {
        self.device(handle, |d| d.modes.clone())
    }

    fn is_wireless(&self, name: &str) -> Result<bool, ControlError> {
        self.device(name, |d| d.wireless)
    }

    fn mac_address(&self, handle: &String) -> Result<String, ControlError> {
        self.device(handle, |d| d.mac.clone())
    }

    fn set_mac_address(&self, handle: &String, mac_address: &str) -> Result<(), ControlError> {
        self.calls.borrow_mut().push(Call::SetMac(handle.clone(), mac_address.into()));
        if let Some(e) = &self.mac_error {
            return Err(e.clone());
        }
        self.device(handle, |d| d.mac = mac_address.into())
    }

    fn mode(&self, handle: &String) -> Result<IfMode, ControlError> {
        self.device(handle, |d| d.mode)
    }

    fn set_mode(&self, handle: &String, mode: IfMode) -> Result<(), ControlError> {
        self.calls.borrow_mut().push(Call::SetMode(handle.clone(), mode));
        if let Some(e) = &self.mode_error {
            return Err(e.clone());
        }
        self.device(handle, |d| d.mode = mode)
    }

    fn down(&self, handle: &String) -> Result<(), ControlError> {
        self.calls.borrow_mut().push(Call::Down(handle.clone()));
        Ok(())
    }

    fn up(&self, handle: &String) -> Result<(), ControlError> {
        self.calls.borrow_mut().push(Call::Up(handle.clone()));
        Ok(())
    }

    fn set_channel(&self, handle: &String, channel: u8) -> Result<(), ControlError> {
        self.calls.borrow_mut().push(Call::SetChannel(handle.clone(), channel));
        Ok(())
    }

    fn is_blocked(&self, handle: &String) -> Result<bool, ControlError> {
        self.device(handle, |d| d.blocked)
    }

    fn unblock(&self, handle: &String) -> Result<(), ControlError> {
        self.calls.borrow_mut().push(Call::Unblock(handle.clone()));
        self.device(handle, |d| d.blocked = false)
    }
}

/// Reports the listed devices as managed.
#[derive(Debug, Default)]
pub(crate) struct MockProbe {
    pub managed: Vec<String>,
}

impl OwnershipProbe for MockProbe {
    fn is_externally_managed(&self, name: &str) -> Result<bool> {
        Ok(self.managed.iter().any(|n| n == name))
    }
}
