mod nl80211;
mod nm;
mod util;

pub use nm::NetworkManagerProbe;

use std::{fs, path::Path};
use getset::{CopyGetters, Getters};
use crate::{ControlError, IfMode, Result, platform::RadioControl};
use nl80211::Nl80211;

/// Control handle of one network device.
#[derive(Debug, Clone, Eq, PartialEq, CopyGetters, Getters)]
pub struct Card {
    #[getset(get = "pub")]
    pub(crate) name: String,
    #[getset(get_copy = "pub")]
    pub(crate) ifindex: u32,
    #[getset(get_copy = "pub")]
    pub(crate) wiphy: Option<u32>,
}

/// [`RadioControl`] backed by sysfs, interface ioctls and nl80211.
///
/// Wired Ethernet devices are accepted so they can serve as the internet
/// interface, anything else without a wireless phy is reported as
/// [`ControlError::Unsupported`].
#[derive(Debug)]
pub struct SysRadio {
    nl: Option<Nl80211>,
}

impl SysRadio {
    pub fn new() -> Result<Self> {
        let nl = match Nl80211::new() {
            Ok(nl) => Some(nl),
            Err(e) => {
                rsutil::warn!("nl80211 is not available: {}", e);
                None
            },
        };

        Ok(Self { nl })
    }

    #[inline]
    fn nl(&self, card: &Card) -> Result<&Nl80211, ControlError> {
        match (&self.nl, card.wiphy) {
            (Some(nl), Some(_)) => Ok(nl),
            _ => Err(ControlError::Unsupported),
        }
    }
}

impl RadioControl for SysRadio {
    type Handle = Card;

    #[inline]
    fn interfaces(&self) -> Result<Vec<String>, ControlError> {
        util::device_dirs(Path::new(util::SYS_CLASS_NET))
    }

    fn open(&self, name: &str) -> Result<Card, ControlError> {
        let path = util::sysfs(name);
        if !path.exists() {
            return Err(ControlError::NoDevice);
        }
        if !path.is_dir() {
            return Err(ControlError::Unsupported);
        }
        let wiphy = util::wiphy_index(name)?;
        if wiphy.is_none() && util::read_attr(name, "type")? != "1" {
            return Err(ControlError::Unsupported);
        }
        let ifindex = util::read_attr(name, "ifindex")?;
        let ifindex = ifindex.parse()
            .map_err(|_| ControlError::Os { code: -1, message: format!("bad ifindex `{}`", ifindex) })?;

        Ok(Card { name: name.into(), ifindex, wiphy })
    }

    fn supported_modes(&self, card: &Card) -> Result<Vec<IfMode>, ControlError> {
        if card.wiphy.is_none() {
            return Ok(vec![]);
        }
        self.nl(card)?.supported_iftypes(card.ifindex)
    }

    #[inline]
    fn is_wireless(&self, name: &str) -> Result<bool, ControlError> {
        Ok(util::is_wireless(name))
    }

    #[inline]
    fn mac_address(&self, card: &Card) -> Result<String, ControlError> {
        util::read_attr(&card.name, "address")
    }

    fn set_mac_address(&self, card: &Card, mac_address: &str) -> Result<(), ControlError> {
        util::set_hw_address(&card.name, &util::parse_mac(mac_address)?)
    }

    fn mode(&self, card: &Card) -> Result<IfMode, ControlError> {
        if card.wiphy.is_none() {
            return Ok(IfMode::Managed);
        }
        self.nl(card)?.iftype(card.ifindex)
    }

    fn set_mode(&self, card: &Card, mode: IfMode) -> Result<(), ControlError> {
        self.nl(card)?.set_iftype(card.ifindex, mode)
    }

    #[inline]
    fn down(&self, card: &Card) -> Result<(), ControlError> {
        util::set_link(&card.name, false)
    }

    #[inline]
    fn up(&self, card: &Card) -> Result<(), ControlError> {
        util::set_link(&card.name, true)
    }

    fn set_channel(&self, card: &Card, channel: u8) -> Result<(), ControlError> {
        self.nl(card)?.set_channel(card.ifindex, channel)
    }

    fn is_blocked(&self, card: &Card) -> Result<bool, ControlError> {
        for switch in util::rfkill_switches(&card.name)? {
            if fs::read_to_string(switch)?.trim() == "1" {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn unblock(&self, card: &Card) -> Result<(), ControlError> {
        for switch in util::rfkill_switches(&card.name)? {
            if fs::read_to_string(&switch)?.trim() == "1" {
                fs::write(&switch, "0")?;
                rsutil::debug!("Cleared soft block at {:?}", switch);
            }
        }

        Ok(())
    }
}
