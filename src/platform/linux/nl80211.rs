//! nl80211 commands over a generic netlink socket.
//!
//! Every request asks for an ACK, so an exchange ends with an `NLMSG_ERROR`
//! carrying either 0 or a negated errno.

use std::{cell::RefCell, fmt::Display, os::fd::{AsRawFd as _, BorrowedFd}};
use neli::{
    attr::Attribute as _,
    consts::{nl::{NlmF, NlmFFlags}, socket::NlFamily},
    err::NlError,
    genl::{Genlmsghdr, Nlattr},
    nl::{NlPayload, Nlmsghdr},
    socket::NlSocketHandle,
    types::{Buffer, GenlBuffer},
};
use nix::sys::{socket::{setsockopt, sockopt}, time::{TimeVal, TimeValLike as _}};
use crate::{ControlError, IfMode};

const NL80211_GENL_NAME: &str = "nl80211";
const RECV_TIMEOUT_MS: i64 = 3000;

const NL80211_CMD_GET_WIPHY: u8 = 1;
const NL80211_CMD_SET_WIPHY: u8 = 2;
const NL80211_CMD_GET_INTERFACE: u8 = 5;
const NL80211_CMD_SET_INTERFACE: u8 = 6;
const NL80211_ATTR_IFINDEX: u16 = 3;
const NL80211_ATTR_IFTYPE: u16 = 5;
const NL80211_ATTR_SUPPORTED_IFTYPES: u16 = 32;
const NL80211_ATTR_WIPHY_FREQ: u16 = 38;
const NL80211_ATTR_WIPHY_CHANNEL_TYPE: u16 = 39;
const NL80211_CHAN_NO_HT: u32 = 0;

type Reply = Genlmsghdr<u8, u16>;

fn channel_frequency(channel: u8) -> Option<u32> {
    match channel {
        1..=13 => Some(2407 + 5 * channel as u32),
        14 => Some(2484),
        32..=177 => Some(5000 + 5 * channel as u32),
        _ => None,
    }
}

#[inline]
fn failure<E: Display>(context: &str, e: E) -> ControlError {
    ControlError::Os { code: -1, message: format!("{}: {}", context, e) }
}

#[inline]
fn errno(code: i32) -> ControlError {
    let code = code.abs();
    ControlError::from_code(code, format!("nl80211 error {}", code))
}

fn attribute(kind: u16, value: u32) -> Result<Nlattr<u16, Buffer>, ControlError> {
    Nlattr::new(false, false, kind, value)
        .map_err(|e| failure("netlink attribute", e))
}

fn supported_iftypes(reply: &Reply) -> Vec<IfMode> {
    let mut results = vec![];
    let attrs = reply.get_attr_handle();
    for attr in attrs.iter() {
        if attr.nla_type.nla_type != NL80211_ATTR_SUPPORTED_IFTYPES {
            continue;
        }
        // each nested attribute is a flag whose type is the iftype
        if let Ok(nested) = attr.get_attr_handle::<u16>() {
            results.extend(nested.iter()
                .filter_map(|v| IfMode::from_iftype(v.nla_type.nla_type as u32)));
        }
    }

    results
}

fn iftype(reply: &Reply) -> Option<IfMode> {
    let attrs = reply.get_attr_handle();
    attrs.iter()
        .find(|v| v.nla_type.nla_type == NL80211_ATTR_IFTYPE)
        .and_then(|v| v.get_payload_as::<u32>().ok())
        .and_then(IfMode::from_iftype)
}

pub(crate) struct Nl80211 {
    sock: RefCell<NlSocketHandle>,
    family: u16,
}

impl std::fmt::Debug for Nl80211 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Nl80211")
            .field("family", &self.family)
            .finish()
    }
}

impl Nl80211 {
    pub(crate) fn new() -> Result<Self, ControlError> {
        let mut sock = NlSocketHandle::connect(NlFamily::Generic, None, &[])?;
        {
            // SAFETY: the descriptor is owned by `sock`, which outlives this borrow.
            let fd = unsafe { BorrowedFd::borrow_raw(sock.as_raw_fd()) };
            setsockopt(&fd, sockopt::ReceiveTimeout, &TimeVal::milliseconds(RECV_TIMEOUT_MS))?;
        }

        let family = sock.resolve_genl_family(NL80211_GENL_NAME)
            .map_err(|e| {
                rsutil::debug!("Failed to resolve the nl80211 family: {}", e);
                ControlError::Unsupported
            })?;
        rsutil::debug!("nl80211 family id: {}", family);

        Ok(Self { sock: RefCell::new(sock), family })
    }

    /// Sends `cmd` for `ifindex` and collects the replies up to the ACK.
    fn request(&self, cmd: u8, ifindex: u32, extra: &[(u16, u32)]) -> Result<Vec<Reply>, ControlError> {
        let mut attrs = GenlBuffer::new();
        attrs.push(attribute(NL80211_ATTR_IFINDEX, ifindex)?);
        for &(kind, value) in extra {
            attrs.push(attribute(kind, value)?);
        }
        let msg = Nlmsghdr::new(
            None,
            self.family,
            NlmFFlags::new(&[NlmF::Request, NlmF::Ack]),
            None,
            None,
            NlPayload::Payload(Genlmsghdr::new(cmd, 1, attrs)),
        );

        let mut sock = self.sock.borrow_mut();
        sock.send(msg)
            .map_err(|e| failure("netlink send", e))?;
        rsutil::trace!("Sent nl80211 command {} for ifindex {}", cmd, ifindex);

        let mut results = vec![];
        loop {
            let reply = match sock.recv::<u16, Reply>() {
                Ok(Some(v)) => v,
                Ok(None) => return Ok(results),
                Err(NlError::Nlmsgerr(e)) => return Err(errno(e.error)),
                Err(e) => return Err(failure("netlink receive", e)),
            };
            match reply.nl_payload {
                NlPayload::Payload(v) => results.push(v),
                NlPayload::Err(e) if e.error != 0 => return Err(errno(e.error)),
                _ => return Ok(results),
            }
        }
    }

    pub(crate) fn supported_iftypes(&self, ifindex: u32) -> Result<Vec<IfMode>, ControlError> {
        let replies = self.request(NL80211_CMD_GET_WIPHY, ifindex, &[])?;
        Ok(replies.iter().flat_map(supported_iftypes).collect())
    }

    pub(crate) fn iftype(&self, ifindex: u32) -> Result<IfMode, ControlError> {
        let replies = self.request(NL80211_CMD_GET_INTERFACE, ifindex, &[])?;
        replies.iter()
            .find_map(iftype)
            .ok_or(ControlError::Os { code: -1, message: format!("no interface type for ifindex {}", ifindex) })
    }

    pub(crate) fn set_iftype(&self, ifindex: u32, mode: IfMode) -> Result<(), ControlError> {
        self.request(NL80211_CMD_SET_INTERFACE, ifindex, &[(NL80211_ATTR_IFTYPE, mode.iftype())])?;
        rsutil::debug!("nl80211 set ifindex {} to {}", ifindex, mode);

        Ok(())
    }

    pub(crate) fn set_channel(&self, ifindex: u32, channel: u8) -> Result<(), ControlError> {
        let freq = channel_frequency(channel)
            .ok_or(ControlError::InvalidArgument)?;
        self.request(NL80211_CMD_SET_WIPHY, ifindex, &[
            (NL80211_ATTR_WIPHY_FREQ, freq),
            (NL80211_ATTR_WIPHY_CHANNEL_TYPE, NL80211_CHAN_NO_HT),
        ])?;

        Ok(())
    }
}
