use std::{fs, os::fd::{AsRawFd as _, OwnedFd}, path::{Path, PathBuf}};
use nix::{libc, sys::socket};
use crate::ControlError;

pub(crate) const SYS_CLASS_NET: &str = "/sys/class/net";
const ARPHRD_ETHER: libc::sa_family_t = 1;

nix::ioctl_read_bad!(siocgifflags, libc::SIOCGIFFLAGS, libc::ifreq);
nix::ioctl_write_ptr_bad!(siocsifflags, libc::SIOCSIFFLAGS, libc::ifreq);
nix::ioctl_write_ptr_bad!(siocsifhwaddr, libc::SIOCSIFHWADDR, libc::ifreq);

#[inline]
pub(crate) fn sysfs(name: &str) -> PathBuf {
    Path::new(SYS_CLASS_NET).join(name)
}

/// Device directories under `root`; plain files such as `bonding_masters` are left out.
pub(crate) fn device_dirs(root: &Path) -> Result<Vec<String>, ControlError> {
    let mut results = vec![];
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        // device entries are symlinks, `is_dir` follows them
        if !entry.path().is_dir() {
            rsutil::trace!("Ignoring {:?}", entry.path());
            continue;
        }
        results.push(entry.file_name().to_string_lossy().into_owned());
    }
    results.sort();

    Ok(results)
}

pub(crate) fn read_attr(name: &str, attr: &str) -> Result<String, ControlError> {
    let value = fs::read_to_string(sysfs(name).join(attr))?;
    Ok(value.trim().to_string())
}

#[inline]
pub(crate) fn is_wireless(name: &str) -> bool {
    let path = sysfs(name);
    path.join("wireless").exists() || path.join("phy80211").exists()
}

pub(crate) fn wiphy_index(name: &str) -> Result<Option<u32>, ControlError> {
    if !sysfs(name).join("phy80211").exists() {
        return Ok(None);
    }
    let index = read_attr(name, "phy80211/index")?;
    index.parse()
        .map(Some)
        .map_err(|_| ControlError::Os { code: -1, message: format!("bad wiphy index `{}`", index) })
}

/// The writable soft-block switches of the device's phy.
pub(crate) fn rfkill_switches(name: &str) -> Result<Vec<PathBuf>, ControlError> {
    let phy = sysfs(name).join("phy80211");
    if !phy.exists() {
        return Ok(vec![]);
    }

    let mut results = vec![];
    for entry in fs::read_dir(phy)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with("rfkill") {
            results.push(entry.path().join("soft"));
        }
    }

    Ok(results)
}

pub(crate) fn parse_mac(mac_address: &str) -> Result<[u8; 6], ControlError> {
    let mut octets = [0u8; 6];
    let mut parts = mac_address.split(':');
    for octet in octets.iter_mut() {
        let part = parts.next()
            .filter(|p| p.len() == 2)
            .ok_or(ControlError::InvalidArgument)?;
        *octet = u8::from_str_radix(part, 16)
            .map_err(|_| ControlError::InvalidArgument)?;
    }
    if parts.next().is_some() {
        return Err(ControlError::InvalidArgument);
    }

    Ok(octets)
}

fn ifreq(name: &str) -> Result<libc::ifreq, ControlError> {
    let bytes = name.as_bytes();
    if bytes.len() >= libc::IFNAMSIZ {
        return Err(ControlError::NoDevice);
    }
    let mut req: libc::ifreq = unsafe { std::mem::zeroed() };
    for (dst, src) in req.ifr_name.iter_mut().zip(bytes) {
        *dst = *src as libc::c_char;
    }

    Ok(req)
}

fn control_socket() -> Result<OwnedFd, ControlError> {
    let sock = socket::socket(
        socket::AddressFamily::Inet,
        socket::SockType::Datagram,
        socket::SockFlag::SOCK_CLOEXEC, None
    )?;
    Ok(sock)
}

pub(crate) fn set_link(name: &str, up: bool) -> Result<(), ControlError> {
    let sock = control_socket()?;
    let mut req = ifreq(name)?;
    unsafe { siocgifflags(sock.as_raw_fd(), &mut req)?; }

    let flags = unsafe { req.ifr_ifru.ifru_flags };
    let iff_up = libc::IFF_UP as libc::c_short;
    req.ifr_ifru.ifru_flags = if up { flags | iff_up } else { flags & !iff_up };
    unsafe { siocsifflags(sock.as_raw_fd(), &req)?; }

    Ok(())
}

pub(crate) fn set_hw_address(name: &str, octets: &[u8; 6]) -> Result<(), ControlError> {
    let sock = control_socket()?;
    let mut req = ifreq(name)?;

    let mut addr: libc::sockaddr = unsafe { std::mem::zeroed() };
    addr.sa_family = ARPHRD_ETHER;
    for (dst, src) in addr.sa_data.iter_mut().zip(octets) {
        *dst = *src as libc::c_char;
    }
    req.ifr_ifru.ifru_hwaddr = addr;
    unsafe { siocsifhwaddr(sock.as_raw_fd(), &req)?; }

    Ok(())
}
