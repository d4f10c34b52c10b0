use zbus::{blocking::{Connection, Proxy}, zvariant::OwnedObjectPath};
use crate::{Result, platform::OwnershipProbe};

const NM_SERVICE: &str = "org.freedesktop.NetworkManager";
const NM_PATH: &str = "/org/freedesktop/NetworkManager";
const NM_DEVICE: &str = "org.freedesktop.NetworkManager.Device";

/// Asks NetworkManager over the system bus whether it manages a device.
///
/// A bus without NetworkManager, or a device it does not know, counts as
/// not managed.
pub struct NetworkManagerProbe {
    conn: Connection,
}

impl NetworkManagerProbe {
    pub fn new() -> Result<Self> {
        Ok(Self {
            conn: Connection::system()?,
        })
    }
}

impl OwnershipProbe for NetworkManagerProbe {
    fn is_externally_managed(&self, name: &str) -> Result<bool> {
        let nm = Proxy::new(&self.conn, NM_SERVICE, NM_PATH, NM_SERVICE)?;
        let path: OwnedObjectPath = match nm.call("GetDeviceByIpIface", &(name,)) {
            Ok(v) => v,
            Err(e @ zbus::Error::MethodError(..)) => {
                rsutil::debug!("NetworkManager has no device {}: {}", name, e);
                return Ok(false);
            },
            Err(e) => return Err(e.into()),
        };

        let device = Proxy::new(&self.conn, NM_SERVICE, path.as_str(), NM_DEVICE)?;
        let managed = device.get_property::<bool>("Managed")?;
        rsutil::debug!("{} managed by NetworkManager: {}", name, managed);

        Ok(managed)
    }
}
