#[cfg(target_os = "linux")]
fn main() -> rsradio::Result<()> {
    use rsradio::{IfMode, ManagerConfig, NetworkManagerProbe, RadioManager, SysRadio};

    let radio = SysRadio::new()?;
    let probe = NetworkManagerProbe::new()?;
    let mut config = ManagerConfig::new();
    if let Ok(name) = std::env::var("RSRADIO_AP") {
        config = config.with_ap_interface(Some(name));
    }
    let mut manager = RadioManager::with_probe(radio, probe)
        .with_config(config);

    manager.discover()?;
    for adapter in manager.adapters() {
        println!("{}: monitor={} AP={} wireless={} mac={}",
            adapter.name(), adapter.has_monitor_mode(), adapter.has_ap_mode(),
            adapter.is_wireless(), adapter.mac_address());
    }

    let selection = match manager.select_interfaces() {
        Ok(v) => v,
        Err(e) => {
            report(manager.on_exit());
            return Err(e);
        },
    };
    println!("monitor: {}, AP: {}", selection.monitor(), selection.ap());

    let ret = (|| -> rsradio::Result<()> {
        manager.check_uncontrolled(selection.monitor())?;
        manager.check_uncontrolled(selection.ap())?;
        manager.unblock(selection.monitor())?;
        let mac_address = manager.set_random_mac_address(selection.ap())?;
        println!("{} now uses {}", selection.ap(), mac_address);
        manager.set_mode(selection.monitor(), IfMode::Monitor)?;
        manager.set_channel(selection.monitor(), 6)
    })();

    report(manager.on_exit());

    ret
}

#[cfg(target_os = "linux")]
fn report(report: rsradio::ExitReport) {
    for (name, e) in report.failures() {
        eprintln!("Failed to restore {}: {}", name, e);
    }
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("No radio control available on this platform");
}
