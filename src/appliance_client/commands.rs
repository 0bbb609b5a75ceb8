// Operational commands sent as the `cmd` query parameter (`type=op`).

use crate::models::InterfaceId;

pub const CPU_LOAD: &str = "<show><running><resource-monitor><minute><last>1</last></minute></resource-monitor></running></show>";

pub const DISK_SPACE: &str = "<show><system><disk-space></disk-space></system></show>";

pub const SESSION_INFO: &str = "<show><session><info></info></session></show>";

pub const ENVIRONMENTALS: &str = "<show><system><environmentals></environmentals></system></show>";

pub const CERTIFICATES: &str =
    "<show><config><running><xpath>shared/certificate</xpath></running></config></show>";

pub fn interface_counters(interface: &InterfaceId) -> String {
    format!(
        "<show><counter><interface>{}</interface></counter></show>",
        interface.appliance_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InterfaceKind;

    #[test]
    fn interface_counter_command() {
        let id = InterfaceId::new(InterfaceKind::Tun, "4").unwrap();
        assert_eq!(
            interface_counters(&id),
            "<show><counter><interface>tunnel.4</interface></counter></show>"
        );
    }
}
