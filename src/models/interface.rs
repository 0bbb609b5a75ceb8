// Monitored interface identity: kind + index, e.g. eth3 -> ethernet1/3.

use crate::error::{ProbeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InterfaceKind {
    /// Physical ethernet port (`ethernet1/N`).
    Eth,
    /// VPN tunnel interface (`tunnel.N`).
    Tun,
}

impl InterfaceKind {
    pub fn prefix(self) -> &'static str {
        match self {
            InterfaceKind::Eth => "eth",
            InterfaceKind::Tun => "tun",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceId {
    pub kind: InterfaceKind,
    pub index: String,
}

impl InterfaceId {
    /// `index` may carry a subinterface (`3.100`) but nothing else.
    pub fn new(kind: InterfaceKind, index: &str) -> Result<Self> {
        let index = index.trim();
        let valid = !index.is_empty()
            && index.chars().all(|c| c.is_ascii_digit() || c == '.')
            && !index.starts_with('.')
            && !index.ends_with('.');
        if !valid {
            return Err(ProbeError::Usage(format!(
                "interface index must look like 3 or 3.100, got '{}'",
                index
            )));
        }
        Ok(Self {
            kind,
            index: index.to_string(),
        })
    }

    /// Counter store key.
    pub fn counter_id(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.index)
    }

    /// Interface name as the appliance spells it.
    pub fn appliance_name(&self) -> String {
        match self.kind {
            InterfaceKind::Eth => format!("ethernet1/{}", self.index),
            InterfaceKind::Tun => format!("tunnel.{}", self.index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ethernet_names() {
        let id = InterfaceId::new(InterfaceKind::Eth, "3").unwrap();
        assert_eq!(id.counter_id(), "eth3");
        assert_eq!(id.appliance_name(), "ethernet1/3");
    }

    #[test]
    fn tunnel_names() {
        let id = InterfaceId::new(InterfaceKind::Tun, "12").unwrap();
        assert_eq!(id.counter_id(), "tun12");
        assert_eq!(id.appliance_name(), "tunnel.12");
    }

    #[test]
    fn rejects_markup_in_index() {
        assert!(InterfaceId::new(InterfaceKind::Eth, "1</interface>").is_err());
        assert!(InterfaceId::new(InterfaceKind::Eth, "").is_err());
        assert!(InterfaceId::new(InterfaceKind::Eth, ".5").is_err());
        assert!(InterfaceId::new(InterfaceKind::Eth, "3.100").is_ok());
    }
}
