// Command line surface (plugin-style short flags).

use crate::checks::{CheckKind, CheckRequest};
use crate::config::ProbeConfig;
use crate::error::{ProbeError, Result};
use crate::models::{InterfaceId, InterfaceKind};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckArg {
    #[value(name = "CPU")]
    Cpu,
    #[value(name = "DiskSpace")]
    DiskSpace,
    #[value(name = "SessInfo")]
    SessInfo,
    #[value(name = "Throughput")]
    Throughput,
    /// Throughput of ethernet ports.
    #[value(name = "EthThroughput")]
    EthThroughput,
    /// Throughput of VPN tunnels.
    #[value(name = "VPNThroughput")]
    VpnThroughput,
    #[value(name = "Environmental")]
    Environmental,
    #[value(name = "Temperature")]
    Temperature,
    #[value(name = "Certificates")]
    Certificates,
}

impl CheckArg {
    pub fn kind(self) -> CheckKind {
        match self {
            CheckArg::Cpu => CheckKind::Cpu,
            CheckArg::DiskSpace => CheckKind::DiskSpace,
            CheckArg::SessInfo => CheckKind::SessInfo,
            CheckArg::Throughput | CheckArg::EthThroughput | CheckArg::VpnThroughput => {
                CheckKind::Throughput
            }
            CheckArg::Environmental => CheckKind::Environmental,
            CheckArg::Temperature => CheckKind::Temperature,
            CheckArg::Certificates => CheckKind::Certificates,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "check_paloalto", version, about = "Monitoring plugin for Palo Alto firewalls")]
pub struct Cli {
    /// Firewall hostname or IP address.
    #[arg(short = 'H', long)]
    pub host: String,

    /// XML API key.
    #[arg(short = 'T', long)]
    pub token: String,

    /// Metric family to check.
    #[arg(short = 'C', long, ignore_case = true)]
    pub check: CheckArg,

    /// Interface indexes for Throughput, e.g. `3,4` or `3.100`.
    #[arg(short = 'I', long = "interface", value_delimiter = ',')]
    pub interfaces: Vec<String>,

    /// Interface kind for plain Throughput.
    #[arg(long, value_enum)]
    pub interface_type: Option<InterfaceKind>,

    /// Names to skip (interfaces, sensors, certificates, disks, cores).
    #[arg(short = 'e', long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Warning threshold.
    #[arg(short = 'w', long, allow_hyphen_values = true)]
    pub warning: Option<String>,

    /// Critical threshold.
    #[arg(short = 'c', long, allow_hyphen_values = true)]
    pub critical: Option<String>,

    /// Counter store file (overrides `[state] path`).
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Request timeout in seconds (overrides `[appliance] timeout_secs`).
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates.
    #[arg(long)]
    pub insecure: bool,

    /// Drop stored baselines for the selected interfaces before sampling.
    #[arg(long)]
    pub reset_counters: bool,

    /// TOML config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Repeat for more output: long output on stdout, logs on stderr.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn interface_kind(&self) -> InterfaceKind {
        match self.check {
            CheckArg::EthThroughput => InterfaceKind::Eth,
            CheckArg::VpnThroughput => InterfaceKind::Tun,
            _ => self.interface_type.unwrap_or(InterfaceKind::Eth),
        }
    }

    pub fn to_request(&self) -> Result<CheckRequest> {
        let kind = self.check.kind();
        let iface_kind = self.interface_kind();
        let mut interfaces: Vec<InterfaceId> = Vec::new();
        for raw in self.interfaces.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let id = InterfaceId::new(iface_kind, raw)?;
            if !interfaces.contains(&id) {
                interfaces.push(id);
            }
        }
        if kind != CheckKind::Throughput && !interfaces.is_empty() {
            return Err(ProbeError::Usage(format!(
                "--interface only applies to Throughput, not {}",
                kind.profile().name
            )));
        }
        Ok(CheckRequest {
            kind,
            interfaces,
            exclude: self.exclude.clone(),
            warning: self.warning.clone(),
            critical: self.critical.clone(),
            reset_counters: self.reset_counters,
        })
    }

    /// Command line flags win over file values.
    pub fn apply(&self, config: &mut ProbeConfig) {
        if let Some(t) = self.timeout {
            config.appliance.timeout_secs = t;
        }
        if self.insecure {
            config.appliance.verify_tls = false;
        }
        if let Some(p) = &self.state_file {
            config.state.path = p.clone();
        }
    }
}
