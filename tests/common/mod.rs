// Shared test helpers: fake appliance responses and probe contexts.
#![allow(dead_code)]

use check_paloalto::appliance_client::ApplianceClient;
use check_paloalto::checks::{Clock, ProbeContext};
use std::path::Path;
use std::time::Duration;

pub fn context(base_url: &str, state_path: &Path, clock: Clock) -> ProbeContext {
    ProbeContext {
        client: ApplianceClient::new(base_url, "secret-key", Duration::from_secs(5), true)
            .expect("client"),
        state_path: state_path.to_path_buf(),
        lock_timeout: Duration::from_secs(5),
        clock,
    }
}

pub fn success(result: &str) -> String {
    format!(r#"<response status="success"><result>{}</result></response>"#, result)
}

pub fn counters_xml(entries: &[(&str, &str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(name, ibytes, obytes)| {
            format!(
                "<entry><name>{}</name><ibytes>{}</ibytes><obytes>{}</obytes></entry>",
                name, ibytes, obytes
            )
        })
        .collect();
    success(&format!("<ifnet><ifnet>{}</ifnet></ifnet>", body))
}

pub fn cpu_xml(loads: &[u32]) -> String {
    let entries: String = loads
        .iter()
        .enumerate()
        .map(|(i, v)| format!("<entry><coreid>{}</coreid><value>{}</value></entry>", i, v))
        .collect();
    success(&format!(
        "<resource-monitor><data-processors><dp0><minute><cpu-load-average>{}</cpu-load-average></minute></dp0></data-processors></resource-monitor>",
        entries
    ))
}

pub fn environmentals_xml(cpu_temp: f64, cpu_alarm: bool, fan_alarm: bool) -> String {
    let flag = |b: bool| if b { "True" } else { "False" };
    success(&format!(
        "<thermal><Slot1><entry><slot>1</slot><description>Temperature near CPU</description>\
         <min>5.0</min><max>60.0</max><alarm>{}</alarm><DegreesC>{}</DegreesC></entry>\
         <entry><slot>1</slot><description>Temperature @ inlet</description>\
         <min>5.0</min><max>45.0</max><alarm>False</alarm><DegreesC>28.0</DegreesC></entry></Slot1></thermal>\
         <fan><Slot1><entry><slot>1</slot><description>Fan #1 RPM</description>\
         <min>1000</min><alarm>{}</alarm><RPMs>4200</RPMs></entry></Slot1></fan>",
        flag(cpu_alarm),
        cpu_temp,
        flag(fan_alarm)
    ))
}

pub fn certificates_xml(certs: &[(&str, &str)]) -> String {
    let entries: String = certs
        .iter()
        .map(|(name, expiry)| {
            format!(
                r#"<entry name="{}"><not-valid-after>{}</not-valid-after></entry>"#,
                name, expiry
            )
        })
        .collect();
    success(&format!("<certificate>{}</certificate>", entries))
}
