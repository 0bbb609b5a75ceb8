// Turn XML API responses into typed readings. Exposed to the crate for checks and unit tests.

use crate::error::{ProbeError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use roxmltree::{Document, Node};

#[derive(Debug, Clone, PartialEq)]
pub struct CoreLoad {
    pub core_id: u32,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiskUsage {
    /// Device name without `/dev/`, e.g. `sda2`.
    pub device: String,
    pub used_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub max_sessions: u64,
    pub active_sessions: u64,
    pub throughput_kbps: u64,
}

/// Raw counter text for one interface; validated later by `CounterSample::parse`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCounters {
    pub ibytes: Option<String>,
    pub obytes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Top-level section: `thermal`, `fan`, `power`, `power-supply`, ...
    pub section: String,
    pub description: String,
    pub alarm: bool,
    pub degrees_c: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificateInfo {
    pub name: String,
    pub not_valid_after: DateTime<Utc>,
}

/// Checks the `<response status="...">` envelope. Returns the error text for `status="error"`.
pub(crate) fn response_error(xml: &str) -> Result<Option<String>> {
    let doc = document(xml)?;
    let root = doc.root_element();
    if !root.has_tag_name("response") {
        return Err(ProbeError::MalformedResponse(format!(
            "expected <response>, got <{}>",
            root.tag_name().name()
        )));
    }
    match root.attribute("status") {
        Some("success") => Ok(None),
        Some(_) => Ok(Some(error_message(root))),
        None => Err(ProbeError::MalformedResponse(
            "response without status attribute".into(),
        )),
    }
}

/// Concatenated text of `<msg>` (or the whole response if there is none).
pub(crate) fn error_message(root: Node<'_, '_>) -> String {
    let scope = root
        .descendants()
        .find(|n| n.has_tag_name("msg"))
        .unwrap_or(root);
    let text: Vec<&str> = scope
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if text.is_empty() {
        "no message".to_string()
    } else {
        text.join(" ")
    }
}

pub(crate) fn cpu_load(xml: &str) -> Result<Vec<CoreLoad>> {
    let doc = document(xml)?;
    let avg = doc
        .descendants()
        .find(|n| n.has_tag_name("cpu-load-average"))
        .ok_or_else(|| missing("cpu-load-average"))?;
    let mut cores = Vec::new();
    for entry in avg.children().filter(|n| n.has_tag_name("entry")) {
        let core_id = required(entry, "coreid")?
            .parse::<u32>()
            .map_err(|_| malformed("coreid is not an integer"))?;
        let percent = parse_f64(required(entry, "value")?, "cpu load value")?;
        cores.push(CoreLoad { core_id, percent });
    }
    if cores.is_empty() {
        return Err(missing("cpu-load-average/entry"));
    }
    Ok(cores)
}

/// Parses the `df -h` style text inside `<result>`; one entry per `/dev/*` filesystem.
pub(crate) fn disk_space(xml: &str) -> Result<Vec<DiskUsage>> {
    let doc = document(xml)?;
    let result = result_node(&doc)?;
    let text: String = result
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let mut disks = Vec::new();
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        let Some(fs) = tokens.next() else { continue };
        let Some(device) = fs.strip_prefix("/dev/") else {
            continue;
        };
        let Some(pct) = tokens.find_map(|t| t.strip_suffix('%')) else {
            continue;
        };
        let used_percent = parse_f64(pct, "disk usage percent")?;
        disks.push(DiskUsage {
            device: device.to_string(),
            used_percent,
        });
    }
    if disks.is_empty() {
        return Err(malformed("no /dev filesystems in disk-space output"));
    }
    Ok(disks)
}

pub(crate) fn session_info(xml: &str) -> Result<SessionInfo> {
    let doc = document(xml)?;
    let result = result_node(&doc)?;
    let num = |name: &str| -> Result<u64> {
        required(result, name)?
            .parse::<u64>()
            .map_err(|_| malformed(&format!("{} is not an integer", name)))
    };
    Ok(SessionInfo {
        max_sessions: num("num-max")?,
        active_sessions: num("num-active")?,
        throughput_kbps: num("kbps")?,
    })
}

/// Counters for `appliance_name`, preferring the logical (`ifnet`) entry over `hw`.
/// Falls back to the last unnamed entry carrying `ibytes`; an entry naming another
/// interface is never used.
pub(crate) fn interface_counters(xml: &str, appliance_name: &str) -> Result<RawCounters> {
    let doc = document(xml)?;
    result_node(&doc)?;
    let entries: Vec<Node<'_, '_>> = doc
        .descendants()
        .filter(|n| n.has_tag_name("entry"))
        .collect();
    let named: Vec<Node<'_, '_>> = entries
        .iter()
        .copied()
        .filter(|e| child_text(*e, "name").map(str::trim) == Some(appliance_name))
        .collect();
    let entry = named
        .iter()
        .copied()
        .find(|e| e.parent().is_some_and(|p| p.has_tag_name("ifnet")))
        .or_else(|| named.first().copied())
        .or_else(|| {
            entries
                .iter()
                .rev()
                .copied()
                .find(|e| {
                    !e.children().any(|n| n.has_tag_name("name"))
                        && child_text(*e, "ibytes").is_some()
                })
        })
        .ok_or_else(|| malformed(&format!("no counters for {}", appliance_name)))?;
    Ok(RawCounters {
        ibytes: child_text(entry, "ibytes").map(str::to_string),
        obytes: child_text(entry, "obytes").map(str::to_string),
    })
}

pub(crate) fn environmentals(xml: &str) -> Result<Vec<SensorReading>> {
    let doc = document(xml)?;
    let result = result_node(&doc)?;
    let mut readings = Vec::new();
    for section in result.children().filter(|n| n.is_element()) {
        for entry in section.descendants().filter(|n| n.has_tag_name("entry")) {
            let Some(alarm) = child_text(entry, "alarm") else {
                continue;
            };
            let description = child_text(entry, "description")
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .or_else(|| entry.attribute("name").map(str::to_string))
                .unwrap_or_else(|| format!("{} sensor", section.tag_name().name()));
            readings.push(SensorReading {
                section: section.tag_name().name().to_string(),
                description,
                alarm: alarm.trim().eq_ignore_ascii_case("true"),
                degrees_c: optional_f64(entry, "DegreesC")?,
                min: optional_f64(entry, "min")?,
                max: optional_f64(entry, "max")?,
            });
        }
    }
    if readings.is_empty() {
        return Err(malformed("no sensor entries in environmentals output"));
    }
    Ok(readings)
}

pub(crate) fn certificates(xml: &str) -> Result<Vec<CertificateInfo>> {
    let doc = document(xml)?;
    result_node(&doc)?;
    let mut certs = Vec::new();
    for entry in doc.descendants().filter(|n| n.has_tag_name("entry")) {
        let Some(expiry) = child_text(entry, "not-valid-after") else {
            continue;
        };
        let name = entry
            .attribute("name")
            .ok_or_else(|| malformed("certificate entry without name"))?;
        certs.push(CertificateInfo {
            name: name.to_string(),
            not_valid_after: parse_expiry(expiry)?,
        });
    }
    Ok(certs)
}

/// Appliance format: `Jan  2 03:04:05 2031 GMT` (day is space padded).
pub(crate) fn parse_expiry(raw: &str) -> Result<DateTime<Utc>> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_end_matches(" GMT").trim_end_matches(" UTC");
    NaiveDateTime::parse_from_str(trimmed, "%b %d %H:%M:%S %Y")
        .map(|dt| dt.and_utc())
        .map_err(|e| malformed(&format!("bad certificate date '{}': {}", raw, e)))
}

fn document(xml: &str) -> Result<Document<'_>> {
    Document::parse(xml).map_err(|e| malformed(&format!("not XML: {}", e)))
}

fn result_node<'a, 'input>(doc: &'a Document<'input>) -> Result<Node<'a, 'input>> {
    doc.root_element()
        .children()
        .find(|n| n.has_tag_name("result"))
        .ok_or_else(|| missing("result"))
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
}

fn required<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
    child_text(node, name)
        .map(str::trim)
        .ok_or_else(|| missing(name))
}

fn optional_f64(node: Node<'_, '_>, name: &str) -> Result<Option<f64>> {
    child_text(node, name)
        .map(|t| parse_f64(t, name))
        .transpose()
}

fn parse_f64(raw: &str, what: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| malformed(&format!("{} is not a number: '{}'", what, raw.trim())))
}

fn missing(name: &str) -> ProbeError {
    ProbeError::MalformedResponse(format!("missing <{}>", name))
}

fn malformed(detail: &str) -> ProbeError {
    ProbeError::MalformedResponse(detail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const CPU_XML: &str = r#"<response status="success"><result><resource-monitor>
        <data-processors><dp0><minute><cpu-load-average>
        <entry><coreid>0</coreid><value>3</value></entry>
        <entry><coreid>1</coreid><value>47</value></entry>
        </cpu-load-average></minute></dp0></data-processors></resource-monitor></result></response>"#;

    #[test]
    fn cpu_load_reads_each_core() {
        let cores = cpu_load(CPU_XML).unwrap();
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[1].core_id, 1);
        assert_eq!(cores[1].percent, 47.0);
    }

    #[test]
    fn cpu_load_missing_section_is_malformed() {
        let err = cpu_load(r#"<response status="success"><result/></response>"#).unwrap_err();
        assert!(matches!(err, ProbeError::MalformedResponse(_)));
    }

    #[test]
    fn disk_space_parses_df_text() {
        let xml = r#"<response status="success"><result><![CDATA[
Filesystem      Size  Used Avail Use% Mounted on
/dev/sda2       3.8G  2.7G  1.0G  74% /
/dev/sda5       7.6G  3.5G  3.8G  48% /opt/pancfg
tmpfs           2.0G   12M  2.0G   1% /dev/shm
]]></result></response>"#;
        let disks = disk_space(xml).unwrap();
        assert_eq!(
            disks,
            vec![
                DiskUsage {
                    device: "sda2".into(),
                    used_percent: 74.0
                },
                DiskUsage {
                    device: "sda5".into(),
                    used_percent: 48.0
                },
            ]
        );
    }

    #[test]
    fn session_info_reads_fields() {
        let xml = r#"<response status="success"><result>
            <num-max>262142</num-max><num-active>1234</num-active><kbps>5600</kbps>
            </result></response>"#;
        let info = session_info(xml).unwrap();
        assert_eq!(info.max_sessions, 262142);
        assert_eq!(info.active_sessions, 1234);
        assert_eq!(info.throughput_kbps, 5600);
    }

    #[test]
    fn session_info_missing_field() {
        let xml = r#"<response status="success"><result><num-max>1</num-max></result></response>"#;
        let err = session_info(xml).unwrap_err();
        assert!(err.to_string().contains("num-active"));
    }

    #[test]
    fn interface_counters_prefers_ifnet_entry() {
        let xml = r#"<response status="success"><result>
            <hw><entry><name>ethernet1/3</name><ibytes>1</ibytes><obytes>2</obytes></entry></hw>
            <ifnet><ifnet><entry><name>ethernet1/3</name><ibytes>100</ibytes><obytes>200</obytes></entry></ifnet></ifnet>
            </result></response>"#;
        let c = interface_counters(xml, "ethernet1/3").unwrap();
        assert_eq!(c.ibytes.as_deref(), Some("100"));
        assert_eq!(c.obytes.as_deref(), Some("200"));
    }

    #[test]
    fn interface_counters_keeps_missing_fields_as_none() {
        let xml = r#"<response status="success"><result><ifnet><entry>
            <name>tunnel.4</name><ibytes>7</ibytes></entry></ifnet></result></response>"#;
        let c = interface_counters(xml, "tunnel.4").unwrap();
        assert_eq!(c.ibytes.as_deref(), Some("7"));
        assert!(c.obytes.is_none());
    }

    #[test]
    fn interface_counters_ignore_other_interfaces() {
        let xml = r#"<response status="success"><result><ifnet><entry>
            <name>ethernet1/4</name><ibytes>999</ibytes><obytes>888</obytes></entry></ifnet></result></response>"#;
        let err = interface_counters(xml, "ethernet1/3").unwrap_err();
        assert!(matches!(err, ProbeError::MalformedResponse(_)));
        assert!(err.to_string().contains("no counters for ethernet1/3"));
    }

    #[test]
    fn interface_counters_accept_unnamed_entry() {
        let xml = r#"<response status="success"><result><entry>
            <ibytes>5</ibytes><obytes>6</obytes></entry></result></response>"#;
        let c = interface_counters(xml, "ethernet1/3").unwrap();
        assert_eq!(c.ibytes.as_deref(), Some("5"));
    }

    #[test]
    fn interface_counters_without_entries_is_malformed() {
        let xml = r#"<response status="success"><result/></response>"#;
        assert!(interface_counters(xml, "ethernet1/1").is_err());
    }

    #[test]
    fn environmentals_collects_all_sections() {
        let xml = r#"<response status="success"><result>
            <thermal><Slot1>
              <entry><slot>1</slot><description>Temperature near CPU</description>
                <min>5.0</min><max>60.0</max><alarm>False</alarm><DegreesC>41.2</DegreesC></entry>
            </Slot1></thermal>
            <fan><Slot1>
              <entry><slot>1</slot><description>Fan #1 RPM</description>
                <min>1000</min><alarm>True</alarm><RPMs>0</RPMs></entry>
            </Slot1></fan>
            </result></response>"#;
        let r = environmentals(xml).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].section, "thermal");
        assert_eq!(r[0].degrees_c, Some(41.2));
        assert_eq!(r[0].max, Some(60.0));
        assert!(!r[0].alarm);
        assert_eq!(r[1].description, "Fan #1 RPM");
        assert!(r[1].alarm);
        assert_eq!(r[1].degrees_c, None);
    }

    #[test]
    fn certificates_parse_expiry() {
        let xml = r#"<response status="success"><result><certificate>
            <entry name="web-ui"><not-valid-after>Jan  2 03:04:05 2031 GMT</not-valid-after></entry>
            <entry name="root-ca"><not-valid-after>Dec 31 23:59:59 2040 GMT</not-valid-after></entry>
            </certificate></result></response>"#;
        let certs = certificates(xml).unwrap();
        assert_eq!(certs.len(), 2);
        assert_eq!(certs[0].name, "web-ui");
        let d = certs[0].not_valid_after;
        assert_eq!((d.year(), d.month(), d.day()), (2031, 1, 2));
        assert_eq!((d.hour(), d.minute(), d.second()), (3, 4, 5));
    }

    #[test]
    fn certificates_bad_date_is_malformed() {
        let xml = r#"<response status="success"><result>
            <entry name="x"><not-valid-after>tomorrow</not-valid-after></entry>
            </result></response>"#;
        assert!(matches!(
            certificates(xml).unwrap_err(),
            ProbeError::MalformedResponse(_)
        ));
    }

    #[test]
    fn response_error_extracts_message() {
        let xml = r#"<response status="error" code="403"><result><msg>Invalid credentials.</msg></result></response>"#;
        assert_eq!(
            response_error(xml).unwrap().as_deref(),
            Some("Invalid credentials.")
        );
        assert!(response_error(CPU_XML).unwrap().is_none());
    }

    #[test]
    fn non_xml_is_malformed() {
        assert!(matches!(
            response_error("<html").unwrap_err(),
            ProbeError::MalformedResponse(_)
        ));
    }
}
