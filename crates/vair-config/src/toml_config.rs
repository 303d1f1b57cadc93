use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use super::stack_config::{
    CfgLink, CfgLinkEndpoint, CfgRlcNet, CfgRrcNet, SharedConfig, StackConfig, default_broadcast_interval_ms,
};

/// Build `SharedConfig` from a TOML configuration file
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if !root.rrc.extra.is_empty() {
        return Err(format!("Unrecognized fields in rrc: {:?}", sorted_keys(&root.rrc.extra)).into());
    }
    if !root.rlc.extra.is_empty() {
        return Err(format!("Unrecognized fields in rlc: {:?}", sorted_keys(&root.rlc.extra)).into());
    }
    if let Some(ref link) = root.link {
        if !link.extra.is_empty() {
            return Err(format!("Unrecognized fields in link: {:?}", sorted_keys(&link.extra)).into());
        }
    }

    // Build config from required and optional values
    let mut cfg = StackConfig {
        debug_log: root.debug_log,
        rrc: CfgRrcNet {
            endpoint: CfgLinkEndpoint { bind_addr: root.rrc.bind_addr, bind_port: root.rrc.bind_port },
        },
        rlc: CfgRlcNet {
            endpoint: CfgLinkEndpoint { bind_addr: root.rlc.bind_addr, bind_port: root.rlc.bind_port },
            broadcast_interval_ms: root.rlc.broadcast_interval_ms.unwrap_or_else(default_broadcast_interval_ms),
        },
        link: CfgLink::default(),
    };

    if let Some(link) = root.link {
        apply_link_patch(&mut cfg.link, link);
    }

    Ok(SharedConfig::from_config(cfg)?)
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    let cfg = from_reader(r)?;
    Ok(cfg)
}

fn apply_link_patch(dst: &mut CfgLink, src: LinkDto) {
    if let Some(v) = src.recv_timeout_ms {
        dst.recv_timeout_ms = v;
    }
    if let Some(v) = src.max_datagram_size {
        dst.max_datagram_size = v;
    }
    if let Some(v) = src.rnti_first {
        dst.rnti_first = v;
    }
    if let Some(v) = src.rnti_last {
        dst.rnti_last = v;
    }
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,

    rrc: RrcDto,
    rlc: RlcDto,

    #[serde(default)]
    link: Option<LinkDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct RrcDto {
    pub bind_addr: String,
    pub bind_port: u16,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct RlcDto {
    pub bind_addr: String,
    pub bind_port: u16,
    pub broadcast_interval_ms: Option<u64>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
struct LinkDto {
    pub recv_timeout_ms: Option<u64>,
    pub max_datagram_size: Option<usize>,
    pub rnti_first: Option<u16>,
    pub rnti_last: Option<u16>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
