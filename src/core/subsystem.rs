//! Subsystem identifiers and the subsystem name registry
//!
//! The registry table ends with the `unknown` sentinel. Lookups resolve through
//! precomputed indexes but keep the scan semantics of a sentinel-terminated
//! table:
//!
//! * [`subsystem_name`] never matches the sentinel; unresolved ids (the sentinel
//!   included) yield `"unknown"`.
//! * [`subsystem_id`] never matches the sentinel's name; unresolved names yield
//!   [`Subsystem::UNKNOWN`].
//! * [`is_valid_subsystem`] accepts the sentinel id itself, and only the ids in
//!   front of it otherwise.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Number of slots in a per-handle level table
pub const MAX_SUBSYSTEMS: usize = 255;

/// A `{name, id}` pair in a static registry table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameEntry {
    pub name: &'static str,
    pub id: u8,
}

impl NameEntry {
    pub const fn new(name: &'static str, id: u8) -> Self {
        Self { name, id }
    }
}

/// Identifier of an engine component that emits log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subsystem(pub u8);

impl Subsystem {
    pub const COMMON: Subsystem = Subsystem(0);
    pub const HANDLE: Subsystem = Subsystem(1);
    pub const HOST: Subsystem = Subsystem(2);
    pub const LISTENER: Subsystem = Subsystem(3);
    pub const LINK: Subsystem = Subsystem(4);
    pub const TRANSPORT: Subsystem = Subsystem(5);
    pub const CRYPTO: Subsystem = Subsystem(6);
    pub const COMPRESS: Subsystem = Subsystem(7);
    pub const FILTER: Subsystem = Subsystem(19);
    pub const DSTCACHE: Subsystem = Subsystem(20);
    pub const HEARTBEAT: Subsystem = Subsystem(21);
    pub const PMTUD: Subsystem = Subsystem(22);
    pub const TX: Subsystem = Subsystem(23);
    pub const RX: Subsystem = Subsystem(24);
    pub const TRANSP_LOOPBACK: Subsystem = Subsystem(28);
    pub const TRANSP_UDP: Subsystem = Subsystem(29);
    pub const TRANSP_SCTP: Subsystem = Subsystem(30);
    pub const NSSCRYPTO: Subsystem = Subsystem(60);
    pub const OPENSSLCRYPTO: Subsystem = Subsystem(61);
    pub const GCRYPTCRYPTO: Subsystem = Subsystem(62);
    pub const ZLIBCOMP: Subsystem = Subsystem(70);
    pub const LZ4COMP: Subsystem = Subsystem(71);
    pub const LZ4HCCOMP: Subsystem = Subsystem(72);
    pub const LZO2COMP: Subsystem = Subsystem(73);
    pub const LZMACOMP: Subsystem = Subsystem(74);
    pub const BZIP2COMP: Subsystem = Subsystem(75);
    pub const ZSTDCOMP: Subsystem = Subsystem(76);
    pub const NONE: Subsystem = Subsystem(253);
    /// Registry sentinel, also the "no subsystem" marker on the logging path
    pub const UNKNOWN: Subsystem = Subsystem(254);

    #[inline]
    pub const fn id(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        subsystem_name(self.0)
    }

    pub fn from_name(name: &str) -> Self {
        Subsystem(subsystem_id(name))
    }

    pub fn is_valid(self) -> bool {
        is_valid_subsystem(self.0)
    }

    /// Slot in a level table, if this id addresses one
    #[inline]
    pub(crate) fn slot(self) -> Option<usize> {
        let idx = self.0 as usize;
        (idx < MAX_SUBSYSTEMS).then_some(idx)
    }
}

impl From<u8> for Subsystem {
    fn from(id: u8) -> Self {
        Subsystem(id)
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry table; `unknown` MUST remain the last entry.
pub const SUBSYSTEM_NAMES: [NameEntry; 29] = [
    NameEntry::new("common", Subsystem::COMMON.0),
    NameEntry::new("handle", Subsystem::HANDLE.0),
    NameEntry::new("host", Subsystem::HOST.0),
    NameEntry::new("listener", Subsystem::LISTENER.0),
    NameEntry::new("link", Subsystem::LINK.0),
    NameEntry::new("transport", Subsystem::TRANSPORT.0),
    NameEntry::new("crypto", Subsystem::CRYPTO.0),
    NameEntry::new("compress", Subsystem::COMPRESS.0),
    NameEntry::new("filter", Subsystem::FILTER.0),
    NameEntry::new("dstcache", Subsystem::DSTCACHE.0),
    NameEntry::new("heartbeat", Subsystem::HEARTBEAT.0),
    NameEntry::new("pmtud", Subsystem::PMTUD.0),
    NameEntry::new("tx", Subsystem::TX.0),
    NameEntry::new("rx", Subsystem::RX.0),
    NameEntry::new("loopback", Subsystem::TRANSP_LOOPBACK.0),
    NameEntry::new("udp", Subsystem::TRANSP_UDP.0),
    NameEntry::new("sctp", Subsystem::TRANSP_SCTP.0),
    NameEntry::new("nsscrypto", Subsystem::NSSCRYPTO.0),
    NameEntry::new("opensslcrypto", Subsystem::OPENSSLCRYPTO.0),
    NameEntry::new("gcryptcrypto", Subsystem::GCRYPTCRYPTO.0),
    NameEntry::new("zlibcomp", Subsystem::ZLIBCOMP.0),
    NameEntry::new("lz4comp", Subsystem::LZ4COMP.0),
    NameEntry::new("lz4hccomp", Subsystem::LZ4HCCOMP.0),
    NameEntry::new("lzo2comp", Subsystem::LZO2COMP.0),
    NameEntry::new("lzmacomp", Subsystem::LZMACOMP.0),
    NameEntry::new("bzip2comp", Subsystem::BZIP2COMP.0),
    NameEntry::new("zstdcomp", Subsystem::ZSTDCOMP.0),
    NameEntry::new("none", Subsystem::NONE.0),
    NameEntry::new("unknown", Subsystem::UNKNOWN.0),
];

const SENTINEL_NAME: &str = "unknown";

/// Entries in front of the sentinel
fn registered() -> &'static [NameEntry] {
    &SUBSYSTEM_NAMES[..SUBSYSTEM_NAMES.len() - 1]
}

/// id -> name index over the registered entries (sentinel excluded)
static NAME_BY_ID: [Option<&'static str>; 256] = build_name_index();

const fn build_name_index() -> [Option<&'static str>; 256] {
    let mut index = [None; 256];
    let mut i = 0;
    while i < SUBSYSTEM_NAMES.len() - 1 {
        let entry = SUBSYSTEM_NAMES[i];
        index[entry.id as usize] = Some(entry.name);
        i += 1;
    }
    index
}

fn id_by_name() -> &'static HashMap<String, u8> {
    static INDEX: OnceLock<HashMap<String, u8>> = OnceLock::new();
    INDEX.get_or_init(|| {
        registered()
            .iter()
            .map(|entry| (entry.name.to_ascii_lowercase(), entry.id))
            .collect()
    })
}

/// Name of a subsystem id, `"unknown"` when unresolved.
pub fn subsystem_name(id: u8) -> &'static str {
    NAME_BY_ID[id as usize].unwrap_or(SENTINEL_NAME)
}

/// Case-insensitive lookup of a subsystem id, [`Subsystem::UNKNOWN`] when unresolved.
pub fn subsystem_id(name: &str) -> u8 {
    id_by_name()
        .get(&name.to_ascii_lowercase())
        .copied()
        .unwrap_or(Subsystem::UNKNOWN.0)
}

/// Whether `id` may address a level table slot.
///
/// The sentinel id is valid: it matches its own table entry.
pub fn is_valid_subsystem(id: u8) -> bool {
    id == Subsystem::UNKNOWN.0 || NAME_BY_ID[id as usize].is_some()
}

/// Registered subsystems in table order, sentinel excluded
pub fn subsystems() -> impl Iterator<Item = Subsystem> {
    registered().iter().map(|entry| Subsystem(entry.id))
}
