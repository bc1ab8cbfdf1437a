//! Global component ID construction.
//!
//! A GCID combines a component ID with a checksum of the data the component
//! was built from, laid out as a path so catalogs can shard on it:
//!
//! | Component ID | GCID |
//! |--------------|------|
//! | `org.gnome.Maps` | `org/gnome/Maps/<checksum>` |
//! | `io.github.foo.Bar` | `io/github/foo.Bar/<checksum>` |
//! | `firefox.desktop` | `f/fi/firefox.desktop/<checksum>` |

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

/// Top-level domains recognized as the head of a reverse-DNS component ID.
///
/// Covers the country-code domains and the generic domains seen in component
/// IDs. An ID whose head is a TLD missing here takes the simple split layout.
const COUNTRY_CODE_DOMAINS: &[&str] = &[
    "ac", "ad", "ae", "af", "ag", "ai", "al", "am", "ao", "aq", "ar", "as", "at", "au",
    "aw", "ax", "az", "ba", "bb", "bd", "be", "bf", "bg", "bh", "bi", "bj", "bm", "bn",
    "bo", "br", "bs", "bt", "bw", "by", "bz", "ca", "cc", "cd", "cf", "cg", "ch", "ci",
    "ck", "cl", "cm", "cn", "co", "cr", "cu", "cv", "cw", "cx", "cy", "cz", "de", "dj",
    "dk", "dm", "do", "dz", "ec", "ee", "eg", "er", "es", "et", "eu", "fi", "fj", "fk",
    "fm", "fo", "fr", "ga", "gd", "ge", "gf", "gg", "gh", "gi", "gl", "gm", "gn", "gp",
    "gq", "gr", "gs", "gt", "gu", "gw", "gy", "hk", "hm", "hn", "hr", "ht", "hu", "id",
    "ie", "il", "im", "in", "io", "iq", "ir", "is", "it", "je", "jm", "jo", "jp", "ke",
    "kg", "kh", "ki", "km", "kn", "kp", "kr", "kw", "ky", "kz", "la", "lb", "lc", "li",
    "lk", "lr", "ls", "lt", "lu", "lv", "ly", "ma", "mc", "md", "me", "mg", "mh", "mk",
    "ml", "mm", "mn", "mo", "mp", "mq", "mr", "ms", "mt", "mu", "mv", "mw", "mx", "my",
    "mz", "na", "nc", "ne", "nf", "ng", "ni", "nl", "no", "np", "nr", "nu", "nz", "om",
    "pa", "pe", "pf", "pg", "ph", "pk", "pl", "pm", "pn", "pr", "ps", "pt", "pw", "py",
    "qa", "re", "ro", "rs", "ru", "rw", "sa", "sb", "sc", "sd", "se", "sg", "sh", "si",
    "sk", "sl", "sm", "sn", "so", "sr", "ss", "st", "su", "sv", "sx", "sy", "sz", "tc",
    "td", "tf", "tg", "th", "tj", "tk", "tl", "tm", "tn", "to", "tr", "tt", "tv", "tw",
    "tz", "ua", "ug", "uk", "us", "uy", "uz", "va", "vc", "ve", "vg", "vi", "vn", "vu",
    "wf", "ws", "ye", "yt", "za", "zm", "zw",
];

const GENERIC_DOMAINS: &[&str] = &[
    "app", "art", "blog", "cloud", "club", "codes", "com", "community", "design", "dev",
    "digital", "edu", "email", "foundation", "games", "gay", "gov", "group", "host", "info",
    "int", "link", "live", "mil", "mobi", "moe", "name", "net", "network", "news",
    "ninja", "one", "online", "org", "page", "pro", "pub", "rocks", "run", "site",
    "social", "software", "solutions", "space", "studio", "systems", "tech", "tools", "top",
    "website", "wiki", "work", "works", "xyz", "zone",
];

/// Digest algorithm used for GCID checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumKind {
    #[default]
    Sha256,
    Sha512,
}

impl ChecksumKind {
    /// Computes the lowercase hex digest of `data`.
    pub fn compute(&self, data: &str) -> String {
        match self {
            ChecksumKind::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(data.as_bytes());
                format!("{:x}", hasher.finalize())
            }
            ChecksumKind::Sha512 => {
                let mut hasher = Sha512::new();
                hasher.update(data.as_bytes());
                format!("{:x}", hasher.finalize())
            }
        }
    }
}

impl std::str::FromStr for ChecksumKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha256" => Ok(ChecksumKind::Sha256),
            "sha512" => Ok(ChecksumKind::Sha512),
            _ => Err(format!("Unknown checksum: {}. Use 'sha256' or 'sha512'", s)),
        }
    }
}

pub fn is_top_level_domain(s: &str) -> bool {
    let s = s.to_lowercase();
    COUNTRY_CODE_DOMAINS.contains(&s.as_str()) || GENERIC_DOMAINS.contains(&s.as_str())
}

/// Builds the global component ID for `cid`.
///
/// Returns `None` for an empty component ID. A missing checksum is rendered
/// as an empty trailing segment.
pub fn build_component_global_id(cid: &str, checksum: Option<&str>) -> Option<String> {
    if cid.is_empty() {
        return None;
    }
    let checksum = checksum.unwrap_or("");

    let parts: Vec<&str> = cid.split('.').collect();
    if parts.len() > 2 && is_top_level_domain(parts[0]) {
        return Some(format!(
            "{}/{}/{}/{}",
            parts[0].to_lowercase(),
            parts[1],
            parts[2..].join("."),
            checksum
        ));
    }

    let first: String = cid.chars().take(1).collect();
    let prefix: String = cid.chars().take(2).collect();
    Some(format!(
        "{}/{}/{}/{}",
        first.to_lowercase(),
        prefix.to_lowercase(),
        cid,
        checksum
    ))
}
