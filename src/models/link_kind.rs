use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminant for the four link record kinds sharing the short-code
/// namespace. Doubles as the API token scope and the session `link_type`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Single,
    Quality,
    Series,
    Zip,
}

impl LinkKind {
    /// Resolution probe order. At most one kind can own a code, so the
    /// order only matters for diagnostics.
    pub const ALL: [LinkKind; 4] = [
        LinkKind::Single,
        LinkKind::Quality,
        LinkKind::Series,
        LinkKind::Zip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Single => "single",
            LinkKind::Quality => "quality",
            LinkKind::Series => "series",
            LinkKind::Zip => "zip",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(LinkKind::Single),
            "quality" => Ok(LinkKind::Quality),
            "series" => Ok(LinkKind::Series),
            "zip" => Ok(LinkKind::Zip),
            _ => Err(()),
        }
    }
}
