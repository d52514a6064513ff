// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-region numbering shapes.
//!
//! Each region lists the national significant number (NSN) shapes it accepts:
//! leading digits plus an inclusive length range. Regions differ in what a
//! leading `0` means: most use it as a trunk prefix that is dropped in
//! international form, while Italy keeps it as part of the number.

use serde::Serialize;

/// How a leading zero in national notation is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrunkPrefix {
    /// `0` is a trunk prefix, dropped after the country code.
    Strip,
    /// `0` belongs to the number and survives international formatting.
    Keep,
}

/// Kind of line a shape describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    Mobile,
    Fixed,
}

/// One accepted NSN shape.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub kind: LineKind,
    pub prefixes: &'static [&'static str],
    pub min_len: usize,
    pub max_len: usize,
}

impl Shape {
    fn matches(&self, nsn: &str) -> bool {
        (self.min_len..=self.max_len).contains(&nsn.len())
            && self.prefixes.iter().any(|p| nsn.starts_with(p))
    }
}

/// A dialing region.
#[derive(Debug)]
pub struct Region {
    /// ISO 3166-1 alpha-2 code.
    pub code: &'static str,
    pub name: &'static str,
    /// Country calling code, digits only.
    pub country_code: &'static str,
    pub trunk: TrunkPrefix,
    pub shapes: &'static [Shape],
}

impl Region {
    /// Looks up a region by its ISO code, case-insensitively.
    pub fn from_code(code: &str) -> Option<&'static Region> {
        REGIONS.iter().find(|r| r.code.eq_ignore_ascii_case(code))
    }

    /// Applies this region's zero rule to digits written after the country code.
    pub fn national_significant<'a>(&self, national: &'a str) -> &'a str {
        match self.trunk {
            TrunkPrefix::Strip => national.trim_start_matches('0'),
            TrunkPrefix::Keep => national,
        }
    }

    /// Returns the NSN if `candidate`, written in national notation, fits one of
    /// this region's shapes. A single leading trunk zero is dropped first where
    /// the region strips it.
    pub fn match_national<'a>(&self, candidate: &'a str) -> Option<&'a str> {
        let nsn = match self.trunk {
            TrunkPrefix::Strip => candidate.strip_prefix('0').unwrap_or(candidate),
            TrunkPrefix::Keep => candidate,
        };
        self.shapes
            .iter()
            .any(|s| s.matches(nsn))
            .then_some(nsn)
    }

    /// Which kind of line the NSN looks like, if any.
    pub fn line_kind(&self, nsn: &str) -> Option<LineKind> {
        self.shapes.iter().find(|s| s.matches(nsn)).map(|s| s.kind)
    }

    /// `+<country code><nsn>`.
    pub fn format(&self, nsn: &str) -> String {
        format!("+{}{}", self.country_code, nsn)
    }
}

const DIGITS_2_TO_9: &[&str] = &["2", "3", "4", "5", "6", "7", "8", "9"];

/// All known regions, in the fallback search order used after the home region.
pub static REGIONS: &[Region] = &[
    Region {
        code: "FR",
        name: "France",
        country_code: "33",
        trunk: TrunkPrefix::Strip,
        shapes: &[
            Shape { kind: LineKind::Mobile, prefixes: &["6", "7"], min_len: 9, max_len: 9 },
            Shape { kind: LineKind::Fixed, prefixes: &["1", "2", "3", "4", "5", "9"], min_len: 9, max_len: 9 },
        ],
    },
    Region {
        code: "BE",
        name: "Belgium",
        country_code: "32",
        trunk: TrunkPrefix::Strip,
        shapes: &[
            Shape { kind: LineKind::Mobile, prefixes: &["46", "47", "48", "49"], min_len: 9, max_len: 9 },
            Shape { kind: LineKind::Fixed, prefixes: DIGITS_2_TO_9, min_len: 8, max_len: 8 },
        ],
    },
    Region {
        code: "CH",
        name: "Switzerland",
        country_code: "41",
        trunk: TrunkPrefix::Strip,
        shapes: &[
            Shape { kind: LineKind::Mobile, prefixes: &["75", "76", "77", "78", "79"], min_len: 9, max_len: 9 },
            Shape { kind: LineKind::Fixed, prefixes: &["2", "3", "4", "5", "6", "8", "9"], min_len: 9, max_len: 9 },
        ],
    },
    Region {
        code: "LU",
        name: "Luxembourg",
        country_code: "352",
        trunk: TrunkPrefix::Strip,
        shapes: &[
            Shape { kind: LineKind::Mobile, prefixes: &["621", "628", "661", "668", "691", "698"], min_len: 9, max_len: 9 },
            Shape { kind: LineKind::Fixed, prefixes: &["2"], min_len: 8, max_len: 8 },
        ],
    },
    Region {
        code: "GB",
        name: "United Kingdom",
        country_code: "44",
        trunk: TrunkPrefix::Strip,
        shapes: &[
            Shape { kind: LineKind::Mobile, prefixes: &["7"], min_len: 10, max_len: 10 },
            Shape { kind: LineKind::Fixed, prefixes: &["1", "2"], min_len: 9, max_len: 10 },
        ],
    },
    Region {
        code: "ES",
        name: "Spain",
        country_code: "34",
        trunk: TrunkPrefix::Strip,
        shapes: &[
            Shape { kind: LineKind::Mobile, prefixes: &["6", "7"], min_len: 9, max_len: 9 },
            Shape { kind: LineKind::Fixed, prefixes: &["8", "9"], min_len: 9, max_len: 9 },
        ],
    },
    Region {
        code: "PT",
        name: "Portugal",
        country_code: "351",
        trunk: TrunkPrefix::Strip,
        shapes: &[
            Shape { kind: LineKind::Mobile, prefixes: &["91", "92", "93", "96"], min_len: 9, max_len: 9 },
            Shape { kind: LineKind::Fixed, prefixes: &["2"], min_len: 9, max_len: 9 },
        ],
    },
    Region {
        code: "IT",
        name: "Italy",
        country_code: "39",
        trunk: TrunkPrefix::Keep,
        shapes: &[
            Shape { kind: LineKind::Mobile, prefixes: &["3"], min_len: 9, max_len: 10 },
            Shape { kind: LineKind::Fixed, prefixes: &["0"], min_len: 6, max_len: 11 },
        ],
    },
    Region {
        code: "DE",
        name: "Germany",
        country_code: "49",
        trunk: TrunkPrefix::Strip,
        shapes: &[
            Shape { kind: LineKind::Mobile, prefixes: &["15", "16", "17"], min_len: 10, max_len: 11 },
            Shape {
                kind: LineKind::Fixed,
                prefixes: &["30", "40", "69", "89", "211", "221", "341", "351", "511", "611", "711", "911"],
                min_len: 9,
                max_len: 11,
            },
        ],
    },
    Region {
        code: "MA",
        name: "Morocco",
        country_code: "212",
        trunk: TrunkPrefix::Strip,
        shapes: &[
            Shape { kind: LineKind::Mobile, prefixes: &["6", "7"], min_len: 9, max_len: 9 },
            Shape { kind: LineKind::Fixed, prefixes: &["5"], min_len: 9, max_len: 9 },
        ],
    },
    Region {
        code: "US",
        name: "United States",
        country_code: "1",
        trunk: TrunkPrefix::Keep,
        shapes: &[
            Shape { kind: LineKind::Mobile, prefixes: DIGITS_2_TO_9, min_len: 10, max_len: 10 },
        ],
    },
];
