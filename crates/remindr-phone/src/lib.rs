// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number normalization for remindr.
//!
//! Turns loosely formatted numbers, as typed into appointment descriptions,
//! into a canonical international form (`+<country code><national number>`),
//! together with the region it was attributed to and how confident that
//! attribution is.
//!
//! Resolution order:
//! 1. Explicit international prefix (`+` or `00`): the country code is matched
//!    longest-first and the region's zero rule is applied to the remainder.
//! 2. National notation: the home region is tried first, then every other
//!    known region in table order. Each region gets two candidates, the digits
//!    as written and the digits with the leading zero toggled, plus the digits
//!    read as `<country code><nsn>` without a `+`.
//! 3. Nothing matched: low confidence, attributed to the home region.

pub mod regions;

use serde::Serialize;
use strum::Display;

pub use regions::{LineKind, Region, TrunkPrefix, REGIONS};

/// How trustworthy a normalization result is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

/// Canonical form of a phone number plus its attributed region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedPhone {
    /// `+<digits>`, or empty when the input held no digits.
    pub formatted: String,
    pub region_code: &'static str,
    pub region_name: &'static str,
    pub confidence: Confidence,
}

impl NormalizedPhone {
    fn high(region: &'static Region, nsn: &str) -> Self {
        Self {
            formatted: region.format(nsn),
            region_code: region.code,
            region_name: region.name,
            confidence: Confidence::High,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.formatted.is_empty()
    }
}

/// Normalizes `input` using `home` as the default region.
pub fn normalize(input: &str, home: &'static Region) -> NormalizedPhone {
    let cleaned = clean(input);

    if let Some(intl) = cleaned.strip_prefix('+') {
        if let Some(found) = from_international(intl) {
            return found;
        }
        return fallback(home, intl, true);
    }

    if let Some(found) = from_national(&cleaned, home) {
        return found;
    }
    fallback(home, &cleaned, false)
}

/// Masks all but the last four digits, for logs.
pub fn mask(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    let prefix = if phone.trim_start().starts_with('+') { "+" } else { "" };
    format!("{prefix}{}{tail}", "*".repeat(digits.len() - 4))
}

/// Keeps digits and a leading `+`; rewrites a `00` international prefix as `+`.
fn clean(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if c == '+' && out.is_empty() {
            out.push(c);
        }
    }
    match out.strip_prefix("00") {
        Some(rest) => format!("+{rest}"),
        None => out,
    }
}

fn from_international(digits: &str) -> Option<NormalizedPhone> {
    let mut by_code: Vec<&'static Region> = REGIONS.iter().collect();
    by_code.sort_by_key(|r| std::cmp::Reverse(r.country_code.len()));

    let region = by_code
        .into_iter()
        .find(|r| digits.starts_with(r.country_code))?;
    let nsn = region.national_significant(&digits[region.country_code.len()..]);
    (!nsn.is_empty()).then(|| NormalizedPhone::high(region, nsn))
}

fn from_national(digits: &str, home: &'static Region) -> Option<NormalizedPhone> {
    if digits.is_empty() {
        return None;
    }
    let toggled = match digits.strip_prefix('0') {
        Some(rest) => rest.to_string(),
        None => format!("0{digits}"),
    };

    let order = std::iter::once(home).chain(REGIONS.iter().filter(|r| r.code != home.code));
    for region in order {
        for candidate in [digits, toggled.as_str()] {
            if let Some(nsn) = region.match_national(candidate) {
                return Some(NormalizedPhone::high(region, nsn));
            }
        }
        if let Some(rest) = digits.strip_prefix(region.country_code) {
            let nsn = region.national_significant(rest);
            if region.line_kind(nsn).is_some() {
                return Some(NormalizedPhone::high(region, nsn));
            }
        }
    }
    None
}

fn fallback(home: &'static Region, digits: &str, international: bool) -> NormalizedPhone {
    let formatted = if digits.is_empty() {
        String::new()
    } else if international {
        format!("+{digits}")
    } else {
        home.format(digits.strip_prefix('0').unwrap_or(digits))
    };
    NormalizedPhone {
        formatted,
        region_code: home.code,
        region_name: home.name,
        confidence: Confidence::Low,
    }
}
