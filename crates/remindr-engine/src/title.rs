// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment title formats.
//!
//! Legacy titles read `"{client} - {service}"`, current titles read
//! `"{service} | {client}"`.

const LEGACY_SEPARATOR: &str = " - ";
const CURRENT_SEPARATOR: &str = " | ";

/// Splits a current-format title into `(service, client)`.
pub(crate) fn split_current(title: &str) -> Option<(&str, &str)> {
    let (service, client) = title.split_once(CURRENT_SEPARATOR)?;
    non_empty_pair(service, client)
}

/// Splits a legacy-format title into `(client, service)`.
pub(crate) fn split_legacy(title: &str) -> Option<(&str, &str)> {
    if title.contains(CURRENT_SEPARATOR) {
        return None;
    }
    let (client, service) = title.split_once(LEGACY_SEPARATOR)?;
    non_empty_pair(client, service)
}

fn non_empty_pair<'a>(a: &'a str, b: &'a str) -> Option<(&'a str, &'a str)> {
    let (a, b) = (a.trim(), b.trim());
    (!a.is_empty() && !b.is_empty()).then_some((a, b))
}

/// Whether `title` is still in the legacy format.
///
/// False for current-format titles, so migrating twice is a no-op.
pub fn is_legacy_title(title: &str) -> bool {
    split_legacy(title).is_some()
}

/// Current-format rewrite of a legacy title, or `None` if there is nothing
/// to migrate.
pub fn migrate_title(title: &str) -> Option<String> {
    let (client, service) = split_legacy(title)?;
    Some(format!("{service}{CURRENT_SEPARATOR}{client}"))
}
