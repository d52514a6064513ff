// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery of the appointments that still need a reminder.
//!
//! Discovery is stateless: it reads the calendar and the store and hands
//! its result straight back to the caller.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, info};

use remindr_core::types::{Appointment, CalendarEvent};
use remindr_core::{AppointmentSource, RemindrError, ReminderStore};

use crate::title::{split_current, split_legacy};

/// A run of digits with the usual separators, optionally prefixed by `+`.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\(?\d[\d\s.\-()]{6,}\d").unwrap_or_else(|e| panic!("invalid phone regex: {e}"))
});

const MIN_PHONE_DIGITS: usize = 8;

/// Client and service named by an appointment title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub client_name: String,
    pub service_name: String,
}

/// Parses either the current `"{service} | {client}"` or the legacy
/// `"{client} - {service}"` title.
pub fn parse_title(title: &str) -> Option<ParsedTitle> {
    if let Some((service, client)) = split_current(title) {
        return Some(ParsedTitle {
            client_name: client.to_string(),
            service_name: service.to_string(),
        });
    }
    split_legacy(title).map(|(client, service)| ParsedTitle {
        client_name: client.to_string(),
        service_name: service.to_string(),
    })
}

/// First phone-looking run in a free-text description.
pub fn extract_phone(description: &str) -> Option<String> {
    PHONE_RE
        .find_iter(description)
        .map(|m| m.as_str().trim())
        .find(|candidate| candidate.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS)
        .map(str::to_string)
}

/// Fills the reminder template for one appointment.
///
/// Placeholders: `{client_name}`, `{service}`, `{date}` (dd/mm/yyyy),
/// `{time}` (HH:MM, in the appointment's own offset) and `{business_name}`.
pub fn render_message(template: &str, appointment: &Appointment, business_name: &str) -> String {
    template
        .replace("{client_name}", &appointment.client_name)
        .replace("{service}", &appointment.service_name)
        .replace("{date}", &appointment.start.format("%d/%m/%Y").to_string())
        .replace("{time}", &appointment.start.format("%H:%M").to_string())
        .replace("{business_name}", business_name)
}

/// Outcome of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discovery {
    /// Due appointments, ordered by start time.
    pub appointments: Vec<Appointment>,
    /// Events that could not be turned into an appointment.
    pub skipped: u32,
    /// Events that already have a reminder for this date.
    pub already_reminded: u32,
}

fn to_appointment(event: &CalendarEvent) -> Option<Appointment> {
    let Some(parsed) = parse_title(&event.title) else {
        debug!(event_id = %event.id, "title not recognized, skipping event");
        return None;
    };
    let Some(phone) = event.description.as_deref().and_then(extract_phone) else {
        debug!(event_id = %event.id, "no phone number in description, skipping event");
        return None;
    };
    Some(Appointment {
        appointment_id: event.id.clone(),
        client_name: parsed.client_name,
        service_name: parsed.service_name,
        phone_number: phone,
        start: event.start,
    })
}

/// Appointments on `date` that have no reminder yet.
///
/// Calendar and store failures are returned whole; nothing is written.
pub async fn discover(
    source: &dyn AppointmentSource,
    store: &dyn ReminderStore,
    date: NaiveDate,
) -> Result<Discovery, RemindrError> {
    let events = source.appointments_on(date).await?;
    let reminded = store.reminded_appointment_ids(date).await?;

    let mut discovery = Discovery::default();
    for event in &events {
        if reminded.contains(&event.id) {
            discovery.already_reminded += 1;
            continue;
        }
        match to_appointment(event) {
            Some(appointment) => discovery.appointments.push(appointment),
            None => discovery.skipped += 1,
        }
    }
    discovery.appointments.sort_by_key(|a| a.start);

    info!(
        %date,
        events = events.len(),
        due = discovery.appointments.len(),
        skipped = discovery.skipped,
        already_reminded = discovery.already_reminded,
        "discovery finished"
    );
    Ok(discovery)
}
