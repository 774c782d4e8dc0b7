//! Date, time and status presentation helpers.
//!
//! Wire forms are `YYYY-MM-DD` dates and zero-padded 24-hour `HH:MM` times.
//! Display forms are `05 Jan 2024` and `1:00 pm`.

use chrono::NaiveDate;

use crate::models::AppointmentStatus;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Invalid time {0:?}. Use HH:MM")]
    InvalidTime(String),
    #[error("Invalid date {0:?}. Use YYYY-MM-DD")]
    InvalidDate(String),
}

// ── Time ─────────────────────────────────────────────────

/// Normalize `H:M` text to zero-padded 24-hour `HH:MM` (`9:5` → `09:05`).
pub fn normalize_time(raw: &str) -> Result<String, FormatError> {
    let (hour, minute) = parse_time(raw)?;
    Ok(format!("{hour:02}:{minute:02}"))
}

/// Normalize a time-picker selection to `HH:MM`.
pub fn time_from_picker(hour: u32, minute: u32) -> Result<String, FormatError> {
    if hour > 23 || minute > 59 {
        return Err(FormatError::InvalidTime(format!("{hour}:{minute}")));
    }
    Ok(format!("{hour:02}:{minute:02}"))
}

/// `13:00` → `1:00 pm`, `00:30` → `12:30 am`. Unparseable input is returned as-is.
pub fn format_time(raw: &str) -> String {
    match parse_time(raw) {
        Ok((hour, minute)) => {
            let suffix = if hour < 12 { "am" } else { "pm" };
            let hour12 = match hour % 12 {
                0 => 12,
                h => h,
            };
            format!("{hour12}:{minute:02} {suffix}")
        }
        Err(_) => raw.to_string(),
    }
}

fn parse_time(raw: &str) -> Result<(u32, u32), FormatError> {
    let invalid = || FormatError::InvalidTime(raw.to_string());
    let (h, m) = raw.trim().split_once(':').ok_or_else(invalid)?;
    let h = h.trim();
    let m = m.trim();
    if h.is_empty() || m.is_empty() || h.len() > 2 || m.len() > 2 {
        return Err(invalid());
    }
    if !all_digits(h) || !all_digits(m) {
        return Err(invalid());
    }
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

// ── Date ─────────────────────────────────────────────────

/// Parse `YYYY-M-D` (or an ISO timestamp starting with one) into a calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, FormatError> {
    let invalid = || FormatError::InvalidDate(raw.to_string());
    let date_part = raw.trim().split('T').next().unwrap_or_default();
    let mut parts = date_part.split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    if y.len() != 4 || m.is_empty() || m.len() > 2 || d.is_empty() || d.len() > 2 {
        return Err(invalid());
    }
    if ![y, m, d].iter().all(|part| all_digits(part)) {
        return Err(invalid());
    }
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    let day: u32 = d.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Normalize to `YYYY-MM-DD` (`2024-1-5` → `2024-01-05`).
pub fn normalize_date(raw: &str) -> Result<String, FormatError> {
    Ok(date_to_wire(parse_date(raw)?))
}

pub fn date_to_wire(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `2024-01-05` → `05 Jan 2024`. Unparseable input is returned as-is.
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Ok(date) => date.format("%d %b %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// `str::parse` accepts a leading sign; wire values never carry one.
fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

// ── Status ───────────────────────────────────────────────

/// Badge colour for an appointment status.
pub fn status_color(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Pending => "#F59E0B",
        AppointmentStatus::Confirmed => "#10B981",
        AppointmentStatus::Cancelled => "#EF4444",
        AppointmentStatus::Rejected => "#6B7280",
        AppointmentStatus::Completed => "#3B82F6",
    }
}

pub fn status_label(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Pending => "Pending",
        AppointmentStatus::Confirmed => "Confirmed",
        AppointmentStatus::Cancelled => "Cancelled",
        AppointmentStatus::Rejected => "Rejected",
        AppointmentStatus::Completed => "Completed",
    }
}
