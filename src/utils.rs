use std::io::{self, Write};

use chrono::{DateTime, Utc};

/// Human-readable byte count, decimal units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1000 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Coarse "how long ago" string for scan listings.
pub fn relative_time(then: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(then);

    let days = elapsed.num_days();
    if days >= 365 {
        let years = days / 365;
        return format!("{} year{} ago", years, if years > 1 { "s" } else { "" });
    }
    if days >= 30 {
        let months = days / 30;
        return format!("{} month{} ago", months, if months > 1 { "s" } else { "" });
    }
    if days >= 1 {
        return format!("{} day{} ago", days, if days > 1 { "s" } else { "" });
    }
    let hours = elapsed.num_hours();
    if hours >= 1 {
        return format!("{} hour{} ago", hours, if hours > 1 { "s" } else { "" });
    }
    "just now".to_string()
}

/// Whether the process runs with an effective uid of 0. System cache roots
/// are only cleaned when this holds.
#[cfg(unix)]
pub fn is_elevated() -> bool {
    // SAFETY: geteuid has no failure modes.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_elevated() -> bool {
    false
}

/// Yes/no question on stdout. Empty input takes `default` when one is given;
/// anything unrecognised re-asks.
pub fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let hint = if default == Some(true) { "Y/n" } else { "y/N" };
    let mut input = String::new();

    loop {
        print!("{prompt} ({hint}): ");
        io::stdout().flush()?;

        input.clear();
        io::stdin().read_line(&mut input)?;

        match (input.trim(), default) {
            (answer, _) if answer.eq_ignore_ascii_case("y") => return Ok(true),
            (answer, _) if answer.eq_ignore_ascii_case("n") => return Ok(false),
            ("", Some(fallback)) => return Ok(fallback),
            _ => {}
        }
    }
}
