use std::sync::LazyLock;

use regex::Regex;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.\d+)?S)?$")
        .expect("static duration pattern is valid")
});

/// reads a run time or wait time as whole seconds. accepts the ISO-8601 time
/// durations used by the source schedule format (`PT1H2M3S`, `PT45S`, `PT0H0M00S`)
/// or a bare integer number of seconds. fractional seconds are truncated.
pub fn parse_duration_seconds(value: &str) -> Result<u32, String> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<u32>() {
        return Ok(seconds);
    }
    let captures = ISO_DURATION
        .captures(trimmed)
        .ok_or_else(|| format!("'{value}' is not an ISO-8601 time duration"))?;
    let field = |idx: usize| -> Result<u32, String> {
        match captures.get(idx) {
            None => Ok(0),
            Some(m) => m
                .as_str()
                .parse::<u32>()
                .map_err(|e| format!("'{value}' has an invalid component: {e}")),
        }
    };
    let (hours, minutes, seconds) = (field(1)?, field(2)?, field(3)?);
    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(|| format!("'{value}' is too long to represent in seconds"))
}
