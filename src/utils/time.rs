/// Formats a millisecond timestamp as HH:MM:SS for display next to the
/// position/duration properties.
pub fn format_ms(time_ms: u64) -> String {
    let mut seconds_remaining = time_ms / 1000;
    let hours = seconds_remaining / 3600;
    seconds_remaining -= hours * 3600;
    let minutes = seconds_remaining / 60;
    seconds_remaining -= minutes * 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds_remaining)
}
