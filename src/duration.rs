/// Render whole seconds as `H:MM:SS`, prefixed with `N day(s), ` once the
/// value reaches a full day.
/// 75 → "0:01:15"
/// 90061 → "1 day, 1:01:01"
pub fn format_duration(secs: u128) -> String {
    let days = secs / 86_400;
    let rem = secs % 86_400;
    let clock = format!("{}:{:02}:{:02}", rem / 3600, (rem % 3600) / 60, rem % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}
