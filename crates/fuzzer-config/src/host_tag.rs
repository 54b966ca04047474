use std::time::{SystemTime, UNIX_EPOCH};

const WEEKDAYS: [&str; 7] = ["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"];

/// `<user>-<weekday_HH_MM_SS>-<pid>` (spec §3 "Host-tag"): guarantees
/// filename uniqueness across concurrent fuzzer instances sharing a work
/// directory, matching the Python original's
/// `"%s-%s-%d" % (uname, time.strftime("%a_%H_%M_%S"), os.getpid())`.
pub fn host_tag(user: &str, pid: u32) -> String {
    format!("{user}-{}-{pid}", weekday_hh_mm_ss(SystemTime::now()))
}

/// `Thu_hh_mm_ss`-style timestamp with no external datetime dependency
/// (the pack carries no chrono/time usage narrow enough to justify the
/// extra dependency for this one format — see SPEC_FULL §3).
fn weekday_hh_mm_ss(now: SystemTime) -> String {
    let secs = now
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    // Unix epoch (1970-01-01) was a Thursday.
    let days_since_epoch = secs / 86_400;
    let weekday = WEEKDAYS[(days_since_epoch % 7) as usize];

    let secs_of_day = secs % 86_400;
    let hh = secs_of_day / 3600;
    let mm = (secs_of_day % 3600) / 60;
    let ss = secs_of_day % 60;

    format!("{weekday}_{hh:02}_{mm:02}_{ss:02}")
}
