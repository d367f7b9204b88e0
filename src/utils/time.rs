use chrono::{DateTime, Local};

pub fn current_human_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}

/// Seconds elapsed since `start`, with microsecond precision.
pub fn elapsed_secs(start: DateTime<Local>) -> f64 {
    (Local::now() - start)
        .num_microseconds()
        .map(|n| n as f64 / 1_000_000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn elapsed_is_measured_from_start() {
        let start = Local::now() - Duration::seconds(2);
        let elapsed = elapsed_secs(start);
        assert!((2.0..10.0).contains(&elapsed), "elapsed {elapsed}");
    }
}
