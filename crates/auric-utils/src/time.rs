//! Duration formatting helpers

use std::time::Duration;

/// Render an elapsed duration the way run metadata reports it: whole
/// milliseconds with a `ms` suffix.
pub fn elapsed_label(elapsed: Duration) -> String {
    format!("{}ms", elapsed.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_label() {
        assert_eq!(elapsed_label(Duration::from_millis(0)), "0ms");
        assert_eq!(elapsed_label(Duration::from_millis(42)), "42ms");
        assert_eq!(elapsed_label(Duration::from_secs(2)), "2000ms");
        // Sub-millisecond remainders truncate
        assert_eq!(elapsed_label(Duration::from_micros(1500)), "1ms");
    }
}
