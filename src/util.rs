use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Orders ids numerically when both sides are integers, lexicographically otherwise.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

pub fn sort_ids<S: AsRef<str>>(ids: &mut [S]) {
    ids.sort_by(|a, b| compare_ids(a.as_ref(), b.as_ref()));
}

pub fn stable_hash(id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

/// Position of `value` between `min` and `max` on a log scale, in `0..=1`.
pub fn normalize_log(value: usize, min: usize, max: usize) -> f32 {
    let min = min.max(1) as f64;
    let max = (max as f64).max(min);
    let value = value.max(1) as f64;

    let denominator = max.ln() - min.ln();
    if denominator.abs() < f64::EPSILON {
        return 0.5;
    }

    ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0) as f32
}

pub fn short_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }

    let mut short = label.chars().take(max_chars.saturating_sub(1)).collect::<String>();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_sort_by_value() {
        let mut ids = vec!["10", "2", "b", "1", "a"];
        sort_ids(&mut ids);
        assert_eq!(ids, vec!["1", "2", "10", "a", "b"]);
    }

    #[test]
    fn normalize_log_spans_unit_range() {
        assert_eq!(normalize_log(1, 1, 100), 0.0);
        assert_eq!(normalize_log(100, 1, 100), 1.0);
        assert_eq!(normalize_log(7, 7, 7), 0.5);
        assert!((normalize_log(10, 1, 100) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn short_label_truncates_long_text() {
        assert_eq!(short_label("abc", 5), "abc");
        assert_eq!(short_label("abcdefgh", 4), "abc…");
    }
}
