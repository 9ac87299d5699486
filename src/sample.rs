use rand::Rng;

/// Uniform integer over `[min, max]` inclusive. `min` may be negative;
/// `max < min` is a caller contract violation (panics in the range
/// constructor).
pub fn sample_range(min: i64, max: i64) -> i64 {
    rand::thread_rng().gen_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_within_bounds() {
        for _ in 0..10_000 {
            let v = sample_range(0, 1023);
            assert!((0..=1023).contains(&v));
        }
    }

    #[test]
    fn negative_ranges_are_supported() {
        for _ in 0..10_000 {
            let v = sample_range(-32768, 32767);
            assert!((-32768..=32767).contains(&v));
        }
    }

    #[test]
    fn degenerate_range_yields_its_only_value() {
        assert_eq!(sample_range(5, 5), 5);
    }

    #[test]
    fn distribution_is_approximately_uniform() {
        // Chi-square goodness of fit over 10 buckets, 10k samples. With 9
        // degrees of freedom the 99.99th percentile is about 33.7; a run
        // exceeding 40 indicates a broken sampler rather than bad luck.
        const SAMPLES: usize = 10_000;
        const BUCKETS: usize = 10;
        let mut counts = [0usize; BUCKETS];
        for _ in 0..SAMPLES {
            counts[sample_range(0, BUCKETS as i64 - 1) as usize] += 1;
        }
        let expected = (SAMPLES / BUCKETS) as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|&observed| {
                let delta = observed as f64 - expected;
                delta * delta / expected
            })
            .sum();
        assert!(chi_square < 40.0, "chi-square {chi_square} out of tolerance");
    }
}
