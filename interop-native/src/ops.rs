//! Safe implementations behind the exported C functions
//!
//! The `extern "C"` layer only converts raw inputs into these and back.
//! All arithmetic wraps on overflow: panicking inside an `extern "C"`
//! function would abort the host process.

/// Prefix prepended by [`transform_string`]
pub const PROCESSED_PREFIX: &str = "Processed: ";

/// Two's-complement wrapping addition
pub fn add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

/// Transform a host string into the value returned by `process_string`
pub fn transform_string(input: &str) -> String {
    format!("{}{}", PROCESSED_PREFIX, input.to_uppercase())
}

/// Iterative Fibonacci, wrapping on `u64` overflow (first wrap at n = 94)
pub fn fibonacci(n: u32) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        _ => {
            let mut a = 0u64;
            let mut b = 1u64;
            for _ in 2..=n {
                let next = a.wrapping_add(b);
                a = b;
                b = next;
            }
            b
        }
    }
}

/// Double every element in ascending order, handing each result to `on_value`
///
/// Returns the number of elements processed.
pub fn double_each<F>(data: &[i32], mut on_value: F) -> i32
where
    F: FnMut(i32),
{
    let mut processed = 0i32;
    for &value in data {
        on_value(value.wrapping_mul(2));
        processed = processed.wrapping_add(1);
    }
    processed
}

/// Accumulate a running sum in ascending order, handing each intermediate
/// total to `on_total`
///
/// Returns the final total.
pub fn running_sum<F>(data: &[i32], mut on_total: F) -> i32
where
    F: FnMut(i32),
{
    data.iter().fold(0i32, |total, &value| {
        let total = total.wrapping_add(value);
        on_total(total);
        total
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_wraps() {
        assert_eq!(add(5, 7), 12);
        assert_eq!(add(-3, 3), 0);
        assert_eq!(add(i32::MAX, 1), i32::MIN);
        assert_eq!(add(i32::MIN, -1), i32::MAX);
    }

    #[test]
    fn test_transform_string() {
        assert_eq!(transform_string("hello from go"), "Processed: HELLO FROM GO");
        assert_eq!(transform_string(""), "Processed: ");
        assert_eq!(transform_string("straße"), "Processed: STRASSE");
    }

    #[test]
    fn test_fibonacci_known_values() {
        assert_eq!(fibonacci(0), 0);
        assert_eq!(fibonacci(1), 1);
        assert_eq!(fibonacci(2), 1);
        assert_eq!(fibonacci(10), 55);
        assert_eq!(fibonacci(93), 12_200_160_415_121_876_738);
    }

    #[test]
    fn test_fibonacci_recurrence_across_wrap() {
        for n in 2..200 {
            assert_eq!(
                fibonacci(n),
                fibonacci(n - 1).wrapping_add(fibonacci(n - 2)),
                "recurrence broken at n = {}",
                n
            );
        }
    }

    #[test]
    fn test_double_each() {
        let mut seen = Vec::new();
        let count = double_each(&[1, 2, 3, 4, 5], |v| seen.push(v));
        assert_eq!(count, 5);
        assert_eq!(seen, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_running_sum() {
        let mut seen = Vec::new();
        let total = running_sum(&[10, 20, 30, 40], |v| seen.push(v));
        assert_eq!(total, 100);
        assert_eq!(seen, vec![10, 30, 60, 100]);
    }

    #[test]
    fn test_empty_buffer_never_calls_back() {
        let mut calls = 0;
        assert_eq!(double_each(&[], |_| calls += 1), 0);
        assert_eq!(running_sum(&[], |_| calls += 1), 0);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_negative_values_and_overflow_wrap() {
        let mut seen = Vec::new();
        double_each(&[-4, i32::MAX], |v| seen.push(v));
        assert_eq!(seen, vec![-8, -2]);

        assert_eq!(running_sum(&[i32::MAX, 1], |_| {}), i32::MIN);
    }
}
