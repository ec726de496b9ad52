//! Table sizing: prime lengths for a 0.75 load-factor target.

/// Expected elements per bucket a freshly sized table aims for.
pub const LOAD_FACTOR: f64 = 0.75;

/// Odd primes up to and including `limit`, preceded by 2. Each odd
/// candidate is trial-divided by the primes found so far.
fn small_primes(limit: usize) -> Vec<usize> {
    let mut primes = vec![2];
    let mut i = 3;
    while i <= limit {
        if primes
            .iter()
            .take_while(|&&p| p * p <= i)
            .all(|&p| i % p != 0)
        {
            primes.push(i);
        }
        i += 2;
    }
    primes
}

/// Requires `primes` to hold every prime up to `sqrt(n)`.
fn is_prime_with(n: usize, primes: &[usize]) -> bool {
    if n < 2 {
        return false;
    }
    primes
        .iter()
        .take_while(|&&p| p * p <= n)
        .all(|&p| n % p != 0)
}

fn isqrt(n: usize) -> usize {
    let mut r = (n as f64).sqrt() as usize;
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r
}

/// Smallest prime `>= n`. Inputs below 2 yield 2.
///
/// Divisor primes are generated once per call, up to a bound that covers
/// every candidate up to the next prime (Bertrand's postulate gives a
/// prime below `2n`).
#[must_use]
pub fn next_prime(n: usize) -> usize {
    if n <= 2 {
        return 2;
    }
    let mut candidate = if n % 2 == 0 { n + 1 } else { n };
    let primes = small_primes(isqrt(n.saturating_mul(2)) + 1);
    while !is_prime_with(candidate, &primes) {
        candidate += 2;
    }
    candidate
}

/// Bucket count for a table expected to hold `expected` elements:
/// the smallest prime `>= expected / LOAD_FACTOR + 1`.
#[must_use]
pub fn table_len(expected: usize) -> usize {
    next_prime((expected as f64 / LOAD_FACTOR) as usize + 1)
}
