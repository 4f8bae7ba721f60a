use num_complex::Complex;
use std::f32::consts::PI;

/// Mid-scale offset of the RTL-SDR unsigned 8-bit sample format
pub const IQ_OFFSET: f32 = 127.5;

/// Convert raw interleaved u8 I/Q bytes into centered complex samples
///
/// Writes one sample per byte pair into `out` and returns the number of pairs
/// written. A trailing odd byte is ignored; callers validate the length first.
pub fn iq_from_bytes(raw: &[u8], out: &mut [Complex<f32>]) -> usize {
    let mut count = 0;
    for (iq, slot) in raw.chunks_exact(2).zip(out.iter_mut()) {
        *slot = Complex::new(iq[0] as f32 - IQ_OFFSET, iq[1] as f32 - IQ_OFFSET);
        count += 1;
    }
    count
}

/// Phase difference between two consecutive I/Q samples, in radians
///
/// Each phase comes from `atan2`, so a rotation across the ±π boundary shows up
/// as a jump of almost 2π. One correction step folds it back.
#[inline]
pub fn instantaneous_frequency(prev: Complex<f32>, next: Complex<f32>) -> f32 {
    let mut delta = next.arg() - prev.arg();

    if delta > PI {
        delta -= 2.0 * PI;
    } else if delta < -PI {
        delta += 2.0 * PI;
    }

    delta
}

/// FM discriminator over a block of I/Q samples
///
/// Produces `iq.len() - 1` frequency samples into `out` and returns that count.
/// The first sample of a block has no predecessor, so every block loses one
/// output sample.
pub fn discriminate(iq: &[Complex<f32>], out: &mut [f32]) -> usize {
    let mut count = 0;
    for (pair, slot) in iq.windows(2).zip(out.iter_mut()) {
        *slot = instantaneous_frequency(pair[0], pair[1]);
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotating_signal(step: f32, len: usize) -> Vec<Complex<f32>> {
        (0..len)
            .map(|i| Complex::from_polar(100.0, step * i as f32))
            .collect()
    }

    #[test]
    fn test_iq_from_bytes() {
        let raw = [0u8, 255, 127, 128];
        let mut iq = vec![Complex::new(0.0, 0.0); 2];

        assert_eq!(iq_from_bytes(&raw, &mut iq), 2);
        assert_eq!(iq[0], Complex::new(-127.5, 127.5));
        assert_eq!(iq[1], Complex::new(-0.5, 0.5));
    }

    #[test]
    fn test_constant_phase_gives_zero() {
        let raw: Vec<u8> = [200u8, 60].repeat(64);
        let mut iq = vec![Complex::new(0.0, 0.0); 64];
        let pairs = iq_from_bytes(&raw, &mut iq);

        let mut freq = vec![1.0; 63];
        let n = discriminate(&iq[..pairs], &mut freq);

        assert_eq!(n, 63);
        assert!(freq.iter().all(|&f| f == 0.0));
    }

    #[test]
    fn test_constant_frequency() {
        for &step in &[0.1f32, -0.7, 1.5, -2.9] {
            let iq = rotating_signal(step, 200);
            let mut freq = vec![0.0; 199];

            assert_eq!(discriminate(&iq, &mut freq), 199);
            for f in &freq {
                assert!((f - step).abs() < 1e-3, "expected {}, got {}", step, f);
            }
        }
    }

    #[test]
    fn test_wraps_across_pi() {
        // Phase crosses ±π on almost every sample
        let step = 3.0f32;
        let iq = rotating_signal(step, 100);
        let mut freq = vec![0.0; 99];
        discriminate(&iq, &mut freq);

        for f in &freq {
            assert!((f - step).abs() < 1e-3);
            assert!(*f > -PI && *f <= PI);
        }

        let step = -3.0f32;
        let iq = rotating_signal(step, 100);
        discriminate(&iq, &mut freq);
        for f in &freq {
            assert!((f - step).abs() < 1e-3);
        }
    }

    #[test]
    fn test_quarter_turn_bytes() {
        use std::f32::consts::FRAC_PI_2;

        // Corners of the cu8 square, centered to ±99.5, visited counter-clockwise
        let ccw = [227u8, 227, 28, 227, 28, 28, 227, 28].repeat(4);
        // Same corners clockwise
        let cw = [227u8, 227, 227, 28, 28, 28, 28, 227].repeat(4);

        for (raw, expected, mirror) in [(&ccw, FRAC_PI_2, 3), (&cw, -FRAC_PI_2, 0)] {
            let mut iq = vec![Complex::new(0.0, 0.0); 16];
            let mut freq = vec![0.0; 15];
            iq_from_bytes(raw, &mut iq);
            assert_eq!(discriminate(&iq, &mut freq), 15);

            for (i, f) in freq.iter().enumerate() {
                // ±π/4 → ∓π/4 is symmetric and exact; the other steps are
                // within one ulp of a quarter turn
                if i % 4 == mirror {
                    assert_eq!(*f, expected);
                } else {
                    assert!((f - expected).abs() <= FRAC_PI_2 * f32::EPSILON);
                }
            }
            for window in freq.windows(5) {
                assert_eq!(window[0].to_bits(), window[4].to_bits());
            }
        }
    }

    #[test]
    fn test_single_correction_step() {
        let prev = Complex::from_polar(1.0, 3.0);
        let next = Complex::from_polar(1.0, -3.0);
        let delta = instantaneous_frequency(prev, next);
        assert!((delta - (2.0 * PI - 6.0)).abs() < 1e-5);
    }

    #[test]
    fn test_output_is_one_shorter() {
        let iq = rotating_signal(0.2, 10);
        let mut freq = vec![0.0; 10];
        assert_eq!(discriminate(&iq, &mut freq), 9);

        assert_eq!(discriminate(&iq[..1], &mut freq), 0);
    }
}
