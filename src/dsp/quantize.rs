/// Full-scale gain mapping [-1.0, 1.0] onto the i16 range
pub const PCM_GAIN: f32 = 32767.0;

/// Convert one float sample to 16-bit PCM
///
/// The scaled value is clamped before the narrowing cast and the fractional
/// part is truncated toward zero.
#[inline]
pub fn to_pcm(sample: f32) -> i16 {
    let scaled = (sample * PCM_GAIN).clamp(i16::MIN as f32, i16::MAX as f32);
    scaled as i16
}

/// Quantize a block of float samples into `output`, returning the count written
pub fn quantize(input: &[f32], output: &mut [i16]) -> usize {
    let mut count = 0;
    for (&sample, slot) in input.iter().zip(output.iter_mut()) {
        *slot = to_pcm(sample);
        count += 1;
    }
    count
}
