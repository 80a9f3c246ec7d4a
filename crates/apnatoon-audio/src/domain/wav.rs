//! RIFF/WAVE container for raw narration PCM.
//!
//! The speech service returns bare 16-bit signed little-endian mono samples.
//! Players need a container, so the samples are prefixed with the canonical
//! 44-byte PCM header.

/// Length of the canonical PCM WAVE header.
pub const HEADER_LEN: usize = 44;

/// Sample rate the speech service uses when it reports none.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;

/// Wraps mono 16-bit PCM bytes in a WAVE container.
///
/// Never fails: an empty buffer yields a header-only container with a zero
/// data length. Lengths beyond `u32::MAX` saturate in the header fields.
#[must_use]
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let data_len = u32::try_from(pcm.len()).unwrap_or(u32::MAX);
    let byte_rate = sample_rate.saturating_mul(u32::from(BLOCK_ALIGN));

    let mut wav = Vec::with_capacity(HEADER_LEN + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&data_len.saturating_add(36).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16_u32.to_le_bytes());
    // Format tag 1 = linear PCM.
    wav.extend_from_slice(&1_u16.to_le_bytes());
    wav.extend_from_slice(&CHANNELS.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);
    wav
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_header_layout_matches_canonical_pcm_wave() {
        // Arrange
        let pcm = [0x01, 0x00, 0xff, 0x7f, 0x00, 0x80];

        // Act
        let wav = pcm_to_wav(&pcm, DEFAULT_SAMPLE_RATE);

        // Assert
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36 + 6);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 24), 24_000);
        assert_eq!(u32_at(&wav, 28), 48_000);
        assert_eq!(u16_at(&wav, 32), 2);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 6);
        assert_eq!(&wav[HEADER_LEN..], &pcm);
    }

    #[test]
    fn test_empty_pcm_produces_header_only_container() {
        let wav = pcm_to_wav(&[], DEFAULT_SAMPLE_RATE);

        assert_eq!(wav.len(), HEADER_LEN);
        assert_eq!(u32_at(&wav, 4), 36);
        assert_eq!(u32_at(&wav, 40), 0);
    }

    #[test]
    fn test_lengths_and_byte_rate_track_input_for_any_rate() {
        for (len, rate) in [(1_usize, 8_000_u32), (333, 16_000), (4_800, 44_100), (7, 1)] {
            let pcm = vec![0x5a; len];

            let wav = pcm_to_wav(&pcm, rate);

            assert_eq!(wav.len(), HEADER_LEN + len);
            assert_eq!(u32_at(&wav, 4) as usize, 36 + len);
            assert_eq!(u32_at(&wav, 40) as usize, len);
            assert_eq!(u32_at(&wav, 24), rate);
            assert_eq!(u32_at(&wav, 28), rate * 2);
        }
    }
}
