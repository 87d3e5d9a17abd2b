//! Uncompressed PCM (`raw `, `twos`, `NONE`, `sowt`, `in24`, `in32`).

use crate::{FourCC, QtError};

use super::{
    AudioFormat,
    DecodableStream,
    OutputQueue,
    PcmBlock,
    SampleDescription,
    SampleDescriptionRegistry,
    StreamParams,
};

/// Registry handling integer PCM audio.
#[derive(Debug, Default, Clone, Copy)]
pub struct PcmRegistry;

impl SampleDescriptionRegistry for PcmRegistry {
    fn supports_codec(&self, codec_tag: FourCC) -> bool {
        AudioFormat::from_fourcc(codec_tag).is_some_and(|f| f.is_pcm())
    }

    fn make_stream(
        &self,
        description: &SampleDescription,
        params: &StreamParams,
    ) -> Result<Box<dyn DecodableStream>, QtError> {
        let tag = description.codec_tag();
        let format = AudioFormat::from_fourcc(tag)
            .filter(|f| f.is_pcm())
            .ok_or_else(|| QtError::UnsupportedCodec(tag.to_string()))?;

        let bits = match format {
            AudioFormat::In24 => 24,
            AudioFormat::In32 => 32,
            _ => params.bits_per_sample,
        };
        if !matches!(bits, 8 | 16 | 24 | 32) || params.channels == 0 {
            return Err(QtError::UnsupportedCodec(format!(
                "{tag} with {bits} bits and {} channels", params.channels
            )))
        }

        Ok(Box::new(PcmStream {
            format,
            bytes_per_sample: bits as usize / 8,
            channels: params.channels,
            sample_rate: params.sample_rate,
            discard: 0,
        }))
    }
}

#[derive(Debug)]
pub struct PcmStream {
    format: AudioFormat,
    bytes_per_sample: usize,
    channels: u16,
    sample_rate: u32,
    /// Frames to drop from the start of the next chunk.
    discard: u32,
}

impl PcmStream {
    fn frame_size(&self) -> usize {
        self.bytes_per_sample * self.channels as usize
    }

    fn decode(&self, raw: &[u8]) -> i16 {
        // keep the most significant 16 bits
        match (self.format, raw) {
            (AudioFormat::Raw, [b]) => ((*b as i16) - 128) << 8,
            // offset binary
            (AudioFormat::Raw, [hi, lo, ..]) => (u16::from_be_bytes([*hi, *lo]) ^ 0x8000) as i16,
            (_, [b]) => (*b as i8 as i16) << 8,
            (AudioFormat::Sowt, [.., lo, hi]) => i16::from_le_bytes([*lo, *hi]),
            (_, [hi, lo, ..]) => i16::from_be_bytes([*hi, *lo]),
            (_, []) => 0,
        }
    }
}

impl DecodableStream for PcmStream {
    fn queue_chunk(
        &mut self,
        data: &[u8],
        sample_count: u32,
        queue: &mut dyn OutputQueue,
    ) -> Result<usize, QtError> {
        let frame_size = self.frame_size();
        let frames = (data.len() / frame_size).min(sample_count as usize);
        let skip = (std::mem::take(&mut self.discard) as usize).min(frames);

        let samples: Vec<i16> = data[skip * frame_size .. frames * frame_size]
            .chunks_exact(self.bytes_per_sample)
            .map(|s| self.decode(s))
            .collect();

        if samples.is_empty() {
            return Ok(0)
        }

        queue.push(PcmBlock {
            samples,
            channels: self.channels,
            sample_rate: self.sample_rate,
        });

        Ok(1)
    }

    fn discard_leading(&mut self, samples: u32) {
        self.discard = samples;
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        codec::{AudioDescription, SampleDescription, SampleDescriptionRegistry, StreamParams},
        FourCC,
    };

    use super::PcmRegistry;

    fn pcm(tag: &[u8; 4], channels: u16, bits: u16) -> SampleDescription {
        SampleDescription::Audio(AudioDescription {
            codec_tag: FourCC(*tag),
            version: 0,
            channels,
            bits_per_sample: bits,
            sample_rate: 22050.0,
            samples_per_frame: 1,
            bytes_per_frame: (bits / 8 * channels) as u32,
            esds: None,
            extensions: Vec::new(),
        })
    }

    fn twos(channels: u16) -> SampleDescription {
        pcm(b"twos", channels, 16)
    }

    fn decode_one(desc: &SampleDescription, chunk: &[u8], count: u32) -> Vec<i16> {
        let params = StreamParams::from_audio(desc.audio().unwrap(), true);
        let mut stream = PcmRegistry.make_stream(desc, &params).unwrap();
        let mut queue = Vec::new();
        stream.queue_chunk(chunk, count, &mut queue).unwrap();
        queue.into_iter().flat_map(|b| b.samples).collect()
    }

    #[test]
    fn big_endian_16_bit() {
        let desc = twos(1);
        let params = StreamParams::from_audio(desc.audio().unwrap(), true);
        let mut stream = PcmRegistry.make_stream(&desc, &params).unwrap();
        let mut queue = Vec::new();
        let queued = stream.queue_chunk(&[0x01, 0x02, 0xff, 0xfe], 2, &mut queue).unwrap();
        assert_eq!(queued, 1);
        assert_eq!(queue[0].samples, vec![0x0102, -2]);
        assert_eq!(queue[0].sample_rate, 22050);
    }

    #[test]
    fn discard_applies_once() {
        let desc = twos(2);
        let params = StreamParams::from_audio(desc.audio().unwrap(), true);
        let mut stream = PcmRegistry.make_stream(&desc, &params).unwrap();
        let chunk = [0_u8, 1, 0, 2, 0, 3, 0, 4];
        let mut queue = Vec::new();

        stream.discard_leading(5);
        stream.discard_leading(1);
        stream.queue_chunk(&chunk, 2, &mut queue).unwrap();
        stream.queue_chunk(&chunk, 2, &mut queue).unwrap();

        assert_eq!(queue[0].samples, vec![3, 4]);
        assert_eq!(queue[1].frames(), 2);
    }

    #[test]
    fn wide_little_endian_keeps_high_bytes() {
        // 0x123456 and -1 as 24-bit little endian
        let chunk = [0x56, 0x34, 0x12, 0xff, 0xff, 0xff];
        assert_eq!(decode_one(&pcm(b"sowt", 1, 24), &chunk, 2), vec![0x1234, -1]);

        let chunk = [0x78, 0x56, 0x34, 0x12];
        assert_eq!(decode_one(&pcm(b"sowt", 1, 32), &chunk, 1), vec![0x1234]);
    }

    #[test]
    fn wide_offset_binary() {
        let chunk = [0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff];
        assert_eq!(decode_one(&pcm(b"raw ", 1, 24), &chunk, 3), vec![0, i16::MIN, i16::MAX]);
    }

    #[test]
    fn rejects_compressed() {
        assert!(!PcmRegistry.supports_codec(FourCC(*b"ima4")));
        assert!(PcmRegistry.supports_codec(FourCC(*b"sowt")));
    }
}
