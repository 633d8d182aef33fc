/// Sound engine: procedural chiptune effects via rodio.
///
/// Every effect is synthesised once at start-up into an in-memory WAV
/// buffer and played fire-and-forget through a detached `Sink`.
///
/// Without the "sound" feature the stub `SoundEngine` does nothing.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_dig: Arc<Vec<u8>>,
        sfx_hole: Arc<Vec<u8>>,
        sfx_gimmick: Arc<Vec<u8>>,
        sfx_descend: Arc<Vec<u8>>,
        sfx_jump: Arc<Vec<u8>>,
        sfx_die: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_record: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::info!("no audio output, running silent: {e}");
                    return None;
                }
            };

            let wav = |samples: Vec<f32>| Arc::new(make_wav(&samples));
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_dig: wav(gen_dig()),
                sfx_hole: wav(sweep(180.0, 90.0, 0.10, 0.3)),
                sfx_gimmick: wav(arpeggio(&[880.0, 1175.0, 1568.0, 1175.0], 0.05, 0.22)),
                sfx_descend: wav(sweep(520.0, 220.0, 0.12, 0.25)),
                sfx_jump: wav(sweep(300.0, 700.0, 0.09, 0.22)),
                sfx_die: wav(fade_tail(arpeggio(&[440.0, 370.0, 311.0, 261.0], 0.12, 0.3))),
                sfx_clear: wav(gen_clear()),
                sfx_record: wav(arpeggio(&[659.0, 784.0, 988.0, 1319.0, 1568.0], 0.07, 0.25)),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(_) => return,
            };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_dig(&self) { self.play(&self.sfx_dig); }
        pub fn play_hole(&self) { self.play(&self.sfx_hole); }
        pub fn play_gimmick(&self) { self.play(&self.sfx_gimmick); }
        pub fn play_descend(&self) { self.play(&self.sfx_descend); }
        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_die(&self) { self.play(&self.sfx_die); }
        pub fn play_clear(&self) { self.play(&self.sfx_clear); }
        pub fn play_record(&self) { self.play(&self.sfx_record); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    fn sample_count(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Sine glide from `from` to `to` Hz with a linear fade.
    fn sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(duration);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - t) * volume
            })
            .collect()
    }

    /// Back-to-back square-ish notes.
    fn arpeggio(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(note_dur);
        let mut samples = Vec::with_capacity(n * notes.len());
        for &freq in notes {
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.4;
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Fade the last quarter to silence.
    fn fade_tail(mut samples: Vec<f32>) -> Vec<f32> {
        let total = samples.len();
        let fade = total / 4;
        for (k, s) in samples[total - fade..].iter_mut().enumerate() {
            *s *= 1.0 - k as f32 / fade.max(1) as f32;
        }
        samples
    }

    /// Shovel scrape: low tone under LCG noise.
    fn gen_dig() -> Vec<f32> {
        let n = sample_count(0.14);
        let mut rng: u32 = 0x2545_f491;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * (140.0 + 120.0 * (1.0 - t)) * TAU).sin();
                rng = rng.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (tone * 0.35 + noise * 0.65) * (1.0 - t).powf(0.7) * 0.28
            })
            .collect()
    }

    /// Goal fanfare with a held top note.
    fn gen_clear() -> Vec<f32> {
        let mut samples = arpeggio(&[523.0, 659.0, 784.0], 0.1, 0.3);
        samples.extend(sweep(1047.0, 1047.0, 0.35, 0.3));
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder (16-bit PCM mono)
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let bits_per_sample: u16 = 16;
        let block_align: u16 = bits_per_sample / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API (no-ops when the sound feature is off)
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_dig(&self) {}
    pub fn play_hole(&self) {}
    pub fn play_gimmick(&self) {}
    pub fn play_descend(&self) {}
    pub fn play_jump(&self) {}
    pub fn play_die(&self) {}
    pub fn play_clear(&self) {}
    pub fn play_record(&self) {}
}
