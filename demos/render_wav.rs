use fpsr::render::render_values;
use fpsr::timeline::Timeline;
use fpsr::StackedModulo;

const SAMPLE_RATE: u32 = 44100;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // One generator frame per 1/100 s: a stepped random control signal.
    let sm = StackedModulo::default();
    let timeline = Timeline::new(100.0 / SAMPLE_RATE as f64);
    let samples = render_values(&sm, &timeline, 0.0, SAMPLE_RATE as usize * 4);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create("fpsr_holds.wav", spec)?;
    for &value in &samples {
        // [0, 1) held values as a bipolar step signal
        writer.write_sample(((value * 2.0 - 1.0) * 32767.0) as i16)?;
    }
    writer.finalize()?;

    println!("Generated fpsr_holds.wav ({} samples)", samples.len());
    Ok(())
}
