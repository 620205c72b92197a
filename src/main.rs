//! `sid6581` - render a single gated SID note to a WAV file.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use sid6581::export::{write_wav_with_config, ExportConfig};
use sid6581::{
    ChipModel, ControlBits, ModeVolBits, ResFiltBits, SamplingMethod, SidConfig,
    SoundInterfaceDevice, Tone, Voice,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Waveform {
    Triangle,
    Sawtooth,
    Pulse,
    Noise,
}

impl Waveform {
    fn control_bits(self) -> ControlBits {
        match self {
            Waveform::Triangle => ControlBits::TRIANGLE,
            Waveform::Sawtooth => ControlBits::SAWTOOTH,
            Waveform::Pulse => ControlBits::PULSE,
            Waveform::Noise => ControlBits::NOISE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FilterMode {
    Lowpass,
    Bandpass,
    Highpass,
}

impl FilterMode {
    fn mode_bits(self) -> ModeVolBits {
        match self {
            FilterMode::Lowpass => ModeVolBits::LP,
            FilterMode::Bandpass => ModeVolBits::BP,
            FilterMode::Highpass => ModeVolBits::HP,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "sid6581")]
#[command(about = "Render a MOS 6581/8580 SID note to a WAV file")]
struct Args {
    /// Output WAV file
    #[arg(short, long, default_value = "sid6581.wav")]
    output: PathBuf,

    /// JSON chip configuration (command-line options override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chip model
    #[arg(long, value_enum)]
    model: Option<ChipModel>,

    /// Sampling method
    #[arg(long, value_enum)]
    method: Option<SamplingMethod>,

    /// System clock frequency (Hz)
    #[arg(long)]
    clock: Option<f64>,

    /// Output sampling frequency (Hz)
    #[arg(long)]
    rate: Option<f64>,

    /// Note to play, e.g. C4, A#3
    #[arg(short, long, default_value = "C4")]
    tone: Tone,

    /// Voice 1 waveform
    #[arg(short, long, value_enum, default_value = "triangle")]
    waveform: Waveform,

    /// Pulse width (0-4095) for the pulse waveform
    #[arg(long, default_value_t = 2048)]
    pulse_width: u32,

    /// Attack/decay register value
    #[arg(long, default_value_t = 0xBE)]
    attack_decay: u32,

    /// Sustain/release register value
    #[arg(long, default_value_t = 0xF8)]
    sustain_release: u32,

    /// Master volume (0-15)
    #[arg(long, default_value_t = 15)]
    volume: u32,

    /// Time the gate stays open (ms)
    #[arg(long, default_value_t = 320)]
    gate_ms: u64,

    /// Time rendered after the gate closes (ms)
    #[arg(long, default_value_t = 300)]
    release_ms: u64,

    /// Route voice 1 through the filter in this mode
    #[arg(long, value_enum)]
    filter: Option<FilterMode>,

    /// Filter cutoff (0-2047)
    #[arg(long, default_value_t = 1024)]
    cutoff: u32,

    /// Filter resonance (0-15)
    #[arg(long, default_value_t = 0)]
    resonance: u32,

    /// Normalize the rendered audio
    #[arg(long)]
    normalize: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<SidConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SidConfig::default(),
    };
    if let Some(model) = args.model {
        config.chip_model = model;
    }
    if let Some(method) = args.method {
        config.sampling_method = method;
    }
    if let Some(clock) = args.clock {
        config.clock_frequency = clock;
    }
    if let Some(rate) = args.rate {
        config.sampling_frequency = rate;
    }
    Ok(config)
}

fn render(args: &Args, sid: &mut SoundInterfaceDevice) -> Result<Vec<i16>> {
    let voice = Voice::One;
    let mut mode_vol = args.volume;
    if let Some(filter) = args.filter {
        sid.filter_cutoff(args.cutoff)?;
        sid.set_filter_res_filt((args.resonance << 4) | ResFiltBits::FILT1.bits() as u32)?;
        mode_vol |= filter.mode_bits().bits() as u32;
    }
    sid.set_filter_mode_vol(mode_vol)?;

    sid.attack_decay(voice, args.attack_decay)?;
    sid.sustain_release(voice, args.sustain_release)?;
    sid.tone(voice, args.tone)?;
    sid.pulse_width(voice, args.pulse_width)?;

    let waveform = args.waveform.control_bits();
    sid.control(voice, waveform | ControlBits::GATE)?;
    let mut samples = sid.clock(Duration::from_millis(args.gate_ms));

    sid.control(voice, waveform)?;
    samples.extend(sid.clock(Duration::from_millis(args.release_ms)));
    Ok(samples)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        ConfigBuilder::default()
            .set_time_level(LevelFilter::Trace)
            .build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let config = load_config(&args)?;
    let mut sid = SoundInterfaceDevice::new(config).context("configuring SID")?;

    info!(
        "rendering {} ({:.2} Hz) on {}",
        args.tone,
        args.tone.frequency(config.clock_frequency),
        config.chip_model
    );
    let samples = render(&args, &mut sid)?;

    let export = ExportConfig::with_sample_rate(config.sampling_frequency.round() as u32)
        .normalize(args.normalize);
    write_wav_with_config(&args.output, &samples, export)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(
        "wrote {} samples to {}",
        samples.len(),
        args.output.display()
    );
    Ok(())
}
