use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vigil_assistant::asr::MicCapture;
use vigil_assistant::llm::LocalLlm;
use vigil_assistant::security::{SnapshotDevice, Webcam};
use vigil_assistant::speech::{NativeSynth, Synthesizer};
use vigil_assistant::{Config, Daemon};

/// Vigil - desktop voice assistant with a webcam intrusion watch
#[derive(Parser)]
#[command(name = "vigil", version, about)]
struct Cli {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(short, long, env = "VIGIL_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable spoken output (log-only mode)
    #[arg(long, env = "VIGIL_MUTE")]
    mute: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
#[allow(clippy::enum_variant_names)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test voice synthesis
    TestTts {
        /// Text to speak
        #[arg(default_value = "Bonjour, je suis prêt.")]
        text: String,
    },
    /// Test the webcam by taking one snapshot
    TestCamera {
        /// Where to write the snapshot
        #[arg(default_value = "test_capture.jpg")]
        path: PathBuf,
    },
    /// Test the local language model
    TestLlm {
        /// Prompt to send
        #[arg(default_value = "Dis bonjour en une phrase.")]
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,vigil_assistant=info",
        1 => "info,vigil_assistant=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref());
    if cli.mute {
        config.tts.enabled = false;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestTts { text } => test_tts(&config, &text),
            Command::TestCamera { path } => test_camera(&config, &path),
            Command::TestLlm { prompt } => test_llm(config, &prompt).await,
        };
    }

    tracing::info!(
        assistant = %config.assistant_name,
        llm_model = %config.llm.model,
        "starting vigil"
    );

    let daemon = Daemon::new(config);
    daemon.run().await?;

    Ok(())
}

/// Test microphone input with a live level meter
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = MicCapture::new()?;
    capture.start()?;

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check your input device and levels.");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test voice synthesis directly, without the queue
fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let mut synth = NativeSynth::new(config.tts.voice_keyword.as_deref())?;
    synth.speak(text)?;

    println!("---");
    println!("If you heard the speech, TTS is working!");
    Ok(())
}

/// Test the webcam with one snapshot
fn test_camera(config: &Config, path: &std::path::Path) -> anyhow::Result<()> {
    println!(
        "Capturing one frame from camera {}...",
        config.security.camera_index
    );

    let camera = Webcam::new(config.security.camera_index);
    if camera.snap(path)? {
        println!("Snapshot written to {}", path.display());
    } else {
        println!("Camera opened but produced no frame");
    }
    Ok(())
}

/// Test the local language model end to end
async fn test_llm(config: Config, prompt: &str) -> anyhow::Result<()> {
    println!("Prompt: {prompt}\n");

    let llm = LocalLlm::new(config.llm);
    let reply = llm.generate(prompt).await;
    println!("Reply: {reply}");
    Ok(())
}
