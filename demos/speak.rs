//! Speak a sentence and save it as a WAV file.
//!
//! ```bash
//! export GEMINI_API_KEY="your-api-key"
//! cargo run --example speak -- "Take one tablet every eight hours." advice.wav
//! ```

use medigen::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&TracingConfig::development())?;

    let mut args = std::env::args().skip(1);
    let text = args
        .next()
        .unwrap_or_else(|| "Remember to drink water regularly.".to_string());
    let output = args.next().unwrap_or_else(|| "speech.wav".to_string());

    let client = GeminiClient::builder().build()?;
    let clip = client
        .synthesize_speech(text, Some(SpeechStyle::Professional))
        .await?;

    println!(
        "{} bytes, {} Hz, {:.1}s -> {output}",
        clip.bytes.len(),
        clip.sample_rate,
        clip.duration().as_secs_f64()
    );
    std::fs::write(&output, clip.into_bytes())?;
    Ok(())
}
