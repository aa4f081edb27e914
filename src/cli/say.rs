//! `tango say`

use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;

use tango::tts::{GoogleTts, SpeechSynthesizer};
use tango::Config;

pub(crate) async fn cmd_say(config: &Config, text: &str, output: &Path) -> Result<()> {
    let tts = GoogleTts::from_config(&config.tts)?
        .ok_or_else(|| anyhow::anyhow!("TTS_API_KEY is not configured"))?;

    let audio = tts.synthesize(text).await?;
    let bytes = decode_audio(&audio)?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} bytes to {}", bytes.len(), output.display());
    Ok(())
}

fn decode_audio(audio: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(audio.trim())
        .context("TTS returned invalid base64 audio")
}
