//! Integration tests for ffmpeg conversion.
//!
//! These tests require ffmpeg built with libopus on PATH.
//!
//! Run with: cargo test --features integ_test --test ffmpeg_transcode

#[cfg(feature = "integ_test")]
mod tests {
    use std::path::Path;
    use std::process::{Command, Stdio};

    use counselbot::relay::{Ffmpeg, TranscodeError, Transcoder};

    /// Render one second of a 440Hz tone as an OGG Opus voice clip.
    fn make_clip(path: &Path) -> bool {
        Command::new("ffmpeg")
            .args(["-y", "-f", "lavfi", "-i", "sine=frequency=440:duration=1", "-c:a", "libopus"])
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_converts_ogg_to_wav() {
        let dir = tempfile::tempdir().unwrap();
        let ogg = dir.path().join("voice.ogg");
        let wav = dir.path().join("voice.wav");
        if !make_clip(&ogg) {
            eprintln!("Skipping test: ffmpeg with libopus not available");
            return;
        }

        Ffmpeg::new("ffmpeg", None).transcode(&ogg, &wav).await.expect("conversion failed");

        let data = std::fs::read(&wav).unwrap();
        assert!(data.starts_with(b"RIFF"), "output is not a WAV file");
        assert_eq!(&data[8..12], b"WAVE");
    }

    #[tokio::test]
    async fn test_overwrites_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let ogg = dir.path().join("voice.ogg");
        let wav = dir.path().join("voice.wav");
        if !make_clip(&ogg) {
            eprintln!("Skipping test: ffmpeg with libopus not available");
            return;
        }
        std::fs::write(&wav, b"stale").unwrap();

        Ffmpeg::new("ffmpeg", None).transcode(&ogg, &wav).await.expect("conversion failed");

        assert!(std::fs::read(&wav).unwrap().starts_with(b"RIFF"));
    }

    #[tokio::test]
    async fn test_garbage_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ogg = dir.path().join("voice.ogg");
        let wav = dir.path().join("voice.wav");
        std::fs::write(&ogg, b"definitely not audio").unwrap();

        let result = Ffmpeg::new("ffmpeg", None).transcode(&ogg, &wav).await;

        match result {
            Err(TranscodeError::Failed(status)) => assert!(!status.success()),
            Err(TranscodeError::NotInstalled(_)) => eprintln!("Skipping test: ffmpeg not installed"),
            other => panic!("expected conversion failure, got {other:?}"),
        }
    }
}
