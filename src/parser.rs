mod ass;
mod encoding;
mod lrc;
mod srt;

use std::{
    path::Path,
    time::Instant,
};

pub use ass::parse_ass;
pub use encoding::decode;
pub use lrc::parse_lrc;
pub use srt::{
    parse_srt,
    parse_vtt,
};
use tracing::{
    debug,
    info,
};

use crate::core::{
    Entry,
    KikitoriError,
};

/// Plain strings are shown for the whole video.
pub const PLAIN_TEXT_END_MS: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    Ass,
    Lrc,
    Text,
}

impl SubtitleFormat {
    pub fn from_path(path: &Path) -> Result<Self, KikitoriError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "srt" => Ok(SubtitleFormat::Srt),
            "vtt" => Ok(SubtitleFormat::Vtt),
            "ass" | "ssa" => Ok(SubtitleFormat::Ass),
            "lrc" => Ok(SubtitleFormat::Lrc),
            "txt" => Ok(SubtitleFormat::Text),
            _ => Err(KikitoriError::UnsupportedFileType(path.display().to_string())),
        }
    }
}

/// Decodes raw subtitle bytes and parses them into entries ordered by start time.
pub fn parse(bytes: &[u8], format: SubtitleFormat) -> Result<Vec<Entry>, KikitoriError> {
    let (text, encoding) = decode(bytes);
    debug!(encoding = encoding.name(), ?format, "Decoded subtitle bytes");
    parse_text(&text, format)
}

pub fn parse_text(text: &str, format: SubtitleFormat) -> Result<Vec<Entry>, KikitoriError> {
    let entries = match format {
        SubtitleFormat::Srt => parse_srt(text)?,
        SubtitleFormat::Vtt => parse_vtt(text)?,
        SubtitleFormat::Ass => parse_ass(text)?,
        SubtitleFormat::Lrc => parse_lrc(text),
        SubtitleFormat::Text => parse_plain(text),
    };

    if entries.is_empty() {
        return Err(KikitoriError::EmptySubtitle);
    }

    Ok(entries)
}

pub async fn read_file(path: impl AsRef<Path>) -> Result<Vec<Entry>, KikitoriError> {
    let start = Instant::now();
    let path = path.as_ref();
    let format = SubtitleFormat::from_path(path)?;
    let bytes = tokio::fs::read(path).await?;
    let entries = parse(&bytes, format)?;

    info!(
        "Parsed {} entries from {} ({:.1}s)",
        entries.len(),
        path.display(),
        start.elapsed().as_secs_f32()
    );
    Ok(entries)
}

/// Cue times come back as a time of day; subtitles never run past 24 hours.
fn cue_millis(time: time::Time) -> i64 {
    let seconds = i64::from(time.hour()) * 3600 + i64::from(time.minute()) * 60 + i64::from(time.second());
    seconds * 1000 + i64::from(time.millisecond())
}

fn parse_plain(text: &str) -> Vec<Entry> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    vec![Entry::new("0", 0, PLAIN_TEXT_END_MS, text)]
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_format_from_path() {
        let cases = [
            ("movie.ja.srt", SubtitleFormat::Srt),
            ("clip.VTT", SubtitleFormat::Vtt),
            ("episode.ass", SubtitleFormat::Ass),
            ("song.lrc", SubtitleFormat::Lrc),
            ("notes.txt", SubtitleFormat::Text),
        ];
        for (name, expected) in cases {
            assert_eq!(SubtitleFormat::from_path(&PathBuf::from(name)).unwrap(), expected);
        }

        assert!(matches!(
            SubtitleFormat::from_path(&PathBuf::from("video.mkv")),
            Err(KikitoriError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_plain_text_spans_whole_video() {
        let entries = parse_text("  今日は  ", SubtitleFormat::Text).unwrap();
        assert_eq!(entries, vec![Entry::new("0", 0, PLAIN_TEXT_END_MS, "今日は")]);
        assert!(matches!(parse_text("   ", SubtitleFormat::Text), Err(KikitoriError::EmptySubtitle)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        for format in [SubtitleFormat::Srt, SubtitleFormat::Vtt, SubtitleFormat::Ass] {
            assert!(parse_text("this is not a subtitle file", format).is_err(), "{:?}", format);
        }
    }

    #[test]
    fn test_cue_millis() {
        let time = time::Time::from_hms_milli(1, 2, 3, 456).unwrap();
        assert_eq!(cue_millis(time), 3_723_456);
    }

    #[test]
    fn test_parse_decodes_shift_jis() {
        let source = "1\n00:00:01,000 --> 00:00:02,500\n今日はいい天気ですね。明日も晴れるでしょう。\n\n\
                      2\n00:00:03,000 --> 00:00:05,000\n私は学校へ行きます。先生に会いたいです。\n\n\
                      3\n00:00:06,000 --> 00:00:08,000\nこの映画はとても面白かったと思います。\n";
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(source);
        assert!(std::str::from_utf8(&bytes).is_err());

        let entries = parse(&bytes, SubtitleFormat::Srt).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].text, "今日はいい天気ですね。明日も晴れるでしょう。");
        assert_eq!((entries[0].from, entries[0].to), (1000, 2500));
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.lrc");
        tokio::fs::write(&path, "[ti:Song]\n[00:01.00]hello\n[00:05.00]world\n").await.unwrap();

        let entries = read_file(&path).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "hello");

        let missing = read_file(dir.path().join("missing.srt")).await;
        assert!(matches!(missing, Err(KikitoriError::Io(_))));
    }
}
