use rsubs_lib::{
    SRT,
    VTT,
};

use super::cue_millis;
use crate::core::{
    Entry,
    KikitoriError,
};

pub fn parse_srt(text: &str) -> Result<Vec<Entry>, KikitoriError> {
    let srt = SRT::parse(normalize_newlines(text))
        .map_err(|e| KikitoriError::parse("SRT", format!("{:?}", e)))?;

    Ok(srt
        .lines
        .into_iter()
        .filter(|line| !line.text.trim().is_empty())
        .map(|line| {
            let from = cue_millis(line.start);
            Entry {
                id: line.sequence_number.to_string(),
                from,
                to: cue_millis(line.end).max(from),
                text: line.text,
            }
        })
        .collect())
}

/// Header, `NOTE`, `STYLE` and `REGION` blocks are dropped and cue settings
/// are ignored. Cues without an identifier are numbered by position.
pub fn parse_vtt(text: &str) -> Result<Vec<Entry>, KikitoriError> {
    let vtt = VTT::parse(normalize_newlines(text))
        .map_err(|e| KikitoriError::parse("VTT", format!("{:?}", e)))?;

    Ok(vtt
        .lines
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !line.text.trim().is_empty())
        .map(|(ordinal, line)| {
            let from = cue_millis(line.start);
            Entry {
                id: line.identifier.unwrap_or_else(|| ordinal.to_string()),
                from,
                to: cue_millis(line.end).max(from),
                text: line.text,
            }
        })
        .collect())
}

fn normalize_newlines(text: &str) -> String {
    text.trim_start_matches('\u{feff}').replace("\r\n", "\n").replace('\r', "\n")
}
