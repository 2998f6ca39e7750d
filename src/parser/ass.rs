use rsubs_lib::SSA;

use super::cue_millis;
use crate::core::{
    utils::SubtitleText,
    Entry,
    KikitoriError,
};

/// Extracts the dialogue events of an ASS/SSA script. `Comment` events are
/// skipped, `\N` line breaks and style override blocks are resolved.
pub fn parse_ass(text: &str) -> Result<Vec<Entry>, KikitoriError> {
    let ssa = SSA::parse(text.trim_start_matches('\u{feff}').replace("\r\n", "\n"))
        .map_err(|e| KikitoriError::parse("ASS", format!("{:?}", e)))?;

    Ok(ssa
        .events
        .into_iter()
        .filter(|event| !event.line_type.eq_ignore_ascii_case("comment"))
        .enumerate()
        .map(|(ordinal, event)| {
            let from = cue_millis(event.start);
            let text = event
                .text
                .replace("\\N", "\n")
                .replace("\\n", "\n")
                .replace("\\h", " ")
                .strip_override_tags();
            Entry { id: ordinal.to_string(), from, to: cue_millis(event.end).max(from), text }
        })
        .filter(|entry| !entry.text.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "[Script Info]\nTitle: Test\nScriptType: v4.00+\n\n\
        [V4+ Styles]\n\
        Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, \
        Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, \
        Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
        Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1\n\n\
        [Events]\n\
        Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
        Dialogue: 0,0:00:01.50,0:00:03.25,Default,,0,0,0,,{\\an8}上です\n\
        Dialogue: 0,0:01:02.00,0:01:04.00,Default,,0,0,0,,一行目\\N二行目, まだ\n";

    #[test]
    fn test_parse_ass() {
        let entries = parse_ass(SCRIPT).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].from, entries[0].to), (1500, 3250));
        assert_eq!(entries[0].text, "上です");
        assert_eq!(entries[1].from, 62_000);
        assert_eq!(entries[1].text, "一行目\n二行目, まだ");
    }
}
