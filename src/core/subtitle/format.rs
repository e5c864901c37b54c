//! SRT and WebVTT serialization for timed segments, plus a timestamp parser
//! used to verify round-trips.

use anyhow::{Result, anyhow};

use super::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
}

impl SubtitleFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "srt" => Some(Self::Srt),
            "vtt" | "webvtt" => Some(Self::Vtt),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Srt => "application/x-subrip; charset=utf-8",
            Self::Vtt => "text/vtt; charset=utf-8",
        }
    }

    /// Millisecond separator: SRT uses a comma, WebVTT a dot.
    fn ms_separator(&self) -> char {
        match self {
            Self::Srt => ',',
            Self::Vtt => '.',
        }
    }
}

fn format_timestamp(seconds: f64, sep: char) -> String {
    let total_ms = (seconds * 1000.0).round().max(0.0) as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}{sep}{millis:03}")
}

/// Render segments in the given format. Empty input produces an empty SRT
/// body, and a bare `WEBVTT` header for VTT.
pub fn render(segments: &[Segment], format: SubtitleFormat) -> String {
    let sep = format.ms_separator();
    let mut out = String::new();
    if format == SubtitleFormat::Vtt {
        out.push_str("WEBVTT\n\n");
    }
    for seg in segments {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            seg.index,
            format_timestamp(seg.start, sep),
            format_timestamp(seg.end, sep),
            seg.text
        ));
    }
    out
}

/// Parse a `HH:MM:SS,mmm` or `HH:MM:SS.mmm` timestamp back into seconds.
pub fn parse_timestamp(ts: &str) -> Result<f64> {
    let normalized = ts.replace(',', ".");
    let mut clock = normalized.split(':');
    let (h, m, rest) = match (clock.next(), clock.next(), clock.next()) {
        (Some(h), Some(m), Some(rest)) => (h, m, rest),
        _ => return Err(anyhow!("malformed timestamp: {ts}")),
    };
    let hours: u64 = h.parse()?;
    let minutes: u64 = m.parse()?;
    let (s, ms) = rest
        .split_once('.')
        .ok_or_else(|| anyhow!("missing millisecond part: {ts}"))?;
    let secs: u64 = s.parse()?;
    let millis: u64 = ms.parse()?;
    let total_ms = hours * 3_600_000 + minutes * 60_000 + secs * 1000 + millis;
    Ok(total_ms as f64 / 1000.0)
}

/// Parse a rendered SRT/VTT body back into segments. Only understands the
/// exact shape `render` emits; used by tests to check round-trip fidelity.
pub fn parse(body: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    for block in body.trim_start_matches("WEBVTT").split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        let mut lines = block.lines();
        let index: usize = lines
            .next()
            .ok_or_else(|| anyhow!("empty cue block"))?
            .trim()
            .parse()?;
        let timing = lines.next().ok_or_else(|| anyhow!("cue missing timing"))?;
        let (start_raw, end_raw) = timing
            .split_once(" --> ")
            .ok_or_else(|| anyhow!("malformed timing line: {timing}"))?;
        let text = lines.collect::<Vec<_>>().join("\n");
        segments.push(Segment {
            index,
            start: parse_timestamp(start_raw.trim())?,
            end: parse_timestamp(end_raw.trim())?,
            text,
        });
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::super::{DEFAULT_MAX_LINE_LEN, generate};
    use super::*;

    #[test]
    fn srt_uses_comma_millisecond_separator() {
        let segments = generate("马年大吉。恭喜发财！", 4.0, DEFAULT_MAX_LINE_LEN);
        let body = render(&segments, SubtitleFormat::Srt);
        assert_eq!(
            body,
            "1\n00:00:00,000 --> 00:00:02,000\n马年大吉\n\n\
             2\n00:00:02,000 --> 00:00:04,000\n恭喜发财\n\n"
        );
    }

    #[test]
    fn vtt_has_header_and_dot_separator() {
        let segments = generate("新春快乐。", 1.5, DEFAULT_MAX_LINE_LEN);
        let body = render(&segments, SubtitleFormat::Vtt);
        assert!(body.starts_with("WEBVTT\n\n"));
        assert!(body.contains("00:00:00.000 --> 00:00:01.500"));
    }

    #[test]
    fn empty_segments_render_empty_bodies() {
        assert_eq!(render(&[], SubtitleFormat::Srt), "");
        assert_eq!(render(&[], SubtitleFormat::Vtt), "WEBVTT\n\n");
    }

    #[test]
    fn timestamps_zero_pad_hours_minutes_seconds() {
        assert_eq!(format_timestamp(3723.042, ','), "01:02:03,042");
        assert_eq!(format_timestamp(0.0, '.'), "00:00:00.000");
    }

    #[test]
    fn parse_timestamp_accepts_both_separators() {
        assert_eq!(parse_timestamp("00:00:02,500").unwrap(), 2.5);
        assert_eq!(parse_timestamp("01:02:03.042").unwrap(), 3723.042);
        assert!(parse_timestamp("02,500").is_err());
    }

    #[test]
    fn srt_round_trip_preserves_millisecond_timing() {
        let text = "春风送暖，万象更新。马到成功！阖家幸福；吉祥如意。";
        let segments = generate(text, 9.7, DEFAULT_MAX_LINE_LEN);
        let parsed = parse(&render(&segments, SubtitleFormat::Srt)).unwrap();
        assert_eq!(parsed.len(), segments.len());
        for (a, b) in segments.iter().zip(&parsed) {
            assert_eq!(a.index, b.index);
            assert_eq!(a.text, b.text);
            // Rendering quantizes to whole milliseconds.
            assert!((a.start - b.start).abs() < 0.0005 + 1e-9);
            assert!((a.end - b.end).abs() < 0.0005 + 1e-9);
        }
    }

    #[test]
    fn vtt_round_trip_matches_srt_timing() {
        let segments = generate("过年好。红包拿来！", 5.0, DEFAULT_MAX_LINE_LEN);
        let from_vtt = parse(&render(&segments, SubtitleFormat::Vtt)).unwrap();
        let from_srt = parse(&render(&segments, SubtitleFormat::Srt)).unwrap();
        assert_eq!(from_vtt, from_srt);
    }
}
