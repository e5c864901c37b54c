pub mod format;

pub const DEFAULT_MAX_LINE_LEN: usize = 20;

/// One timed subtitle line. Offsets are seconds from the start of the audio.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Characters that terminate a sentence (CJK and Latin variants).
const SENTENCE_ENDINGS: &[char] = &['。', '！', '？', '；', '…', '.', '!', '?', ';'];

/// Secondary separators used when a sentence exceeds the line threshold.
const SOFT_SEPARATORS: &[char] = &['，', ',', '、', '：', ':'];

fn is_sentence_ending(c: char) -> bool {
    SENTENCE_ENDINGS.contains(&c)
}

fn is_soft_separator(c: char) -> bool {
    SOFT_SEPARATORS.contains(&c) || c.is_whitespace()
}

/// Split raw text into sentences on terminal punctuation. The punctuation is
/// consumed; it never appears in the output lines. Text with no terminal
/// punctuation comes back as a single sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if is_sentence_ending(c) {
            if !current.trim().is_empty() {
                sentences.push(current.trim().to_string());
            }
            current.clear();
        } else {
            current.push(c);
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current.trim().to_string());
    }
    sentences
}

/// Break an overlong sentence on soft separators, greedily packing fragments
/// into lines of at most `max_len` characters. Fragments sharing a line are
/// rejoined with a full-width comma, which counts toward the threshold. A
/// single fragment longer than `max_len` is emitted as its own line unchanged.
fn split_long_sentence(sentence: &str, max_len: usize) -> Vec<String> {
    let mut fragments: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in sentence.chars() {
        if is_soft_separator(c) {
            if !current.is_empty() {
                fragments.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        fragments.push(current);
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for frag in fragments {
        if line.is_empty() {
            line = frag;
        } else if line.chars().count() + 1 + frag.chars().count() <= max_len {
            line.push('，');
            line.push_str(&frag);
        } else {
            lines.push(std::mem::take(&mut line));
            line = frag;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Split text into display lines: sentences first, then a greedy soft-separator
/// pass for any sentence over `max_len` characters.
pub fn split_lines(text: &str, max_len: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for sentence in split_sentences(text) {
        if sentence.chars().count() <= max_len {
            lines.push(sentence);
        } else {
            lines.extend(split_long_sentence(&sentence, max_len));
        }
    }
    lines
}

/// Allocate `duration` seconds across lines proportionally to their character
/// counts, back-to-back from t=0. This is a placeholder policy: it does not
/// consult real speech alignment. The last segment absorbs rounding drift so
/// the track always ends exactly at `duration`.
pub fn allocate_timing(lines: Vec<String>, duration: f64) -> Vec<Segment> {
    let counts: Vec<usize> = lines.iter().map(|l| l.chars().count().max(1)).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut segments = Vec::with_capacity(lines.len());
    let mut cursor = 0.0f64;
    let last = lines.len() - 1;
    for (i, (text, chars)) in lines.into_iter().zip(counts).enumerate() {
        let end = if i == last {
            duration
        } else {
            cursor + duration * (chars as f64 / total as f64)
        };
        segments.push(Segment {
            index: i + 1,
            start: cursor,
            end,
            text,
        });
        cursor = end;
    }
    segments
}

/// Full pipeline: text + audio duration -> timed segments.
///
/// Empty or whitespace-only text yields an empty sequence, as does a
/// non-positive duration.
pub fn generate(text: &str, duration: f64, max_len: usize) -> Vec<Segment> {
    if text.trim().is_empty() || !duration.is_finite() || duration <= 0.0 {
        return Vec::new();
    }
    allocate_timing(split_lines(text, max_len), duration)
}
