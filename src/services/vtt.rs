//! WebVTT post-processing for auto-generated YouTube captions.
//!
//! Auto captions repeat lines across overlapping cues and carry inline
//! timing tags. This module turns raw VTT into readable text: tags are
//! stripped, consecutive repeats collapsed, and text optionally grouped
//! under caller-supplied chapters.

use std::collections::HashSet;

/// One chapter boundary, as supplied by the caller or by video metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterSpec {
    pub title: String,
    pub start_time: f64,
    pub end_time: Option<f64>,
}

/// Parse a `HH:MM:SS(.mmm)`, `MM:SS(.mmm)`, or bare-seconds string.
/// Unparseable input maps to 0.0.
pub fn time_to_seconds(value: &str) -> f64 {
    let parts: Vec<&str> = value.trim().split(':').collect();
    let parsed = match parts.as_slice() {
        [h, m, s] => (|| {
            Some(h.parse::<i64>().ok()? as f64 * 3600.0
                + m.parse::<i64>().ok()? as f64 * 60.0
                + s.parse::<f64>().ok()?)
        })(),
        [m, s] => (|| Some(m.parse::<i64>().ok()? as f64 * 60.0 + s.parse::<f64>().ok()?))(),
        [v] => v.parse::<f64>().ok(),
        _ => None,
    };
    parsed.unwrap_or(0.0)
}

/// Format seconds as `HH:MM:SS`, or `MM:SS` under one hour.
pub fn format_time(seconds: f64) -> String {
    let total = seconds as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Strip inline tags (`<00:13:50.279>`, `<c>`, `</c>`) and collapse the
/// whitespace the removal leaves behind.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Process a whole VTT document into a deduplicated transcript.
///
/// Cue fragments are assembled into sentences (a fragment ending in
/// `.`/`!`/`?` closes one); repeated fragments and sentences that are
/// substrings of other sentences are dropped.
pub fn transcript(vtt: &str) -> String {
    let mut processed: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut current = String::new();
    let mut started = false;

    for line in vtt.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !started {
            if line.starts_with("WEBVTT") {
                continue;
            }
            started = true;
        }
        if line.contains("-->") || line.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let cleaned = clean_text(line);
        if cleaned.is_empty() {
            continue;
        }
        if processed.last().is_some_and(|last| last.contains(&cleaned))
            || (!current.is_empty() && current.contains(&cleaned))
        {
            continue;
        }

        if cleaned.ends_with(['.', '!', '?']) {
            let sentence = if current.is_empty() {
                cleaned
            } else {
                format!("{current} {cleaned}")
            };
            if seen.insert(sentence.clone()) {
                processed.push(sentence);
            }
            current.clear();
        } else if current.is_empty() {
            current = cleaned;
        } else {
            current.push(' ');
            current.push_str(&cleaned);
        }
    }

    if !current.is_empty() && seen.insert(current.clone()) {
        processed.push(current);
    }

    // Drop lines fully contained in another line.
    let final_lines: Vec<&String> = processed
        .iter()
        .enumerate()
        .filter(|(i, line)| {
            !processed
                .iter()
                .enumerate()
                .any(|(j, other)| *i != j && other.contains(line.as_str()))
        })
        .map(|(_, line)| line)
        .collect();

    final_lines
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract deduplicated caption text for cues starting inside
/// `[start_seconds, end_seconds)`.
pub fn extract_timerange(vtt: &str, start_seconds: f64, end_seconds: f64) -> String {
    struct Segment {
        time: f64,
        text: String,
    }

    let lines: Vec<&str> = vtt.lines().collect();
    let mut segments: Vec<Segment> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if let Some((start_part, _)) = line.split_once("-->") {
            let cue_time = time_to_seconds(start_part);
            if start_seconds <= cue_time && cue_time < end_seconds {
                let mut text = String::new();
                let mut j = i + 1;
                while j < lines.len() && !lines[j].contains("-->") && !lines[j].trim().is_empty() {
                    let candidate = lines[j].trim();
                    if !candidate.chars().all(|c| c.is_ascii_digit()) {
                        let cleaned = clean_text(candidate);
                        if !cleaned.is_empty() {
                            if !text.is_empty() {
                                text.push(' ');
                            }
                            text.push_str(&cleaned);
                        }
                    }
                    j += 1;
                }
                if !text.is_empty() {
                    segments.push(Segment {
                        time: cue_time,
                        text,
                    });
                }
            }
        }
        i += 1;
    }

    segments.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut processed: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for segment in segments {
        let text = segment.text.trim().to_string();
        if seen.contains(&text) {
            continue;
        }
        match processed.last_mut() {
            Some(last) if last.contains(&text) => continue,
            Some(last) if text.contains(last.as_str()) => {
                // The new segment extends the previous one; keep the
                // more complete text.
                *last = text.clone();
                seen.insert(text);
            }
            _ => {
                processed.push(text.clone());
                seen.insert(text);
            }
        }
    }

    processed.join("\n")
}

/// Group caption text under the selected chapters.
///
/// A chapter without an explicit end time ends where the next chapter in
/// the full chapter list starts (or at the video duration for the last
/// one); a two-second buffer is added to non-final boundaries so trailing
/// words are not cut mid-sentence.
pub fn group_by_chapters(
    vtt: &str,
    selected: &[ChapterSpec],
    all_chapters: &[ChapterSpec],
    video_duration: f64,
) -> String {
    if selected.is_empty() {
        return transcript(vtt);
    }

    let mut selected: Vec<ChapterSpec> = selected.to_vec();
    selected.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    let mut sections = Vec::new();
    for (index, chapter) in selected.iter().enumerate() {
        let mut end = chapter.end_time.unwrap_or_else(|| {
            all_chapters
                .iter()
                .position(|c| c.start_time == chapter.start_time && c.title == chapter.title)
                .map(|pos| match all_chapters.get(pos + 1) {
                    Some(next) => next.start_time,
                    None => video_duration,
                })
                .or_else(|| {
                    selected
                        .iter()
                        .filter(|c| c.start_time > chapter.start_time)
                        .map(|c| c.start_time)
                        .min_by(f64::total_cmp)
                })
                .unwrap_or(video_duration)
        });

        let is_last = index == selected.len() - 1;
        if !is_last && end < video_duration {
            end += 2.0;
        }

        let text = extract_timerange(vtt, chapter.start_time, end);
        if !text.is_empty() {
            sections.push(format!("## {}\n{}", chapter.title, text));
        }
    }

    sections.join("\n\n")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
WEBVTT
Kind: captions

00:00:01.000 --> 00:00:03.000
hello<00:00:02.000><c> world</c>

00:00:03.000 --> 00:00:05.000
hello world

00:00:05.000 --> 00:00:08.000
this is the second part.

00:01:10.000 --> 00:01:12.000
later on in the video.
";

    #[test]
    fn time_parsing_handles_all_formats() {
        assert_eq!(time_to_seconds("01:02:03"), 3723.0);
        assert_eq!(time_to_seconds("02:30"), 150.0);
        assert_eq!(time_to_seconds("12.5"), 12.5);
        assert_eq!(time_to_seconds("00:00:01.500"), 1.5);
        assert_eq!(time_to_seconds("garbage"), 0.0);
    }

    #[test]
    fn format_time_omits_hours_under_one_hour() {
        assert_eq!(format_time(59.0), "00:59");
        assert_eq!(format_time(150.0), "02:30");
        assert_eq!(format_time(3723.0), "01:02:03");
    }

    #[test]
    fn clean_text_strips_inline_tags() {
        assert_eq!(
            clean_text("hello<00:13:50.279><c> world</c>"),
            "hello world"
        );
        assert_eq!(clean_text("plain line"), "plain line");
    }

    #[test]
    fn transcript_deduplicates_repeated_cues() {
        let text = transcript(SAMPLE);
        assert_eq!(text.matches("hello world").count(), 1);
        assert!(text.contains("this is the second part."));
        assert!(!text.contains("WEBVTT"));
        assert!(!text.contains("-->"));
    }

    #[test]
    fn extract_timerange_respects_boundaries() {
        let early = extract_timerange(SAMPLE, 0.0, 60.0);
        assert!(early.contains("hello world"));
        assert!(!early.contains("later on"));

        let late = extract_timerange(SAMPLE, 60.0, 120.0);
        assert!(late.contains("later on in the video."));
        assert!(!late.contains("hello"));
    }

    #[test]
    fn group_by_chapters_sections_the_text() {
        let chapters = vec![
            ChapterSpec {
                title: "Intro".to_string(),
                start_time: 0.0,
                end_time: None,
            },
            ChapterSpec {
                title: "Later".to_string(),
                start_time: 60.0,
                end_time: None,
            },
        ];
        let grouped = group_by_chapters(SAMPLE, &chapters, &chapters, 120.0);
        assert!(grouped.contains("## Intro"));
        assert!(grouped.contains("## Later"));
        let intro_pos = grouped.find("## Intro").unwrap();
        let later_pos = grouped.find("## Later").unwrap();
        assert!(intro_pos < later_pos);
        assert!(grouped[later_pos..].contains("later on in the video."));
    }

    #[test]
    fn empty_selection_falls_back_to_full_transcript() {
        let grouped = group_by_chapters(SAMPLE, &[], &[], 120.0);
        assert_eq!(grouped, transcript(SAMPLE));
    }
}
