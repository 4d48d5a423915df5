//! Sentence-aware text splitting
//!
//! Sentences are packed into chunks of at most `max_chars` characters. The
//! next chunk starts with the trailing sentences of the previous one, up to
//! `overlap` characters. A sentence longer than `max_chars` is cut at
//! character boundaries.

pub fn split(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let overlap = overlap.min(max_chars / 2);

    let mut pieces = Vec::new();
    for sentence in sentences(text) {
        if char_len(&sentence) > max_chars {
            pieces.extend(hard_split(&sentence, max_chars));
        } else {
            pieces.push(sentence);
        }
    }

    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;

    for piece in pieces {
        let len = char_len(&piece);
        let joined_len = if current.is_empty() { len } else { current_len + 1 + len };
        if joined_len > max_chars && !current.is_empty() {
            chunks.push(current.join(" "));
            current = carry_over(&current, overlap, max_chars - len);
            current_len = joined(&current);
        }
        current_len = if current.is_empty() { len } else { current_len + 1 + len };
        current.push(piece);
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

/// Sentences ending in `.`, `!` or `?` followed by whitespace, or at line breaks.
fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.lines() {
        let mut start = 0;
        let chars: Vec<(usize, char)> = line.char_indices().collect();
        for (i, &(pos, c)) in chars.iter().enumerate() {
            let at_break = matches!(c, '.' | '!' | '?')
                && chars.get(i + 1).map_or(true, |&(_, next)| next.is_whitespace());
            if at_break {
                let end = pos + c.len_utf8();
                push_trimmed(&mut out, &line[start..end]);
                start = end;
            }
        }
        push_trimmed(&mut out, &line[start..]);
    }
    out
}

fn push_trimmed(out: &mut Vec<String>, s: &str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
}

fn hard_split(sentence: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = sentence.chars().collect();
    chars.chunks(max_chars).map(|c| c.iter().collect()).collect()
}

/// Trailing pieces totalling at most `overlap` chars, leaving `room` for the next piece.
fn carry_over(pieces: &[String], overlap: usize, room: usize) -> Vec<String> {
    let budget = overlap.min(room.saturating_sub(1));
    let mut kept = Vec::new();
    let mut total = 0;
    for piece in pieces.iter().rev() {
        let len = char_len(piece) + usize::from(!kept.is_empty());
        if total + len > budget {
            break;
        }
        total += len;
        kept.push(piece.clone());
    }
    kept.reverse();
    kept
}

fn joined(pieces: &[String]) -> usize {
    let chars: usize = pieces.iter().map(|p| char_len(p)).sum();
    chars + pieces.len().saturating_sub(1)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split("Realistic people like tools. They work outdoors.", 100, 10), vec![
            "Realistic people like tools. They work outdoors."
        ]);
        assert!(split("  \n ", 100, 10).is_empty());
    }

    #[test]
    fn chunks_respect_the_size_and_overlap() {
        let text = "Alpha one. Beta two. Gamma three. Delta four.";
        let chunks = split(text, 22, 10);
        assert_eq!(chunks, vec!["Alpha one. Beta two.", "Beta two. Gamma three.", "Delta four."]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 22));
    }

    #[test]
    fn decimals_and_long_sentences() {
        assert_eq!(sentences("Nilai 3.5 cukup. Lanjut"), vec!["Nilai 3.5 cukup.", "Lanjut"]);
        let chunks = split("ééééééééé", 4, 0);
        assert_eq!(chunks, vec!["éééé", "éééé", "é"]);
    }
}
