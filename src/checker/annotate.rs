use crate::Match;

/// One piece of an annotated document: untouched text or a marker wrapping
/// the range a match reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Marker(Marker),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub id: usize,
    /// Char offset into the text as it was submitted for checking.
    pub offset: usize,
    /// Covered substring. Empty for a zero-width marker.
    pub text: String,
    pub message: String,
    pub replacements: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AnnotatedDocument {
    segments: Vec<Segment>,
    dropped: usize,
}

impl AnnotatedDocument {
    /// A document with no markers at all.
    pub fn plain(text: &str) -> Self {
        let mut segments = Vec::new();
        if !text.is_empty() {
            segments.push(Segment::Plain(text.to_string()));
        }
        Self {
            segments,
            dropped: 0,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Marker(m) => Some(m),
            Segment::Plain(_) => None,
        })
    }

    pub fn marker(&self, id: usize) -> Option<&Marker> {
        self.markers().find(|m| m.id == id)
    }

    pub fn marker_count(&self) -> usize {
        self.markers().count()
    }

    /// Matches that could not be annotated (overlapping or out of bounds).
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// Concatenate every segment back into the submitted text.
    pub fn reconstruct(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Plain(text) => out.push_str(text),
                Segment::Marker(marker) => out.push_str(&marker.text),
            }
        }
        out
    }

    /// Render as a single markup string, each marker wrapped in a
    /// `<mark>` tag.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Plain(text) => out.push_str(text),
                Segment::Marker(marker) => {
                    out.push_str("<mark>");
                    out.push_str(&marker.text);
                    out.push_str("</mark>");
                }
            }
        }
        out
    }
}

/// Wrap each match's range in a marker.
///
/// Matches are spliced in descending offset order: every splice then lands
/// on a position no earlier splice has shifted, so the reported offsets
/// stay valid throughout. Ties keep their reported order (stable sort), so
/// the first-reported match at an offset wins. A match whose range reaches
/// into an already-annotated region, or past the end of the text, is
/// dropped. Zero-length matches become zero-width markers.
pub fn annotate(text: &str, matches: &[Match]) -> AnnotatedDocument {
    if matches.is_empty() {
        return AnnotatedDocument::plain(text);
    }

    let mut ordered: Vec<&Match> = matches.iter().collect();
    ordered.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut segments = vec![Segment::Plain(text.to_string())];
    let mut dropped = 0;

    for m in ordered {
        // The first segment always holds the not-yet-annotated prefix of
        // the original text; everything after it is already spliced.
        let head = match segments.first() {
            Some(Segment::Plain(s)) => s.clone(),
            _ => {
                dropped += 1;
                continue;
            }
        };

        if m.end() > head.chars().count() {
            dropped += 1;
            continue;
        }

        let start = char_to_byte(&head, m.offset);
        let end = char_to_byte(&head, m.end());

        let marker = Segment::Marker(Marker {
            id: 0,
            offset: m.offset,
            text: head[start..end].to_string(),
            message: m.message.clone(),
            replacements: m.replacements.clone(),
        });

        let mut spliced = Vec::with_capacity(3);
        if start > 0 {
            spliced.push(Segment::Plain(head[..start].to_string()));
        }
        spliced.push(marker);
        if end < head.len() {
            spliced.push(Segment::Plain(head[end..].to_string()));
        }
        segments.splice(0..1, spliced);
    }

    segments.retain(|s| !matches!(s, Segment::Plain(p) if p.is_empty()));

    // Number markers in document order; ids are what the correction
    // session keys its registry on.
    let mut next_id = 0;
    for segment in &mut segments {
        if let Segment::Marker(m) = segment {
            m.id = next_id;
            next_id += 1;
        }
    }

    AnnotatedDocument { segments, dropped }
}

/// Splice chosen replacements into `text`, highest offset first so no
/// applied pick shifts the range of one still to come. Picks whose range
/// reaches into an already-rewritten region, or past the end of the text,
/// are skipped. Returns the new text and the number of picks applied.
pub fn apply_replacements(text: &str, picks: &[(Match, String)]) -> (String, usize) {
    let mut ordered: Vec<&(Match, String)> = picks.iter().collect();
    ordered.sort_by(|a, b| b.0.offset.cmp(&a.0.offset));

    let total_chars = text.chars().count();
    let mut out = text.to_string();
    // Lowest char index already rewritten; the prefix before it still has
    // the original text's offsets.
    let mut boundary = total_chars;
    let mut applied = 0;

    for (m, replacement) in ordered {
        if m.end() > boundary {
            continue;
        }

        let start = char_to_byte(&out, m.offset);
        let end = char_to_byte(&out, m.end());
        out.replace_range(start..end, replacement);
        boundary = m.offset;
        applied += 1;
    }

    (out, applied)
}

/// Slice `text` by char offset and length, if the range is in bounds.
pub fn covered_text(text: &str, offset: usize, length: usize) -> Option<&str> {
    if offset + length > text.chars().count() {
        return None;
    }
    let start = char_to_byte(text, offset);
    let end = char_to_byte(text, offset + length);
    Some(&text[start..end])
}

fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(offset: usize, length: usize) -> Match {
        Match {
            offset,
            length,
            message: String::new(),
            rule_id: None,
            replacements: Vec::new(),
        }
    }

    fn marker_texts(doc: &AnnotatedDocument) -> Vec<String> {
        doc.markers().map(|mk| mk.text.clone()).collect()
    }

    #[test]
    fn test_no_matches_leaves_text_unchanged() {
        let doc = annotate("Nothing wrong here.", &[]);
        assert_eq!(doc.marker_count(), 0);
        assert_eq!(doc.reconstruct(), "Nothing wrong here.");
        assert_eq!(doc.to_markup(), "Nothing wrong here.");
    }

    #[test]
    fn test_single_match_wraps_reported_range() {
        let doc = annotate("Ths is a test.", &[m(0, 3)]);
        assert_eq!(marker_texts(&doc), vec!["Ths"]);
        assert_eq!(doc.reconstruct(), "Ths is a test.");
        assert_eq!(doc.to_markup(), "<mark>Ths</mark> is a test.");
    }

    #[test]
    fn test_reconstruction_with_several_markers() {
        let text = "one two three four";
        let doc = annotate(text, &[m(4, 3), m(14, 4), m(0, 3)]);
        assert_eq!(doc.marker_count(), 3);
        assert_eq!(marker_texts(&doc), vec!["one", "two", "four"]);
        assert_eq!(doc.reconstruct(), text);
    }

    #[test]
    fn test_descending_order_keeps_offsets_valid() {
        let doc = annotate("abcdefgh", &[m(5, 2), m(0, 3)]);
        assert_eq!(marker_texts(&doc), vec!["abc", "fg"]);
        assert_eq!(doc.reconstruct(), "abcdefgh");
    }

    #[test]
    fn test_ascending_order_corrupts_a_markup_splice() {
        // Regression guard: the naive left-to-right version of the splice,
        // applied to a flat markup string, grabs shifted text for the
        // second range.
        let text = "abcdefgh";
        let mut markup = text.to_string();
        for m in [m(0, 3), m(5, 2)] {
            let covered = markup[m.offset..m.end()].to_string();
            markup.replace_range(m.offset..m.end(), &format!("<mark>{}</mark>", covered));
        }
        assert!(!markup.contains("<mark>fg</mark>"));

        let doc = annotate(text, &[m(0, 3), m(5, 2)]);
        assert!(doc.to_markup().contains("<mark>fg</mark>"));
    }

    #[test]
    fn test_overlapping_match_is_dropped() {
        // The higher-offset match is spliced first, so the containing
        // range now reaches into annotated territory and is skipped.
        let doc = annotate("abcdefgh", &[m(0, 6), m(2, 2)]);
        assert_eq!(marker_texts(&doc), vec!["cd"]);
        assert_eq!(doc.dropped_count(), 1);
        assert_eq!(doc.reconstruct(), "abcdefgh");
    }

    #[test]
    fn test_equal_offsets_first_reported_wins() {
        let mut first = m(4, 2);
        first.message = "first".to_string();
        let mut second = m(4, 3);
        second.message = "second".to_string();

        let doc = annotate("abcdefgh", &[first, second]);
        assert_eq!(doc.marker_count(), 1);
        assert_eq!(doc.markers().next().unwrap().message, "first");
        assert_eq!(doc.dropped_count(), 1);
        assert_eq!(doc.reconstruct(), "abcdefgh");
    }

    #[test]
    fn test_out_of_bounds_match_is_dropped() {
        let doc = annotate("short", &[m(3, 10)]);
        assert_eq!(doc.marker_count(), 0);
        assert_eq!(doc.dropped_count(), 1);
        assert_eq!(doc.reconstruct(), "short");
    }

    #[test]
    fn test_zero_length_match_becomes_zero_width_marker() {
        let doc = annotate("abcd", &[m(2, 0)]);
        assert_eq!(doc.marker_count(), 1);
        assert_eq!(doc.markers().next().unwrap().text, "");
        assert_eq!(doc.reconstruct(), "abcd");
        assert_eq!(doc.to_markup(), "ab<mark></mark>cd");
    }

    #[test]
    fn test_offsets_are_char_indices() {
        // "über" starts at char 4; byte offsets would land mid-"ö".
        let text = "Schön über alles";
        let doc = annotate(text, &[m(6, 4)]);
        assert_eq!(marker_texts(&doc), vec!["über"]);
        assert_eq!(doc.reconstruct(), text);
    }

    #[test]
    fn test_marker_ids_follow_document_order() {
        let doc = annotate("abcdefgh", &[m(5, 2), m(0, 3)]);
        let ids: Vec<usize> = doc.markers().map(|mk| mk.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(doc.marker(1).unwrap().text, "fg");
    }

    #[test]
    fn test_covered_text_uses_char_offsets() {
        assert_eq!(covered_text("Schön über alles", 6, 4), Some("über"));
        assert_eq!(covered_text("abc", 1, 0), Some(""));
        assert_eq!(covered_text("abc", 2, 5), None);
    }

    #[test]
    fn test_apply_single_replacement() {
        let (fixed, applied) =
            apply_replacements("Ths is a test.", &[(m(0, 3), "This".to_string())]);
        assert_eq!(fixed, "This is a test.");
        assert_eq!(applied, 1);
    }

    #[test]
    fn test_apply_several_replacements_descending() {
        let picks = vec![
            (m(0, 3), "This".to_string()),
            (m(9, 4), "text".to_string()),
        ];
        let (fixed, applied) = apply_replacements("Ths is a tset.", &picks);
        assert_eq!(fixed, "This is a text.");
        assert_eq!(applied, 2);
    }

    #[test]
    fn test_apply_skips_overlapping_pick() {
        let picks = vec![
            (m(0, 6), "xxxxxx".to_string()),
            (m(4, 2), "yy".to_string()),
        ];
        let (fixed, applied) = apply_replacements("abcdefgh", &picks);
        assert_eq!(fixed, "abcdyygh");
        assert_eq!(applied, 1);
    }

    #[test]
    fn test_apply_replacement_with_multibyte_text() {
        let (fixed, applied) =
            apply_replacements("Schön über alles", &[(m(6, 4), "unter".to_string())]);
        assert_eq!(fixed, "Schön unter alles");
        assert_eq!(applied, 1);
    }

    #[test]
    fn test_apply_skips_out_of_bounds_pick() {
        let (fixed, applied) = apply_replacements("abc", &[(m(2, 5), "zz".to_string())]);
        assert_eq!(fixed, "abc");
        assert_eq!(applied, 0);
    }
}
