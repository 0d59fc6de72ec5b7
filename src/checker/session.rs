use std::collections::HashMap;
use thiserror::Error;

use crate::checker::annotate::{annotate, apply_replacements, AnnotatedDocument};
use crate::stats::TextStats;
use crate::Match;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Collapsed,
    SuggestionsOpen,
    Applied,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no marker with id {0}")]
    UnknownMarker(usize),
    #[error("marker {0} has already been applied")]
    AlreadyApplied(usize),
    #[error("marker {0} has no suggestion panel open")]
    NotOpen(usize),
    #[error("marker {id} has no replacement candidate {index}")]
    NoSuchReplacement { id: usize, index: usize },
    #[error("markers are stale; run a fresh check before correcting again")]
    Stale,
}

/// The correction workflow over one checked text: markers move
/// `Collapsed -> SuggestionsOpen -> Applied`, at most one suggestion panel
/// is open at a time, and applying any single correction invalidates every
/// other marker until the new text is checked again.
pub struct CorrectionSession {
    text: String,
    doc: AnnotatedDocument,
    states: HashMap<usize, MarkerState>,
    open: Option<usize>,
    stats: TextStats,
    stale: bool,
}

impl CorrectionSession {
    pub fn new(text: &str, matches: &[Match]) -> Self {
        let doc = annotate(text, matches);
        let states = doc
            .markers()
            .map(|m| (m.id, MarkerState::Collapsed))
            .collect();

        Self {
            text: text.to_string(),
            doc,
            states,
            open: None,
            stats: TextStats::of(text),
            stale: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn stats(&self) -> TextStats {
        self.stats
    }

    pub fn document(&self) -> &AnnotatedDocument {
        &self.doc
    }

    pub fn state(&self, id: usize) -> Option<MarkerState> {
        self.states.get(&id).copied()
    }

    pub fn open_marker(&self) -> Option<usize> {
        self.open
    }

    /// True once a correction has been applied: the remaining offsets no
    /// longer describe the current text, so only a fresh check may produce
    /// new markers.
    pub fn needs_recheck(&self) -> bool {
        self.stale
    }

    /// Open a marker's suggestion panel, collapsing whichever other panel
    /// is open.
    pub fn open(&mut self, id: usize) -> Result<(), SessionError> {
        if self.stale {
            return Err(SessionError::Stale);
        }
        match self.states.get(&id) {
            None => return Err(SessionError::UnknownMarker(id)),
            Some(MarkerState::Applied) => return Err(SessionError::AlreadyApplied(id)),
            Some(_) => {}
        }

        if let Some(other) = self.open.take() {
            if other != id {
                self.states.insert(other, MarkerState::Collapsed);
            }
        }

        self.states.insert(id, MarkerState::SuggestionsOpen);
        self.open = Some(id);
        Ok(())
    }

    /// A click outside the open panel: collapse it.
    pub fn dismiss(&mut self) {
        if let Some(id) = self.open.take() {
            if self.state(id) == Some(MarkerState::SuggestionsOpen) {
                self.states.insert(id, MarkerState::Collapsed);
            }
        }
    }

    /// Replace the open marker's range with one of its candidates. The
    /// marker becomes `Applied` (terminal) and every other marker is
    /// discarded; stats are recomputed against the new text.
    pub fn apply(&mut self, id: usize, index: usize) -> Result<&str, SessionError> {
        if self.stale {
            return Err(SessionError::Stale);
        }
        match self.states.get(&id) {
            None => return Err(SessionError::UnknownMarker(id)),
            Some(MarkerState::Applied) => return Err(SessionError::AlreadyApplied(id)),
            Some(MarkerState::Collapsed) => return Err(SessionError::NotOpen(id)),
            Some(MarkerState::SuggestionsOpen) => {}
        }

        let marker = self
            .doc
            .marker(id)
            .ok_or(SessionError::UnknownMarker(id))?;
        let replacement = marker
            .replacements
            .get(index)
            .ok_or(SessionError::NoSuchReplacement { id, index })?
            .clone();

        let pick = Match {
            offset: marker.offset,
            length: marker.text.chars().count(),
            message: String::new(),
            rule_id: None,
            replacements: Vec::new(),
        };
        let (new_text, _) = apply_replacements(&self.text, &[(pick, replacement)]);

        self.text = new_text;
        self.stats = TextStats::of(&self.text);
        self.doc = AnnotatedDocument::plain(&self.text);
        self.states.insert(id, MarkerState::Applied);
        self.open = None;
        self.stale = true;

        Ok(&self.text)
    }

    /// The user edited the text: every marker is discarded and stats are
    /// recomputed.
    pub fn edit(&mut self, new_text: &str) {
        self.text = new_text.to_string();
        self.stats = TextStats::of(new_text);
        self.doc = AnnotatedDocument::plain(new_text);
        self.states.clear();
        self.open = None;
        self.stale = false;
    }

    pub fn clear(&mut self) {
        self.edit("");
    }
}
