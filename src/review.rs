//! Per-session review state: which question is on screen, the reviewer's
//! draft scores, and the list of committed scores that gets exported.
//!
//! Nothing here is global. A session owns one [`ReviewState`] and passes the
//! shared, read-only [`QuestionGroups`] into the operations that need it.

use crate::error::SaveError;
use crate::grouping::{QuestionGroup, QuestionGroups};
use crate::models::{Score, ScoreEntry};
use std::collections::{HashMap, HashSet};

/// Where the view ended up after a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the question at this index
    Moved(usize),
    /// The saved question was the last one
    Finished,
}

/// Result of saving the current question's drafts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub question_id: String,
    /// Entries copied into the export list
    pub saved: usize,
    /// Entries of an already-committed question that were missing from the
    /// export list and had to be appended instead of updated
    pub repaired: usize,
    pub advance: Advance,
}

#[derive(Debug, Clone)]
pub struct ReviewState {
    current_index: usize,
    default_score: Score,
    /// question_id -> one entry per model, in first-edit order
    drafts: HashMap<String, Vec<ScoreEntry>>,
    /// question ids in the order their drafts were first created
    draft_order: Vec<String>,
    committed: HashSet<String>,
    export_list: Vec<ScoreEntry>,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self::new(Score::DEFAULT)
    }
}

impl ReviewState {
    /// Fresh state for a new session. `default_score` seeds untouched controls.
    pub fn new(default_score: Score) -> Self {
        Self {
            current_index: 0,
            default_score,
            drafts: HashMap::new(),
            draft_order: Vec::new(),
            committed: HashSet::new(),
            export_list: Vec::new(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Reset the index to the first question if it no longer points at one.
    /// Returns true when a reset happened.
    pub fn validate_index(&mut self, group_count: usize) -> bool {
        if self.current_index >= group_count {
            tracing::debug!(
                index = self.current_index,
                group_count,
                "Current index out of range, resetting to first question"
            );
            self.current_index = 0;
            return true;
        }
        false
    }

    /// The question currently on screen, after re-validating the index
    pub fn current_group<'g>(&mut self, groups: &'g QuestionGroups) -> Option<&'g QuestionGroup> {
        self.validate_index(groups.len());
        groups.get(self.current_index)
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_go_next(&self, group_count: usize) -> bool {
        self.current_index + 1 < group_count
    }

    /// Step back one question. No-op on the first question.
    pub fn go_previous(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.current_index -= 1;
        tracing::debug!(index = self.current_index, "Moved to previous question");
        true
    }

    /// Step forward one question. No-op on the last question.
    pub fn go_next(&mut self, group_count: usize) -> bool {
        if !self.can_go_next(group_count) {
            return false;
        }
        self.current_index += 1;
        tracing::debug!(index = self.current_index, "Moved to next question");
        true
    }

    pub fn draft_score(&self, question_id: &str, llm: &str) -> Option<Score> {
        self.drafts
            .get(question_id)?
            .iter()
            .find(|e| e.llm == llm)
            .map(|e| e.score)
    }

    /// Current draft for a (question, model) pair, creating it with the
    /// session's default score the first time the pair is shown.
    pub fn draft_score_or_init(&mut self, question_id: &str, llm: &str) -> Score {
        if let Some(score) = self.draft_score(question_id, llm) {
            return score;
        }
        let score = self.default_score;
        self.drafts_entry(question_id)
            .push(ScoreEntry::new(question_id, llm, score));
        score
    }

    /// Initialise drafts for every model answering this question
    pub fn init_drafts(&mut self, group: &QuestionGroup) {
        for row in &group.rows {
            self.draft_score_or_init(&group.question_id, &row.llm);
        }
    }

    /// Overwrite a draft score. Committed scores are untouched until the next save.
    pub fn set_draft_score(&mut self, question_id: &str, llm: &str, score: Score) {
        let drafts = self.drafts_entry(question_id);
        match drafts.iter_mut().find(|e| e.llm == llm) {
            Some(entry) => entry.score = score,
            None => drafts.push(ScoreEntry::new(question_id, llm, score)),
        }
        tracing::debug!(question_id, llm, score = score.value(), "Draft score set");
    }

    pub fn drafts_for(&self, question_id: &str) -> &[ScoreEntry] {
        self.drafts
            .get(question_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_committed(&self, question_id: &str) -> bool {
        self.committed.contains(question_id)
    }

    pub fn committed_count(&self) -> usize {
        self.committed.len()
    }

    /// Committed scores in export order
    pub fn export_list(&self) -> &[ScoreEntry] {
        &self.export_list
    }

    /// Commit the current question's drafts to the export list.
    ///
    /// The first save appends one entry per model. Later saves update those
    /// entries in place; an entry that is somehow missing is appended and
    /// counted in [`SaveOutcome::repaired`]. On success the view advances to
    /// the next question when there is one.
    pub fn save_current(&mut self, groups: &QuestionGroups) -> Result<SaveOutcome, SaveError> {
        let question_id = self
            .current_group(groups)
            .ok_or(SaveError::NoQuestion)?
            .question_id
            .clone();

        let entries = self.drafts_for(&question_id).to_vec();
        if entries.is_empty() {
            return Err(SaveError::NoScores { question_id });
        }

        let mut repaired = 0;
        if self.is_committed(&question_id) {
            for entry in &entries {
                match self
                    .export_list
                    .iter_mut()
                    .find(|e| e.is_for(&entry.question_id, &entry.llm))
                {
                    Some(existing) => existing.score = entry.score,
                    None => {
                        tracing::warn!(
                            question_id = %entry.question_id,
                            llm = %entry.llm,
                            "Committed question had no exported score for this model, appending"
                        );
                        self.export_list.push(entry.clone());
                        repaired += 1;
                    }
                }
            }
        } else {
            self.export_list.extend(entries.iter().cloned());
        }

        self.committed.insert(question_id.clone());
        tracing::info!(question_id = %question_id, saved = entries.len(), "Saved scores");

        let advance = if self.go_next(groups.len()) {
            Advance::Moved(self.current_index)
        } else {
            Advance::Finished
        };

        Ok(SaveOutcome {
            question_id,
            saved: entries.len(),
            repaired,
            advance,
        })
    }

    /// Commit the drafts of every question that has never been saved.
    /// Returns how many entries were appended to the export list.
    pub fn save_all_remaining(&mut self) -> usize {
        let mut newly_saved = 0;

        for question_id in &self.draft_order {
            if self.committed.contains(question_id) {
                continue;
            }
            if let Some(entries) = self.drafts.get(question_id) {
                self.export_list.extend(entries.iter().cloned());
                newly_saved += entries.len();
            }
            self.committed.insert(question_id.clone());
        }

        tracing::info!(newly_saved, "Saved all remaining scores");
        newly_saved
    }

    fn drafts_entry(&mut self, question_id: &str) -> &mut Vec<ScoreEntry> {
        if !self.drafts.contains_key(question_id) {
            self.draft_order.push(question_id.to_string());
        }
        self.drafts.entry(question_id.to_string()).or_default()
    }
}
