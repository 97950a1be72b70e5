use crate::models::ResponseRow;
use std::collections::HashMap;
use std::ops::Index;

/// All response rows sharing one question_id. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionGroup {
    pub question_id: String,
    pub rows: Vec<ResponseRow>,
}

impl QuestionGroup {
    /// Question text as given on the group's first row
    pub fn question_text(&self) -> &str {
        &self.rows[0].question_text
    }
}

/// Response rows partitioned by question, in first-appearance order
#[derive(Debug, Clone, Default)]
pub struct QuestionGroups {
    groups: Vec<QuestionGroup>,
}

impl QuestionGroups {
    /// Group rows by question_id, keeping the order in which ids first appear
    pub fn from_rows(rows: Vec<ResponseRow>) -> Self {
        let mut groups: Vec<QuestionGroup> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for row in rows {
            match positions.get(&row.question_id) {
                Some(&pos) => groups[pos].rows.push(row),
                None => {
                    positions.insert(row.question_id.clone(), groups.len());
                    groups.push(QuestionGroup {
                        question_id: row.question_id.clone(),
                        rows: vec![row],
                    });
                }
            }
        }

        tracing::debug!(groups = groups.len(), "Grouped responses by question");
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QuestionGroup> {
        self.groups.get(index)
    }

    /// Total number of response rows across all groups
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }
}

impl Index<usize> for QuestionGroups {
    type Output = QuestionGroup;

    fn index(&self, index: usize) -> &QuestionGroup {
        &self.groups[index]
    }
}
