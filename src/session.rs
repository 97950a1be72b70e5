use crate::commands::{Command, HELP, PanelRef};
use crate::export;
use crate::grouping::{QuestionGroup, QuestionGroups};
use crate::models::Score;
use crate::output::{self, ExportStatus, Notice, OutputFormat, Panel, View};
use crate::review::{Advance, ReviewState};
use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// One reviewer's interactive session over a shared, read-only set of questions
pub struct Session<'a> {
    groups: &'a QuestionGroups,
    state: ReviewState,
    export_path: PathBuf,
    format: OutputFormat,
}

impl<'a> Session<'a> {
    pub fn new(
        groups: &'a QuestionGroups,
        default_score: Score,
        export_path: PathBuf,
        format: OutputFormat,
    ) -> Self {
        Self {
            groups,
            state: ReviewState::new(default_score),
            export_path,
            format,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    /// Read commands line by line until `quit` or end of input,
    /// re-rendering the current question after every action.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        self.render(out)?;
        self.prompt(out)?;

        for line in input.lines() {
            let line = line?;
            match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(Command::Help) => output::write_text(out, HELP, self.format)?,
                Ok(command) => {
                    for notice in self.handle(command) {
                        output::write_notice(out, &notice, self.format)?;
                    }
                    self.render(out)?;
                }
                Err(e) => {
                    output::write_notice(out, &Notice::Error(e.to_string()), self.format)?;
                }
            }
            self.prompt(out)?;
        }

        tracing::info!(
            committed = self.state.committed_count(),
            exported = self.state.export_list().len(),
            "Session ended"
        );
        Ok(())
    }

    /// Apply one action to the review state and report what happened
    pub fn handle(&mut self, command: Command) -> Vec<Notice> {
        match command {
            Command::Previous => {
                if self.state.go_previous() {
                    vec![]
                } else {
                    vec![Notice::Info("Already at the first question.".to_string())]
                }
            }
            Command::Next => {
                if self.state.go_next(self.groups.len()) {
                    vec![]
                } else {
                    vec![Notice::Info("Already at the last question.".to_string())]
                }
            }
            Command::Score { panel, score } => self.score(&panel, score).into_iter().collect(),
            Command::Save => self.save(),
            Command::SaveAll => {
                let newly_saved = self.state.save_all_remaining();
                if newly_saved > 0 {
                    vec![Notice::Success(format!("Saved {} scores!", newly_saved))]
                } else {
                    vec![Notice::Info("No unsaved scores to save.".to_string())]
                }
            }
            Command::Export(path) => vec![self.export(path)],
            Command::Show | Command::Help | Command::Quit => vec![],
        }
    }

    /// Build the view of the current question, initialising its score
    /// controls on first exposure. `None` only when there are no questions.
    pub fn view(&mut self) -> Option<View> {
        let total = self.groups.len();
        let group = self.state.current_group(self.groups)?;
        self.state.init_drafts(group);

        let panels = group
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| Panel {
                number: i + 1,
                llm: row.llm.clone(),
                response: row.response.clone(),
                score: self.state.draft_score_or_init(&group.question_id, &row.llm),
            })
            .collect();

        let index = self.state.current_index();
        Some(View {
            position: index + 1,
            total,
            progress: index as f64 / total as f64,
            question_id: group.question_id.clone(),
            question_text: group.question_text().to_string(),
            panels,
            committed: self.state.is_committed(&group.question_id),
            can_go_previous: self.state.can_go_previous(),
            can_go_next: self.state.can_go_next(total),
            export: ExportStatus {
                entries: self.state.export_list().len(),
                path: self.export_path.display().to_string(),
            },
        })
    }

    fn render<W: Write>(&mut self, out: &mut W) -> Result<()> {
        match self.view() {
            Some(view) => output::write_view(out, &view, self.format),
            None => output::write_notice(
                out,
                &Notice::Warning("No questions found in data.".to_string()),
                self.format,
            ),
        }
    }

    fn prompt<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.format == OutputFormat::Plain {
            write!(out, "> ")?;
        }
        out.flush()?;
        Ok(())
    }

    fn score(&mut self, panel: &PanelRef, score: Score) -> Option<Notice> {
        let Some(group) = self.state.current_group(self.groups) else {
            return Some(Notice::Error("No questions found in data.".to_string()));
        };

        match resolve_panel(group, panel) {
            Some(llm) => {
                self.state.set_draft_score(&group.question_id, llm, score);
                None
            }
            None => Some(Notice::Error(match panel {
                PanelRef::Position(n) => format!(
                    "No response panel {} (this question has {}).",
                    n,
                    group.rows.len()
                ),
                PanelRef::Model(name) => {
                    format!("No response from model '{}' for this question.", name)
                }
            })),
        }
    }

    fn save(&mut self) -> Vec<Notice> {
        match self.state.save_current(self.groups) {
            Ok(outcome) => {
                let mut notices = vec![Notice::Success(format!(
                    "Saved {} scores for question {}!",
                    outcome.saved, outcome.question_id
                ))];
                if outcome.repaired > 0 {
                    notices.push(Notice::Warning(format!(
                        "{} score(s) were missing from the export list and have been added.",
                        outcome.repaired
                    )));
                }
                if outcome.advance == Advance::Finished {
                    notices.push(Notice::Success(
                        "All questions have been scored!".to_string(),
                    ));
                }
                notices
            }
            Err(e) => vec![Notice::Error(e.to_string())],
        }
    }

    fn export(&self, path: Option<PathBuf>) -> Notice {
        let entries = self.state.export_list();
        if entries.is_empty() {
            return Notice::Info("Score some responses to enable downloads".to_string());
        }

        let path = path.unwrap_or_else(|| self.export_path.clone());
        match export::write_scores(entries, &path) {
            Ok(()) => Notice::Success(format!(
                "Exported {} scores to {}",
                entries.len(),
                path.display()
            )),
            Err(e) => Notice::Error(format!("{:#}", e)),
        }
    }
}

/// Model name behind a panel reference, if the current question has it
fn resolve_panel<'g>(group: &'g QuestionGroup, panel: &PanelRef) -> Option<&'g str> {
    match panel {
        PanelRef::Position(n) => {
            let name = n.to_string();
            group
                .rows
                .iter()
                .find(|row| row.llm == name)
                .or_else(|| n.checked_sub(1).and_then(|i| group.rows.get(i)))
                .map(|row| row.llm.as_str())
        }
        PanelRef::Model(name) => group
            .rows
            .iter()
            .find(|row| row.llm == *name)
            .map(|row| row.llm.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResponseRow;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn row(question_id: &str, llm: &str, response: &str) -> ResponseRow {
        ResponseRow {
            question_id: question_id.to_string(),
            question_text: format!("question {}", question_id),
            llm: llm.to_string(),
            response: response.to_string(),
        }
    }

    fn example_groups() -> QuestionGroups {
        QuestionGroups::from_rows(vec![
            row("Q1", "A", "foo"),
            row("Q1", "B", "bar"),
            row("Q2", "A", "baz"),
        ])
    }

    fn run_script(session: &mut Session<'_>, script: &str) -> String {
        let mut out = Vec::new();
        session.run(Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_view_initialises_default_scores() {
        let groups = example_groups();
        let mut session = Session::new(
            &groups,
            Score::new(2).unwrap(),
            PathBuf::from("scores.csv"),
            OutputFormat::Plain,
        );

        let view = session.view().unwrap();
        assert_eq!(view.position, 1);
        assert_eq!(view.total, 2);
        assert_eq!(view.panels.len(), 2);
        assert!(view.panels.iter().all(|p| p.score.value() == 2));
        assert_eq!(session.state().drafts_for("Q1").len(), 2);
        assert!(session.state().drafts_for("Q2").is_empty());
    }

    #[test]
    fn test_score_by_unknown_panel() {
        let groups = example_groups();
        let mut session = Session::new(
            &groups,
            Score::DEFAULT,
            PathBuf::from("scores.csv"),
            OutputFormat::Plain,
        );

        let notices = session.handle(Command::Score {
            panel: PanelRef::Position(3),
            score: Score::new(5).unwrap(),
        });
        assert_eq!(
            notices,
            vec![Notice::Error(
                "No response panel 3 (this question has 2).".to_string()
            )]
        );

        let notices = session.handle(Command::Score {
            panel: PanelRef::Model("C".to_string()),
            score: Score::new(5).unwrap(),
        });
        assert_eq!(
            notices,
            vec![Notice::Error(
                "No response from model 'C' for this question.".to_string()
            )]
        );
        assert!(session.state().drafts_for("Q1").is_empty());
    }

    #[test]
    fn test_numeric_model_name_wins_over_panel_number() {
        let groups = QuestionGroups::from_rows(vec![row("Q1", "2", "two"), row("Q1", "1", "one")]);
        let mut session = Session::new(
            &groups,
            Score::DEFAULT,
            PathBuf::from("scores.csv"),
            OutputFormat::Plain,
        );
        session.view();

        assert!(session.handle(Command::parse("score 2 5").unwrap()).is_empty());
        assert_eq!(session.state().draft_score("Q1", "2"), Some(Score::new(5).unwrap()));
        assert_eq!(session.state().draft_score("Q1", "1"), Some(Score::DEFAULT));

        // no model called "3", so the number still addresses a panel
        let groups = example_groups();
        let mut session = Session::new(
            &groups,
            Score::DEFAULT,
            PathBuf::from("scores.csv"),
            OutputFormat::Plain,
        );
        session.handle(Command::parse("score 2 1").unwrap());
        assert_eq!(session.state().draft_score("Q1", "B"), Some(Score::new(1).unwrap()));
    }

    #[test]
    fn test_navigation_notices_at_bounds() {
        let groups = example_groups();
        let mut session = Session::new(
            &groups,
            Score::DEFAULT,
            PathBuf::from("scores.csv"),
            OutputFormat::Plain,
        );

        assert_eq!(
            session.handle(Command::Previous),
            vec![Notice::Info("Already at the first question.".to_string())]
        );
        assert!(session.handle(Command::Next).is_empty());
        assert_eq!(
            session.handle(Command::Next),
            vec![Notice::Info("Already at the last question.".to_string())]
        );
    }

    #[test]
    fn test_export_without_scores() {
        let groups = example_groups();
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let mut session =
            Session::new(&groups, Score::DEFAULT, path.clone(), OutputFormat::Plain);

        assert_eq!(
            session.handle(Command::Export(None)),
            vec![Notice::Info(
                "Score some responses to enable downloads".to_string()
            )]
        );
        assert!(!path.exists());
    }

    #[test]
    fn test_example_scenario_end_to_end() {
        let groups = example_groups();
        let dir = tempdir().unwrap();
        let path = dir.path().join("llm_scoring_results.csv");
        let mut session =
            Session::new(&groups, Score::DEFAULT, path.clone(), OutputFormat::Plain);

        let text = run_script(
            &mut session,
            "score A 5\nscore 2 2\nsave\nscore A 4\nprev\nsave-all\nexport\nquit\nnext\n",
        );

        assert!(text.contains("Saved 2 scores for question Q1!"));
        assert!(text.contains("Question ID: Q2"));
        assert!(text.contains("Saved 1 scores!"));
        assert!(text.contains("Exported 3 scores to"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "question_id,llm,score\nQ1,A,5\nQ1,B,2\nQ2,A,4\n");

        // input after quit is ignored
        assert_eq!(session.state().current_index(), 0);
    }

    #[test]
    fn test_update_after_save_does_not_duplicate() {
        let groups = example_groups();
        let mut session = Session::new(
            &groups,
            Score::DEFAULT,
            PathBuf::from("scores.csv"),
            OutputFormat::Plain,
        );

        let text = run_script(&mut session, "save\nprev\nscore B 1\nsave\n");
        assert!(text.contains("save (Update Scores)"));

        let exported: Vec<(String, u8)> = session
            .state()
            .export_list()
            .iter()
            .map(|e| (e.llm.clone(), e.score.value()))
            .collect();
        assert_eq!(
            exported,
            vec![("A".to_string(), 3), ("B".to_string(), 1)]
        );
    }

    #[test]
    fn test_save_on_last_question_reports_completion() {
        let groups = example_groups();
        let mut session = Session::new(
            &groups,
            Score::DEFAULT,
            PathBuf::from("scores.csv"),
            OutputFormat::Plain,
        );

        let text = run_script(&mut session, "next\nsave\n");
        assert!(text.contains("Saved 1 scores for question Q2!"));
        assert!(text.contains("All questions have been scored!"));
    }

    #[test]
    fn test_save_all_with_nothing_pending() {
        let groups = example_groups();
        let mut session = Session::new(
            &groups,
            Score::DEFAULT,
            PathBuf::from("scores.csv"),
            OutputFormat::Plain,
        );

        let text = run_script(&mut session, "save\nnext\nprev\n");
        assert!(text.contains("Question ID: Q2"));

        // Q1 committed, Q2 rendered with defaults and still pending
        assert_eq!(
            session.handle(Command::SaveAll),
            vec![Notice::Success("Saved 1 scores!".to_string())]
        );
        assert_eq!(
            session.handle(Command::SaveAll),
            vec![Notice::Info("No unsaved scores to save.".to_string())]
        );
    }

    #[test]
    fn test_bad_input_leaves_state_unchanged() {
        let groups = example_groups();
        let mut session = Session::new(
            &groups,
            Score::DEFAULT,
            PathBuf::from("scores.csv"),
            OutputFormat::Plain,
        );

        let text = run_script(&mut session, "score A 7\nfly\nhelp\n");
        assert!(text.contains("Score must be between 1 and 5, got 7"));
        assert!(text.contains("Unknown command 'fly'"));
        assert!(text.contains("Commands:"));
        assert_eq!(session.state().draft_score("Q1", "A"), Some(Score::DEFAULT));
    }

    #[test]
    fn test_json_session_output() {
        let groups = example_groups();
        let mut session = Session::new(
            &groups,
            Score::DEFAULT,
            PathBuf::from("scores.csv"),
            OutputFormat::Json,
        );

        let text = run_script(&mut session, "save\n");
        let events: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["view"]["question_id"], "Q1");
        assert_eq!(events[1]["notice"]["level"], "success");
        assert_eq!(events[2]["view"]["question_id"], "Q2");
        assert_eq!(events[2]["view"]["export"]["entries"], 2);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let groups = example_groups();
        let mut first = Session::new(
            &groups,
            Score::DEFAULT,
            PathBuf::from("a.csv"),
            OutputFormat::Plain,
        );
        let mut second = Session::new(
            &groups,
            Score::DEFAULT,
            PathBuf::from("b.csv"),
            OutputFormat::Plain,
        );

        first.view();
        first.handle(Command::Save);

        assert_eq!(first.state().export_list().len(), 2);
        assert!(second.state().export_list().is_empty());
        assert_eq!(second.view().unwrap().question_id, "Q1");
    }
}
