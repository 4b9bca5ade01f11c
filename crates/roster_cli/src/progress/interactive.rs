use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use roster::aggregate::{AggregateProgress, Category};

/// Spinner and running item count of one category.
struct CategoryState {
    bar: ProgressBar,
    items: usize,
}

/// Interactive progress reporter using indicatif.
///
/// Each category gets its own spinner line; the line is finished with the
/// category's record count, failure or skip reason.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<HashMap<Category, CategoryState>>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(HashMap::new()),
        }
    }

    fn add_bar(&self, category: Category) -> ProgressBar {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(Self::spinner_style());
        bar.set_prefix(format!("{:>13}", category.as_str()));
        bar
    }

    pub fn handle(&self, event: AggregateProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            AggregateProgress::Started { username, tier } => {
                self.multi
                    .println(format!("Aggregating repositories for {username} ({tier})"))
                    .ok();
            }

            AggregateProgress::CategoryStarted { category } => {
                let bar = self.add_bar(category);
                bar.enable_steady_tick(Duration::from_millis(100));
                bar.set_message("fetching...");
                state.insert(category, CategoryState { bar, items: 0 });
            }

            AggregateProgress::FetchedPage {
                category,
                namespace,
                page,
                count,
            } => {
                if let Some(s) = state.get_mut(&category) {
                    s.items += count;
                    s.bar
                        .set_message(format!("{namespace} page {page}, {} items", s.items));
                }
            }

            AggregateProgress::ForkBaseAdded { category, base, .. } => {
                if let Some(s) = state.get(&category) {
                    s.bar.set_message(format!("added upstream {base}"));
                }
            }

            AggregateProgress::CategoryComplete { category, count } => {
                if let Some(s) = state.get(&category) {
                    s.bar.set_style(Self::done_style());
                    s.bar.finish_with_message(format!("{count} repositories"));
                }
            }

            AggregateProgress::CategoryFailed { category, error } => {
                if let Some(s) = state.get(&category) {
                    s.bar.set_style(Self::failed_style());
                    s.bar.finish_with_message(format!("failed: {error}"));
                }
            }

            AggregateProgress::CategorySkipped { category } => {
                let bar = self.add_bar(category);
                bar.set_style(Self::skipped_style());
                bar.finish_with_message("skipped (requires a token)");
            }

            AggregateProgress::Complete {
                owned,
                collaborator_like,
                other,
            } => {
                self.multi
                    .println(format!(
                        "Done: {owned} owned, {collaborator_like} collaborator, {other} other"
                    ))
                    .ok();
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for s in state.values() {
            if !s.bar.is_finished() {
                s.bar.finish();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .expect("Invalid template")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn done_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {msg:.green}")
            .expect("Invalid template")
    }

    fn failed_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {msg:.red}")
            .expect("Invalid template")
    }

    fn skipped_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {msg:.dim}")
            .expect("Invalid template")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
