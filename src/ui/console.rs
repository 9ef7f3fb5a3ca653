//! Line oriented console output

use super::{Phase, Progress, Ui};

/// Prints phases, sheet progress and log lines to stdout
#[derive(Debug, Default)]
pub struct ConsoleUi {
    phase: Option<Phase>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn indicator(phase: &Phase) -> &'static str {
        match phase {
            Phase::Loading => "<",
            Phase::Reading => "*",
            Phase::Writing => "*",
            Phase::Saving => ">",
            Phase::Complete => "+",
        }
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        if self.phase.as_ref() == Some(&phase) {
            return;
        }
        println!("{} {}", Self::indicator(&phase), phase);
        self.phase = Some(phase);
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        let progress = Progress::new(current, total, label);
        println!(
            "  [{:>3.0}%] {}",
            progress.ratio() * 100.0,
            progress.label
        );
    }

    fn log(&mut self, message: impl Into<String>) {
        println!("  {}", message.into());
    }
}
