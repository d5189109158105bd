use std::{
    io::{self, BufRead, Write},
    str::FromStr,
    sync::Arc,
};

use control::ControlState;
use shared::{domain::ControlSnapshot, error::CommandError};
use tracing::{debug, info};

/// A command that changes control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    IncreaseDelay,
    DecreaseDelay,
    ToggleErrorMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Adjust(Adjustment),
    Exit,
}

impl FromStr for ConsoleCommand {
    type Err = CommandError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "1" => Ok(Self::Adjust(Adjustment::IncreaseDelay)),
            "2" => Ok(Self::Adjust(Adjustment::DecreaseDelay)),
            "3" => Ok(Self::Adjust(Adjustment::ToggleErrorMode)),
            "4" => Ok(Self::Exit),
            other => Err(CommandError::InvalidOption(other.to_string())),
        }
    }
}

/// Why the console loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Requested,
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleState {
    Prompting,
    Applying(Adjustment),
    Exiting,
}

pub struct ControlConsole {
    control: Arc<ControlState>,
    step_ms: u64,
}

impl ControlConsole {
    pub fn new(control: Arc<ControlState>, step_ms: u64) -> Self {
        Self { control, step_ms }
    }

    /// Drives the menu until the operator exits or input ends.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> io::Result<ConsoleExit> {
        let mut state = ConsoleState::Prompting;
        let mut line = String::new();

        loop {
            state = match state {
                ConsoleState::Prompting => {
                    self.render_menu(&mut output)?;
                    line.clear();
                    if input.read_line(&mut line)? == 0 {
                        writeln!(output)?;
                        output.flush()?;
                        return Ok(ConsoleExit::InputClosed);
                    }
                    match line.parse::<ConsoleCommand>() {
                        Ok(ConsoleCommand::Exit) => ConsoleState::Exiting,
                        Ok(ConsoleCommand::Adjust(adjustment)) => {
                            ConsoleState::Applying(adjustment)
                        }
                        Err(error) => {
                            debug!(%error, "rejected console input");
                            writeln!(output, "Invalid option. Try again.")?;
                            ConsoleState::Prompting
                        }
                    }
                }
                ConsoleState::Applying(adjustment) => {
                    let snapshot = self.apply(adjustment);
                    info!(
                        ?adjustment,
                        delay_ms = snapshot.delay_ms,
                        error_mode = snapshot.error_mode,
                        "control state updated"
                    );
                    ConsoleState::Prompting
                }
                ConsoleState::Exiting => {
                    writeln!(output, "Exiting...")?;
                    output.flush()?;
                    return Ok(ConsoleExit::Requested);
                }
            };
        }
    }

    fn apply(&self, adjustment: Adjustment) -> ControlSnapshot {
        match adjustment {
            Adjustment::IncreaseDelay => {
                self.control.increase_delay(self.step_ms);
            }
            Adjustment::DecreaseDelay => {
                self.control.decrease_delay(self.step_ms);
            }
            Adjustment::ToggleErrorMode => {
                self.control.toggle_error_mode();
            }
        }
        self.control.snapshot()
    }

    fn render_menu<W: Write>(&self, output: &mut W) -> io::Result<()> {
        let snapshot = self.control.snapshot();
        writeln!(output)?;
        writeln!(output, "--- Control Menu ---")?;
        writeln!(output, "Current delay: {} ms", snapshot.delay_ms)?;
        writeln!(output, "Error mode: {}", snapshot.error_mode_label())?;
        writeln!(output, "------------------------")?;
        writeln!(output, "1. Increase response time (+{}ms)", self.step_ms)?;
        writeln!(output, "2. Decrease response time (-{}ms)", self.step_ms)?;
        writeln!(output, "3. Toggle error mode")?;
        writeln!(output, "4. Exit")?;
        write!(output, "Choose an option: ")?;
        output.flush()
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
