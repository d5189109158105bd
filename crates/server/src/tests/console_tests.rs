use super::*;

use std::io::Cursor;

fn console(delay_ms: u64) -> (ControlConsole, Arc<ControlState>) {
    let control = Arc::new(ControlState::with_delay(delay_ms));
    (ControlConsole::new(Arc::clone(&control), 500), control)
}

fn run_script(console: &ControlConsole, script: &str) -> (ConsoleExit, String) {
    let mut output = Vec::new();
    let exit = console
        .run(Cursor::new(script.as_bytes().to_vec()), &mut output)
        .expect("console run");
    (exit, String::from_utf8(output).expect("utf8"))
}

#[test]
fn parses_the_four_commands() {
    assert_eq!(
        "1".parse::<ConsoleCommand>(),
        Ok(ConsoleCommand::Adjust(Adjustment::IncreaseDelay))
    );
    assert_eq!(
        "2\n".parse::<ConsoleCommand>(),
        Ok(ConsoleCommand::Adjust(Adjustment::DecreaseDelay))
    );
    assert_eq!(
        " 3 ".parse::<ConsoleCommand>(),
        Ok(ConsoleCommand::Adjust(Adjustment::ToggleErrorMode))
    );
    assert_eq!("4".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Exit));
    assert_eq!(
        "5".parse::<ConsoleCommand>(),
        Err(CommandError::InvalidOption("5".into()))
    );
    assert!("".parse::<ConsoleCommand>().is_err());
    assert!("11".parse::<ConsoleCommand>().is_err());
}

#[test]
fn commands_mutate_shared_state() {
    let (console, control) = console(2000);
    let (exit, _) = run_script(&console, "1\n1\n2\n3\n4\n");

    assert_eq!(exit, ConsoleExit::Requested);
    assert_eq!(control.delay(), 2500);
    assert!(control.is_error_mode());
}

#[test]
fn decrease_clamps_at_zero_from_console() {
    let (console, control) = console(200);
    run_script(&console, "2\n2\n4\n");
    assert_eq!(control.delay(), 0);
}

#[test]
fn menu_reflects_state_after_each_command() {
    let (console, _control) = console(2000);
    let (_, output) = run_script(&console, "1\n3\n4\n");

    let delays: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with("Current delay:"))
        .collect();
    assert_eq!(
        delays,
        ["Current delay: 2000 ms", "Current delay: 2500 ms", "Current delay: 2500 ms"]
    );

    let modes: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with("Error mode:"))
        .collect();
    assert_eq!(modes, ["Error mode: OFF", "Error mode: OFF", "Error mode: ON"]);
    assert!(output.contains("1. Increase response time (+500ms)"));
    assert!(output.trim_end().ends_with("Exiting..."));
}

#[test]
fn invalid_input_reprompts_without_change() {
    let (console, control) = console(2000);
    let (exit, output) = run_script(&console, "hello\n\n9\n4\n");

    assert_eq!(exit, ConsoleExit::Requested);
    assert_eq!(output.matches("Invalid option. Try again.").count(), 3);
    assert_eq!(output.matches("Choose an option: ").count(), 4);
    assert_eq!(control.snapshot(), ControlSnapshot::default());
}

#[test]
fn end_of_input_stops_console_without_exit() {
    let (console, control) = console(2000);
    let (exit, output) = run_script(&console, "1\n");

    assert_eq!(exit, ConsoleExit::InputClosed);
    assert_eq!(control.delay(), 2500);
    assert!(!output.contains("Exiting..."));
}

#[test]
fn exit_is_terminal_and_ignores_remaining_input() {
    let (console, control) = console(2000);
    let (exit, _) = run_script(&console, "4\n1\n1\n");

    assert_eq!(exit, ConsoleExit::Requested);
    assert_eq!(control.delay(), 2000);
}

#[test]
fn apply_returns_snapshot_after_change() {
    let (console, _control) = console(1000);
    assert_eq!(
        console.apply(Adjustment::ToggleErrorMode),
        ControlSnapshot {
            delay_ms: 1000,
            error_mode: true
        }
    );
    assert_eq!(console.apply(Adjustment::IncreaseDelay).delay_ms, 1500);
    assert_eq!(console.apply(Adjustment::DecreaseDelay).delay_ms, 1000);
}
