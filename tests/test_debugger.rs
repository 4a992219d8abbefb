//! Step controller and breakpoint behavior

#[path = "common/mod.rs"]
mod common;
use common::{interpreter, Brainfuck};
use esorun::debugger::{Directive, ScriptedPrompt, StepController};
use esorun::{Breakpoint, LinearBuffer, SourceBuffer, Tape};
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn stepping_prompts_before_every_step() {
    let (mut interp, _) = interpreter::<Brainfuck>("+++", "");
    let seen = Rc::new(Cell::new(0));
    let counter = Rc::clone(&seen);
    let mut controller = StepController::new(ScriptedPrompt::new([Directive::Step, Directive::Step]))
        .stepping(true)
        .with_observer(move |_| counter.set(counter.get() + 1));

    controller.run(&mut interp).unwrap();

    // two steps, then the exhausted script answers continue
    assert_eq!(seen.get(), 3);
    assert_eq!(controller.prompt().asked(), 3);
    assert!(!controller.is_stepping());
    assert_eq!(interp.state().environment().current_number().unwrap(), 3);
}

#[test]
fn next_breakpoint_stops_again_inside_a_loop() {
    let (mut interp, _) = interpreter::<Brainfuck>("+++[-]", "");
    interp.set_breakpoints([Breakpoint::at(4, 0)]);
    let mut controller = StepController::new(ScriptedPrompt::new([Directive::NextBreakpoint; 3]));

    controller.run(&mut interp).unwrap();

    // once per pass through the loop body
    assert_eq!(controller.prompt().asked(), 3);
    assert_eq!(interp.state().environment().current_number().unwrap(), 0);
}

#[test]
fn continue_drops_breakpoints() {
    let (mut interp, _) = interpreter::<Brainfuck>("+++[-]", "");
    interp.set_breakpoints([Breakpoint::at(4, 0)]);
    let mut controller = StepController::new(ScriptedPrompt::new([Directive::Continue]));

    controller.run(&mut interp).unwrap();

    assert_eq!(controller.prompt().asked(), 1);
    assert!(!interp.has_breakpoints());
}

#[test]
fn one_shot_breakpoint_fires_once() {
    let (mut interp, _) = interpreter::<Brainfuck>("+++[-]", "");
    let once = Breakpoint::<LinearBuffer, Tape>::once(|s| s.source.position().is_at(4, 0));
    interp.set_breakpoints([once]);
    let mut controller = StepController::new(ScriptedPrompt::new([Directive::NextBreakpoint; 3]));

    controller.run(&mut interp).unwrap();

    assert_eq!(controller.prompt().asked(), 1);
}

#[test]
fn installing_breakpoints_replaces_the_set() {
    let (mut interp, _) = interpreter::<Brainfuck>("+++[-]", "");
    interp.set_breakpoints([Breakpoint::at(4, 0)]);
    interp.set_breakpoints([Breakpoint::at(2, 0)]);
    let mut controller = StepController::new(ScriptedPrompt::new([Directive::NextBreakpoint; 3]));

    controller.run(&mut interp).unwrap();

    assert_eq!(controller.prompt().asked(), 1);
    assert!(interp.has_breakpoints());
}
