//! End-to-end programs for each bundled language

#[path = "common/mod.rs"]
mod common;
use common::{interpreter, numbers, run, Befunge93, Brainfuck, EngineError, False, Outcome};

#[test]
fn befunge_hello_world() {
    let program = "0\"!dlroW ,olleH\">:#,_@";
    assert_eq!(run::<Befunge93>(program, "").unwrap(), "Hello, World!");
}

#[test]
fn befunge_countdown_loop() {
    // prints 5 down to 1, then halts on zero
    let program = "5>:.1-:v\n ^     _@";
    assert_eq!(run::<Befunge93>(program, "").unwrap(), "54321");
}

#[test]
fn befunge_self_modification() {
    // writes '@' over the cell the pointer reaches next
    let program = "\"@\"70p 1.";
    assert_eq!(run::<Befunge93>(program, "").unwrap(), "");
}

#[test]
fn befunge_division_by_zero_is_an_error() {
    assert!(matches!(
        run::<Befunge93>("10/@", ""),
        Err(EngineError::Arithmetic(_))
    ));
}

#[test]
fn brainfuck_hello_world() {
    let program = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
    assert_eq!(run::<Brainfuck>(program, "").unwrap(), "Hello World!\n");
}

#[test]
fn brainfuck_reverse_input() {
    assert_eq!(run::<Brainfuck>(">,[>,]<[.<]", "abc").unwrap(), "cba");
}

#[test]
fn brainfuck_multiline_source_with_comments() {
    let program = ">++++++++[<++++++++>-] cell zero is 64\n+++ three letters\n[<+.>-]";
    assert_eq!(run::<Brainfuck>(program, "").unwrap(), "ABC");
}

#[test]
fn false_factorial() {
    let program = "[$1=~[$1-f;!*]?]f: 5f;!.";
    assert_eq!(run::<False>(program, "").unwrap(), "120");
}

#[test]
fn false_prints_strings_and_numbers() {
    let program = "\"sum=\" 2 3+. 10,";
    assert_eq!(run::<False>(program, "").unwrap(), "sum=5\n");
}

#[test]
fn false_leaves_results_on_stack() {
    let (mut interp, _) = interpreter::<False>("1 2 3 4+", "");
    assert_eq!(interp.execute().unwrap(), Outcome::Complete);
    assert_eq!(numbers(&interp), vec![7, 2, 1]);
}

#[test]
fn false_echoes_input_until_eof() {
    let program = "[^$1_=~][,]#%";
    assert_eq!(run::<False>(program, "hey").unwrap(), "hey");
}
