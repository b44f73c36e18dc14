// End-to-end tests: source → image → program → execution

use brainpix::alphabet::{lex, Instruction};
use brainpix::carrier::Carrier;
use brainpix::codec::{Codec, DeltaTable, Pixel};
use brainpix::config::Config;
use brainpix::interpreter::{
    Bracket, Engine, EngineConfig, HaltReason, LoadError, Program, RuntimeError, Tape,
};
use brainpix::snapshot::{Ending, History};
use brainpix::{load_embedded_program, Error};
use std::path::Path;

const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

fn run(program: &Program, input: &[u8]) -> (Vec<u8>, u64) {
    let mut input = input;
    let mut output = Vec::new();
    let summary = Engine::new(program, EngineConfig::default())
        .run(&mut input, &mut output)
        .expect("execution failed");
    (output, summary.steps)
}

fn embed(source: &str, table: &DeltaTable) -> Carrier {
    let pixels = (0..48 * 48u32)
        .map(|i| Pixel::new((i % 251) as u8, (i / 7) as u8, (i * 13) as u8, 255))
        .collect();
    let mut carrier = Carrier::new(48, 48, pixels).unwrap();
    Codec::new(table)
        .inject(&mut carrier, 1, &lex(source))
        .expect("program should fit");
    carrier
}

#[test]
fn test_increment_then_output() {
    let program = Program::load(&[
        Instruction::Increment,
        Instruction::Increment,
        Instruction::Increment,
        Instruction::Increment,
        Instruction::Increment,
        Instruction::Output,
        Instruction::EndOfProgram,
    ])
    .unwrap();

    let (output, steps) = run(&program, b"");
    assert_eq!(output, vec![0x05]);
    assert_eq!(steps, 6);
}

#[test]
fn test_clear_loop_from_three() {
    let program = Program::load(&lex("[-]")).unwrap();
    let mut engine =
        Engine::with_tape(&program, EngineConfig::default(), Tape::from_cells(vec![3]));

    let summary = engine.run(&mut &b""[..], &mut Vec::new()).unwrap();
    assert_eq!(summary.halted_by, HaltReason::EndOfProgram);
    assert_eq!(engine.tape().get(0), 0);
    // '[' once, then '-' and ']' per body execution
    assert_eq!((summary.steps - 1) / 2, 3);
}

#[test]
fn test_bracket_pairs() {
    assert_eq!(
        Program::load(&lex("[")),
        Err(LoadError::UnmatchedBracket {
            position: 0,
            bracket: Bracket::Open,
        })
    );

    let pair = Program::load(&lex("[]")).unwrap();
    assert_eq!(pair.jump_target(0), Some(1));
    assert_eq!(pair.jump_target(1), Some(0));

    let nested = Program::load(&lex("[[]]")).unwrap();
    assert_eq!(nested.jump_target(0), Some(3));
    assert_eq!(nested.jump_target(1), Some(2));
    assert_eq!(nested.jump_target(2), Some(1));
    assert_eq!(nested.jump_target(3), Some(0));
}

#[test]
fn test_hello_world_through_image() {
    let table = DeltaTable::standard();
    let carrier = embed(HELLO_WORLD, &table);

    let program = load_embedded_program(&table, &carrier, 1).unwrap();
    let (output, _) = run(&program, b"");
    assert_eq!(output, b"Hello World!\n");
}

#[test]
fn test_cat_through_image() {
    let table = DeltaTable::standard();
    let carrier = embed(",[.,]", &table);

    let program = load_embedded_program(&table, &carrier, 1).unwrap();
    let (output, _) = run(&program, b"pixels");
    assert_eq!(output, b"pixels");
}

#[test]
fn test_wrong_origin_is_a_data_error() {
    let table = DeltaTable::standard();
    let carrier = Carrier::filled(8, 8, Pixel::new(40, 40, 40, 255));

    let err = load_embedded_program(&table, &carrier, 1).unwrap_err();
    assert!(matches!(err, Error::Codec(_)));
    assert!(err.is_data_error());
}

#[test]
fn test_unbalanced_embedded_program_is_a_data_error() {
    let table = DeltaTable::standard();
    let carrier = embed("+[>+", &table);

    let err = load_embedded_program(&table, &carrier, 1).unwrap_err();
    assert!(matches!(
        err,
        Error::Load(LoadError::UnmatchedBracket {
            position: 1,
            bracket: Bracket::Open,
        })
    ));
    assert!(err.is_data_error());
}

#[test]
fn test_step_limit_stops_infinite_loop() {
    let program = Program::load(&lex("+[]")).unwrap();
    let config = EngineConfig {
        step_limit: Some(1000),
        ..EngineConfig::default()
    };

    let result = Engine::new(&program, config).run(&mut &b""[..], &mut Vec::new());
    match result {
        Err(err @ RuntimeError::StepLimitExceeded { limit: 1000 }) => assert!(err.is_fuse()),
        other => panic!("expected step limit, got {:?}", other),
    }
}

#[test]
fn test_custom_table_from_config() {
    let config = Config::from_toml(
        r#"
        [[deltas]]
        instruction = "move_right"
        vector = [1, 0, 0, 0]
        [[deltas]]
        instruction = "move_left"
        vector = [2, 0, 0, 0]
        [[deltas]]
        instruction = "increment"
        vector = [3, 0, 0, 0]
        [[deltas]]
        instruction = "decrement"
        vector = [4, 0, 0, 0]
        [[deltas]]
        instruction = "output"
        vector = [5, 0, 0, 0]
        [[deltas]]
        instruction = "input"
        vector = [6, 0, 0, 0]
        [[deltas]]
        instruction = "loop_open"
        vector = [7, 0, 0, 0]
        [[deltas]]
        instruction = "loop_close"
        vector = [8, 0, 0, 0]
        [[deltas]]
        instruction = "end_of_program"
        vector = [9, 0, 0, 0]
        "#,
        Path::new("brainpix.toml"),
    )
    .unwrap();
    let custom = config.delta_table().unwrap();
    let carrier = embed("+++.", &custom);

    let program = load_embedded_program(&custom, &carrier, 1).unwrap();
    assert_eq!(run(&program, b"").0, vec![3]);

    // The standard table cannot read a stream written with another table
    assert!(load_embedded_program(&DeltaTable::standard(), &carrier, 1).is_err());
}

#[test]
fn test_debug_history_replays_output() {
    let program = Program::load(&lex(HELLO_WORLD)).unwrap();
    let mut history = History::record(program, EngineConfig::default(), b"", 64 << 20);

    assert_eq!(history.ending(), &Ending::Completed);
    assert!(history.output_so_far().is_empty());

    history.jump_to_end();
    assert_eq!(history.output_so_far(), b"Hello World!\n");

    for _ in 0..10 {
        history.step_backward().unwrap();
    }
    let partial = history.output_so_far().len();
    assert!(partial < 13);
    assert!(b"Hello World!\n".starts_with(history.output_so_far()));
}

#[test]
fn test_source_errors_carry_line_and_column() {
    let err = brainpix::load_source("+[>+\n more text ]]").unwrap_err();
    match &err {
        Error::Source { error, location } => {
            assert_eq!(error.position(), 5);
            assert_eq!((location.line, location.column), (2, 13));
        }
        other => panic!("expected a located error, got {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "unmatched ']' at instruction 5 (line 2, column 13)"
    );
    assert!(err.is_data_error());

    let program = brainpix::load_source("comment [ - ] end").unwrap();
    assert_eq!(program.jump_target(0), Some(2));
}
