use std::sync::Arc;

use bytelens_core::{CodeObject, Constant, Error};
use bytelens_disasm::{
    disassemble,
    labels::{find_jump_targets, jump_destination},
    linetable::find_line_starts,
    parser::{parse_instructions, InstructionStream},
    ArgValue, Disassembler, DisassemblerConfig, Listing, ListingSink, CPYTHON_38,
};

/// `a = 0` / `while a < 10:` / `print(a)` / `a += 1`
fn while_loop_module() -> CodeObject {
    CodeObject {
        name: "<module>".into(),
        filename: "loop.py".into(),
        first_line: 1,
        code: hex::decode("64005a00650064016b00721e65016500830101006500640237005a00710464035300").unwrap(),
        constants: vec![Constant::Int(0), Constant::Int(10), Constant::Int(1), Constant::None],
        names: vec!["a".into(), "print".into()],
        line_table: vec![4, 1, 8, 1, 8, 1],
        ..CodeObject::default()
    }
}

fn function(name: &str, first_line: i64, constants: Vec<Constant>) -> Arc<CodeObject> {
    // LOAD_CONST 0; RETURN_VALUE
    Arc::new(CodeObject {
        name: name.into(),
        filename: "nested.py".into(),
        first_line,
        code: vec![100, 0, 83, 0],
        constants,
        ..CodeObject::default()
    })
}

#[test]
fn test_full_listing_of_while_loop() {
    let listing = disassemble(&while_loop_module()).unwrap();
    let expected = [
        "1         0 LOAD_CONST               0 (0)",
        "          2 STORE_NAME               0 (a)",
        "",
        "2   >>    4 LOAD_NAME                0 (a)",
        "          6 LOAD_CONST               1 (10)",
        "          8 COMPARE_OP               0 (<)",
        "         10 POP_JUMP_IF_FALSE       30 ",
        "",
        "3        12 LOAD_NAME                1 (print)",
        "         14 LOAD_NAME                0 (a)",
        "         16 CALL_FUNCTION            1 ",
        "         18 POP_TOP                    ",
        "",
        "4        20 LOAD_NAME                0 (a)",
        "         22 LOAD_CONST               2 (1)",
        "         24 INPLACE_ADD                ",
        "         26 STORE_NAME               0 (a)",
        "         28 JUMP_ABSOLUTE            4 ",
        "    >>   30 LOAD_CONST               3 (None)",
        "         32 RETURN_VALUE               ",
    ];
    let rendered = listing.render();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines, expected);
}

#[test]
fn test_decoding_is_deterministic() {
    let unit = while_loop_module();
    let a = parse_instructions(&unit.code, &CPYTHON_38).unwrap();
    let b = parse_instructions(&unit.code, &CPYTHON_38).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), unit.code.len() / 2);
}

#[test]
fn test_no_argument_opcodes_have_no_operand_or_value() {
    let listing = disassemble(&while_loop_module()).unwrap();
    for record in listing.records() {
        if !CPYTHON_38.takes_argument(record.opcode) {
            assert_eq!(record.arg, None);
            assert_eq!(record.value, None);
        }
    }
}

#[test]
fn test_extended_arg_chain_compounds() {
    // EXTENDED_ARG 0x01; EXTENDED_ARG 0x02; BUILD_TUPLE 0x03
    let code = hex::decode("900190026603").unwrap();
    let insts = parse_instructions(&code, &CPYTHON_38).unwrap();
    assert_eq!(insts[2].arg, Some(0x010203));
    assert_ne!(insts[2].arg, Some(0x0203));

    let listing = disassemble(&CodeObject::new("ext", code)).unwrap();
    let last = listing.records().last().unwrap();
    assert_eq!(last.arg, Some(0x010203));
    assert_eq!(last.mnemonic, "BUILD_TUPLE");
}

#[test]
fn test_line_table_with_negative_delta() {
    let unit = CodeObject {
        first_line: 10,
        line_table: vec![0, 0, 4, 1, 6, 0xff],
        ..CodeObject::default()
    };
    let starts = find_line_starts(&unit);
    assert_eq!(starts.into_iter().collect::<Vec<_>>(), vec![(0, 10), (4, 11), (10, 10)]);
}

#[test]
fn test_jump_targets_idempotent_and_stable() {
    let unit = while_loop_module();
    let first = find_jump_targets(&unit, &CPYTHON_38).unwrap();
    let second = find_jump_targets(&unit, &CPYTHON_38).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.as_slice(), &[30, 4]);
}

#[test]
fn test_every_jump_target_is_a_computed_destination() {
    let unit = while_loop_module();
    let targets = find_jump_targets(&unit, &CPYTHON_38).unwrap();
    let destinations: Vec<usize> = InstructionStream::for_unit(&unit, &CPYTHON_38)
        .unwrap()
        .filter_map(|ins| jump_destination(&CPYTHON_38, &ins.unwrap()))
        .collect();
    for target in targets.as_slice() {
        assert!(destinations.contains(target));
    }
}

#[test]
fn test_relative_jump_shows_destination() {
    // ten NOPs, then JUMP_FORWARD 6 at offset 20
    let mut code = [9u8, 0].repeat(10);
    code.extend_from_slice(&[110, 6]);
    code.extend_from_slice(&[9, 0, 9, 0, 9, 0, 83, 0]);
    let listing = disassemble(&CodeObject::new("jump", code)).unwrap();

    let jump = listing.records().find(|r| r.offset == 20).unwrap();
    assert_eq!(jump.value, Some(ArgValue::JumpTarget(28)));
    assert!(jump.to_string().ends_with("(to 28)"));
    assert!(listing.records().find(|r| r.offset == 28).unwrap().is_jump_target);
}

#[test]
fn test_nested_units_follow_parent_in_load_order() {
    let inner = function("inner", 3, vec![Constant::None]);
    let first = function("first", 2, vec![Constant::Code(inner)]);
    let second = function("second", 6, vec![Constant::Int(1)]);
    let module = CodeObject {
        name: "<module>".into(),
        // LOAD_CONST 0..=3, RETURN_VALUE
        code: vec![100, 0, 100, 1, 100, 2, 100, 3, 83, 0],
        constants: vec![
            Constant::Str("A".into()),
            Constant::Code(first),
            Constant::Str("B".into()),
            Constant::Code(second),
        ],
        ..CodeObject::default()
    };

    let listing = disassemble(&module).unwrap();
    let order: Vec<(&str, usize)> = listing
        .sections
        .iter()
        .map(|s| (s.unit.as_str(), s.depth))
        .collect();
    assert_eq!(
        order,
        vec![
            ("<code object <module>, file \"<unknown>\", line 1>", 0),
            ("<code object first, file \"nested.py\", line 2>", 1),
            ("<code object inner, file \"nested.py\", line 3>", 2),
            ("<code object second, file \"nested.py\", line 6>", 1),
        ]
    );
    assert_eq!(listing.sections[0].records.len(), 5);

    let rendered = listing.render();
    assert!(rendered.contains("\nDisassembly of <code object first, file \"nested.py\", line 2>:\n\n"));
    assert!(rendered.contains("(<code object second, file \"nested.py\", line 6>)"));
}

#[test]
fn test_odd_length_rejected() {
    let err = disassemble(&CodeObject::new("odd", vec![100, 0, 83])).unwrap_err();
    assert!(matches!(err, Error::MalformedStream { ref unit, offset: 2, .. } if unit == "odd"));
}

#[test]
fn test_index_out_of_range_is_surfaced() {
    let unit = CodeObject::new("bad", vec![100, 4, 83, 0]);
    let err = disassemble(&unit).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfRange { index: 4, len: 0, offset: 0, .. }));
}

#[test]
fn test_nested_failure_keeps_parent_output() {
    let broken = Arc::new(CodeObject::new("broken", vec![100, 0, 83]));
    let module = CodeObject {
        code: vec![100, 0, 83, 0],
        constants: vec![Constant::Code(broken)],
        ..CodeObject::default()
    };
    let mut listing = Listing::new();
    let err = Disassembler::default().run(&module, &mut listing).unwrap_err();
    assert!(matches!(err, Error::MalformedStream { ref unit, .. } if unit == "broken"));
    assert_eq!(listing.sections.len(), 1);
    assert_eq!(listing.sections[0].records.len(), 2);
}

#[test]
fn test_depth_limit() {
    let leaf = function("leaf", 3, vec![Constant::None]);
    let middle = function("middle", 2, vec![Constant::Code(leaf)]);
    let module = CodeObject {
        code: vec![100, 0, 83, 0],
        constants: vec![Constant::Code(middle)],
        ..CodeObject::default()
    };
    let config = DisassemblerConfig { max_depth: 1, ..DisassemblerConfig::default() };
    let err = Disassembler::new(&CPYTHON_38, config).disassemble(&module).unwrap_err();
    assert_eq!(err, Error::NestingTooDeep { unit: "leaf".into(), max_depth: 1 });
}

#[test]
fn test_recursion_can_be_disabled() {
    let module = CodeObject {
        code: vec![100, 0, 83, 0],
        constants: vec![Constant::Code(function("f", 2, vec![Constant::None]))],
        ..CodeObject::default()
    };
    let config = DisassemblerConfig { recurse_nested: false, ..DisassemblerConfig::default() };
    let listing = Disassembler::new(&CPYTHON_38, config).disassemble(&module).unwrap();
    assert_eq!(listing.sections.len(), 1);
}

#[test]
fn test_non_code_value_rejected_before_decoding() {
    struct Counting(usize);
    impl ListingSink for Counting {
        fn begin_unit(&mut self, _unit: &CodeObject, _depth: usize) {
            self.0 += 1;
        }
        fn record(&mut self, _record: bytelens_disasm::InstructionRecord) {
            self.0 += 1;
        }
    }

    let mut sink = Counting(0);
    let err = Disassembler::default()
        .run_value(&Constant::Str("not code".into()), &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedInput(_)));
    assert_eq!(sink.0, 0);

    let ok = Disassembler::default().run_value(&Constant::Code(function("f", 1, vec![Constant::None])), &mut sink);
    assert!(ok.is_ok());
    assert_eq!(sink.0, 3);
}

#[test]
fn test_shared_sibling_is_disassembled_twice() {
    let shared = function("shared", 2, vec![Constant::None]);
    let module = CodeObject {
        // LOAD_CONST 0; LOAD_CONST 1; RETURN_VALUE
        code: vec![100, 0, 100, 1, 83, 0],
        constants: vec![Constant::Code(Arc::clone(&shared)), Constant::Code(shared)],
        ..CodeObject::default()
    };
    let listing = disassemble(&module).unwrap();
    let depths: Vec<usize> = listing.sections.iter().map(|s| s.depth).collect();
    assert_eq!(depths, vec![0, 1, 1]);
    assert_eq!(listing.sections[1].unit, listing.sections[2].unit);
}
