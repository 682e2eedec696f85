use expect_test::expect;

use crate::{FieldError, FieldKind, MAX_PERMUTATIONS, SchemaError, load};

const LC3: &str = include_str!("../../../res/encodings.json");

fn with_instruction(enc: &str) -> String {
    format!(
        r#"[
            {{ "type": "REGS", "data": {{
                "reglist": ["R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7"]
            }} }},
            {{ "type": "INST", "data": {{ "label": "test", "enc": [{enc}] }} }}
        ]"#
    )
}

#[track_caller]
fn field_error(enc: &str) -> (usize, FieldError) {
    match load(&with_instruction(enc)) {
        Err(SchemaError::Field { index, error, .. }) => (index, error),
        other => panic!("expected a field error, found {other:?}"),
    }
}

#[test]
fn lc3_loads() {
    let schema = load(LC3).unwrap();

    assert_eq!(schema.width, 16);
    assert_eq!(schema.hex_digits(), 4);
    assert_eq!(schema.registers.len(), 8);
    assert_eq!(schema.instructions.len(), 31);

    let total: u128 = schema.instructions.iter().map(|it| it.permutations()).sum();
    assert_eq!(total, 40279);

    for inst in &schema.instructions {
        assert_eq!(inst.mask(), 0xffff, "{}", inst.label);
    }
}

#[test]
fn condition_code_flags() {
    let schema = load(LC3).unwrap();
    let setcc = |label: &str| {
        schema.instructions.iter().find(|it| it.label == label).map(|it| it.setcc)
    };

    assert_eq!(setcc("add"), Some(true));
    assert_eq!(setcc("ldr"), Some(true));
    assert_eq!(setcc("st"), Some(false));
    assert_eq!(setcc("jmp"), Some(false));
}

#[test]
fn fields_sorted_by_display_position() {
    let schema = load(LC3).unwrap();
    let add = &schema.instructions[0];

    let order: Vec<_> = add.fields.iter().map(|it| (it.kind, it.hi, it.lo, it.display)).collect();

    expect![[r#"
        [
            (
                Opcode,
                15,
                12,
                None,
            ),
            (
                Fixed,
                5,
                3,
                None,
            ),
            (
                Register,
                11,
                9,
                Some(
                    0,
                ),
            ),
            (
                Register,
                8,
                6,
                Some(
                    1,
                ),
            ),
            (
                Register,
                2,
                0,
                Some(
                    2,
                ),
            ),
        ]
    "#]]
    .assert_debug_eq(&order);
}

#[test]
fn display_order_is_independent_of_bit_order() {
    let schema = load(&with_instruction(
        r#"
        { "type": "OPCODE", "hi": 15, "lo": 12, "data": { "value": "1010" } },
        { "type": "IMM", "hi": 11, "lo": 3, "data": { "pos": 1 } },
        { "type": "REG", "hi": 2, "lo": 0, "data": { "pos": 0 } }
        "#,
    ))
    .unwrap();

    let inst = &schema.instructions[0];
    let kinds: Vec<_> = inst.fields.iter().map(|it| it.kind).collect();
    assert_eq!(kinds, [FieldKind::Opcode, FieldKind::Register, FieldKind::Immediate]);

    assert_eq!(inst.fields[2].domain, -256..=255);
    assert_eq!(inst.fields[1].domain, -4..=3);
    assert_eq!(inst.fields[0].domain, 0b1010..=0b1010);
}

#[test]
fn decode() {
    let schema = load(LC3).unwrap();
    let registers = &schema.registers;

    let add_imm = &schema.instructions[1];
    assert_eq!(add_imm.decode(0x1261, registers).as_deref(), Some("add R1 R1 1"));
    assert_eq!(add_imm.decode(0x127f, registers).as_deref(), Some("add R1 R1 -1"));
    // register form.
    assert_eq!(add_imm.decode(0x1042, registers), None);
    // outside of the instruction.
    assert_eq!(add_imm.decode(0x1_1261, registers), None);

    let br = schema.instructions.iter().find(|it| it.label == "brz").unwrap();
    assert_eq!(br.decode(0x05ff, registers).as_deref(), Some("brz -1"));
    assert_eq!(br.decode(0x0dff, registers), None);
}

#[test]
fn no_config_defaults_width() {
    let schema = load(&with_instruction(
        r#"{ "type": "FIXED", "hi": 15, "lo": 0, "data": { "value": "0000000000000000" } }"#,
    ))
    .unwrap();

    assert_eq!(schema.width, 16);
    assert_eq!(schema.instructions[0].permutations(), 1);
    assert!(!schema.instructions[0].setcc);
}

#[test]
fn top_level_errors() {
    let err = load(r#"[{ "type": "INST", "data": { "label": "rti", "enc": [] } }]"#).unwrap_err();
    expect!["schema has no register list"].assert_eq(&err.to_string());

    let err = load(
        r#"[
            { "type": "REGS", "data": { "reglist": ["R0"] } },
            { "type": "REGS", "data": { "reglist": ["R0"] } }
        ]"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateRegisters));

    let err = load(
        r#"[
            { "type": "CONF", "data": { "width": 0 } },
            { "type": "REGS", "data": { "reglist": ["R0"] } }
        ]"#,
    )
    .unwrap_err();
    expect!["invalid instruction width 0 (expected 1..=64)"].assert_eq(&err.to_string());

    let err = load(
        r#"[
            { "type": "CONF", "data": { "width": 16 } },
            { "type": "REGS", "data": { "reglist": ["R0"] } },
            { "type": "CONF", "data": { "width": 32 } }
        ]"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateConfig));
    expect!["schema configures the instruction width more than once"].assert_eq(&err.to_string());

    let err = load(r#"[{ "type": "ALIAS", "data": {} }]"#).unwrap_err();
    assert!(matches!(err, SchemaError::Json(_)));

    let err = load(
        r#"[
            { "type": "REGS", "data": { "reglist": ["R0"] } },
            { "type": "INST", "data": { "label": "x", "enc": [
                { "type": "WIDE", "hi": 15, "lo": 0 }
            ] } }
        ]"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::Json(_)));
}

#[test]
fn field_errors() {
    let (index, error) = field_error(
        r#"
        { "type": "OPCODE", "hi": 15, "lo": 12, "data": { "value": "0001" } },
        { "type": "IMM", "hi": 3, "lo": 11, "data": { "pos": 0 } }
        "#,
    );
    assert_eq!((index, error), (1, FieldError::Reversed { hi: 3, lo: 11 }));

    let (_, error) =
        field_error(r#"{ "type": "OPCODE", "hi": 16, "lo": 12, "data": { "value": "00001" } }"#);
    assert_eq!(error, FieldError::OutOfRange { hi: 16, width: 16 });

    let (_, error) = field_error(r#"{ "type": "OPCODE", "hi": 15, "lo": 12, "data": {} }"#);
    assert_eq!(error, FieldError::MissingValue);

    let (_, error) =
        field_error(r#"{ "type": "OPCODE", "hi": 15, "lo": 12, "data": { "value": "001" } }"#);
    assert_eq!(error, FieldError::InvalidValue { value: "001".to_owned(), width: 4 });

    let (_, error) =
        field_error(r#"{ "type": "FIXED", "hi": 15, "lo": 12, "data": { "value": "0a01" } }"#);
    assert_eq!(error, FieldError::InvalidValue { value: "0a01".to_owned(), width: 4 });

    let (_, error) = field_error(r#"{ "type": "REG", "hi": 15, "lo": 12, "data": {} }"#);
    assert_eq!(error, FieldError::MissingPosition);

    let (_, error) = field_error(r#"{ "type": "REG", "hi": 15, "lo": 12, "data": { "pos": 0 } }"#);
    assert_eq!(error, FieldError::TooFewRegisters { width: 4, registers: 8 });
}

#[test]
fn operands_too_wide() {
    let err = load(
        r#"[
            { "type": "CONF", "data": { "width": 64 } },
            { "type": "REGS", "data": { "reglist": ["R0"] } },
            { "type": "INST", "data": { "label": "movi", "enc": [
                { "type": "OPCODE", "hi": 63, "lo": 56, "data": { "value": "00000001" } },
                { "type": "IMM", "hi": 55, "lo": 0, "data": { "pos": 0 } }
            ] } }
        ]"#,
    )
    .unwrap_err();

    let SchemaError::Field { index, error, .. } = &err else {
        panic!("expected a field error, found {err:?}");
    };
    assert_eq!((*index, error), (1, &FieldError::TooWide(56)));
    expect!["`movi` field 1: 56 bit operands are too wide to enumerate"]
        .assert_eq(&err.to_string());
}

#[test]
fn too_many_permutations() {
    let err = load(
        r#"[
            { "type": "CONF", "data": { "width": 64 } },
            { "type": "REGS", "data": { "reglist": ["R0"] } },
            { "type": "INST", "data": { "label": "pair", "enc": [
                { "type": "IMM", "hi": 63, "lo": 32, "data": { "pos": 0 } },
                { "type": "IMM", "hi": 31, "lo": 0, "data": { "pos": 1 } }
            ] } }
        ]"#,
    )
    .unwrap_err();

    let SchemaError::TooManyPermutations { label, count } = &err else {
        panic!("expected too many permutations, found {err:?}");
    };
    assert_eq!(label, "pair");
    assert_eq!(*count, 1 << 64);
    assert!(*count > MAX_PERMUTATIONS);

    // right at the limit still loads.
    let schema = load(
        r#"[
            { "type": "CONF", "data": { "width": 28 } },
            { "type": "REGS", "data": { "reglist": ["R0"] } },
            { "type": "INST", "data": { "label": "wide", "enc": [
                { "type": "IMM", "hi": 27, "lo": 0, "data": { "pos": 0 } }
            ] } }
        ]"#,
    )
    .unwrap();
    assert_eq!(schema.instructions[0].permutations(), MAX_PERMUTATIONS);
}

#[test]
fn layout_errors() {
    let (index, error) = field_error(
        r#"
        { "type": "OPCODE", "hi": 15, "lo": 12, "data": { "value": "0001" } },
        { "type": "IMM", "hi": 12, "lo": 0, "data": { "pos": 0 } }
        "#,
    );
    assert_eq!((index, error), (1, FieldError::Overlap(12)));

    let (index, error) = field_error(
        r#"
        { "type": "REG", "hi": 15, "lo": 13, "data": { "pos": 0 } },
        { "type": "REG", "hi": 12, "lo": 10, "data": { "pos": 0 } }
        "#,
    );
    assert_eq!((index, error), (1, FieldError::DuplicatePosition(0)));

    let err = load(&with_instruction(
        r#"
        { "type": "OPCODE", "hi": 15, "lo": 12, "data": { "value": "0001" } },
        { "type": "IMM", "hi": 11, "lo": 1, "data": { "pos": 0 } }
        "#,
    ))
    .unwrap_err();
    expect!["`test` doesn't encode bit 0"].assert_eq(&err.to_string());

    let err = load(&with_instruction(
        r#"{ "type": "OPCODE", "hi": 15, "lo": 12, "data": { "value": "001" } }"#,
    ))
    .unwrap_err();
    expect!["`test` field 0: `001` isn't a 4 bit binary literal"].assert_eq(&err.to_string());
}
