use crate::{parse, ParseErrorKind, PipeArgument};

#[test]
fn positions_are_byte_exact() {
    let src = "hello {{ .Name }} you are {{ .Age }} years old";
    let parsed = parse(src, "test.tmpl").expect("parse");
    let block = &parsed.blocks[0];
    assert_eq!(block.variables.len(), 2);
    for variable in &block.variables {
        let pos = &variable.position;
        assert_eq!(&src[pos.offset..pos.end_offset()], pos.text);
    }
    assert_eq!(block.variables[0].name, "Name");
    assert_eq!(block.variables[0].position.text, ".Name");
    assert_eq!(block.variables[0].position.offset, 9);
    assert_eq!(block.variables[1].name, "Age");
    assert_eq!(block.variables[1].position.offset, 29);
}

#[test]
fn dotted_chain_is_one_occurrence() {
    let src = "{{ .Address.Street.Number }}";
    let parsed = parse(src, "test.tmpl").expect("parse");
    let block = &parsed.blocks[0];
    assert_eq!(block.variables.len(), 1);
    assert_eq!(block.variables[0].name, "Address.Street.Number");
    assert_eq!(block.variables[0].position.text, ".Address.Street.Number");
}

#[test]
fn type_hint_binds_to_block() {
    let src = "{{/*gotype: example.com/app/models.User*/}}\n{{ .Name }}";
    let parsed = parse(src, "user.tmpl").expect("parse");
    let hint = parsed.blocks[0].type_hint.as_ref().expect("hint");
    assert_eq!(hint.type_path, "example.com/app/models.User");
    assert_eq!(
        &src[hint.position.offset..hint.position.offset + hint.position.text.len()],
        "example.com/app/models.User"
    );
}

#[test]
fn duplicate_type_hint_fails_the_parse() {
    let src = "{{/*gotype: example.com/a.T*/}}{{/*gotype: example.com/b.U*/}}";
    let err = parse(src, "test.tmpl").expect_err("duplicate hint");
    assert_eq!(err.kind, ParseErrorKind::DuplicateTypeHint);
}

#[test]
fn hints_in_separate_blocks_are_fine() {
    let src = concat!(
        "{{/*gotype: example.com/a.T*/}}\n",
        "{{define \"footer\"}}{{/*gotype: example.com/b.U*/}}{{ .Year }}{{end}}\n",
    );
    let parsed = parse(src, "test.tmpl").expect("parse");
    assert_eq!(parsed.blocks.len(), 2);
    assert!(parsed.blocks[0].type_hint.is_some());
    assert_eq!(parsed.blocks[1].name, "footer");
    assert!(parsed.blocks[1].type_hint.is_some());
    assert_eq!(parsed.blocks[1].variables[0].name, "Year");
}

#[test]
fn type_hint_without_import_path_prefix_is_malformed() {
    for src in [
        "{{/*gotype: User*/}}",
        "{{/*gotype: invalid.Type*/}}",
        "{{/*gotype: .User*/}}",
    ] {
        let err = parse(src, "test.tmpl").expect_err("malformed hint");
        assert!(
            matches!(err.kind, ParseErrorKind::MalformedTypeHint(_)),
            "{src}: {:?}",
            err.kind
        );
    }
}

#[test]
fn unclosed_action_aborts() {
    let err = parse("text {{ .Name ", "test.tmpl").expect_err("unclosed");
    assert_eq!(err.kind, ParseErrorKind::UnclosedAction);
}

#[test]
fn unmatched_end_aborts() {
    let err = parse("{{ .A }}{{end}}", "test.tmpl").expect_err("unmatched end");
    assert_eq!(err.kind, ParseErrorKind::UnmatchedEnd);
}

#[test]
fn missing_end_aborts() {
    let err = parse("{{range .Items}}{{ .Name }}", "test.tmpl").expect_err("missing end");
    assert_eq!(err.kind, ParseErrorKind::UnclosedBlock);
}

#[test]
fn unterminated_string_aborts() {
    let err = parse("{{ printf \"oops }}", "test.tmpl").expect_err("unterminated");
    assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
}

#[test]
fn range_and_with_record_scope() {
    let src = concat!(
        "{{range .Items}}",
        "{{ .Label }}",
        "{{with .Owner}}{{ .Email }}{{end}}",
        "{{end}}",
        "{{ .Title }}",
    );
    let parsed = parse(src, "test.tmpl").expect("parse");
    let block = &parsed.blocks[0];
    let by_name = |name: &str| {
        block
            .variables
            .iter()
            .find(|v| v.name == name)
            .unwrap_or_else(|| panic!("missing {name}"))
    };
    assert_eq!(by_name("Items").scope, "");
    assert_eq!(by_name("Label").scope, "range");
    assert_eq!(by_name("Owner").scope, "range");
    assert_eq!(by_name("Email").scope, "range.with");
    assert_eq!(by_name("Title").scope, "");
}

#[test]
fn define_resets_the_scope_chain() {
    let src = concat!(
        "{{range .Items}}",
        "{{define \"row\"}}{{ .Name }}{{end}}",
        "{{ .Label }}",
        "{{end}}",
    );
    let parsed = parse(src, "test.tmpl").expect("parse");
    let row = parsed
        .blocks
        .iter()
        .find(|block| block.name == "row")
        .expect("row block");
    assert_eq!(row.variables[0].name, "Name");
    assert_eq!(row.variables[0].scope, "");
    let label = parsed.blocks[0]
        .variables
        .iter()
        .find(|v| v.name == "Label")
        .expect("label");
    assert_eq!(label.scope, "range");
}

#[test]
fn pipeline_threads_the_previous_stage() {
    let src = "{{ .GetJob | upper }}";
    let parsed = parse(src, "test.tmpl").expect("parse");
    let block = &parsed.blocks[0];
    assert_eq!(block.variables.len(), 1);
    assert_eq!(block.functions.len(), 1);
    let upper = &block.functions[0];
    assert_eq!(upper.name, "upper");
    assert_eq!(upper.pipe_arguments.len(), 1);
    match &upper.pipe_arguments[0] {
        PipeArgument::Variable(receiver) => {
            assert_eq!(receiver.name, "GetJob");
            assert_eq!(receiver.position.text, ".GetJob");
        }
        other => panic!("expected variable receiver, got {other:?}"),
    }
    assert_eq!(upper.pipeline_root().name, "GetJob");
}

#[test]
fn literal_arguments_keep_source_order() {
    let src = "{{ .Name | printf \"%s-%d\" 7 }}";
    let parsed = parse(src, "test.tmpl").expect("parse");
    let printf = &parsed.blocks[0].functions[0];
    assert_eq!(printf.name, "printf");
    assert_eq!(printf.pipe_arguments.len(), 3);
    assert!(matches!(
        printf.pipe_arguments[0],
        PipeArgument::Variable(_)
    ));
    assert!(matches!(
        printf.pipe_arguments[1],
        PipeArgument::Literal(crate::LiteralKind::String)
    ));
    assert!(matches!(
        printf.pipe_arguments[2],
        PipeArgument::Literal(crate::LiteralKind::Int)
    ));
    assert_eq!(
        printf.method_arguments,
        vec![crate::LiteralKind::String, crate::LiteralKind::Int]
    );
}

#[test]
fn field_arguments_are_also_recorded_as_variables() {
    let src = "{{ printf \"%s\" .Name }}";
    let parsed = parse(src, "test.tmpl").expect("parse");
    let block = &parsed.blocks[0];
    assert_eq!(block.functions.len(), 1);
    assert_eq!(block.variables.len(), 1);
    assert_eq!(block.variables[0].name, "Name");
}

#[test]
fn declared_locals_are_not_references() {
    let src = "{{range $index, $item := .Items}}{{ $item }}{{end}}";
    let parsed = parse(src, "test.tmpl").expect("parse");
    let block = &parsed.blocks[0];
    let names: Vec<&str> = block.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["Items", "item"]);
    assert_eq!(block.variables[1].scope, "range");
}

#[test]
fn template_invocation_is_a_function_occurrence() {
    let src = "{{template \"header\" .Site}}";
    let parsed = parse(src, "test.tmpl").expect("parse");
    let block = &parsed.blocks[0];
    assert_eq!(block.functions.len(), 1);
    assert_eq!(block.functions[0].name, "template");
    assert_eq!(block.variables[0].name, "Site");
}

#[test]
fn if_contributes_no_scope_segment() {
    let src = "{{if .Ready}}{{ .Name }}{{end}}";
    let parsed = parse(src, "test.tmpl").expect("parse");
    let block = &parsed.blocks[0];
    assert_eq!(block.variables.len(), 2);
    assert_eq!(block.variables[0].name, "Ready");
    assert_eq!(block.variables[1].scope, "");
}

#[test]
fn occurrence_at_picks_the_smallest_covering_span() {
    let src = "{{ .Address.Street }} {{ upper }}";
    let parsed = parse(src, "test.tmpl").expect("parse");
    let hit = parsed.occurrence_at(5).expect("occurrence at cursor");
    assert_eq!(hit.name, "Address.Street");
    let hit = parsed.occurrence_at(26).expect("occurrence at function");
    assert_eq!(hit.name, "upper");
    assert!(parsed.occurrence_at(21).is_none());
}

#[test]
fn trim_markers_do_not_shift_positions() {
    let src = "{{- .Name -}}";
    let parsed = parse(src, "test.tmpl").expect("parse");
    let variable = &parsed.blocks[0].variables[0];
    assert_eq!(variable.position.offset, 4);
    assert_eq!(&src[variable.position.offset..variable.position.end_offset()], ".Name");
}
