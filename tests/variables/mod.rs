// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use invar::*;

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};

fn range(filename: &str, line: u32, byte: u32) -> SourceRange {
    SourceRange::new(
        filename,
        SourcePos::new(line, 1, byte),
        SourcePos::new(line, 13, byte + 12),
    )
}

fn object_of(entries: &[(&str, Value)]) -> Value {
    let attrs: BTreeMap<Rc<str>, Value> = entries
        .iter()
        .map(|(k, v)| (Rc::from(*k), v.clone()))
        .collect();
    Value::object(attrs)
}

fn object_ty(attrs: &[(&str, Type)]) -> Type {
    Type::object(
        attrs
            .iter()
            .map(|(k, t)| (Rc::from(*k), t.clone()))
            .collect(),
    )
}

fn caller_values(entries: &[(&str, Value)]) -> InputValues {
    InputValues::from_map(
        entries
            .iter()
            .map(|(k, v)| (Rc::from(*k), v.clone()))
            .collect(),
        SourceKind::Caller,
    )
}

// The three declarations of the basic module: a string default, an empty
// list default, and an empty map default.
fn basic_decls() -> VariableDecls {
    let f = "vars-basic/main.tf";
    let mut decls = VariableDecls::new();
    decls.insert(
        "a".into(),
        VariableDecl::new("a", Type::Dynamic, Some(Value::from("foo")), true, range(f, 1, 0)),
    );
    decls.insert(
        "b".into(),
        VariableDecl::new(
            "b",
            Type::list(Type::String),
            Some(Value::empty_list(Type::String)),
            true,
            range(f, 6, 55),
        ),
    );
    decls.insert(
        "c".into(),
        VariableDecl::new(
            "c",
            Type::map(Type::String),
            Some(Value::empty_map(Type::String)),
            true,
            range(f, 11, 113),
        ),
    );
    decls
}

fn bool_decls() -> VariableDecls {
    let f = "vars-basic-bool/main.tf";
    let mut decls = VariableDecls::new();
    decls.insert(
        "a".into(),
        VariableDecl::new("a", Type::Dynamic, Some(Value::from(true)), true, range(f, 4, 177)),
    );
    decls.insert(
        "b".into(),
        VariableDecl::new("b", Type::Dynamic, Some(Value::from(false)), true, range(f, 8, 214)),
    );
    decls
}

#[test]
fn defaults_only() {
    let decls = basic_decls();
    let got = InputValues::default_values(&decls);

    let mut want = InputValues::new();
    want.insert("a", InputValue::new(Value::from("foo"), SourceKind::Config));
    want.insert(
        "b",
        InputValue::new(Value::empty_list(Type::String), SourceKind::Config),
    );
    want.insert(
        "c",
        InputValue::new(Value::empty_map(Type::String), SourceKind::Config),
    );
    assert!(got.identical(&want));

    // Defaults point back at their declarations.
    let a_range = got.get("a").and_then(|iv| iv.source_range.clone());
    assert_eq!(a_range, Some(range("vars-basic/main.tf", 1, 0)));
}

#[test]
fn caller_overrides_defaults() {
    let decls = basic_decls();
    let overrides = caller_values(&[
        ("a", Value::from("bar")),
        (
            "b",
            Value::list(Type::String, vec![Value::from("foo"), Value::from("bar")]),
        ),
        (
            "c",
            Value::map(
                Type::String,
                [(Rc::from("foo"), Value::from("bar"))].into_iter().collect(),
            ),
        ),
    ]);

    let got = InputValues::default_values(&decls).override_with(&[overrides.clone()]);
    assert!(got.identical(&overrides));

    // Overridden entries carry no source range.
    assert_eq!(got.get("a").and_then(|iv| iv.source_range.clone()), None);
}

#[test]
fn bool_defaults_and_overrides() {
    let decls = bool_decls();

    let got = InputValues::default_values(&decls);
    let mut want = InputValues::new();
    want.insert("a", InputValue::new(Value::from(true), SourceKind::Config));
    want.insert("b", InputValue::new(Value::from(false), SourceKind::Config));
    assert!(got.identical(&want));

    // Overriding a bool declaration with strings is a merge-layer concern
    // only; nothing coerces here.
    let with_strings = got.override_with(&[caller_values(&[
        ("a", Value::from("foo")),
        ("b", Value::from("bar")),
    ])]);
    assert!(with_strings.identical(&caller_values(&[
        ("a", Value::from("foo")),
        ("b", Value::from("bar")),
    ])));

    let with_bools = got.override_with(&[caller_values(&[
        ("a", Value::from(false)),
        ("b", Value::from(true)),
    ])]);
    assert!(with_bools.identical(&caller_values(&[
        ("a", Value::from(false)),
        ("b", Value::from(true)),
    ])));
}

// The declarations of the finalization table: every combination of
// {unconstrained, string-constrained} x {no default, string default, bool
// default, null default} x {nullable, non-nullable} that the resolution
// rules distinguish.
fn finalization_decls() -> VariableDecls {
    let f = "main.tf";
    let rows: Vec<(&str, Type, Option<Value>, bool)> = vec![
        ("nullable_required", Type::Dynamic, None, true),
        (
            "nullable_optional_default_string",
            Type::Dynamic,
            Some(Value::from("hello")),
            true,
        ),
        (
            "nullable_optional_default_null",
            Type::Dynamic,
            Some(Value::null_dynamic()),
            true,
        ),
        ("constrained_string_nullable_required", Type::String, None, true),
        (
            "constrained_string_nullable_optional_default_string",
            Type::String,
            Some(Value::from("hello")),
            true,
        ),
        (
            "constrained_string_nullable_optional_default_bool",
            Type::String,
            Some(Value::from(true)),
            true,
        ),
        (
            "constrained_string_nullable_optional_default_null",
            Type::String,
            Some(Value::null_dynamic()),
            true,
        ),
        ("required", Type::Dynamic, None, false),
        (
            "optional_default_string",
            Type::Dynamic,
            Some(Value::from("hello")),
            false,
        ),
        ("constrained_string_required", Type::String, None, false),
        (
            "constrained_string_optional_default_string",
            Type::String,
            Some(Value::from("hello")),
            false,
        ),
        (
            "constrained_string_optional_default_bool",
            Type::String,
            Some(Value::from(true)),
            false,
        ),
    ];

    let mut decls = VariableDecls::new();
    for (i, (name, ty, default, nullable)) in rows.into_iter().enumerate() {
        decls.insert(
            name.into(),
            VariableDecl::new(name, ty, default, nullable, range(f, (i as u32) * 4 + 1, 0)),
        );
    }
    decls
}

#[test]
fn prepare_final_input_value_table() -> Result<()> {
    let decls = finalization_decls();

    struct Case {
        var_name: &'static str,
        given: Option<Value>,
        want: Value,
        want_err: &'static str,
    }

    let case = |var_name, given, want, want_err| Case {
        var_name,
        given,
        want,
        want_err,
    };

    let cases = vec![
        // nullable_required
        case(
            "nullable_required",
            None,
            Value::unknown_dynamic(),
            r#"Required variable not set: The variable "nullable_required" is required, but is not set."#,
        ),
        // "required" for a nullable variable means only that it must be
        // set, even if it's set to null.
        case("nullable_required", Some(Value::null_dynamic()), Value::null_dynamic(), ""),
        case("nullable_required", Some(Value::from("ahoy")), Value::from("ahoy"), ""),
        case(
            "nullable_required",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
        // nullable_optional_default_string
        case(
            "nullable_optional_default_string",
            None,
            Value::from("hello"), // the declared default value
            "",
        ),
        case(
            "nullable_optional_default_string",
            Some(Value::null_dynamic()),
            Value::null_dynamic(), // nullable variables can be really set to null, masking the default
            "",
        ),
        case(
            "nullable_optional_default_string",
            Some(Value::from("ahoy")),
            Value::from("ahoy"),
            "",
        ),
        case(
            "nullable_optional_default_string",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
        // nullable_optional_default_null
        case(
            "nullable_optional_default_null",
            None,
            Value::null_dynamic(), // the declared default value
            "",
        ),
        case(
            "nullable_optional_default_null",
            Some(Value::null(Type::String)),
            Value::null(Type::String),
            "",
        ),
        case(
            "nullable_optional_default_null",
            Some(Value::from("ahoy")),
            Value::from("ahoy"),
            "",
        ),
        case(
            "nullable_optional_default_null",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
        // constrained_string_nullable_required
        case(
            "constrained_string_nullable_required",
            None,
            Value::unknown(Type::String),
            r#"Required variable not set: The variable "constrained_string_nullable_required" is required, but is not set."#,
        ),
        case(
            "constrained_string_nullable_required",
            Some(Value::null_dynamic()),
            Value::null(Type::String), // the null value still gets converted to match the type constraint
            "",
        ),
        case(
            "constrained_string_nullable_required",
            Some(Value::from("ahoy")),
            Value::from("ahoy"),
            "",
        ),
        case(
            "constrained_string_nullable_required",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
        // constrained_string_nullable_optional_default_string
        case(
            "constrained_string_nullable_optional_default_string",
            None,
            Value::from("hello"), // the declared default value
            "",
        ),
        case(
            "constrained_string_nullable_optional_default_string",
            Some(Value::null_dynamic()),
            Value::null(Type::String),
            "",
        ),
        case(
            "constrained_string_nullable_optional_default_string",
            Some(Value::from("ahoy")),
            Value::from("ahoy"),
            "",
        ),
        case(
            "constrained_string_nullable_optional_default_string",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
        // constrained_string_nullable_optional_default_bool
        case(
            "constrained_string_nullable_optional_default_bool",
            None,
            Value::from("true"), // the declared default value, converted to match the type constraint
            "",
        ),
        case(
            "constrained_string_nullable_optional_default_bool",
            Some(Value::null_dynamic()),
            Value::null(Type::String),
            "",
        ),
        case(
            "constrained_string_nullable_optional_default_bool",
            Some(Value::from("ahoy")),
            Value::from("ahoy"),
            "",
        ),
        case(
            "constrained_string_nullable_optional_default_bool",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
        // constrained_string_nullable_optional_default_null
        case(
            "constrained_string_nullable_optional_default_null",
            None,
            Value::null(Type::String),
            "",
        ),
        case(
            "constrained_string_nullable_optional_default_null",
            Some(Value::null_dynamic()),
            Value::null(Type::String),
            "",
        ),
        case(
            "constrained_string_nullable_optional_default_null",
            Some(Value::from("ahoy")),
            Value::from("ahoy"),
            "",
        ),
        case(
            "constrained_string_nullable_optional_default_null",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
        // required
        case(
            "required",
            None,
            Value::unknown_dynamic(),
            r#"Required variable not set: The variable "required" is required, but is not set."#,
        ),
        case(
            "required",
            Some(Value::null_dynamic()),
            Value::unknown_dynamic(),
            r#"Required variable not set: The variable "required" is required, but the given value is null."#,
        ),
        case("required", Some(Value::from("ahoy")), Value::from("ahoy"), ""),
        case(
            "required",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
        // optional_default_string
        case("optional_default_string", None, Value::from("hello"), ""),
        case(
            "optional_default_string",
            Some(Value::null_dynamic()),
            Value::from("hello"), // the declared default value
            "",
        ),
        case(
            "optional_default_string",
            Some(Value::from("ahoy")),
            Value::from("ahoy"),
            "",
        ),
        case(
            "optional_default_string",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
        // constrained_string_required
        case(
            "constrained_string_required",
            None,
            Value::unknown(Type::String),
            r#"Required variable not set: The variable "constrained_string_required" is required, but is not set."#,
        ),
        case(
            "constrained_string_required",
            Some(Value::null_dynamic()),
            Value::unknown(Type::String),
            r#"Required variable not set: The variable "constrained_string_required" is required, but the given value is null."#,
        ),
        case(
            "constrained_string_required",
            Some(Value::from("ahoy")),
            Value::from("ahoy"),
            "",
        ),
        case(
            "constrained_string_required",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
        // constrained_string_optional_default_string
        case(
            "constrained_string_optional_default_string",
            None,
            Value::from("hello"),
            "",
        ),
        case(
            "constrained_string_optional_default_string",
            Some(Value::null_dynamic()),
            Value::from("hello"), // the declared default value
            "",
        ),
        case(
            "constrained_string_optional_default_string",
            Some(Value::from("ahoy")),
            Value::from("ahoy"),
            "",
        ),
        case(
            "constrained_string_optional_default_string",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
        // constrained_string_optional_default_bool
        case(
            "constrained_string_optional_default_bool",
            None,
            Value::from("true"), // the declared default value, converted to match the type constraint
            "",
        ),
        case(
            "constrained_string_optional_default_bool",
            Some(Value::null_dynamic()),
            Value::from("true"),
            "",
        ),
        case(
            "constrained_string_optional_default_bool",
            Some(Value::from("ahoy")),
            Value::from("ahoy"),
            "",
        ),
        case(
            "constrained_string_optional_default_bool",
            Some(Value::unknown(Type::String)),
            Value::unknown(Type::String),
            "",
        ),
    ];

    for c in cases {
        let decl = decls
            .get(c.var_name)
            .ok_or_else(|| anyhow!("invalid variable name {:?}", c.var_name))?;

        let (got, diags) = prepare_final_input_value(c.var_name, c.given.as_ref(), None, decl);

        if c.want_err.is_empty() {
            assert!(
                !diags.has_errors(),
                "{} {:?}: unexpected error: {:?}",
                c.var_name,
                c.given,
                diags.err().map(|e| e.to_string()),
            );
        } else {
            let got_err = diags
                .err()
                .map(|e| e.to_string())
                .ok_or_else(|| anyhow!("{} {:?}: unexpected success", c.var_name, c.given))?;
            assert_eq!(got_err, c.want_err, "{} {:?}", c.var_name, c.given);
        }

        // A reasonable value comes back even when there was an error.
        assert_eq!(got, c.want, "{} {:?}", c.var_name, c.given);
    }
    Ok(())
}

// The declarations of the module-level check scenarios. `map` has no type
// constraint despite its name.
fn check_decls() -> VariableDecls {
    let f = "input-variables/main.tf";
    let object_elem = object_ty(&[("foo", Type::String), ("bar", Type::Dynamic)]);

    let mut decls = VariableDecls::new();
    decls.insert(
        "foo".into(),
        VariableDecl::new("foo", Type::Dynamic, None, true, range(f, 1, 0)),
    );
    decls.insert(
        "bar".into(),
        VariableDecl::new("bar", Type::Dynamic, None, true, range(f, 4, 30)),
    );
    decls.insert(
        "map".into(),
        VariableDecl::new("map", Type::Dynamic, None, true, range(f, 7, 60)),
    );
    decls.insert(
        "object_map".into(),
        VariableDecl::new(
            "object_map",
            Type::map(object_elem.clone()),
            None,
            true,
            range(f, 10, 90),
        ),
    );
    decls.insert(
        "object_list".into(),
        VariableDecl::new(
            "object_list",
            Type::list(object_elem),
            None,
            true,
            range(f, 18, 160),
        ),
    );
    decls
}

fn cli_values(entries: &[(&str, Value)]) -> InputValues {
    InputValues::from_map(
        entries
            .iter()
            .map(|(k, v)| (Rc::from(*k), v.clone()))
            .collect(),
        SourceKind::CliArg,
    )
}

#[test]
fn check_no_variables_set() {
    let decls = check_decls();

    let diags = check_input_variables(&decls, &InputValues::new());
    assert!(diags.has_errors(), "check succeeded, but want errors");

    // One variable set, the rest unset: every other declaration is
    // required, so the check still fails.
    let diags = check_input_variables(&decls, &cli_values(&[("foo", Value::from("bar"))]));
    assert!(diags.has_errors(), "check succeeded, but want errors");
}

#[test]
fn check_all_variables_set() -> Result<()> {
    let decls = check_decls();
    let concrete_object = object_ty(&[("foo", Type::String), ("bar", Type::Number)]);

    let uno = object_of(&[("foo", Value::from("baz")), ("bar", Value::from(2u64))]);
    let dos = object_of(&[("foo", Value::from("bat")), ("bar", Value::from(99u64))]);

    let values = cli_values(&[
        ("foo", Value::from("bar")),
        ("bar", Value::from("baz")),
        // Okay because the declaration has no type constraint.
        ("map", Value::from("baz")),
        (
            "object_map",
            Value::map(
                concrete_object.clone(),
                [(Rc::from("uno"), uno.clone()), (Rc::from("dos"), dos.clone())]
                    .into_iter()
                    .collect(),
            ),
        ),
        (
            "object_list",
            Value::list(
                concrete_object,
                vec![
                    object_of(&[("foo", Value::from("baz")), ("bar", Value::from(2u64))]),
                    object_of(&[("foo", Value::from("bang")), ("bar", Value::from(42u64))]),
                ],
            ),
        ),
    ]);

    let diags = check_input_variables(&decls, &values);
    if diags.has_errors() {
        return Err(anyhow!(
            "unexpected errors: {:?}",
            diags.err().map(|e| e.to_string())
        ));
    }
    Ok(())
}

#[test]
fn check_mixed_element_types_converge() -> Result<()> {
    // A tuple whose second object disagrees on the type of `bar` still
    // converges: number and string unify on string under the `any`
    // constraint.
    let decls = check_decls();
    let concrete_object = object_ty(&[("foo", Type::String), ("bar", Type::Number)]);

    let values = cli_values(&[
        ("foo", Value::from("bar")),
        ("bar", Value::from("baz")),
        ("map", Value::from("baz")),
        (
            "object_map",
            Value::map(
                concrete_object,
                [(
                    Rc::from("uno"),
                    object_of(&[("foo", Value::from("baz")), ("bar", Value::from(2u64))]),
                )]
                .into_iter()
                .collect(),
            ),
        ),
        (
            "object_list",
            Value::tuple(vec![
                object_of(&[("foo", Value::from("baz")), ("bar", Value::from(2u64))]),
                object_of(&[("foo", Value::from("bang")), ("bar", Value::from("42"))]),
            ]),
        ),
    ]);

    let diags = check_input_variables(&decls, &values);
    if diags.has_errors() {
        return Err(anyhow!(
            "unexpected errors: {:?}",
            diags.err().map(|e| e.to_string())
        ));
    }
    Ok(())
}

#[test]
fn heterogeneous_tuple_accepted_under_any() {
    // With no type constraint at all, mixed element types are permitted
    // and pass through untouched.
    let f = "main.tf";
    let mut decls = VariableDecls::new();
    decls.insert(
        "object_list".into(),
        VariableDecl::new("object_list", Type::Dynamic, None, true, range(f, 1, 0)),
    );

    let given = Value::tuple(vec![
        object_of(&[("bar", Value::from(2u64))]),
        object_of(&[("bar", Value::from("42"))]),
    ]);
    let values = cli_values(&[("object_list", given.clone())]);

    let (finalized, diags) = finalize_input_variables(&decls, &values);
    assert!(!diags.has_errors());
    assert_eq!(finalized.get("object_list").map(|iv| &iv.value), Some(&given));
}

#[test]
fn undeclared_variable_reported() {
    let f = "input-variables/main.tf";
    let mut decls = VariableDecls::new();
    decls.insert(
        "foo".into(),
        VariableDecl::new("foo", Type::Dynamic, None, true, range(f, 1, 0)),
    );
    decls.insert(
        "bar".into(),
        VariableDecl::new("bar", Type::Dynamic, None, true, range(f, 4, 30)),
    );

    let baz_range = range("vars.conf", 3, 40);
    let mut values = cli_values(&[("foo", Value::from("1")), ("bar", Value::from("2"))]);
    values.insert(
        "baz",
        InputValue::new(Value::from("3"), SourceKind::CliArg).with_range(baz_range.clone()),
    );

    let diags = check_input_variables(&decls, &values);
    assert!(diags.has_errors());

    let undeclared: Vec<&Diagnostic> = diags
        .iter()
        .filter(|d| d.summary.as_ref() == "Value for undeclared variable")
        .collect();
    assert_eq!(undeclared.len(), 1);
    let diag = undeclared.first().copied();
    assert_eq!(diag.and_then(|d| d.subject.clone()), Some(baz_range));
    assert!(diag.is_some_and(|d| d.detail.contains("\"baz\"")));
}

#[test]
fn invalid_value_anchored_at_assignment() {
    let decl_range = range("main.tf", 1, 0);
    let mut decls = VariableDecls::new();
    decls.insert(
        "ports".into(),
        VariableDecl::new(
            "ports",
            Type::list(Type::Number),
            None,
            true,
            decl_range.clone(),
        ),
    );

    let assign_range = range("vars.conf", 7, 120);
    let mut values = InputValues::new();
    values.insert(
        "ports",
        InputValue::new(
            Value::tuple(vec![Value::from(80u64), Value::from("not-a-port")]),
            SourceKind::File,
        )
        .with_range(assign_range.clone()),
    );

    let (finalized, diags) = finalize_input_variables(&decls, &values);
    assert!(diags.has_errors());

    let diag = diags.iter().find(|d| d.is_error()).cloned();
    assert_eq!(
        diag.as_ref().map(|d| d.summary.as_ref().to_string()),
        Some("Invalid value for input variable".to_string())
    );
    // The detail names the variable, the declaration site, and the failing
    // element.
    assert!(diag
        .as_ref()
        .is_some_and(|d| d.detail.contains("\"ports\"") && d.detail.contains("main.tf:1,1")));
    assert!(diag.as_ref().is_some_and(|d| d.detail.contains("[1]")));
    assert_eq!(diag.and_then(|d| d.subject), Some(assign_range));

    // The failing variable still finalizes to a typed placeholder.
    assert_eq!(
        finalized.get("ports").map(|iv| &iv.value),
        Some(&Value::unknown(Type::list(Type::Number)))
    );
}

#[test]
fn finalized_bag_matches_declaration_keys() {
    let decls = basic_decls();

    // One override, one extra, one missing default: keys still match the
    // declarations exactly.
    let mut values = InputValues::default_values(&decls);
    values.insert("extra", InputValue::new(Value::from(1u64), SourceKind::Caller));

    let (finalized, diags) = finalize_input_variables(&decls, &values);
    assert!(diags.has_errors()); // the undeclared "extra"
    let keys: Vec<&Rc<str>> = finalized.keys().collect();
    let want: Vec<&Rc<str>> = decls.keys().collect();
    assert_eq!(keys, want);
}

#[test]
fn deterministic_and_idempotent() {
    let decls = finalization_decls();
    let values = caller_values(&[
        ("nullable_required", Value::null_dynamic()),
        ("constrained_string_optional_default_bool", Value::null_dynamic()),
        ("required", Value::from("ahoy")),
    ]);

    let (first, first_diags) = finalize_input_variables(&decls, &values);
    let (second, second_diags) = finalize_input_variables(&decls, &values);

    // Determinism: raw-equal inputs give raw-equal outputs and identical
    // diagnostic sequences.
    assert!(first.identical(&second));
    assert_eq!(first_diags, second_diags);

    // Idempotence: feeding the finalized bag back in as a caller layer
    // reproduces the same values.
    let replay = InputValues::from_map(first.just_values(), SourceKind::Caller);
    let (third, _) = finalize_input_variables(&decls, &replay);
    assert_eq!(first.just_values(), third.just_values());
}
