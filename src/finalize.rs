// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::convert::convert;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::input::{InputValue, InputValues, SourceKind};
use crate::source::SourceRange;
use crate::value::Value;
use crate::variable::{VariableDecl, VariableDecls};

use alloc::format;

/// Finalize one variable: substitute the default for an absent value,
/// enforce the null discipline, and apply the declared type constraint.
///
/// Always returns a value usable under the declaration: on any error the
/// returned value is `unknown` of the declared type, and the problem is
/// reported through the returned diagnostics. Downstream evaluation never
/// sees an ill-typed hole, which lets a single run surface as many problems
/// as possible.
///
/// `given` is `None` when no layer assigned the variable at all; an explicit
/// null is a present value, not an absence. `given_range` is the assignment
/// site when the source tracked one; problems with the supplied value are
/// anchored there, falling back to the declaration.
pub fn prepare_final_input_value(
    name: &str,
    given: Option<&Value>,
    given_range: Option<&SourceRange>,
    decl: &VariableDecl,
) -> (Value, Diagnostics) {
    let mut diags = Diagnostics::new();
    let blame = given_range.unwrap_or_else(|| decl.decl_range());

    // An absent value is replaced by the declared default; a variable with
    // neither is simply not set.
    let given = match given {
        Some(v) => v.clone(),
        None => match decl.default() {
            Some(default) => default.clone(),
            None => {
                diags.push(
                    Diagnostic::error(
                        "Required variable not set",
                        format!("The variable \"{name}\" is required, but is not set."),
                    )
                    .with_subject(decl.decl_range().clone()),
                );
                return (Value::Unknown(decl.ty().clone()), diags);
            }
        },
    };

    // Null discipline. A nullable variable keeps an explicit null, masking
    // any default. A non-nullable variable falls back to its default; with
    // no default to fall back to, null is as good as unset.
    let given = if given.is_null() && !decl.nullable() {
        match decl.default() {
            Some(default) => default.clone(),
            None => {
                diags.push(
                    Diagnostic::error(
                        "Required variable not set",
                        format!(
                            "The variable \"{name}\" is required, but the given value is null."
                        ),
                    )
                    .with_subject(blame.clone()),
                );
                return (Value::Unknown(decl.ty().clone()), diags);
            }
        }
    } else {
        given
    };

    // Declared type constraint. The fallback below keeps the result
    // well-typed even though the conversion failed.
    match convert(&given, decl.ty()) {
        Ok(value) => (value, diags),
        Err(err) => {
            diags.push(
                Diagnostic::error(
                    "Invalid value for input variable",
                    format!(
                        "The given value is not suitable for variable \"{name}\" declared at {}: {err}.",
                        decl.decl_range().start_string()
                    ),
                )
                .with_subject(blame.clone()),
            );
            (Value::Unknown(decl.ty().clone()), diags)
        }
    }
}

/// Finalize every declared variable against the merged assignment bag.
///
/// The returned bag has exactly the declarations' key set. Assigned entries
/// keep their provenance; defaulted and unset entries are tagged as
/// configuration at the declaration site. Assignments naming no declared
/// variable are reported and dropped.
///
/// Emission order is declarations in name order, then undeclared assignments
/// in name order; two calls with equal inputs produce identical diagnostic
/// sequences.
pub fn finalize_input_variables(
    decls: &VariableDecls,
    values: &InputValues,
) -> (InputValues, Diagnostics) {
    let mut diags = Diagnostics::new();
    let mut finalized = InputValues::new();

    for (name, decl) in decls.iter() {
        let given = values.get(name);
        let (value, value_diags) = prepare_final_input_value(
            name,
            given.map(|iv| &iv.value),
            given.and_then(|iv| iv.source_range.as_ref()),
            decl,
        );
        diags.extend(value_diags);

        let (source_kind, source_range) = match given {
            Some(iv) => (iv.source_kind, iv.source_range.clone()),
            None => (SourceKind::Config, Some(decl.decl_range().clone())),
        };
        let mut entry = InputValue::new(value, source_kind);
        entry.source_range = source_range;
        finalized.insert(name.clone(), entry);
    }

    for (name, iv) in values.iter() {
        if decls.contains_key(name) {
            continue;
        }
        let mut diag = Diagnostic::error(
            "Value for undeclared variable",
            format!(
                "A variable named \"{name}\" was assigned a value, but the module does not declare a variable of that name."
            ),
        );
        if let Some(range) = iv.source_range.clone() {
            diag = diag.with_subject(range);
        }
        diags.push(diag);
    }

    (finalized, diags)
}

/// Validate the merged assignment bag against the declaration set without
/// producing the finalized values. Runs the same resolution as
/// [`finalize_input_variables`], so declared defaults fall back here too;
/// a variable with neither an assignment nor a default is an error.
pub fn check_input_variables(decls: &VariableDecls, values: &InputValues) -> Diagnostics {
    finalize_input_variables(decls, values).1
}
