//! Composition contract tests
//!
//! Covers the guarantees every composed method relies on:
//! - identity (name, return type) survives any number of layers
//! - slot lookups are idempotent across driver passes
//! - overloads and colliding keys never share a chain
//! - decorators nest first-innermost
//! - errors pass through unchanged
//! - misconfigured annotations are reported, not fatal

use adorn_core::{
    AnnotationOccurrence, ApplyOutcome, Arguments, DecoratedCallable, DecoratorBinding,
    DecoratorDriver, DiagnosticKind, MethodDeclaration, MethodIdentity, SourceLocation,
    TypeDescriptor,
};
use adorn_testkit::strategies::{arb_method_name, arb_type_descriptor};
use adorn_testkit::*;
use assert_matches::assert_matches;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

// ========== Test Utilities ==========

fn occurrence(name: &str) -> AnnotationOccurrence {
    AnnotationOccurrence::new(name)
}

fn returning_argument(identity: MethodIdentity) -> MethodDeclaration {
    MethodDeclaration::new(identity, TypeDescriptor::named("int"), |args| {
        Ok(args.value(0)?.clone())
    })
}

// ========== Identity Preservation ==========

proptest! {
    /// Name and return type never change, however many layers are added
    #[test]
    fn decorating_preserves_identity(
        name in arb_method_name(),
        return_type in arb_type_descriptor(),
        layers in 0usize..12,
    ) {
        let original = DecoratedCallable::new(&name, return_type.clone(), |_args| Ok(json!(0)));
        let mut current = original.clone();
        for _ in 0..layers {
            current = current.decorate_with(DecoratorBinding::new(add_one())).unwrap();
        }

        prop_assert_eq!(current.name(), name.as_str());
        prop_assert_eq!(current.return_type(), &return_type);
        prop_assert_eq!(current.layers(), layers);
        prop_assert_eq!(current.invoke(Arguments::empty()).unwrap(), json!(layers));
        prop_assert_eq!(original.layers(), 0);
    }
}

// ========== Slot Idempotence ==========

#[test]
fn test_slot_is_shared_across_driver_passes() {
    let mut composer = composer_with(standard_catalog());
    composer.declare(identity_method()).unwrap();
    let method = identity_identity();

    let first = composer.ensure_slot(&method).unwrap();
    {
        let mut driver = DecoratorDriver::new(&mut composer);
        driver.apply(&method, &occurrence("AddOne")).unwrap();
        assert!(driver.finish().is_clean());
    }
    {
        let mut driver = DecoratorDriver::new(&mut composer);
        let outcome = driver.apply(&method, &occurrence("TimesTen")).unwrap();
        assert_matches!(outcome, ApplyOutcome::Applied { layers: 2, .. });
    }
    let second = composer.ensure_slot(&method).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(composer.slots().len(), 1);
    // the second pass wrapped the chain built by the first
    assert_eq!(composer.invoke(&method, [json!(3)]).unwrap(), json!(40));
}

// ========== Overload Isolation ==========

#[test]
fn test_overloads_keep_independent_chains() {
    let mut composer = composer_with(standard_catalog());
    let by_int = MethodIdentity::parse("scale", &["int"]);
    let by_long = MethodIdentity::parse("scale", &["long"]);
    composer.declare(returning_argument(by_int.clone())).unwrap();
    composer.declare(returning_argument(by_long.clone())).unwrap();

    let mut driver = DecoratorDriver::new(&mut composer);
    driver.apply(&by_int, &occurrence("Double")).unwrap();
    driver.apply(&by_long, &occurrence("Negate")).unwrap();
    driver.apply(&by_long, &occurrence("AddOne")).unwrap();
    assert!(driver.finish().is_clean());

    assert_eq!(composer.invoke(&by_int, [json!(5)]).unwrap(), json!(10));
    assert_eq!(composer.invoke(&by_long, [json!(5)]).unwrap(), json!(-4));

    let keys: Vec<String> = [&by_int, &by_long]
        .iter()
        .map(|method| composer.slots().find_slot(method).unwrap().key().to_string())
        .collect();
    assert_eq!(keys, vec!["decorating$scaleint", "decorating$scalelong"]);
}

// ========== Collision Safety ==========

#[test]
fn test_qualified_types_with_same_simple_name() {
    let mut composer = composer_with(standard_catalog());
    let first = MethodIdentity::parse("load", &["a.Foo"]);
    let second = MethodIdentity::parse("load", &["b.Foo"]);
    composer.declare(returning_argument(first.clone())).unwrap();
    composer.declare(returning_argument(second.clone())).unwrap();

    let mut driver = DecoratorDriver::new(&mut composer);
    let a = driver.apply(&first, &occurrence("Double")).unwrap();
    let b = driver.apply(&second, &occurrence("Negate")).unwrap();

    assert_matches!(a, ApplyOutcome::Applied { ref key, .. } if key.as_str() == "decorating$loadFoo");
    assert_matches!(b, ApplyOutcome::Applied { ref key, .. } if key.as_str() == "_decorating$loadFoo");
    assert_eq!(composer.invoke(&first, [json!(7)]).unwrap(), json!(14));
    assert_eq!(composer.invoke(&second, [json!(7)]).unwrap(), json!(-7));
}

#[test]
fn test_names_that_sanitize_alike() {
    let mut composer = composer_with(standard_catalog());
    let spaced = MethodIdentity::new("my method", Vec::new());
    let underscored = MethodIdentity::new("my_method", Vec::new());
    composer.declare(constant_method(spaced.clone(), json!(1))).unwrap();
    composer
        .declare(constant_method(underscored.clone(), json!(1)))
        .unwrap();

    let mut driver = DecoratorDriver::new(&mut composer);
    driver.apply(&spaced, &occurrence("TimesTen")).unwrap();
    driver.apply(&underscored, &occurrence("AddOne")).unwrap();
    driver.apply(&spaced, &occurrence("AddOne")).unwrap();

    assert_eq!(composer.slots().len(), 2);
    assert_eq!(composer.invoke(&spaced, Arguments::empty()).unwrap(), json!(11));
    assert_eq!(
        composer.invoke(&underscored, Arguments::empty()).unwrap(),
        json!(2)
    );
}

// ========== Nesting Order ==========

#[test]
fn test_first_applied_is_innermost() {
    let mut composer = composer_with(standard_catalog());
    composer.declare(identity_method()).unwrap();
    let method = identity_identity();

    let mut driver = DecoratorDriver::new(&mut composer);
    driver.apply(&method, &occurrence("AddOne")).unwrap();
    driver.apply(&method, &occurrence("TimesTen")).unwrap();

    let result = composer.invoke(&method, [json!(3)]).unwrap();
    assert_eq!(result, json!(40));
    assert_ne!(result, json!(31));
}

#[test]
fn test_outermost_runs_first_and_last() {
    let log = call_log();
    let catalog = CatalogBuilder::new()
        .decorator("Inner", recording("inner", Arc::clone(&log)))
        .decorator("Outer", recording("outer", Arc::clone(&log)))
        .build();
    let mut composer = composer_with(catalog);
    composer.declare(identity_method()).unwrap();
    let method = identity_identity();

    let mut driver = DecoratorDriver::new(&mut composer);
    driver.apply(&method, &occurrence("Inner")).unwrap();
    driver.apply(&method, &occurrence("Outer")).unwrap();
    composer.invoke(&method, [json!(1)]).unwrap();

    assert_eq!(
        *log.lock(),
        vec!["outer:enter", "inner:enter", "inner:exit", "outer:exit"]
    );
}

// ========== Error Propagation ==========

#[test]
fn test_body_error_reaches_caller_unchanged() {
    let log = call_log();
    let catalog = CatalogBuilder::new()
        .decorator("Logged", recording("logged", Arc::clone(&log)))
        .decorator("Retry", retry(3))
        .build();
    let mut composer = composer_with(catalog);
    let method = MethodIdentity::new("explode", Vec::new());
    composer
        .declare(failing_method(method.clone(), "disk on fire"))
        .unwrap();

    let mut driver = DecoratorDriver::new(&mut composer);
    driver.apply(&method, &occurrence("Logged")).unwrap();
    driver.apply(&method, &occurrence("Retry")).unwrap();

    let err = composer.invoke(&method, Arguments::empty()).unwrap_err();
    assert_eq!(err.downcast_ref::<Boom>(), Some(&Boom::new("disk on fire")));
    // retry called the inner layer three times
    assert_eq!(log.lock().len(), 6);
}

// ========== Configuration Errors ==========

#[test]
fn test_unmarked_annotation_leaves_existing_layers() {
    let mut composer = composer_with(standard_catalog());
    composer.declare(identity_method()).unwrap();
    let method = identity_identity();

    let mut driver = DecoratorDriver::new(&mut composer);
    driver.apply(&method, &occurrence("Double")).unwrap();
    let outcome = driver
        .apply(
            &method,
            &occurrence("Deprecated").at(SourceLocation::new("Calculator.groovy", 8, 3)),
        )
        .unwrap();
    assert_eq!(outcome, ApplyOutcome::Rejected);
    driver.apply(&method, &occurrence("AddOne")).unwrap();

    let report = driver.finish();
    assert_eq!((report.applied, report.rejected, report.failed), (2, 1, 0));
    let diagnostic = report
        .diagnostics
        .of_kind(DiagnosticKind::MissingDecoratorMarker)
        .next()
        .unwrap();
    assert!(diagnostic.message.contains("Deprecated lacks this marker"));
    assert_eq!(diagnostic.method.as_deref(), Some("identity(int)"));
    assert_eq!(
        diagnostic.to_string(),
        "Calculator.groovy:8:3: error: Annotation to decorate method must be marked as a method \
         decorator. Deprecated lacks this marker."
    );

    assert_eq!(composer.invoke(&method, [json!(4)]).unwrap(), json!(9));
    assert_eq!(
        composer.slots().find_slot(&method).unwrap().current().layers(),
        2
    );
}
