//! Capabilities imported across plugins, resolved at call time.
#![allow(missing_docs)]

use assert2::{check, let_assert};
use convenient::middleware::EnsureResult;
use convenient::prelude::*;

fn results() -> Container {
    let container = Container::new("Results");
    container.export("is_result", Scope::Instance, |args| {
        let status = args.get(0).and_then(Value::as_str);
        Ok(Value::from(matches!(status, Some("success" | "failure"))))
    });
    container
}

fn service(container: &Container, outcome: &'static str) -> Class {
    let is_result = container.import("is_result", Scope::Instance);
    Class::builder("Charge", EntityKind::Service)
        .define(move |class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.append(EnsureResult::new(is_result));
                Ok(())
            })?;
            class.instance_method("result", move |_, _| Ok(Value::from(outcome)));
            Ok(())
        })
        .expect("class")
}

#[test]
fn result_values_pass_through() {
    let class = service(&results(), "success");
    let instance = class.new_instance(Args::new()).expect("instance");

    let value = instance.call("result", Args::new()).expect("a result");
    check!(value.as_str() == Some("success"));
}

#[test]
fn other_values_are_rejected() {
    let class = service(&results(), "maybe");
    let instance = class.new_instance(Args::new()).expect("instance");

    let err = instance.call("result", Args::new()).expect_err("not a result");
    let_assert!(Error::NotAResult { class, method, .. } = err);
    check!(class == "Charge");
    check!(method == "result");
}

#[test]
fn missing_export_fails_at_call_time_not_at_commit() {
    let empty = Container::new("Results");
    let class = service(&empty, "success");

    class.commit().expect("commit does not resolve imports");

    let instance = class.new_instance(Args::new()).expect("instance");
    let err = instance.call("result", Args::new()).expect_err("nothing exported");
    let_assert!(Error::DependencyNotSatisfied { name, container, exported, .. } = err);
    check!(name == "is_result");
    check!(container == "Results");
    check!(exported == "(nothing)");
}

#[test]
fn export_added_after_import_is_used() {
    let late = Container::new("Results");
    let class = service(&late, "failure");
    let instance = class.new_instance(Args::new()).expect("instance");

    check!(instance.call("result", Args::new()).is_err());

    late.export("is_result", Scope::Instance, |_| Ok(Value::from(true)));
    let value = instance.call("result", Args::new()).expect("resolved lazily");
    check!(value.as_str() == Some("failure"));
}

#[test]
fn ensure_result_is_limited_to_result() {
    let is_result = results().import("is_result", Scope::Instance);
    let err = Class::builder("Charge", EntityKind::Service)
        .define(move |class| {
            class.middlewares("call", Scope::Instance, |stack| {
                stack.append(EnsureResult::new(is_result));
                Ok(())
            })?;
            class.instance_method("call", |_, _| Ok(Value::from("success")));
            Ok(())
        })
        .expect("class")
        .commit()
        .expect_err("wrong method");

    let_assert!(Error::NotIntendedFor { middleware, .. } = err);
    check!(middleware == "ensure_result");
}
