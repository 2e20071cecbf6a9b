//! Commit, inheritance and method resolution.
#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use assert2::{check, let_assert};
use convenient::middleware::{EnsureResult, Logging, Recorder, Retry};
use convenient::prelude::*;
use convenient::{Backend, CommitTrigger};

fn service_with_logging(name: &str) -> Class {
    Class::builder(name, EntityKind::Service)
        .define(|class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.append(Logging);
                Ok(())
            })?;
            class.instance_method("result", |_, _| Ok(Value::from("success")));
            Ok(())
        })
        .expect("class")
}

#[test]
fn commit_is_idempotent() {
    let class = service_with_logging("CreateUser");
    check!(!class.is_committed());

    let first = class.commit().expect("commit");
    let second = class.commit().expect("commit again");
    check!(Arc::ptr_eq(&first, &second));
    check!(class.is_committed());
    check!(first.trigger() == CommitTrigger::User);

    let caller = class
        .caller(Scope::Instance, "result")
        .expect("commit")
        .expect("caller");
    let again = class
        .caller(Scope::Instance, "result")
        .expect("commit")
        .expect("caller");
    check!(Arc::ptr_eq(&caller, &again));
    check!(caller.middlewares().len() == 1);
    check!(caller.backend() == Backend::List);

    check!(class.caller(Scope::Instance, "other").expect("commit").is_none());
}

#[test]
fn first_call_commits() {
    let class = service_with_logging("CreateUser");
    let instance = class.new_instance(Args::new()).expect("instance");
    check!(class.is_committed());
    check!(class.commit().expect("committed").trigger() == CommitTrigger::Instantiation);

    let value = instance.call("result", Args::new()).expect("result");
    check!(value.as_str() == Some("success"));
}

#[test]
fn editing_after_commit_fails() {
    let class = service_with_logging("CreateUser");
    class.commit().expect("commit");

    let err = class
        .configure(|class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.append(Retry);
                Ok(())
            })?;
            Ok(())
        })
        .expect_err("committed");
    check!(err == Error::AlreadyCommitted { class: "CreateUser".to_string() });
    check!(err.is_configuration());
}

#[test]
fn reopen_allows_editing_again() {
    let class = service_with_logging("CreateUser");
    let before = class.commit().expect("commit");
    check!(class.reopen());
    check!(!class.reopen());

    class
        .configure(|class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.unshift(Retry);
                Ok(())
            })?;
            Ok(())
        })
        .expect("reopened");

    let after = class.commit().expect("commit");
    check!(!Arc::ptr_eq(&before, &after));
    let caller = after.caller(Scope::Instance, "result").expect("caller");
    let names: Vec<_> = caller.middlewares().iter().map(MiddlewareSpec::name).collect();
    check!(names == vec!["retry", "logging"]);
}

#[test]
fn middleware_not_intended_for_method_fails_commit() {
    let results = Container::new("Results");
    let class = Class::builder("CreateUser", EntityKind::Service)
        .define(|class| {
            class.middlewares("call", Scope::Instance, |stack| {
                stack.append(EnsureResult::new(results.import("is_result", Scope::Instance)));
                Ok(())
            })?;
            Ok(())
        })
        .expect("class");

    let_assert!(Err(Error::NotIntendedFor { middleware, class: name, target, .. }) = class.commit());
    check!(middleware == "ensure_result");
    check!(name == "CreateUser");
    check!(target == "instance method `call` (service entity)");

    // Nothing is cached on failure
    check!(!class.is_committed());
    check!(class.commit().is_err());
}

#[test]
fn not_intended_for_message() {
    let results = Container::new("Results");
    let class = Class::builder("CreateUser", EntityKind::Service)
        .define(|class| {
            class.middlewares("call", Scope::Instance, |stack| {
                stack.append(EnsureResult::new(results.import("is_result", Scope::Instance)));
                Ok(())
            })?;
            Ok(())
        })
        .expect("class");

    let err = class.commit().expect_err("not intended for `call`");
    insta::assert_snapshot!(err.to_string(), @r"
    middleware `ensure_result` is not intended for instance method `call` (service entity) of `CreateUser`.
    It declares: methods: result, scope: instance, entity: any.
    Attach it to a supported method or relax its `intended_for` declaration.
    ");
}

#[test]
fn intended_for_check_can_be_disabled() {
    let results = Container::new("Results");
    let engine = EngineConfig::builder().check_intended_for(false).build();
    let class = Class::builder("CreateUser", EntityKind::Service)
        .engine(engine)
        .define(|class| {
            class.middlewares("call", Scope::Instance, |stack| {
                stack.append(EnsureResult::new(results.import("is_result", Scope::Instance)));
                Ok(())
            })?;
            Ok(())
        })
        .expect("class");

    check!(class.commit().is_ok());
}

#[test]
fn invalid_middleware_arguments_fail_commit() {
    let class = Class::builder("CreateUser", EntityKind::Service)
        .define(|class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.append(Retry.with("attempts", 0));
                Ok(())
            })?;
            Ok(())
        })
        .expect("class");

    let_assert!(Err(Error::InvalidArguments { middleware, .. }) = class.commit());
    check!(middleware == "retry");
}

#[test]
fn intercepted_method_without_definition_is_not_overridden() {
    let class = Class::builder("CreateUser", EntityKind::Service)
        .define(|class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.append(Logging);
                Ok(())
            })?;
            Ok(())
        })
        .expect("class");

    let instance = class.new_instance(Args::new()).expect("instance");
    let err = instance.call("result", Args::new()).expect_err("not overridden");
    check!(
        err == Error::MethodNotOverridden {
            class: "CreateUser".to_string(),
            method: "result".to_string(),
            scope: Scope::Instance,
        }
    );
}

#[test]
fn subclass_inherits_stacks_and_calls_super() {
    let recorder = Recorder::new();
    let parent = Class::builder("CreateUser", EntityKind::Service)
        .define(|class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.observe(recorder.clone());
                Ok(())
            })?;
            class.instance_method("result", |_, _| Ok(Value::from("user")));
            Ok(())
        })
        .expect("parent");

    let child = parent
        .subclass("CreateAdmin")
        .define(|class| {
            class.instance_method("result", |invocation, args| {
                let inner = invocation.call_super(args)?;
                Ok(Value::from(format!("admin {}", inner.as_str().unwrap_or_default())))
            });
            Ok(())
        })
        .expect("child");

    check!(child.is_a(&parent));
    check!(!parent.is_a(&child));
    check!(child.entity() == &EntityKind::Service);

    let admin = child.new_instance(Args::new()).expect("instance");
    check!(admin.class() == &child);
    let value = admin.call("result", Args::new()).expect("result");
    check!(value.as_str() == Some("admin user"));

    // The inherited stack wraps the override once; super skips the chain
    let calls = recorder.calls();
    check!(calls.len() == 1);
    check!(calls[0].class == "CreateAdmin");

    // Committing the child committed the parent first
    check!(parent.is_committed());
}

#[test]
fn subclass_stacks_are_copies() {
    let parent = service_with_logging("CreateUser");
    let child = parent
        .subclass("CreateAdmin")
        .define(|class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.append(Retry);
                Ok(())
            })?;
            Ok(())
        })
        .expect("child");

    let child_stack = child.middlewares(Scope::Instance, "result").expect("stack");
    let parent_stack = parent.middlewares(Scope::Instance, "result").expect("stack");
    check!(child_stack.len() == 2);
    check!(parent_stack.len() == 1);
    check!(child_stack.label() == "instance middlewares of CreateAdmin#result");
}

#[test]
fn class_methods_and_constructor_are_interceptable() {
    let recorder = Recorder::new();
    let class = Class::builder("Counter", EntityKind::Service)
        .define(|class| {
            class.middlewares("new", Scope::Class, |stack| {
                stack.observe(recorder.clone());
                Ok(())
            })?;
            class.instance_method("initialize", |invocation, args| {
                let start: i64 = args.parse(0)?;
                if let Some(instance) = invocation.instance() {
                    instance.set("count", start);
                }
                Ok(Value::null())
            });
            class.instance_method("count", |invocation, _| {
                Ok(invocation
                    .instance()
                    .and_then(|instance| instance.get("count"))
                    .unwrap_or_default())
            });
            class.class_method("label", |invocation, _| {
                Ok(Value::from(format!("{} class", invocation.class().name())))
            });
            Ok(())
        })
        .expect("class");

    let counter = class.new_instance(Args::new().arg(41)).expect("instance");
    check!(counter.call("count", Args::new()).expect("count").as_i64() == Some(41));
    check!(recorder.len() == 1);
    check!(recorder.calls()[0].scope == Scope::Class);

    let label = class.call("label", Args::new()).expect("label");
    check!(label.as_str() == Some("Counter class"));

    let err = class.call("count", Args::new()).expect_err("count is an instance method");
    let_assert!(Error::NoSuchMethod { scope: Scope::Class, .. } = err);
}

#[test]
fn concurrent_first_calls_commit_once() {
    let class = service_with_logging("CreateUser");
    let calls = AtomicUsize::new(0);

    let compiled: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let instance = class.new_instance(Args::new()).expect("instance");
                    instance.call("result", Args::new()).expect("result");
                    calls.fetch_add(1, Ordering::SeqCst);
                    class.commit().expect("committed")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .collect()
    });

    check!(calls.load(Ordering::SeqCst) == 8);
    let first = &compiled[0];
    for other in &compiled {
        check!(Arc::ptr_eq(first, other));
    }
}
