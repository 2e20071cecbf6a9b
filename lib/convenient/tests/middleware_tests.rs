//! Chain semantics: ordering, retries, short-circuits and observers, on both
//! backends.
#![allow(missing_docs)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert2::{check, let_assert};
use convenient::middleware::{CachesReturnValue, Logging, Metrics, Recorder, Retry};
use convenient::prelude::*;
use convenient::{Backend, Block, Json};

const BACKENDS: [Backend; 2] = [Backend::List, Backend::Layered];

type Log = Arc<Mutex<Vec<String>>>;

fn entries(log: &Log) -> Vec<String> {
    log.lock().expect("log").clone()
}

#[derive(MiddlewareInfo)]
#[middleware(name = "trace")]
struct Trace {
    log: Log,
}

impl Middleware for Trace {
    fn call(&self, env: ChainEnv<'_>) -> Result<Value> {
        let label = env.argument("label").and_then(Json::as_str).unwrap_or("?");
        self.log.lock().expect("log").push(format!("{label}:before"));
        let result = env.next();
        self.log.lock().expect("log").push(format!("{label}:after"));
        result
    }
}

fn trace(log: &Log, label: &str) -> MiddlewareSpec {
    Trace { log: Arc::clone(log) }.with("label", label)
}

/// Tries to change everything it can: arguments, return value, error.
#[derive(MiddlewareInfo)]
#[middleware(name = "meddler")]
struct Meddler;

impl Middleware for Meddler {
    fn call(&self, env: ChainEnv<'_>) -> Result<Value> {
        match env.argument("mode").and_then(Json::as_str) {
            Some("skip") => Ok(Value::from("short-circuit")),
            Some("fail") => {
                env.next_with(Args::new().arg("tampered"))?;
                Err(Error::raised("observer failure"))
            }
            _ => {
                env.next_with(Args::new().arg("tampered"))?;
                env.next()?;
                Ok(Value::from("replaced"))
            }
        }
    }
}

#[derive(MiddlewareInfo)]
#[middleware(name = "short_circuit")]
struct ShortCircuit;

impl Middleware for ShortCircuit {
    fn call(&self, _env: ChainEnv<'_>) -> Result<Value> {
        Ok(Value::from("cached"))
    }
}

#[derive(MiddlewareInfo)]
#[middleware(name = "append_argument")]
struct AppendArgument;

impl Middleware for AppendArgument {
    fn call(&self, mut env: ChainEnv<'_>) -> Result<Value> {
        env.args = env.args.clone().kwarg("source", "middleware");
        env.next()
    }
}

/// A class whose `result` echoes its first argument and counts its calls.
fn echo_class(
    backend: Backend,
    calls: &Arc<AtomicUsize>,
    stack: impl FnOnce(&mut Stack<MiddlewareSpec>) -> Result<()>,
) -> Class {
    let calls = Arc::clone(calls);
    Class::builder("Echo", EntityKind::Service)
        .engine(EngineConfig::builder().backend(backend).build())
        .define(|class| {
            class.middlewares("result", Scope::Instance, stack)?;
            class.instance_method("result", move |_, args| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(args.get(0).cloned().unwrap_or_default())
            });
            Ok(())
        })
        .expect("class")
}

fn call_result(class: &Class, args: Args) -> Result<Value> {
    class.new_instance(Args::new())?.call("result", args)
}

#[test]
fn first_middleware_is_outermost() {
    for backend in BACKENDS {
        let log = Log::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let class = echo_class(backend, &calls, |stack| {
            stack.append(trace(&log, "a")).append(trace(&log, "b"));
            Ok(())
        });

        let value = call_result(&class, Args::new().arg("hello")).expect("result");
        check!(value.as_str() == Some("hello"));
        check!(entries(&log) == vec!["a:before", "b:before", "b:after", "a:after"]);
        check!(calls.load(Ordering::SeqCst) == 1);
    }
}

#[test]
fn backends_agree_on_every_stack_shape() {
    for size in 0..4 {
        let mut logs = Vec::new();
        for backend in BACKENDS {
            let log = Log::default();
            let calls = Arc::new(AtomicUsize::new(0));
            let class = echo_class(backend, &calls, |stack| {
                for i in 0..size {
                    stack.append(trace(&log, &i.to_string()));
                }
                Ok(())
            });
            let value = call_result(&class, Args::new().arg(size)).expect("result");
            check!(value.as_i64() == Some(size));
            check!(calls.load(Ordering::SeqCst) == 1);
            logs.push(entries(&log));
        }
        check!(logs[0] == logs[1]);
    }
}

#[test]
fn retry_reruns_only_the_inner_chain() {
    for backend in BACKENDS {
        let log = Log::default();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let class = Class::builder("Flaky", EntityKind::Service)
            .engine(EngineConfig::builder().backend(backend).build())
            .define(|class| {
                class.middlewares("result", Scope::Instance, |stack| {
                    stack
                        .append(Logging)
                        .append(trace(&log, "outer"))
                        .append(Retry.with("attempts", 3))
                        .append(trace(&log, "inner"));
                    Ok(())
                })?;
                class.instance_method("result", move |_, _| {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        return Err(Error::raised("connection reset"));
                    }
                    Ok(Value::from("success"))
                });
                Ok(())
            })
            .expect("class");

        let value = call_result(&class, Args::new()).expect("third attempt succeeds");
        check!(value.as_str() == Some("success"));
        check!(attempts.load(Ordering::SeqCst) == 3);

        let log = entries(&log);
        check!(log.iter().filter(|entry| *entry == "outer:before").count() == 1);
        check!(log.iter().filter(|entry| *entry == "inner:before").count() == 3);
    }
}

#[test]
fn retry_gives_up_after_the_last_attempt() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let class = Class::builder("Broken", EntityKind::Service)
        .define(|class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.append(Retry.with("attempts", 2));
                Ok(())
            })?;
            class.instance_method("result", move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Error::raised("still broken"))
            });
            Ok(())
        })
        .expect("class");

    let err = call_result(&class, Args::new()).expect_err("always fails");
    check!(err == Error::raised("still broken"));
    check!(attempts.load(Ordering::SeqCst) == 2);
}

#[test]
fn retry_ignores_contract_errors() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let class = Class::builder("Strict", EntityKind::Service)
        .define(|class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.append(Retry);
                Ok(())
            })?;
            class.instance_method("result", move |_, args| {
                counter.fetch_add(1, Ordering::SeqCst);
                args.parse::<String>(0).map(Value::from)
            });
            Ok(())
        })
        .expect("class");

    let err = call_result(&class, Args::new()).expect_err("missing argument");
    let_assert!(Error::InvalidArgument(_) = err);
    check!(attempts.load(Ordering::SeqCst) == 1);
}

#[test]
fn middleware_can_short_circuit() {
    for backend in BACKENDS {
        let log = Log::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let class = echo_class(backend, &calls, |stack| {
            stack
                .append(trace(&log, "outer"))
                .append(ShortCircuit)
                .append(trace(&log, "inner"));
            Ok(())
        });

        let value = call_result(&class, Args::new().arg("hello")).expect("result");
        check!(value.as_str() == Some("cached"));
        check!(calls.load(Ordering::SeqCst) == 0);
        check!(entries(&log) == vec!["outer:before", "outer:after"]);
    }
}

#[test]
fn middleware_can_replace_arguments() {
    let class = Class::builder("Keywords", EntityKind::Service)
        .define(|class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.append(AppendArgument);
                Ok(())
            })?;
            class.instance_method("result", |_, args| {
                Ok(args.keyword("source").cloned().unwrap_or_default())
            });
            Ok(())
        })
        .expect("class");

    let value = call_result(&class, Args::new()).expect("result");
    check!(value.as_str() == Some("middleware"));
}

#[test]
fn observer_never_changes_the_outcome() {
    for backend in BACKENDS {
        for mode in ["replace", "fail", "skip"] {
            for position in 0..=3 {
                let log = Log::default();
                let calls = Arc::new(AtomicUsize::new(0));
                let class = echo_class(backend, &calls, |stack| {
                    for label in ["a", "b", "c"] {
                        stack.append(trace(&log, label));
                    }
                    let observer = Meddler.with("mode", mode).observed();
                    match position {
                        3 => {
                            stack.append(observer);
                        }
                        index => {
                            let anchor = trace(&log, ["a", "b", "c"][index]);
                            stack.insert_before(anchor, observer)?;
                        }
                    }
                    Ok(())
                });

                let value = call_result(&class, Args::new().arg("original")).expect("result");
                check!(value.as_str() == Some("original"), "{backend} {mode} at {position}");
                check!(calls.load(Ordering::SeqCst) == 1, "{backend} {mode} at {position}");
                check!(
                    entries(&log).len() == 6,
                    "every traced middleware ran once: {backend} {mode} at {position}"
                );
            }
        }
    }
}

#[test]
fn observer_sees_errors_without_changing_them() {
    let recorder = Recorder::new();
    let class = Class::builder("Failing", EntityKind::Service)
        .define(|class| {
            class.middlewares("result", Scope::Instance, |stack| {
                stack.observe(recorder.clone());
                Ok(())
            })?;
            class.instance_method("result", |_, _| Err(Error::raised("boom")));
            Ok(())
        })
        .expect("class");

    let err = call_result(&class, Args::new().arg(1)).expect_err("fails");
    check!(err == Error::raised("boom"));

    let calls = recorder.calls();
    check!(calls.len() == 1);
    check!(calls[0].method == "result");
    check!(calls[0].args == Args::new().arg(1));
    check!(calls[0].outcome == Err(Error::raised("boom")));
}

#[test]
fn caches_return_value_per_receiver_and_arguments() {
    let calls = Arc::new(AtomicUsize::new(0));
    let class = echo_class(Backend::List, &calls, |stack| {
        stack.append(CachesReturnValue);
        Ok(())
    });

    let instance = class.new_instance(Args::new()).expect("instance");
    for _ in 0..3 {
        let value = instance.call("result", Args::new().arg("a")).expect("result");
        check!(value.as_str() == Some("a"));
    }
    check!(calls.load(Ordering::SeqCst) == 1);

    instance.call("result", Args::new().arg("b")).expect("result");
    check!(calls.load(Ordering::SeqCst) == 2);

    let other = class.new_instance(Args::new()).expect("instance");
    other.call("result", Args::new().arg("a")).expect("result");
    check!(calls.load(Ordering::SeqCst) == 3);
}

#[test]
fn caches_return_value_compares_objects_by_identity() {
    let calls = Arc::new(AtomicUsize::new(0));
    let class = echo_class(Backend::List, &calls, |stack| {
        stack.append(CachesReturnValue);
        Ok(())
    });
    let instance = class.new_instance(Args::new()).expect("instance");

    for i in 0..50 {
        let argument = Value::object(i);
        let value = instance
            .call("result", Args::new().arg(argument.clone()))
            .expect("result");
        check!(value == argument, "call {i} got another object's value");
    }
    check!(calls.load(Ordering::SeqCst) == 50);

    let kept = Value::object("kept");
    for _ in 0..2 {
        let value = instance.call("result", Args::new().arg(kept.clone())).expect("result");
        check!(value == kept);
    }
    check!(calls.load(Ordering::SeqCst) == 51);
}

#[test]
fn caches_return_value_tells_keywords_from_positionals() {
    let calls = Arc::new(AtomicUsize::new(0));
    let class = echo_class(Backend::List, &calls, |stack| {
        stack.append(CachesReturnValue);
        Ok(())
    });
    let instance = class.new_instance(Args::new()).expect("instance");

    let value = instance.call("result", Args::new().kwarg("1, b", 2)).expect("result");
    check!(value.is_null());
    let value = instance
        .call("result", Args::new().arg(1).kwarg("b", 2))
        .expect("result");
    check!(value.as_i64() == Some(1));
    check!(calls.load(Ordering::SeqCst) == 2);
}

#[test]
fn caches_return_value_skips_calls_with_a_block() {
    let calls = Arc::new(AtomicUsize::new(0));
    let class = echo_class(Backend::List, &calls, |stack| {
        stack.append(CachesReturnValue);
        Ok(())
    });
    let instance = class.new_instance(Args::new()).expect("instance");
    let block = Block::new(|_| Ok(Value::null()));

    for _ in 0..3 {
        let args = Args::new().arg("a").block(block.clone());
        instance.call("result", args).expect("result");
    }
    check!(calls.load(Ordering::SeqCst) == 3);

    instance.call("result", Args::new().arg("a")).expect("result");
    instance.call("result", Args::new().arg("a")).expect("result");
    check!(calls.load(Ordering::SeqCst) == 4);
}

#[test]
fn metrics_pass_values_through() {
    let calls = Arc::new(AtomicUsize::new(0));
    let class = echo_class(Backend::Layered, &calls, |stack| {
        stack.append(Metrics);
        Ok(())
    });

    let value = call_result(&class, Args::new().arg(7)).expect("result");
    check!(value.as_i64() == Some(7));
}
