//! Runtime chain: the environment handed to each middleware and the `next`
//! continuation that advances through the stack.

use std::cell::RefCell;

use serde_json::Value as Json;
use tracing::warn;

use crate::class::{Class, Instance, Receiver};
use crate::spec::MiddlewareSpec;
use crate::{Args, Arguments, Result, Scope, Value};

/// Receiver and method of the call being intercepted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CallContext<'a> {
    pub(crate) receiver: Receiver<'a>,
    pub(crate) method: &'a str,
}

/// Something that can be invoked at a position of a chain.
pub(crate) trait Callable: Send + Sync {
    fn call(&self, ctx: CallContext<'_>, args: Args) -> Result<Value>;
}

/// Continuation to the rest of the chain.
#[derive(Clone, Copy)]
pub(crate) struct Next<'a> {
    ctx: CallContext<'a>,
    inner: NextInner<'a>,
}

#[derive(Clone, Copy)]
enum NextInner<'a> {
    /// Ordered-list runner: the remaining links, then the terminal.
    List {
        links: &'a [MiddlewareSpec],
        terminal: &'a dyn Callable,
    },
    /// Layered runner: the inner callable already wraps the rest.
    Callable(&'a dyn Callable),
    /// Handed to observers: runs the rest of the chain at most once.
    Probe(&'a Probe<'a>),
}

struct Probe<'a> {
    inner: &'a Next<'a>,
    args: Args,
    slot: RefCell<Option<Result<Value>>>,
}

impl<'a> Next<'a> {
    pub(crate) fn list(
        ctx: CallContext<'a>,
        links: &'a [MiddlewareSpec],
        terminal: &'a dyn Callable,
    ) -> Self {
        Self {
            ctx,
            inner: NextInner::List { links, terminal },
        }
    }

    pub(crate) fn callable(ctx: CallContext<'a>, callable: &'a dyn Callable) -> Self {
        Self {
            ctx,
            inner: NextInner::Callable(callable),
        }
    }

    pub(crate) fn run(&self, args: Args) -> Result<Value> {
        match self.inner {
            NextInner::List { links, terminal } => match links.split_first() {
                Some((link, rest)) => run_link(link, args, Next::list(self.ctx, rest, terminal)),
                None => terminal.call(self.ctx, args),
            },
            NextInner::Callable(callable) => callable.call(self.ctx, args),
            NextInner::Probe(probe) => {
                if let Some(result) = probe.slot.borrow().as_ref() {
                    return result.clone();
                }
                let result = probe.inner.run(probe.args.clone());
                *probe.slot.borrow_mut() = Some(result.clone());
                result
            }
        }
    }
}

/// Run one link of the chain with `next` as its continuation.
pub(crate) fn run_link(spec: &MiddlewareSpec, args: Args, next: Next<'_>) -> Result<Value> {
    if spec.is_observed() {
        return observe(spec, args, next);
    }
    spec.middleware().call(ChainEnv {
        args,
        arguments: spec.arguments(),
        next,
    })
}

// The observer sees the call, but the inner chain runs exactly once with the
// original arguments and its outcome is returned untouched.
fn observe(spec: &MiddlewareSpec, args: Args, next: Next<'_>) -> Result<Value> {
    let probe = Probe {
        inner: &next,
        args: args.clone(),
        slot: RefCell::new(None),
    };
    let env = ChainEnv {
        args,
        arguments: spec.arguments(),
        next: Next {
            ctx: next.ctx,
            inner: NextInner::Probe(&probe),
        },
    };
    if let Err(error) = spec.middleware().call(env) {
        warn!(middleware = spec.name(), %error, "observer failed, ignoring");
    }
    match probe.slot.into_inner() {
        Some(result) => result,
        None => next.run(probe.args),
    }
}

/// The environment of an intercepted call, as seen by a middleware.
///
/// `args` may be replaced before calling [`ChainEnv::next`]; the new value is
/// what deeper middlewares and the original method receive.
pub struct ChainEnv<'a> {
    /// Call arguments.
    pub args: Args,
    arguments: &'a Arguments,
    next: Next<'a>,
}

impl<'a> ChainEnv<'a> {
    /// The receiver of the call (an instance or a class).
    #[must_use]
    pub const fn entity(&self) -> Receiver<'a> {
        self.next.ctx.receiver
    }

    /// The receiving instance, for instance-method calls.
    #[must_use]
    pub const fn instance(&self) -> Option<&'a Instance> {
        self.next.ctx.receiver.instance()
    }

    /// The class of the receiver.
    #[must_use]
    pub fn class(&self) -> &'a Class {
        self.next.ctx.receiver.class()
    }

    /// Name of the intercepted method.
    #[must_use]
    pub const fn method(&self) -> &'a str {
        self.next.ctx.method
    }

    /// Scope of the intercepted method.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.next.ctx.receiver.scope()
    }

    /// Arguments bound to this middleware with `.with(...)`.
    #[must_use]
    pub const fn arguments(&self) -> &'a Arguments {
        self.arguments
    }

    /// A single bound argument.
    #[must_use]
    pub fn argument(&self, key: &str) -> Option<&'a Json> {
        self.arguments.get(key)
    }

    /// Call the rest of the chain with the current arguments.
    ///
    /// May be called several times; each call runs the rest of the chain again.
    pub fn next(&self) -> Result<Value> {
        self.next.run(self.args.clone())
    }

    /// Call the rest of the chain with other arguments.
    pub fn next_with(&self, args: Args) -> Result<Value> {
        self.next.run(args)
    }
}

impl std::fmt::Debug for ChainEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainEnv")
            .field("class", &self.class().name())
            .field("scope", &self.scope())
            .field("method", &self.method())
            .field("args", &self.args)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}
