//! Composition of a middleware stack into a callable chain.
//!
//! Two backends produce the same observable behavior:
//!
//! - [`Backend::List`] keeps the links in a slice and advances an index on
//!   every `next`.
//! - [`Backend::Layered`] folds the stack into nested callables, each link a
//!   [`tower::Layer`] wrapping the inner one.

use std::sync::Arc;

use tower::Layer;
use tracing::trace;

use crate::chain::{CallContext, Callable, Next, run_link};
use crate::config::Backend;
use crate::spec::MiddlewareSpec;
use crate::{Args, Error, Result, Value};

/// Build the chain of `links` around `terminal`.
///
/// Each middleware validates its bound arguments here, so a bad `.with(...)`
/// fails before the first call.
pub(crate) fn build(
    backend: Backend,
    links: &[MiddlewareSpec],
    terminal: Arc<dyn Callable>,
) -> Result<Arc<dyn Callable>> {
    for spec in links {
        spec.middleware()
            .check(spec.arguments())
            .map_err(|err| match err {
                err @ Error::InvalidArguments { .. } => err,
                other => Error::invalid_arguments(spec.name(), other.to_string()),
            })?;
    }
    trace!(%backend, links = links.len(), "building chain");

    if links.is_empty() {
        return Ok(terminal);
    }

    let chain: Arc<dyn Callable> = match backend {
        Backend::List => Arc::new(ListChain {
            links: links.to_vec(),
            terminal,
        }),
        Backend::Layered => links
            .iter()
            .rev()
            .fold(terminal, |inner, spec| LinkLayer::new(spec.clone()).layer(inner)),
    };
    Ok(chain)
}

struct ListChain {
    links: Vec<MiddlewareSpec>,
    terminal: Arc<dyn Callable>,
}

impl Callable for ListChain {
    fn call(&self, ctx: CallContext<'_>, args: Args) -> Result<Value> {
        Next::list(ctx, &self.links, self.terminal.as_ref()).run(args)
    }
}

/// Wraps an inner callable with one middleware.
#[derive(Clone)]
struct LinkLayer {
    spec: MiddlewareSpec,
}

impl LinkLayer {
    const fn new(spec: MiddlewareSpec) -> Self {
        Self { spec }
    }
}

impl Layer<Arc<dyn Callable>> for LinkLayer {
    type Service = Arc<dyn Callable>;

    fn layer(&self, inner: Arc<dyn Callable>) -> Self::Service {
        Arc::new(Layered {
            spec: self.spec.clone(),
            inner,
        })
    }
}

struct Layered {
    spec: MiddlewareSpec,
    inner: Arc<dyn Callable>,
}

impl Callable for Layered {
    fn call(&self, ctx: CallContext<'_>, args: Args) -> Result<Value> {
        run_link(&self.spec, args, Next::callable(ctx, self.inner.as_ref()))
    }
}
