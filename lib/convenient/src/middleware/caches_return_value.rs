//! Return value memoization.

use parking_lot::Mutex;
use tracing::trace;

use crate::{Args, ChainEnv, Middleware, MiddlewareInfo, Result, Value};

/// Calls already answered for one method of one receiver.
///
/// Holding the arguments keeps object arguments alive, so identity comparison
/// stays sound.
type Memo = Mutex<Vec<(Args, Value)>>;

/// Middleware that memoizes the return value of a method per receiver and
/// arguments.
///
/// Values are stored in the receiver's state, so each instance (or class) has
/// its own cache. Arguments are compared structurally, objects by identity.
/// Errors are not cached, and calls with a block are never cached.
#[derive(Debug, Clone, Copy, Default, MiddlewareInfo)]
#[middleware(name = "caches_return_value")]
pub struct CachesReturnValue;

impl Middleware for CachesReturnValue {
    fn call(&self, env: ChainEnv<'_>) -> Result<Value> {
        if env.args.block_ref().is_some() {
            return env.next();
        }

        let key = format!("return_value:{}", env.method());
        let table = env
            .entity()
            .state()
            .fetch(key, || Value::object(Memo::default()));
        let Some(memo) = table.downcast_ref::<Memo>() else {
            return env.next();
        };

        let cached = memo
            .lock()
            .iter()
            .find(|(args, _)| *args == env.args)
            .map(|(_, value)| value.clone());
        if let Some(value) = cached {
            return Ok(value);
        }

        trace!(method = env.method(), "cache miss");
        let value = env.next()?;
        memo.lock().push((env.args.clone(), value.clone()));
        Ok(value)
    }
}
