/// Sandboxed Lua evaluation for logic nodes
///
/// Each evaluation gets a fresh interpreter with the filesystem, process and
/// module-loading globals removed. Predecessor outputs are exposed as the
/// global `inputs` table, keyed by predecessor node ID.
///
/// Scripts run on tokio's blocking pool, so a slow script never stalls the
/// async workers and a caller-side timeout around the execution still fires.
/// A script that outlives `SCRIPT_TIME_LIMIT` is aborted with a script error.

use crate::runtime::error::NodeError;
use crate::workflow::types::NodeInputs;
use mlua::{HookTriggers, Lua, LuaSerdeExt, VmState};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Globals removed from every interpreter before user code runs
const BLOCKED_GLOBALS: [&str; 8] = [
    "os", "io", "debug", "package", "require", "load", "dofile", "loadfile",
];

/// Wall-clock budget for a single script evaluation
pub const SCRIPT_TIME_LIMIT: Duration = Duration::from_secs(5);

/// How often (in VM instructions) the deadline is checked
const DEADLINE_CHECK_INTERVAL: u32 = 10_000;

/// Evaluate an expression or chunk and convert its result to JSON
///
/// Plain expressions (`inputs.a.count * 2`) and chunks with an explicit
/// `return` are both accepted.
pub async fn evaluate(source: &str, inputs: &NodeInputs) -> Result<Value, NodeError> {
    let (source, inputs) = (source.to_string(), inputs.clone());
    on_blocking_pool(move || eval_json(&source, &inputs, SCRIPT_TIME_LIMIT)).await
}

/// Evaluate an expression and apply Lua truthiness (only `nil` and `false` are false)
pub async fn evaluate_truthy(source: &str, inputs: &NodeInputs) -> Result<bool, NodeError> {
    let (source, inputs) = (source.to_string(), inputs.clone());
    on_blocking_pool(move || eval_truthy(&source, &inputs, SCRIPT_TIME_LIMIT)).await
}

async fn on_blocking_pool<T, F>(job: F) -> Result<T, NodeError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, NodeError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| NodeError::Failed(format!("script task failed: {}", e)))?
}

fn eval_json(source: &str, inputs: &NodeInputs, limit: Duration) -> Result<Value, NodeError> {
    let lua = sandbox(inputs, limit)?;
    let result: mlua::Value = lua.load(source).eval().map_err(script_error)?;
    lua.from_value(result).map_err(script_error)
}

fn eval_truthy(source: &str, inputs: &NodeInputs, limit: Duration) -> Result<bool, NodeError> {
    let lua = sandbox(inputs, limit)?;
    let result: mlua::Value = lua.load(source).eval().map_err(script_error)?;
    Ok(!matches!(result, mlua::Value::Nil | mlua::Value::Boolean(false)))
}

fn sandbox(inputs: &NodeInputs, limit: Duration) -> Result<Lua, NodeError> {
    let lua = Lua::new();
    {
        let globals = lua.globals();

        for name in BLOCKED_GLOBALS {
            globals.set(name, mlua::Nil).map_err(script_error)?;
        }

        let now = lua
            .create_function(|_, ()| Ok(chrono::Utc::now().to_rfc3339()))
            .map_err(script_error)?;
        globals.set("now", now).map_err(script_error)?;

        let time = lua
            .create_function(|_, ()| Ok(chrono::Utc::now().timestamp()))
            .map_err(script_error)?;
        globals.set("time", time).map_err(script_error)?;

        let inputs = lua.to_value(inputs).map_err(script_error)?;
        globals.set("inputs", inputs).map_err(script_error)?;
    }

    let deadline = Instant::now() + limit;
    lua.set_hook(
        HookTriggers::new().every_nth_instruction(DEADLINE_CHECK_INTERVAL),
        move |_, _| {
            if Instant::now() >= deadline {
                Err(mlua::Error::runtime(format!("script exceeded time limit of {:?}", limit)))
            } else {
                Ok(VmState::Continue)
            }
        },
    )
    .map_err(script_error)?;

    Ok(lua)
}

fn script_error(err: mlua::Error) -> NodeError {
    NodeError::Script(err.to_string())
}
