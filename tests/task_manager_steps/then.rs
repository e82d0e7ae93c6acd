//! Then steps for task manager BDD scenarios.

use super::world::TaskManagerWorld;
use eyre::{WrapErr, eyre};
use rstest_bdd_macros::then;
use tasktrace::{
    observability::domain::TraceStatus,
    orchestrator::{ConfigurationError, OrchestratorError},
    task::ports::TaskStore,
};

#[then(r#"the response starts with "{prefix}""#)]
fn response_starts_with(world: &TaskManagerWorld, prefix: String) -> Result<(), eyre::Report> {
    let response = world.response()?;
    if !response.starts_with(&prefix) {
        return Err(eyre!("expected response starting with {prefix:?}, got {response:?}"));
    }
    Ok(())
}

#[then(r#"the response is "{expected}""#)]
fn response_is(world: &TaskManagerWorld, expected: String) -> Result<(), eyre::Report> {
    let response = world.response()?;
    if response != expected {
        return Err(eyre!("expected response {expected:?}, got {response:?}"));
    }
    Ok(())
}

#[then("the request is rejected as misconfigured")]
fn request_rejected(world: &TaskManagerWorld) -> Result<(), eyre::Report> {
    match &world.last_result {
        Some(Err(OrchestratorError::Configuration(ConfigurationError::UnknownBackend(_)))) => {
            Ok(())
        }
        other => Err(eyre!("expected a configuration error, got {other:?}")),
    }
}

#[then("{count:usize} trace is exported")]
fn traces_exported(world: &TaskManagerWorld, count: usize) -> Result<(), eyre::Report> {
    let traces = world.exported().wrap_err("collect exported traces")?;
    if traces.len() != count {
        return Err(eyre!("expected {count} trace(s), got {}", traces.len()));
    }
    Ok(())
}

#[then(r#"the last trace has status "{status}""#)]
fn last_trace_status(world: &TaskManagerWorld, status: String) -> Result<(), eyre::Report> {
    let traces = world.exported()?;
    let trace = traces.last().ok_or_else(|| eyre!("no trace exported"))?;
    if trace.status.as_str() != status {
        return Err(eyre!("expected status {status}, got {}", trace.status));
    }
    if trace.status == TraceStatus::Error
        && trace.error.as_deref().is_none_or(str::is_empty)
    {
        return Err(eyre!("error trace carries no detail"));
    }
    Ok(())
}

#[then(r#"the last trace has spans "{names}""#)]
fn last_trace_spans(world: &TaskManagerWorld, names: String) -> Result<(), eyre::Report> {
    let traces = world.exported()?;
    let trace = traces.last().ok_or_else(|| eyre!("no trace exported"))?;
    let expected: Vec<&str> = names.split(',').map(str::trim).collect();
    if trace.span_names() != expected {
        return Err(eyre!(
            "expected spans {expected:?}, got {:?}",
            trace.span_names()
        ));
    }
    Ok(())
}

#[then("the store holds {count:usize} tasks")]
fn store_holds(world: &TaskManagerWorld, count: usize) -> Result<(), eyre::Report> {
    let total = world.manager()?.store().stats().total;
    if total != count {
        return Err(eyre!("expected {count} tasks, found {total}"));
    }
    Ok(())
}

#[then("{count:u64} trace is counted as dropped")]
fn traces_dropped(world: &TaskManagerWorld, count: u64) -> Result<(), eyre::Report> {
    let manager = world.manager()?;
    world.exported()?;
    let dropped = manager.tracer().stats().traces_dropped;
    if dropped != count {
        return Err(eyre!("expected {count} dropped trace(s), got {dropped}"));
    }
    Ok(())
}
