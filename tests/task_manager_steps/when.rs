//! When steps for task manager BDD scenarios.

use super::world::{TaskManagerWorld, run_async};
use rstest_bdd_macros::when;

#[when(r#"the user sends "{input}" to the "{backend}" backend"#)]
fn send_request(
    world: &mut TaskManagerWorld,
    input: String,
    backend: String,
) -> Result<(), eyre::Report> {
    let result = run_async(world.manager()?.process(&input, &backend));
    world.last_result = Some(result);
    Ok(())
}
