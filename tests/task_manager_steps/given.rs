//! Given steps for task manager BDD scenarios.

use super::world::TaskManagerWorld;
use rstest_bdd_macros::given;
use tasktrace::observability::adapters::InMemoryTraceExporter;

#[given("a task manager with a recording exporter")]
fn recording_manager(world: &mut TaskManagerWorld) -> Result<(), eyre::Report> {
    world.install(InMemoryTraceExporter::new())
}

#[given("a task manager whose exporter always fails")]
fn failing_manager(world: &mut TaskManagerWorld) -> Result<(), eyre::Report> {
    world.install(InMemoryTraceExporter::always_failing())
}
