//! Schema configuration scenarios: test data trees and the multi-step runner

pub mod data;
pub mod hcl;
pub mod runner;

pub use data::{
    ColumnTestData, PatchLock, SchemaConfigTestData, SchemaTestData, TableTestData,
    SYSTEM_COLUMN_REASON_CODE, SYSTEM_TABLE_REASON_CODE,
};
pub use hcl::{hcl_block_keys, hcl_entity_paths};
pub use runner::{
    setup_complex_test, setup_complex_test_with_columns_reload, setup_one_step_test,
    ScenarioReport, ScenarioStep, SchemaScenario, StepReport,
};
