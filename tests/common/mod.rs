pub mod mocks;
pub mod test_utils;

#[allow(unused_imports)]
pub use mocks::{MockKlingApi, ScriptedStatus};
#[allow(unused_imports)]
pub use test_utils::{create_global_test_config, create_test_config};
