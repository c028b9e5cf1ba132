pub mod controller;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod search;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
