pub mod context;
pub mod coordination;
pub mod finalization;
pub mod outlet;
pub mod research;
pub mod state;
pub mod synthesis;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
