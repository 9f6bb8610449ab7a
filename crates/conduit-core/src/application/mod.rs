/// Flow State Store
pub mod current_flow;

/// Navigation policy over the store
pub mod navigation;

pub(crate) mod reducer;
