pub mod appsettings;
pub mod delivery;
pub mod models;
pub mod pipeline;
pub mod scheduling;
pub mod storage;

#[cfg(test)]
mod test_utils;
