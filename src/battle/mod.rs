pub mod ai;
pub mod engine;
pub mod runner;
pub mod state;
pub mod stats;

#[cfg(test)]
mod test_ai;
#[cfg(test)]
mod test_moves;
