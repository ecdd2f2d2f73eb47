mod blend;
mod graph;
mod mask;
mod nodes;
mod pose;
mod tick;

pub use blend::*;
pub use graph::*;
pub use mask::*;
pub use nodes::*;
pub use pose::*;

#[cfg(test)]
mod testing;



#[cfg(test)]
mod graph_tests;
