//! Runtime animation blend graph.
//!
//! Each [`StateMachine`] drives one skinned entity: every [`AnimationGraph::tick`] samples the
//! active [`State`] through its blend tree, arbitrates the outgoing [`Transition`]s, cross-fades
//! into the target state while a transition runs and writes the resulting joint transforms to a
//! [`SceneGraph`].
//!
//! All objects live in fixed-capacity pools sized by [`GraphLimits`] and are addressed through
//! generational [`Handle`]s.

#![forbid(unsafe_code)]

mod arena;
mod config;
mod error;
mod handle;
mod list;
mod pool;
mod runtime;
mod scene;
mod skin;
mod track;

pub use arena::*;
pub use config::*;
pub use error::*;
pub use handle::*;
pub use pool::*;
pub use runtime::*;
pub use scene::*;
pub use skin::*;
pub use track::*;
