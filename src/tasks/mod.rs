//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is alive.
//!
//! # Tasks
//! - TTL Sweep: Removes expired cache entries at configured intervals

mod sweeper;

pub(crate) use sweeper::{spawn_sweeper, SweeperHandle};
