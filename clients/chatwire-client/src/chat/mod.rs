//! Chat module
//!
//! Session identity, the message dispatcher and the surfaces that render
//! its output.

pub mod dispatch;
pub mod identity;
pub mod session;
pub mod view;
