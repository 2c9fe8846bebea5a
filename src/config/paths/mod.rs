//! Filesystem locations used by configuration and state.

pub mod xdg_root;
