//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read the session signal from Leptos context and render chrome
//! shared by every route.

pub mod nav_bar;
pub mod protected;
