//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates rendering details
//! to `components`. Protected pages wrap their body in `Protected`.

pub mod candidate_jobs;
pub mod home;
pub mod hr_dashboard;
pub mod login;
pub mod register;
