// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod detail;
pub mod ids;
pub mod model;
pub mod notify;
pub mod state;
pub mod truncation;

pub use detail::*;
pub use ids::*;
pub use model::*;
pub use notify::*;
pub use state::*;
pub use truncation::*;
