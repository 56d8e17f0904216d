// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod controller;
pub mod forms;
pub mod ids;
pub mod model;
pub mod selection;
pub mod state;
pub mod store;
pub mod validation;

pub use controller::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use selection::*;
pub use state::*;
pub use store::*;
pub use validation::*;
