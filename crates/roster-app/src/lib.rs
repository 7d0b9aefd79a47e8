// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod forms;
pub mod model;
pub mod render;
pub mod state;
pub mod store;
pub mod validation;

pub use forms::*;
pub use model::*;
pub use render::*;
pub use state::*;
pub use store::*;
pub use validation::*;
