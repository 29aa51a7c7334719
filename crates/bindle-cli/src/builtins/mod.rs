//! Loaders and plugins that config files can refer to by name.

pub mod loaders;
pub mod plugins;
