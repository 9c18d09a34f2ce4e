//! Weather adapters.

mod nws;

pub use nws::NwsWeatherProvider;
