mod params;
mod results;
mod sse;
mod status;

pub(crate) use params::{get_params, restart, update_params};
pub(crate) use results::get_results;
pub(crate) use sse::sse_events;
pub(crate) use status::get_status;
