mod cancellation;
mod common;
mod room;
