// Realtime refresh: owned push channel, wire framing and view bindings.
pub mod backoff;
pub mod binding;
pub mod channel;
pub mod frame;
