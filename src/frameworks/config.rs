use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn bind_host() -> String {
    env::var("ARENA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
}

pub fn http_port() -> u16 {
    env::var("ARENA_PORT")
        .or_else(|_| env::var("PORT"))
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000)
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const OUTBOUND_BROADCAST_CAPACITY: usize = 256;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 60);
