pub mod memory;
pub mod redis;

pub use self::memory::InMemorySessionCache;
pub use self::redis::RedisSessionCache;
