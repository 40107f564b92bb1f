pub mod border;
pub mod rstring;
pub mod skiplist;
pub mod sorted_set;

/// The core value type stored in the data store.
#[derive(Debug, Clone)]
pub enum RedisValue {
    String(rstring::RedisString),
    SortedSet(sorted_set::RedisSortedSet),
}

impl RedisValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            RedisValue::String(_) => "string",
            RedisValue::SortedSet(_) => "zset",
        }
    }

    pub fn as_string(&self) -> Option<&rstring::RedisString> {
        match self {
            RedisValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sorted_set(&self) -> Option<&sorted_set::RedisSortedSet> {
        match self {
            RedisValue::SortedSet(z) => Some(z),
            _ => None,
        }
    }

    pub fn as_sorted_set_mut(&mut self) -> Option<&mut sorted_set::RedisSortedSet> {
        match self {
            RedisValue::SortedSet(z) => Some(z),
            _ => None,
        }
    }
}
