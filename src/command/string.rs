use crate::command::{arg_to_bytes, arg_to_string, wrong_type_error};
use crate::connection::ClientState;
use crate::error::ZedisError;
use crate::resp::RespValue;
use crate::store::SharedStore;
use crate::types::RedisValue;
use crate::types::rstring::RedisString;

pub async fn cmd_get(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::null_bulk_string(),
    };

    let store = store.read().await;
    match store.databases[client.db_index].get(&key) {
        Some(value) => match value.as_string() {
            Some(s) => RespValue::bulk_string(s.as_bytes().to_vec()),
            None => wrong_type_error(),
        },
        None => RespValue::null_bulk_string(),
    }
}

/// SET key value [NX|XX] [GET]. Replaces a value of any type.
pub async fn cmd_set(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::error("ERR invalid key"),
    };
    let value = match arg_to_bytes(&args[1]) {
        Some(v) => v.to_vec(),
        None => return RespValue::error("ERR invalid value"),
    };

    let mut nx = false;
    let mut xx = false;
    let mut get = false;
    for arg in &args[2..] {
        let opt = match arg_to_string(arg) {
            Some(s) => s.to_uppercase(),
            None => return ZedisError::SyntaxError.into(),
        };
        match opt.as_str() {
            "NX" => nx = true,
            "XX" => xx = true,
            "GET" => get = true,
            _ => return ZedisError::SyntaxError.into(),
        }
    }
    if nx && xx {
        return ZedisError::SyntaxError.into();
    }

    let mut store = store.write().await;
    let db = store.db(client.db_index);

    let previous = match db.get(&key) {
        Some(RedisValue::String(s)) => Some(s.as_bytes().to_vec()),
        Some(_) if get => return wrong_type_error(),
        Some(_) => None,
        None => None,
    };
    let exists = db.exists(&key);

    let should_set = !(nx && exists) && !(xx && !exists);
    if should_set {
        db.set(key, RedisValue::String(RedisString::new(value)));
    }

    if get {
        match previous {
            Some(v) => RespValue::bulk_string(v),
            None => RespValue::null_bulk_string(),
        }
    } else if should_set {
        RespValue::ok()
    } else {
        RespValue::null_bulk_string()
    }
}
