use crate::command::arg_to_string;
use crate::connection::ClientState;
use crate::resp::RespValue;
use crate::store::SharedStore;

pub async fn cmd_del(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let mut store = store.write().await;
    let db = store.db(client.db_index);
    let mut count = 0i64;

    for arg in args {
        if let Some(key) = arg_to_string(arg) {
            if db.del(&key) {
                count += 1;
            }
        }
    }

    RespValue::integer(count)
}

/// Counts repeated keys once per mention, as Redis does.
pub async fn cmd_exists(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let store = store.read().await;
    let db = &store.databases[client.db_index];
    let count = args
        .iter()
        .filter_map(arg_to_string)
        .filter(|key| db.exists(key))
        .count();
    RespValue::integer(count as i64)
}

pub async fn cmd_type(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::SimpleString("none".to_string()),
    };

    let store = store.read().await;
    match store.databases[client.db_index].key_type(&key) {
        Some(t) => RespValue::SimpleString(t.to_string()),
        None => RespValue::SimpleString("none".to_string()),
    }
}
