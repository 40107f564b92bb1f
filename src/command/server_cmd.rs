use crate::command::{arg_to_i64, arg_to_string, wrong_arg_count};
use crate::config::{Config, SharedConfig};
use crate::connection::ClientState;
use crate::error::ZedisError;
use crate::resp::RespValue;
use crate::store::SharedStore;
use tracing::info;

pub fn cmd_ping(args: &[RespValue]) -> RespValue {
    match args {
        [] => RespValue::SimpleString("PONG".to_string()),
        [msg] => match msg.as_str() {
            Some(msg) => RespValue::bulk_string(msg.to_vec()),
            None => RespValue::SimpleString("PONG".to_string()),
        },
        _ => wrong_arg_count("ping"),
    }
}

pub fn cmd_echo(args: &[RespValue]) -> RespValue {
    match args[0].as_str() {
        Some(msg) => RespValue::bulk_string(msg.to_vec()),
        None => RespValue::null_bulk_string(),
    }
}

pub fn cmd_quit(client: &mut ClientState) -> RespValue {
    client.should_close = true;
    RespValue::ok()
}

pub async fn cmd_select(args: &[RespValue], client: &mut ClientState, config: &SharedConfig) -> RespValue {
    let db_index = match arg_to_i64(&args[0]) {
        Some(n) if n >= 0 => n as usize,
        Some(_) => return RespValue::error("ERR DB index is out of range"),
        None => return ZedisError::NotInteger.into(),
    };

    let cfg = config.read().await;
    if db_index >= cfg.databases {
        return RespValue::error("ERR DB index is out of range");
    }
    drop(cfg);

    client.db_index = db_index;
    RespValue::ok()
}

pub async fn cmd_dbsize(store: &SharedStore, client: &ClientState) -> RespValue {
    let store = store.read().await;
    RespValue::integer(store.databases[client.db_index].dbsize() as i64)
}

pub async fn cmd_flushdb(store: &SharedStore, client: &ClientState) -> RespValue {
    let mut store = store.write().await;
    store.db(client.db_index).flush();
    RespValue::ok()
}

pub async fn cmd_flushall(store: &SharedStore) -> RespValue {
    let mut store = store.write().await;
    store.flush_all();
    RespValue::ok()
}

/// CONFIG GET pattern / CONFIG SET parameter value. GET accepts `*` or an
/// exact parameter name.
pub async fn cmd_config(args: &[RespValue], config: &SharedConfig) -> RespValue {
    let subcmd = match arg_to_string(&args[0]) {
        Some(s) => s.to_uppercase(),
        None => return RespValue::error("ERR invalid config subcommand"),
    };

    match subcmd.as_str() {
        "GET" => {
            if args.len() != 2 {
                return wrong_arg_count("config|get");
            }
            let pattern = match arg_to_string(&args[1]) {
                Some(s) => s.to_lowercase(),
                None => return RespValue::error("ERR invalid parameter"),
            };

            let cfg = config.read().await;
            let mut result = Vec::new();
            for param in Config::keys() {
                if pattern == "*" || pattern == *param {
                    if let Some(val) = cfg.get(param) {
                        result.push(RespValue::bulk_string(param.as_bytes().to_vec()));
                        result.push(RespValue::bulk_string(val.into_bytes()));
                    }
                }
            }
            RespValue::array(result)
        }
        "SET" => {
            if args.len() != 3 {
                return wrong_arg_count("config|set");
            }
            let (param, value) = match (arg_to_string(&args[1]), arg_to_string(&args[2])) {
                (Some(p), Some(v)) => (p, v),
                _ => return ZedisError::SyntaxError.into(),
            };

            let mut cfg = config.write().await;
            match cfg.set(&param, &value) {
                Ok(()) => {
                    info!(param = %param, value = %value, "config updated");
                    RespValue::ok()
                }
                Err(e) => ZedisError::Generic(e).into(),
            }
        }
        _ => RespValue::error(format!(
            "ERR unknown subcommand '{}'. Try CONFIG HELP.",
            subcmd.to_lowercase()
        )),
    }
}
