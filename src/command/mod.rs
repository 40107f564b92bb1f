pub mod key;
pub mod server_cmd;
pub mod sorted_set;
pub mod string;
pub mod transaction;

use crate::config::SharedConfig;
use crate::connection::ClientState;
use crate::error::ZedisError;
use crate::resp::RespValue;
use crate::store::SharedStore;
use tracing::debug;

/// Dispatch a parsed command to the appropriate handler.
///
/// `cmd_name` must already be upper-cased; `args` excludes the name.
pub async fn dispatch(
    cmd_name: &str,
    args: &[RespValue],
    store: &SharedStore,
    config: &SharedConfig,
    client: &mut ClientState,
) -> RespValue {
    debug!(client = client.id, db = client.db_index, cmd = cmd_name, argc = args.len(), "dispatch");

    let Some(arity) = command_arity(cmd_name) else {
        if client.in_multi {
            client.multi_error = true;
        }
        return unknown_command(cmd_name, args);
    };
    if !arity_matches(arity, args.len() + 1) {
        if client.in_multi {
            client.multi_error = true;
        }
        return wrong_arg_count(&cmd_name.to_lowercase());
    }

    // In MULTI mode everything but the transaction commands is queued
    if client.in_multi && !matches!(cmd_name, "EXEC" | "DISCARD" | "MULTI") {
        client.multi_queue.push((cmd_name.to_string(), args.to_vec()));
        return RespValue::SimpleString("QUEUED".to_string());
    }

    match cmd_name {
        // Connection
        "PING" => server_cmd::cmd_ping(args),
        "ECHO" => server_cmd::cmd_echo(args),
        "QUIT" => server_cmd::cmd_quit(client),
        "SELECT" => server_cmd::cmd_select(args, client, config).await,
        "DBSIZE" => server_cmd::cmd_dbsize(store, client).await,
        "FLUSHDB" => server_cmd::cmd_flushdb(store, client).await,
        "FLUSHALL" => server_cmd::cmd_flushall(store).await,
        "CONFIG" => server_cmd::cmd_config(args, config).await,

        // Strings
        "GET" => string::cmd_get(args, store, client).await,
        "SET" => string::cmd_set(args, store, client).await,

        // Keys
        "DEL" => key::cmd_del(args, store, client).await,
        "EXISTS" => key::cmd_exists(args, store, client).await,
        "TYPE" => key::cmd_type(args, store, client).await,

        // Sorted sets
        "ZADD" => sorted_set::cmd_zadd(args, store, client).await,
        "ZINCRBY" => sorted_set::cmd_zincrby(args, store, client).await,
        "ZREM" => sorted_set::cmd_zrem(args, store, client).await,
        "ZSCORE" => sorted_set::cmd_zscore(args, store, client).await,
        "ZCARD" => sorted_set::cmd_zcard(args, store, client).await,
        "ZRANK" => sorted_set::cmd_zrank(args, store, client, false).await,
        "ZREVRANK" => sorted_set::cmd_zrank(args, store, client, true).await,
        "ZCOUNT" => sorted_set::cmd_zcount(args, store, client).await,
        "ZRANGE" => sorted_set::cmd_zrange(args, store, client, false).await,
        "ZREVRANGE" => sorted_set::cmd_zrange(args, store, client, true).await,
        "ZRANGEBYSCORE" => sorted_set::cmd_zrangebyscore(args, store, client, false).await,
        "ZREVRANGEBYSCORE" => sorted_set::cmd_zrangebyscore(args, store, client, true).await,
        "ZREMRANGEBYSCORE" => sorted_set::cmd_zremrangebyscore(args, store, client).await,
        "ZREMRANGEBYRANK" => sorted_set::cmd_zremrangebyrank(args, store, client).await,
        "ZPOPMIN" => sorted_set::cmd_zpop(args, store, client, false).await,
        "ZPOPMAX" => sorted_set::cmd_zpop(args, store, client, true).await,

        // Transactions
        "MULTI" => transaction::cmd_multi(client),
        "EXEC" => transaction::cmd_exec(store, config, client).await,
        "DISCARD" => transaction::cmd_discard(client),

        _ => unknown_command(cmd_name, args),
    }
}

/// Redis-style arity, counting the command name: a positive value is an
/// exact argument count, a negative one a minimum.
fn command_arity(cmd: &str) -> Option<i32> {
    let arity = match cmd {
        "PING" => -1,
        "ECHO" => 2,
        "QUIT" => 1,
        "SELECT" => 2,
        "DBSIZE" => 1,
        "FLUSHDB" | "FLUSHALL" => -1,
        "CONFIG" => -2,
        "GET" => 2,
        "SET" => -3,
        "DEL" | "EXISTS" => -2,
        "TYPE" => 2,
        "ZADD" => -4,
        "ZINCRBY" => 4,
        "ZREM" => -3,
        "ZSCORE" | "ZRANK" | "ZREVRANK" => 3,
        "ZCARD" => 2,
        "ZCOUNT" | "ZREMRANGEBYSCORE" | "ZREMRANGEBYRANK" => 4,
        "ZRANGE" | "ZREVRANGE" | "ZRANGEBYSCORE" | "ZREVRANGEBYSCORE" => -4,
        "ZPOPMIN" | "ZPOPMAX" => -2,
        "MULTI" | "EXEC" | "DISCARD" => 1,
        _ => return None,
    };
    Some(arity)
}

fn arity_matches(arity: i32, argc: usize) -> bool {
    let argc = argc as i64;
    let arity = arity as i64;
    if arity >= 0 { argc == arity } else { argc >= -arity }
}

fn unknown_command(cmd_name: &str, args: &[RespValue]) -> RespValue {
    let args_preview: Vec<String> = args
        .iter()
        .take(3)
        .filter_map(|a| a.to_string_lossy())
        .map(|s| format!("'{s}'"))
        .collect();
    ZedisError::UnknownCommand(cmd_name.to_string(), args_preview.join(" ")).into()
}

/// Extract bytes from a RespValue argument.
pub fn arg_to_bytes(arg: &RespValue) -> Option<&[u8]> {
    arg.as_str()
}

/// Extract a String from a RespValue argument.
pub fn arg_to_string(arg: &RespValue) -> Option<String> {
    arg.to_string_lossy()
}

/// Extract an i64 from a RespValue argument.
pub fn arg_to_i64(arg: &RespValue) -> Option<i64> {
    let s = arg.to_string_lossy()?;
    s.parse().ok()
}

/// Extract a score from a RespValue argument. NaN is never a valid score,
/// and overflow to infinity is only accepted when spelled out.
pub fn arg_to_f64(arg: &RespValue) -> Option<f64> {
    let s = arg.to_string_lossy()?;
    let v: f64 = s.parse().ok()?;
    if v.is_nan() {
        return None;
    }
    if v.is_infinite() {
        let lower = s.to_lowercase();
        let trimmed = lower.trim_start_matches(['+', '-']);
        if trimmed != "inf" && trimmed != "infinity" {
            return None;
        }
    }
    Some(v)
}

/// Return a WRONGTYPE error.
pub fn wrong_type_error() -> RespValue {
    ZedisError::WrongType.into()
}

/// Return a wrong number of arguments error.
pub fn wrong_arg_count(cmd: &str) -> RespValue {
    ZedisError::WrongArgCount(cmd.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity() {
        assert!(arity_matches(-1, 1));
        assert!(arity_matches(-1, 2));
        assert!(!arity_matches(-4, 3));
        assert!(arity_matches(2, 2));
        assert!(!arity_matches(2, 3));
        assert_eq!(command_arity("ZADD"), Some(-4));
        assert_eq!(command_arity("zadd"), None);
        assert_eq!(command_arity("HSET"), None);
    }

    #[test]
    fn test_arg_to_f64() {
        let arg = |s: &str| RespValue::bulk_string(s.as_bytes().to_vec());
        assert_eq!(arg_to_f64(&arg("1.5")), Some(1.5));
        assert_eq!(arg_to_f64(&arg("-inf")), Some(f64::NEG_INFINITY));
        assert_eq!(arg_to_f64(&arg("+inf")), Some(f64::INFINITY));
        assert_eq!(arg_to_f64(&arg("nan")), None);
        assert_eq!(arg_to_f64(&arg("1e400")), None);
        assert_eq!(arg_to_f64(&arg("abc")), None);
    }

    #[test]
    fn test_unknown_command_preview() {
        let args = vec![
            RespValue::bulk_string(b"a".to_vec()),
            RespValue::bulk_string(b"b".to_vec()),
        ];
        assert_eq!(
            unknown_command("NOPE", &args),
            RespValue::error("ERR unknown command 'NOPE', with args beginning with: 'a' 'b'")
        );
    }
}
