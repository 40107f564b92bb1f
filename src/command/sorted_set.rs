use crate::command::{arg_to_bytes, arg_to_f64, arg_to_i64, arg_to_string, wrong_type_error};
use crate::connection::ClientState;
use crate::error::ZedisError;
use crate::resp::RespValue;
use crate::store::{Database, SharedStore};
use crate::types::RedisValue;
use crate::types::border::RangeBorder;
use crate::types::rstring::format_float;
use crate::types::skiplist::Element;
use crate::types::sorted_set::RedisSortedSet;

/// Look up a sorted set for reading. `Ok(None)` when the key is absent.
fn read_zset<'a>(db: &'a Database, key: &str) -> Result<Option<&'a RedisSortedSet>, RespValue> {
    match db.get(key) {
        Some(value) => value.as_sorted_set().map(Some).ok_or_else(wrong_type_error),
        None => Ok(None),
    }
}

/// Look up a sorted set for writing, creating an empty one if needed.
/// Callers must finish with `drop_if_empty` so no empty set is left behind.
fn write_zset<'a>(db: &'a mut Database, key: &str) -> Result<&'a mut RedisSortedSet, RespValue> {
    if !db.exists(key) {
        db.set(key.to_string(), RedisValue::SortedSet(RedisSortedSet::new()));
    }
    db.get_mut(key)
        .and_then(|value| value.as_sorted_set_mut())
        .ok_or_else(wrong_type_error)
}

fn drop_if_empty(db: &mut Database, key: &str) {
    if db.get(key).and_then(|v| v.as_sorted_set()).is_some_and(|z| z.is_empty()) {
        db.del(key);
    }
}

fn parse_border(arg: &RespValue) -> Result<RangeBorder, RespValue> {
    let text = arg_to_string(arg).ok_or(ZedisError::InvalidFormat)?;
    Ok(RangeBorder::parse(&text)?)
}

fn score_reply(score: f64) -> RespValue {
    RespValue::bulk_string(format_float(score).into_bytes())
}

fn elements_reply<'a>(elements: impl IntoIterator<Item = &'a Element>, withscores: bool) -> RespValue {
    let mut items = Vec::new();
    for element in elements {
        items.push(RespValue::bulk_string(element.member.clone()));
        if withscores {
            items.push(score_reply(element.score));
        }
    }
    RespValue::array(items)
}

/// Convert a Redis-style inclusive index pair (negatives count from the
/// end) into a clamped 0-based half-open window. None when it is empty.
fn normalize_rank_window(start: i64, stop: i64, len: u64) -> Option<(i64, i64)> {
    let len = len as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop };
    if start > stop || start >= len {
        return None;
    }
    Some((start, stop.min(len - 1) + 1))
}

pub async fn cmd_zadd(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::error("ERR invalid key"),
    };

    let mut nx = false;
    let mut xx = false;
    let mut gt = false;
    let mut lt = false;
    let mut ch = false;
    let mut incr = false;
    let mut i = 1;

    while i < args.len() {
        let opt = match arg_to_string(&args[i]) {
            Some(s) => s.to_uppercase(),
            None => break,
        };
        match opt.as_str() {
            "NX" => nx = true,
            "XX" => xx = true,
            "GT" => gt = true,
            "LT" => lt = true,
            "CH" => ch = true,
            "INCR" => incr = true,
            _ => break,
        }
        i += 1;
    }

    let pairs = &args[i..];
    if pairs.is_empty() || pairs.len() % 2 != 0 {
        return ZedisError::SyntaxError.into();
    }
    if nx && xx {
        return RespValue::error("ERR XX and NX options at the same time are not compatible");
    }
    if (gt && lt) || (nx && (gt || lt)) {
        return RespValue::error("ERR GT, LT, and/or NX options at the same time are not compatible");
    }
    if incr && pairs.len() != 2 {
        return RespValue::error("ERR INCR option supports a single increment-element pair");
    }

    // Validate every score before touching the set
    let mut updates = Vec::with_capacity(pairs.len() / 2);
    for pair in pairs.chunks(2) {
        let score = match arg_to_f64(&pair[0]) {
            Some(s) => s,
            None => return ZedisError::NotFloat.into(),
        };
        let member = match arg_to_bytes(&pair[1]) {
            Some(m) => m.to_vec(),
            None => return RespValue::error("ERR invalid member"),
        };
        updates.push((score, member));
    }

    let mut store = store.write().await;
    let db = store.db(client.db_index);
    let zset = match write_zset(db, &key) {
        Ok(z) => z,
        Err(e) => return e,
    };

    let mut added = 0i64;
    let mut changed = 0i64;
    let mut incr_result = None;

    for (score, member) in updates {
        let old_score = zset.score(&member);
        if nx && old_score.is_some() {
            continue;
        }
        if xx && old_score.is_none() {
            continue;
        }

        let new_score = match (incr, old_score) {
            (true, Some(old)) => old + score,
            _ => score,
        };
        if new_score.is_nan() {
            drop_if_empty(db, &key);
            return RespValue::error("ERR resulting score is not a number (NaN)");
        }
        if let Some(old) = old_score {
            if gt && new_score <= old {
                continue;
            }
            if lt && new_score >= old {
                continue;
            }
        }

        if zset.add(member, new_score) {
            added += 1;
        } else if old_score != Some(new_score) {
            changed += 1;
        }
        incr_result = Some(new_score);
    }
    drop_if_empty(db, &key);

    if incr {
        match incr_result {
            Some(score) => score_reply(score),
            None => RespValue::null_bulk_string(),
        }
    } else {
        RespValue::integer(if ch { added + changed } else { added })
    }
}

pub async fn cmd_zincrby(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::error("ERR invalid key"),
    };
    let delta = match arg_to_f64(&args[1]) {
        Some(d) => d,
        None => return ZedisError::NotFloat.into(),
    };
    let member = match arg_to_bytes(&args[2]) {
        Some(m) => m.to_vec(),
        None => return RespValue::error("ERR invalid member"),
    };

    let mut store = store.write().await;
    let db = store.db(client.db_index);
    let zset = match write_zset(db, &key) {
        Ok(z) => z,
        Err(e) => return e,
    };
    if zset.score(&member).is_some_and(|old| (old + delta).is_nan()) {
        return RespValue::error("ERR resulting score is not a number (NaN)");
    }
    let score = zset.incr_by(member, delta);
    score_reply(score)
}

pub async fn cmd_zrem(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::integer(0),
    };

    let mut store = store.write().await;
    let db = store.db(client.db_index);

    let removed = match db.get_mut(&key) {
        Some(value) => match value.as_sorted_set_mut() {
            Some(zset) => args[1..]
                .iter()
                .filter_map(arg_to_bytes)
                .filter(|member| zset.remove(member))
                .count(),
            None => return wrong_type_error(),
        },
        None => 0,
    };
    drop_if_empty(db, &key);
    RespValue::integer(removed as i64)
}

pub async fn cmd_zscore(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::null_bulk_string(),
    };
    let member = match arg_to_bytes(&args[1]) {
        Some(m) => m,
        None => return RespValue::null_bulk_string(),
    };

    let store = store.read().await;
    match read_zset(&store.databases[client.db_index], &key) {
        Ok(Some(zset)) => match zset.score(member) {
            Some(s) => score_reply(s),
            None => RespValue::null_bulk_string(),
        },
        Ok(None) => RespValue::null_bulk_string(),
        Err(e) => e,
    }
}

pub async fn cmd_zcard(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::integer(0),
    };

    let store = store.read().await;
    match read_zset(&store.databases[client.db_index], &key) {
        Ok(Some(zset)) => RespValue::integer(zset.len() as i64),
        Ok(None) => RespValue::integer(0),
        Err(e) => e,
    }
}

/// ZRANK / ZREVRANK.
pub async fn cmd_zrank(
    args: &[RespValue],
    store: &SharedStore,
    client: &ClientState,
    reverse: bool,
) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::null_bulk_string(),
    };
    let member = match arg_to_bytes(&args[1]) {
        Some(m) => m,
        None => return RespValue::null_bulk_string(),
    };

    let store = store.read().await;
    let zset = match read_zset(&store.databases[client.db_index], &key) {
        Ok(Some(z)) => z,
        Ok(None) => return RespValue::null_bulk_string(),
        Err(e) => return e,
    };
    let rank = if reverse { zset.rev_rank(member) } else { zset.rank(member) };
    match rank {
        Some(r) => RespValue::integer(r as i64),
        None => RespValue::null_bulk_string(),
    }
}

pub async fn cmd_zcount(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::integer(0),
    };
    let (min, max) = match (parse_border(&args[1]), parse_border(&args[2])) {
        (Ok(min), Ok(max)) => (min, max),
        (Err(e), _) | (_, Err(e)) => return e,
    };

    let store = store.read().await;
    match read_zset(&store.databases[client.db_index], &key) {
        Ok(Some(zset)) => RespValue::integer(zset.count(&min, &max) as i64),
        Ok(None) => RespValue::integer(0),
        Err(e) => e,
    }
}

/// ZRANGE / ZREVRANGE key start stop [WITHSCORES].
pub async fn cmd_zrange(
    args: &[RespValue],
    store: &SharedStore,
    client: &ClientState,
    reverse: bool,
) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::array(vec![]),
    };
    let (start, stop) = match (arg_to_i64(&args[1]), arg_to_i64(&args[2])) {
        (Some(start), Some(stop)) => (start, stop),
        _ => return ZedisError::NotInteger.into(),
    };
    let withscores = match args.len() {
        3 => false,
        4 if arg_to_string(&args[3]).is_some_and(|s| s.eq_ignore_ascii_case("WITHSCORES")) => true,
        _ => return ZedisError::SyntaxError.into(),
    };

    let store = store.read().await;
    let zset = match read_zset(&store.databases[client.db_index], &key) {
        Ok(Some(z)) => z,
        Ok(None) => return RespValue::array(vec![]),
        Err(e) => return e,
    };
    let Some((start, stop)) = normalize_rank_window(start, stop, zset.len()) else {
        return RespValue::array(vec![]);
    };
    match zset.range(start, stop, reverse) {
        Ok(elements) => elements_reply(elements, withscores),
        Err(e) => e.into(),
    }
}

/// ZRANGEBYSCORE key min max / ZREVRANGEBYSCORE key max min, both with
/// optional [WITHSCORES] [LIMIT offset count].
pub async fn cmd_zrangebyscore(
    args: &[RespValue],
    store: &SharedStore,
    client: &ClientState,
    reverse: bool,
) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::array(vec![]),
    };
    let (first, second) = match (parse_border(&args[1]), parse_border(&args[2])) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => return e,
    };
    let (min, max) = if reverse { (second, first) } else { (first, second) };

    let mut withscores = false;
    let mut offset = 0i64;
    let mut limit = -1i64;
    let mut i = 3;
    while i < args.len() {
        let opt = arg_to_string(&args[i]).unwrap_or_default().to_uppercase();
        match opt.as_str() {
            "WITHSCORES" => {
                withscores = true;
                i += 1;
            }
            "LIMIT" if i + 2 < args.len() => {
                match (arg_to_i64(&args[i + 1]), arg_to_i64(&args[i + 2])) {
                    (Some(o), Some(c)) => {
                        offset = o;
                        limit = c;
                    }
                    _ => return ZedisError::NotInteger.into(),
                }
                i += 3;
            }
            _ => return ZedisError::SyntaxError.into(),
        }
    }

    let store = store.read().await;
    match read_zset(&store.databases[client.db_index], &key) {
        Ok(Some(zset)) => {
            let elements = zset.range_by_score(&min, &max, offset, limit, reverse);
            elements_reply(elements, withscores)
        }
        Ok(None) => RespValue::array(vec![]),
        Err(e) => e,
    }
}

pub async fn cmd_zremrangebyscore(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::integer(0),
    };
    let (min, max) = match (parse_border(&args[1]), parse_border(&args[2])) {
        (Ok(min), Ok(max)) => (min, max),
        (Err(e), _) | (_, Err(e)) => return e,
    };

    let mut store = store.write().await;
    let db = store.db(client.db_index);
    let removed = match db.get_mut(&key) {
        Some(value) => match value.as_sorted_set_mut() {
            Some(zset) => zset.remove_by_score(&min, &max),
            None => return wrong_type_error(),
        },
        None => 0,
    };
    drop_if_empty(db, &key);
    RespValue::integer(removed as i64)
}

pub async fn cmd_zremrangebyrank(args: &[RespValue], store: &SharedStore, client: &ClientState) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::integer(0),
    };
    let (start, stop) = match (arg_to_i64(&args[1]), arg_to_i64(&args[2])) {
        (Some(start), Some(stop)) => (start, stop),
        _ => return ZedisError::NotInteger.into(),
    };

    let mut store = store.write().await;
    let db = store.db(client.db_index);
    let removed = match db.get_mut(&key) {
        Some(value) => match value.as_sorted_set_mut() {
            Some(zset) => match normalize_rank_window(start, stop, zset.len()) {
                Some((start, stop)) => zset.remove_by_rank(start as u64, stop as u64),
                None => 0,
            },
            None => return wrong_type_error(),
        },
        None => 0,
    };
    drop_if_empty(db, &key);
    RespValue::integer(removed as i64)
}

/// ZPOPMIN / ZPOPMAX key [count].
pub async fn cmd_zpop(
    args: &[RespValue],
    store: &SharedStore,
    client: &ClientState,
    max: bool,
) -> RespValue {
    let key = match arg_to_string(&args[0]) {
        Some(k) => k,
        None => return RespValue::array(vec![]),
    };
    let count = match args.len() {
        1 => 1,
        2 => match arg_to_i64(&args[1]) {
            Some(c) if c >= 0 => c as u64,
            Some(_) => return RespValue::error("ERR value is out of range, must be positive"),
            None => return ZedisError::NotInteger.into(),
        },
        _ => return ZedisError::SyntaxError.into(),
    };

    let mut store = store.write().await;
    let db = store.db(client.db_index);
    let mut popped = Vec::new();
    match db.get_mut(&key) {
        Some(value) => match value.as_sorted_set_mut() {
            Some(zset) => {
                while (popped.len() as u64) < count {
                    let next = if max { zset.pop_max() } else { zset.pop_min() };
                    match next {
                        Some(element) => popped.push(element),
                        None => break,
                    }
                }
            }
            None => return wrong_type_error(),
        },
        None => return RespValue::array(vec![]),
    }
    drop_if_empty(db, &key);
    elements_reply(&popped, true)
}
