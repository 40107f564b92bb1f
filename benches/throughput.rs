use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use zedis::command::dispatch;
use zedis::config::{Config, SharedConfig};
use zedis::connection::ClientState;
use zedis::resp::RespValue;
use zedis::store::{self, SharedStore};
use zedis::types::border::RangeBorder;
use zedis::types::sorted_set::RedisSortedSet;

fn args(parts: &[&str]) -> Vec<RespValue> {
    parts
        .iter()
        .map(|p| RespValue::bulk_string(p.as_bytes().to_vec()))
        .collect()
}

fn ops_per_sec(iterations: usize, start: Instant) -> f64 {
    iterations as f64 / start.elapsed().as_secs_f64()
}

/// Engine only: no lock, no argument parsing.
fn bench_engine(iterations: usize) -> (f64, f64, f64, f64) {
    let mut zset = RedisSortedSet::new();

    let start = Instant::now();
    for i in 0..iterations {
        zset.add(format!("member_{i}").into_bytes(), (i * 7 % iterations) as f64);
    }
    let add_ops = ops_per_sec(iterations, start);

    let start = Instant::now();
    for i in 0..iterations {
        let _ = zset.rank(format!("member_{i}").as_bytes());
    }
    let rank_ops = ops_per_sec(iterations, start);

    let min = RangeBorder::inclusive(100.0);
    let max = RangeBorder::exclusive(200.0);
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = zset.count(&min, &max);
    }
    let count_ops = ops_per_sec(iterations, start);

    let start = Instant::now();
    for i in 0..iterations {
        zset.remove(format!("member_{i}").as_bytes());
    }
    let remove_ops = ops_per_sec(iterations, start);

    (add_ops, rank_ops, count_ops, remove_ops)
}

async fn bench_commands(store: &SharedStore, config: &SharedConfig, iterations: usize) -> (f64, f64) {
    let mut client = ClientState::new();

    let start = Instant::now();
    for i in 0..iterations {
        let score = i.to_string();
        let member = format!("member_{i}");
        dispatch("ZADD", &args(&["bench", &score, &member]), store, config, &mut client).await;
    }
    let zadd_ops = ops_per_sec(iterations, start);

    let start = Instant::now();
    for _ in 0..iterations {
        dispatch(
            "ZRANGEBYSCORE",
            &args(&["bench", "(100", "+inf", "LIMIT", "0", "10"]),
            store,
            config,
            &mut client,
        )
        .await;
    }
    let range_ops = ops_per_sec(iterations, start);

    (zadd_ops, range_ops)
}

#[tokio::main]
async fn main() {
    let iterations = 100_000;
    let config = Config::default();
    let store = store::shared(config.databases);
    let config = Arc::new(RwLock::new(config));

    println!("=== Zedis Benchmark ({iterations} operations) ===\n");

    let (add_ops, rank_ops, count_ops, remove_ops) = bench_engine(iterations);
    println!("add:            {add_ops:>10.0} ops/sec");
    println!("rank:           {rank_ops:>10.0} ops/sec");
    println!("count:          {count_ops:>10.0} ops/sec");
    println!("remove:         {remove_ops:>10.0} ops/sec");

    let (zadd_ops, range_ops) = bench_commands(&store, &config, iterations).await;
    println!("ZADD:           {zadd_ops:>10.0} ops/sec");
    println!("ZRANGEBYSCORE:  {range_ops:>10.0} ops/sec (LIMIT 0 10)");

    println!("\n=== Done ===");
}
