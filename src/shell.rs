//! Line-oriented front end: one inline command per line in, one
//! human-readable reply out.

use crate::command;
use crate::config::SharedConfig;
use crate::connection::ClientState;
use crate::error::ZedisResult;
use crate::resp::{RespValue, split_inline_command};
use crate::store::SharedStore;
use std::fmt::Write as _;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Run commands from `input` until EOF or `QUIT`, writing each reply to
/// `output`. Returns the number of commands executed.
pub async fn run<R, W>(
    input: R,
    mut output: W,
    store: &SharedStore,
    config: &SharedConfig,
) -> ZedisResult<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut client = ClientState::new();
    let mut lines = input.lines();
    let mut executed = 0u64;
    info!(client = client.id, "session started");

    while let Some(line) = lines.next_line().await? {
        let reply = match split_inline_command(&line) {
            Ok(tokens) if tokens.is_empty() => continue,
            Ok(tokens) => {
                let name = tokens[0].to_uppercase();
                let args: Vec<RespValue> = tokens[1..]
                    .iter()
                    .map(|t| RespValue::bulk_string(t.as_bytes().to_vec()))
                    .collect();
                executed += 1;
                command::dispatch(&name, &args, store, config, &mut client).await
            }
            Err(e) => e.into(),
        };

        output.write_all(render(&reply).as_bytes()).await?;
        output.flush().await?;

        if client.should_close {
            break;
        }
    }

    debug!(client = client.id, executed, "session finished");
    Ok(executed)
}

/// Render a reply the way redis-cli does.
pub fn render(value: &RespValue) -> String {
    let mut out = String::new();
    render_into(&mut out, value, 0);
    out
}

fn render_into(out: &mut String, value: &RespValue, indent: usize) {
    match value {
        RespValue::SimpleString(s) => {
            let _ = writeln!(out, "{s}");
        }
        RespValue::Error(s) => {
            let _ = writeln!(out, "(error) {s}");
        }
        RespValue::Integer(n) => {
            let _ = writeln!(out, "(integer) {n}");
        }
        RespValue::BulkString(None) => out.push_str("(nil)\n"),
        RespValue::BulkString(Some(data)) => {
            let _ = writeln!(out, "\"{}\"", String::from_utf8_lossy(data));
        }
        RespValue::Array(items) if items.is_empty() => out.push_str("(empty array)\n"),
        RespValue::Array(items) => {
            let width = items.len().to_string().len();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(&" ".repeat(indent));
                }
                let _ = write!(out, "{:>width$}) ", i + 1);
                render_into(out, item, indent + width + 2);
            }
        }
    }
}
