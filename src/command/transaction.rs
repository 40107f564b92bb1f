use crate::config::SharedConfig;
use crate::connection::ClientState;
use crate::resp::RespValue;
use crate::store::SharedStore;
use std::future::Future;
use std::pin::Pin;
use tracing::warn;

pub fn cmd_multi(client: &mut ClientState) -> RespValue {
    if client.in_multi {
        return RespValue::error("ERR MULTI calls can not be nested");
    }
    client.reset_transaction();
    client.in_multi = true;
    RespValue::ok()
}

/// Boxed because it re-enters `dispatch` for each queued command.
pub fn cmd_exec<'a>(
    store: &'a SharedStore,
    config: &'a SharedConfig,
    client: &'a mut ClientState,
) -> Pin<Box<dyn Future<Output = RespValue> + Send + 'a>> {
    Box::pin(async move {
        if !client.in_multi {
            return RespValue::error("ERR EXEC without MULTI");
        }

        if client.multi_error {
            warn!(client = client.id, queued = client.multi_queue.len(), "transaction aborted");
            client.reset_transaction();
            return RespValue::error("EXECABORT Transaction discarded because of previous errors.");
        }

        let queue = std::mem::take(&mut client.multi_queue);
        client.reset_transaction();

        let mut results = Vec::with_capacity(queue.len());
        for (cmd_name, args) in queue {
            let result = crate::command::dispatch(&cmd_name, &args, store, config, client).await;
            results.push(result);
        }

        RespValue::array(results)
    })
}

pub fn cmd_discard(client: &mut ClientState) -> RespValue {
    if !client.in_multi {
        return RespValue::error("ERR DISCARD without MULTI");
    }
    client.reset_transaction();
    RespValue::ok()
}
