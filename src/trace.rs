/*!
# Run Tracing

Opt-in pedagogical trace of a distributed run. With the `logging` feature
enabled and `DEBUG_FRAGMENTA` set to anything truthy, every send, receive,
postponement, probe, report, and edge adoption is emitted as a DEBUG event.
Thread names are included because the runner names each agent thread after its
node (`ghs-node-0`, `ghs-node-1`, ...), which makes an interleaved trace
readable per node.
*/

use ctor::ctor;
use tracing::Level;

/// True when the operator asked for a message trace.
fn trace_requested() -> bool {
    match std::env::var("DEBUG_FRAGMENTA") {
        Ok(v) => !(v.is_empty() || v == "0" || v == "false"),
        Err(_) => false,
    }
}

// Must run before the first agent thread can emit an event, hence ctor.
#[ctor]
fn init_run_tracing() {
    if trace_requested() {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_thread_names(true)
            .init();
    }
}
