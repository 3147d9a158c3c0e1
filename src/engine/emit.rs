use crate::model::{Candle, ExecutionSignal};

use super::context::{ExecutionContext, PortValue};
use super::program::{BlockKind, Program};

/// Turn this step's fired action blocks into signals, in execution order.
/// Returns how many signals were emitted.
pub fn emit_signals(program: &Program, candle: &Candle, ctx: &mut ExecutionContext) -> usize {
    let mut emitted = 0;
    for block in program.actions() {
        let BlockKind::Action {
            kind,
            size,
            message,
        } = &block.kind
        else {
            continue;
        };
        if ctx.current.port(&block.id, "fired") != Some(PortValue::Signal(true)) {
            continue;
        }

        let signal = ExecutionSignal {
            kind: *kind,
            price: candle.close,
            timestamp: candle.time,
            index: ctx.index,
            size: *size,
            message: message.clone(),
            block_id: block.id.clone(),
        };
        tracing::debug!(
            block = %block.id,
            kind = %signal.kind,
            index = signal.index,
            price = signal.price,
            "signal"
        );
        ctx.emit(signal);
        emitted += 1;
    }
    emitted
}
