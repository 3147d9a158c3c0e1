use crate::model::candle::PriceSource;
use crate::model::{BlockCategory, BlockTemplate, ParamSpec, PortSpec, ValueKind};

const OPERATORS: [&str; 6] = [">", "<", ">=", "<=", "==", "!="];
const MATH_OPERATORS: [&str; 6] = ["add", "subtract", "multiply", "divide", "min", "max"];

fn template(
    block_type: &str,
    category: BlockCategory,
    description: &str,
    parameters: Vec<ParamSpec>,
    inputs: Vec<PortSpec>,
    outputs: Vec<PortSpec>,
) -> BlockTemplate {
    BlockTemplate {
        block_type: block_type.to_string(),
        category,
        description: description.to_string(),
        parameters,
        inputs,
        outputs,
    }
}

fn number(id: &str, label: &str) -> PortSpec {
    PortSpec::new(id, label, ValueKind::Number)
}

fn boolean(id: &str, label: &str) -> PortSpec {
    PortSpec::new(id, label, ValueKind::Boolean)
}

fn period(default: f64) -> ParamSpec {
    ParamSpec::integer("period", default, 1.0, 500.0)
}

fn source() -> ParamSpec {
    ParamSpec::choice("source", &PriceSource::NAMES, "close")
}

fn action(block_type: &str, description: &str, mut parameters: Vec<ParamSpec>) -> BlockTemplate {
    if block_type != "alert" {
        parameters.insert(0, ParamSpec::number("size", 1.0).with_bounds(0.0, f64::MAX));
    }
    template(
        block_type,
        BlockCategory::Action,
        description,
        parameters,
        vec![boolean("trigger", "Trigger")],
        vec![PortSpec::new("fired", "Fired", ValueKind::Signal)],
    )
}

/// The built-in block set, in listing order.
pub fn templates() -> Vec<BlockTemplate> {
    use BlockCategory::*;

    vec![
        // ── Indicators ──────────────────────────────────────────────
        template(
            "price",
            Indicator,
            "Fields of the current candle.",
            vec![],
            vec![],
            vec![
                number("open", "Open"),
                number("high", "High"),
                number("low", "Low"),
                number("close", "Close"),
                number("volume", "Volume"),
                PortSpec::new("candle", "Candle", ValueKind::Candle),
            ],
        ),
        template(
            "sma",
            Indicator,
            "Simple moving average over `period` candles.",
            vec![period(14.0), source()],
            vec![],
            vec![number("value", "SMA")],
        ),
        template(
            "ema",
            Indicator,
            "Exponential moving average, seeded from the SMA of its first window.",
            vec![period(14.0), source()],
            vec![],
            vec![number("value", "EMA")],
        ),
        template(
            "rsi",
            Indicator,
            "Relative strength index with Wilder smoothing.",
            vec![period(14.0), source()],
            vec![],
            vec![number("value", "RSI")],
        ),
        template(
            "bollinger",
            Indicator,
            "Bollinger bands: SMA plus/minus `std_dev` population standard deviations.",
            vec![
                period(20.0),
                ParamSpec::number("std_dev", 2.0).with_bounds(0.1, 10.0),
                source(),
            ],
            vec![],
            vec![
                number("upper", "Upper"),
                number("middle", "Middle"),
                number("lower", "Lower"),
            ],
        ),
        template(
            "macd",
            Indicator,
            "MACD line, signal line and histogram.",
            vec![
                ParamSpec::integer("fast", 12.0, 1.0, 500.0),
                ParamSpec::integer("slow", 26.0, 1.0, 500.0),
                ParamSpec::integer("signal", 9.0, 1.0, 500.0),
                source(),
            ],
            vec![],
            vec![
                number("macd", "MACD"),
                number("signal", "Signal"),
                number("histogram", "Histogram"),
            ],
        ),
        template(
            "atr",
            Indicator,
            "Average true range with Wilder smoothing.",
            vec![period(14.0)],
            vec![],
            vec![number("value", "ATR")],
        ),
        // ── Conditions ──────────────────────────────────────────────
        template(
            "threshold",
            Condition,
            "Compares an input against a fixed threshold.",
            vec![
                ParamSpec::choice("operator", &OPERATORS, ">"),
                ParamSpec::number("threshold", 0.0),
            ],
            vec![number("value", "Value")],
            vec![boolean("result", "Result")],
        ),
        template(
            "compare",
            Condition,
            "Compares two inputs.",
            vec![ParamSpec::choice("operator", &OPERATORS, ">")],
            vec![number("a", "A"), number("b", "B")],
            vec![boolean("result", "Result")],
        ),
        template(
            "crossover",
            Condition,
            "Detects the step at which `fast` crosses above or below `slow`.",
            vec![],
            vec![number("fast", "Fast"), number("slow", "Slow")],
            vec![
                boolean("cross_up", "Crossed up"),
                boolean("cross_down", "Crossed down"),
            ],
        ),
        template(
            "in_range",
            Condition,
            "True while the input lies within [min, max].",
            vec![
                ParamSpec::number("min", 0.0),
                ParamSpec::number("max", 100.0),
            ],
            vec![number("value", "Value")],
            vec![boolean("result", "Result")],
        ),
        template(
            "bullish_candle",
            Condition,
            "True when the candle closes above its open.",
            vec![],
            vec![PortSpec::new("candle", "Candle", ValueKind::Candle)],
            vec![boolean("result", "Result")],
        ),
        // ── Logic ───────────────────────────────────────────────────
        template(
            "and",
            Logic,
            "True when both inputs are true.",
            vec![],
            vec![boolean("a", "A"), boolean("b", "B")],
            vec![boolean("result", "Result")],
        ),
        template(
            "or",
            Logic,
            "True when either input is true.",
            vec![],
            vec![boolean("a", "A"), boolean("b", "B")],
            vec![boolean("result", "Result")],
        ),
        template(
            "not",
            Logic,
            "Negates its input.",
            vec![],
            vec![boolean("input", "Input")],
            vec![boolean("result", "Result")],
        ),
        template(
            "consecutive",
            Logic,
            "Counts consecutive steps the condition held; true once the count reaches `bars`.",
            vec![ParamSpec::integer("bars", 3.0, 1.0, 500.0)],
            vec![boolean("condition", "Condition")],
            vec![number("count", "Count"), boolean("result", "Result")],
        ),
        // ── Variables ───────────────────────────────────────────────
        template(
            "constant",
            Variable,
            "A fixed number.",
            vec![ParamSpec::number("value", 0.0)],
            vec![],
            vec![number("value", "Value")],
        ),
        template(
            "math",
            Variable,
            "Arithmetic on two inputs.",
            vec![ParamSpec::choice("operator", &MATH_OPERATORS, "add")],
            vec![number("a", "A"), number("b", "B")],
            vec![number("result", "Result")],
        ),
        template(
            "previous",
            Variable,
            "The connected value as of the previous step. Its input still orders \
             the graph, so it cannot close a feedback loop.",
            vec![],
            vec![PortSpec::new("value", "Value", ValueKind::Any)],
            vec![PortSpec::new("value", "Previous", ValueKind::Any)],
        ),
        // ── Actions ─────────────────────────────────────────────────
        action("buy", "Emit a buy signal when triggered.", vec![]),
        action("sell", "Emit a sell signal when triggered.", vec![]),
        action(
            "stop_loss",
            "Emit a stop-loss signal when triggered.",
            vec![ParamSpec::number("percent", 2.0).with_bounds(0.0, 100.0)],
        ),
        action(
            "take_profit",
            "Emit a take-profit signal when triggered.",
            vec![ParamSpec::number("percent", 4.0).with_bounds(0.0, 100.0)],
        ),
        action(
            "alert",
            "Emit an alert carrying `message` when triggered.",
            vec![ParamSpec::text("message", "alert")],
        ),
    ]
}
