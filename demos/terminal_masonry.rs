//! Prints a masonry placement of a small card feed sized to the current
//! terminal. Run headless (e.g. piped) to see the fallback column count.

use masonry_mvp::{
    BreakpointTable, EngineConfig, HeightEstimator, MasonryEngine, Result, TerminalViewport,
    TextMetric, ViewportSignal,
};
use serde_json::{Value, json};

fn feed() -> Vec<Value> {
    let bodies = [
        "Short note.",
        "A somewhat longer paragraph that wraps over a couple of lines in most columns.",
        "Tiny.",
        "Release notes: placement is greedy, column counts follow the terminal width, and every resize re-runs the whole pass.",
        "Medium sized card with a title and a short body.",
        "Another quick one.",
        "Closing thoughts on balancing columns without measuring anything first.",
    ];
    bodies
        .iter()
        .enumerate()
        .map(|(i, body)| json!({"id": format!("card-{i}"), "body": body}))
        .collect()
}

fn main() -> Result<()> {
    let breakpoints = BreakpointTable::new([(0, 1), (60, 2), (100, 3), (140, 4)])?;
    let config = EngineConfig::default()
        .with_breakpoints(breakpoints)
        .with_fallback_columns(2)
        .with_gap(1.0)
        .with_estimator(
            HeightEstimator::compact()
                .with_base_offset(2.0)
                .with_metric(TextMetric::DisplayWidth),
        );

    let signal = ViewportSignal::new();
    let mut engine = MasonryEngine::new(feed(), config)?;
    engine.attach(&signal)?;
    TerminalViewport::seed(&signal);

    println!(
        "viewport width: {:?}, columns: {}",
        engine.viewport_width()?,
        engine.column_count()?
    );
    for (key, column, item) in engine.keyed_pairs()? {
        let body = item.get("body").and_then(Value::as_str).unwrap_or_default();
        println!("[{column}] {key}: {body}");
    }
    println!("extents: {:?}", engine.column_extents()?);
    Ok(())
}
