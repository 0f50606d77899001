//! Fixed demonstration sequence
//!
//! Runs every boundary call once, in order, writing one human-readable line
//! per step and per callback invocation.

use crate::config::DemoConfig;
use crate::native::NativeApi;
use anyhow::{Context, Result};
use std::io::{self, Write};

/// Results of one demo run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoSummary {
    pub sum: i32,
    pub processed_string: String,
    pub fibonacci: u64,
    pub processed_count: i32,
    pub doubled: Vec<i32>,
    pub total: i32,
    pub running_totals: Vec<i32>,
    pub list_sum: i32,
}

/// Callback handler that writes one line per value and records it
///
/// Write failures cannot propagate through the native frames, so the first
/// one is kept and reported by [`LineEcho::finish`].
struct LineEcho<'w, W: Write> {
    out: &'w mut W,
    prefix: &'static str,
    values: Vec<i32>,
    error: Option<io::Error>,
}

impl<'w, W: Write> LineEcho<'w, W> {
    fn new(out: &'w mut W, prefix: &'static str) -> Self {
        Self {
            out,
            prefix,
            values: Vec::new(),
            error: None,
        }
    }

    fn on_value(&mut self, value: i32) {
        self.values.push(value);
        if self.error.is_none() {
            if let Err(e) = writeln!(self.out, "  → {}: {}", self.prefix, value) {
                self.error = Some(e);
            }
        }
    }

    fn finish(self) -> io::Result<Vec<i32>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.values),
        }
    }
}

/// Run the full demo against `api`, writing progress to `out`
pub fn run_demo<W: Write>(
    api: &NativeApi<'_>,
    config: &DemoConfig,
    out: &mut W,
) -> Result<DemoSummary> {
    writeln!(out, "=== Native Interop Demo ===")?;

    // Example 1: simple addition
    let (a, b) = (config.add.a, config.add.b);
    let sum = api.add(a, b);
    writeln!(out, "{} + {} = {}", a, b, sum)?;

    // Example 2: string round trip through native memory
    let processed_string = api
        .process_string(&config.string.input)
        .context("String processing failed")?;
    writeln!(out, "Processed string: {}", processed_string)?;

    // Example 3: Fibonacci
    let n = config.fibonacci.n;
    let fibonacci = api.fibonacci(n);
    writeln!(out, "Fibonacci({}) = {}", n, fibonacci)?;

    writeln!(out, "\n=== Callback Examples ===")?;

    // Example 4: doubling with a per-element callback
    writeln!(out, "\nExample 4: Processing data with callback")?;
    let data = &config.buffers.process;
    writeln!(out, "Original data: {:?}", data)?;
    writeln!(out, "Native side will double each value and call back:")?;
    let mut echo = LineEcho::new(out, "Native processed value");
    let processed_count = api.process_buffer(data, |v| echo.on_value(v))?;
    let doubled = echo.finish()?;
    writeln!(out, "Processed {} elements", processed_count)?;

    // Example 5: running totals
    writeln!(out, "\nExample 5: Sum calculation with running totals callback")?;
    let data = &config.buffers.sum;
    writeln!(out, "Data: {:?}", data)?;
    writeln!(out, "Native side will calculate running sums and call back:")?;
    let mut echo = LineEcho::new(out, "Running sum");
    let total = api.sum_buffer(data, |v| echo.on_value(v))?;
    let running_totals = echo.finish()?;
    writeln!(out, "Final sum: {}", total)?;

    // Example 6: a list grown on the heap before crossing
    writeln!(out, "\nExample 6: Running sum over a growable list")?;
    let mut list = Vec::with_capacity(config.buffers.list.len());
    list.extend_from_slice(&config.buffers.list);
    writeln!(out, "List: {:?}", list)?;
    let mut echo = LineEcho::new(out, "Running sum");
    let list_sum = api.sum_buffer(&list, |v| echo.on_value(v))?;
    echo.finish()?;
    writeln!(out, "Sum of list: {}", list_sum)?;

    out.flush()?;

    Ok(DemoSummary {
        sum,
        processed_string,
        fibonacci,
        processed_count,
        doubled,
        total,
        running_totals,
        list_sum,
    })
}
