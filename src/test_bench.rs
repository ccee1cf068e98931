//! Clock/reset harness for Verilated-style models

use std::env;
use std::path::Path;

use crate::config::GlobalConfig;
use crate::error::{Result, VerilatedError};
use crate::vcd::VcdDump;

/// A model driven by [`TestBench`]
pub trait Module {
    /// Evaluate the model.  Application must call when inputs change.
    fn eval(&mut self);
    /// Simulation complete, run final blocks.
    fn finish(&mut self);

    fn clock_up(&mut self);
    fn clock_down(&mut self);

    fn reset_up(&mut self);
    fn reset_down(&mut self);

    /// Scope name registered with the runtime
    fn name(&self) -> &str {
        "TOP"
    }

    /// Declare traced signals on a dump about to be opened
    fn trace_declare(&mut self, _vcd: &mut VcdDump) {}

    /// Copy current signal values into the dump
    fn trace_sample(&self, _vcd: &mut VcdDump) {}
}

type TickFn<'a, M> = dyn FnMut(&mut M, u64) -> bool + 'a;

pub struct TestBench<'a, M: Module> {
    config: &'a GlobalConfig,
    core: M,
    tick_count: u64,
    tick_fn: Box<TickFn<'a, M>>,
    trace: Option<VcdDump>,
}

impl<'a, M: Module + Default> TestBench<'a, M> {
    /// Build a default model, recording this process's arguments
    pub fn init<F>(config: &'a GlobalConfig, f: F) -> Result<Self>
    where
        F: FnMut(&mut M, u64) -> bool + 'a,
    {
        let args: Vec<String> = env::args_os()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        Self::init_with_command_args(config, args, f)
    }

    pub fn init_with_command_args<I, S, F>(config: &'a GlobalConfig, args: I, f: F) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(&mut M, u64) -> bool + 'a,
    {
        config.command_args(args)?;
        Ok(Self::with_core(config, M::default(), f))
    }
}

impl<'a, M: Module> TestBench<'a, M> {
    /// Wrap an existing model; `f` runs after every tick and returning
    /// false ends the simulation
    pub fn with_core<F>(config: &'a GlobalConfig, core: M, f: F) -> Self
    where
        F: FnMut(&mut M, u64) -> bool + 'a,
    {
        config.register_scope(core.name());
        TestBench {
            config,
            core,
            tick_count: 0,
            tick_fn: Box::new(f),
            trace: None,
        }
    }

    pub fn core(&self) -> &M {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut M {
        &mut self.core
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Start dumping every clock edge to `path`
    pub fn open_trace(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if !self.config.trace_ever_on() {
            return Err(VerilatedError::TraceNotEnabled);
        }
        let mut vcd = VcdDump::new();
        vcd.set_module_name(self.core.name());
        self.core.trace_declare(&mut vcd);
        vcd.open(path)?;
        self.trace = Some(vcd);
        Ok(())
    }

    pub fn trace(&self) -> Option<&VcdDump> {
        self.trace.as_ref()
    }

    pub fn close_trace(&mut self) -> Result<()> {
        match self.trace.take() {
            Some(mut vcd) => vcd.close(),
            None => Ok(()),
        }
    }

    fn sample(&mut self, time: u64) -> Result<()> {
        if let Some(ref mut vcd) = self.trace {
            self.core.trace_sample(vcd);
            vcd.dump(time)?;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.core.reset_up();
        (self.tick_fn)(&mut self.core, self.tick_count);
        self.core.reset_down();
    }

    pub fn tick(&mut self) -> Result<()> {
        // Increment our own internal time reference
        self.tick_count += 1;
        if self.config.debug() > 0 {
            tracing::debug!(target: "verilated", "tick {}", self.tick_count);
        }

        // Settle combinational logic depending on inputs changed before the
        // rising edge.
        self.core.clock_down();
        self.core.eval();

        // Rising edge
        self.core.clock_up();
        self.core.eval();
        self.sample(self.tick_count * 2)?;

        // Falling edge
        self.core.clock_down();
        self.core.eval();
        self.sample(self.tick_count * 2 + 1)?;

        if !(self.tick_fn)(&mut self.core, self.tick_count) {
            self.config.set_got_finish(true);
            self.core.finish();
            if let Some(ref mut vcd) = self.trace {
                vcd.flush()?;
            }
        }
        Ok(())
    }

    pub fn done(&self) -> bool {
        self.config.got_finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcd::SignalId;
    use std::fs;

    #[derive(Default)]
    struct Counter {
        clk: bool,
        rst: bool,
        count: u8,
        last_clk: bool,
        finished: bool,
        ids: Option<(SignalId, SignalId)>,
    }

    impl Module for Counter {
        fn eval(&mut self) {
            if self.clk && !self.last_clk {
                self.count = if self.rst { 0 } else { self.count.wrapping_add(1) };
            }
            self.last_clk = self.clk;
        }
        fn finish(&mut self) {
            self.finished = true;
        }
        fn clock_up(&mut self) {
            self.clk = true;
        }
        fn clock_down(&mut self) {
            self.clk = false;
        }
        fn reset_up(&mut self) {
            self.rst = true;
            self.count = 0;
        }
        fn reset_down(&mut self) {
            self.rst = false;
        }
        fn name(&self) -> &str {
            "counter"
        }
        fn trace_declare(&mut self, vcd: &mut VcdDump) {
            self.ids = Some((vcd.declare("clk", 1), vcd.declare("count", 8)));
        }
        fn trace_sample(&self, vcd: &mut VcdDump) {
            if let Some((clk, count)) = self.ids {
                vcd.set(clk, self.clk as u64);
                vcd.set(count, self.count as u64);
            }
        }
    }

    #[test]
    fn test_runs_until_finish() {
        let config = GlobalConfig::new();
        let mut tb = TestBench::<Counter>::init_with_command_args(
            &config,
            ["sim", "+limit=5"],
            |c: &mut Counter, _| c.count < 5,
        )
        .unwrap();
        tb.reset();
        while !tb.done() {
            tb.tick().unwrap();
        }
        assert_eq!(tb.core().count, 5);
        assert_eq!(tb.tick_count(), 5);
        assert!(tb.core().finished);
        assert_eq!(config.plus_match("limit").as_deref(), Some("+limit=5"));
        assert_eq!(config.scopes(), vec!["counter"]);
    }

    #[test]
    fn test_trace_requires_trace_ever_on() {
        let dir = tempfile::tempdir().unwrap();
        let config = GlobalConfig::new();
        let mut tb = TestBench::with_core(&config, Counter::default(), |_, _| true);
        assert!(matches!(
            tb.open_trace(dir.path().join("t.vcd")),
            Err(VerilatedError::TraceNotEnabled)
        ));
        assert!(tb.trace().is_none());
    }

    #[test]
    fn test_trace_dumps_both_edges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.vcd");
        let config = GlobalConfig::new();
        config.set_trace_ever_on(true);

        let mut tb =
            TestBench::with_core(&config, Counter::default(), |c: &mut Counter, _| c.count < 3);
        tb.open_trace(&path).unwrap();
        tb.reset();
        while !tb.done() {
            tb.tick().unwrap();
        }
        assert_eq!(tb.trace().map(|v| v.record_count()), Some(6));
        tb.close_trace().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("$scope module counter $end"));
        let times: Vec<&str> = text.lines().filter(|l| l.starts_with('#')).collect();
        assert_eq!(times, vec!["#2", "#3", "#4", "#5", "#6", "#7"]);
        assert!(text.contains("b00000011 \""));
    }
}
