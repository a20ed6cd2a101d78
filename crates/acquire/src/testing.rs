//! Fakes shared by the unit tests.

use std::collections::VecDeque;
use std::io;

use ad7124::{Filter, Gain, Input, OperatingMode, PowerMode, RefSource};
use embedded_hal::delay::DelayNs;
use thiserror::Error;

use crate::converter::Converter;
use crate::transform::MIDPOINT;
use crate::transport::Transport;

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Begin,
    Mode(OperatingMode),
    Setup {
        id: u8,
        reference: RefSource,
        gain: Gain,
        bipolar: bool,
    },
    Filter {
        id: u8,
        filter: Filter,
        rate: u16,
    },
    Bind {
        index: u8,
        setup: u8,
        positive: Input,
        negative: Input,
        enabled: bool,
    },
    Enable(u8, bool),
    Read(u8),
    Poll,
}

#[derive(Clone, Debug, PartialEq, Error)]
#[error("injected failure at {0:?}")]
pub struct FakeError(pub Op);

/// How the fake answers calibration completion polls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Completion {
    Unsupported,
    AfterPolls(usize),
    Never,
}

/// Records every call and tracks mode, bindings and enabled channels.
pub struct FakeConverter {
    pub ops: Vec<Op>,
    pub mode: OperatingMode,
    pub internal_reference: bool,
    pub enabled: [bool; 16],
    pub bound: [Option<(u8, Input, Input)>; 16],
    pub raw: [i32; 16],
    /// Channels enabled at each entry into offset calibration.
    pub calibrations: Vec<Vec<u8>>,
    pub completion: Completion,
    pub fail_on: Option<Op>,
    pub failing_reads: Vec<u8>,
    polls: usize,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            mode: OperatingMode::Idle,
            internal_reference: false,
            enabled: [false; 16],
            bound: [None; 16],
            raw: [MIDPOINT; 16],
            calibrations: Vec::new(),
            completion: Completion::AfterPolls(1),
            fail_on: None,
            failing_reads: Vec::new(),
            polls: 0,
        }
    }

    fn record(&mut self, op: Op) -> Result<(), FakeError> {
        self.ops.push(op.clone());
        match &self.fail_on {
            Some(failing) if *failing == op => Err(FakeError(op)),
            _ => Ok(()),
        }
    }
}

impl Converter for FakeConverter {
    type Error = FakeError;

    fn begin(&mut self) -> Result<(), Self::Error> {
        self.record(Op::Begin)
    }

    fn set_operating_mode(
        &mut self,
        mode: OperatingMode,
        _power: PowerMode,
        internal_reference: bool,
    ) -> Result<(), Self::Error> {
        self.record(Op::Mode(mode))?;
        self.internal_reference = internal_reference;

        if mode == OperatingMode::SystemOffsetCalibration {
            let enabled: Vec<u8> = (0..16u8)
                .filter(|&index| self.enabled[index as usize])
                .collect();
            self.calibrations.push(enabled);
            self.polls = 0;
        }

        self.mode = mode;
        Ok(())
    }

    fn configure_setup_profile(
        &mut self,
        id: u8,
        reference: RefSource,
        gain: Gain,
        bipolar: bool,
    ) -> Result<(), Self::Error> {
        self.record(Op::Setup {
            id,
            reference,
            gain,
            bipolar,
        })
    }

    fn configure_filter(
        &mut self,
        id: u8,
        filter: Filter,
        output_rate: u16,
    ) -> Result<(), Self::Error> {
        self.record(Op::Filter {
            id,
            filter,
            rate: output_rate,
        })
    }

    fn bind_channel(
        &mut self,
        index: u8,
        setup: u8,
        positive: Input,
        negative: Input,
        enabled: bool,
    ) -> Result<(), Self::Error> {
        self.record(Op::Bind {
            index,
            setup,
            positive,
            negative,
            enabled,
        })?;
        self.bound[index as usize] = Some((setup, positive, negative));
        self.enabled[index as usize] = enabled;
        Ok(())
    }

    fn set_channel_enabled(&mut self, index: u8, enabled: bool) -> Result<(), Self::Error> {
        self.record(Op::Enable(index, enabled))?;
        self.enabled[index as usize] = enabled;
        Ok(())
    }

    /// Not recorded: a state query leaves the converter untouched.
    fn channel_enabled(&mut self, index: u8) -> Result<bool, Self::Error> {
        Ok(self.enabled[index as usize])
    }

    fn read_raw(&mut self, index: u8) -> Result<i32, Self::Error> {
        self.record(Op::Read(index))?;
        if self.failing_reads.contains(&index) {
            return Err(FakeError(Op::Read(index)));
        }
        Ok(self.raw[index as usize])
    }

    fn calibration_done(&mut self) -> Result<Option<bool>, Self::Error> {
        self.record(Op::Poll)?;
        self.polls += 1;
        Ok(match self.completion {
            Completion::Unsupported => None,
            Completion::AfterPolls(polls) => Some(self.polls >= polls),
            Completion::Never => Some(false),
        })
    }
}

#[derive(Default)]
pub struct FakeDelay {
    pub sleeps_ms: Vec<u32>,
    pub waited_ns: u64,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waited_ns += ns as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleeps_ms.push(ms);
        self.waited_ns += ms as u64 * 1_000_000;
    }
}

/// Captures emitted lines and replays queued command bytes.
#[derive(Default)]
pub struct ScriptedTransport {
    pub lines: Vec<String>,
    pub input: VecDeque<u8>,
}

impl Transport for ScriptedTransport {
    fn emit_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_owned());
        Ok(())
    }

    fn try_receive(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front())
    }
}
