//! Signal derivation and transition detection.
//!
//! A [`SignalPolicy`] maps each bar to a [`Signal`]; consecutive signals are
//! then mapped through [`Transition::between`] into trade intents. Bars
//! before a policy's warm-up index are `Flat` by convention.

use std::cmp::Ordering;
use std::fmt;

use super::indicator_helpers::IndicatorSet;
use super::strategy::StrategyParams;

/// Desired position state at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signal {
    #[default]
    Flat,
    Long,
    /// Close above the upper band. Never opens a short; it sells any
    /// holding, and falling back to `Flat` afterwards buys again.
    Exit,
}

impl Signal {
    /// Integer encoding 1 / 0 / -1. Transitions follow the direction in
    /// which the code moves.
    pub fn code(self) -> i8 {
        match self {
            Signal::Long => 1,
            Signal::Flat => 0,
            Signal::Exit => -1,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Flat => write!(f, "FLAT"),
            Signal::Long => write!(f, "LONG"),
            Signal::Exit => write!(f, "EXIT"),
        }
    }
}

/// Trade intent produced by a change of signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enter,
    Exit,
    None,
}

impl Transition {
    /// Transition table over (previous, next) signal pairs.
    ///
    /// A rising code enters and a falling code exits, including the
    /// `Exit -> Flat` step back inside the bands. Jumps across `Flat`
    /// (`Exit <-> Long`) map to a single enter or exit.
    pub fn between(previous: Signal, next: Signal) -> Transition {
        match next.code().cmp(&previous.code()) {
            Ordering::Greater => Transition::Enter,
            Ordering::Less => Transition::Exit,
            Ordering::Equal => Transition::None,
        }
    }
}

/// Strategy-specific rule turning prices and indicators into a signal.
pub trait SignalPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// First bar index the policy evaluates; earlier bars are `Flat`.
    fn warmup(&self) -> usize;

    fn derive_signal(
        &self,
        index: usize,
        closes: &[f64],
        indicators: &IndicatorSet,
        previous: Signal,
    ) -> Signal;
}

/// Long while the short average is strictly above the long average.
#[derive(Debug, Clone)]
pub struct CrossoverPolicy {
    short_window: usize,
    long_window: usize,
}

impl CrossoverPolicy {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
        }
    }
}

impl SignalPolicy for CrossoverPolicy {
    fn name(&self) -> &str {
        StrategyParams::SMA_CROSSOVER
    }

    fn warmup(&self) -> usize {
        self.short_window.max(self.long_window.saturating_sub(1))
    }

    fn derive_signal(
        &self,
        index: usize,
        _closes: &[f64],
        indicators: &IndicatorSet,
        _previous: Signal,
    ) -> Signal {
        match indicators.moving_averages(index) {
            Some((short, long)) if short > long => Signal::Long,
            _ => Signal::Flat,
        }
    }
}

/// Long when the close drops below the lower band; the above-upper-band
/// check runs second and wins.
#[derive(Debug, Clone)]
pub struct BandPolicy {
    window: usize,
}

impl BandPolicy {
    pub fn new(window: usize) -> Self {
        Self { window }
    }
}

impl SignalPolicy for BandPolicy {
    fn name(&self) -> &str {
        StrategyParams::BOLLINGER
    }

    fn warmup(&self) -> usize {
        self.window
    }

    fn derive_signal(
        &self,
        index: usize,
        closes: &[f64],
        indicators: &IndicatorSet,
        _previous: Signal,
    ) -> Signal {
        let (Some(bands), Some(&close)) = (indicators.bands(index), closes.get(index)) else {
            return Signal::Flat;
        };

        let mut signal = Signal::Flat;
        if close < bands.lower {
            signal = Signal::Long;
        }
        if close > bands.upper {
            signal = Signal::Exit;
        }
        signal
    }
}

pub fn policy_for(params: &StrategyParams) -> Box<dyn SignalPolicy> {
    match params {
        StrategyParams::SmaCrossover {
            short_window,
            long_window,
        } => Box::new(CrossoverPolicy::new(*short_window, *long_window)),
        StrategyParams::Bollinger { window, .. } => Box::new(BandPolicy::new(*window)),
    }
}

/// One signal per bar.
pub fn derive_signals(
    policy: &dyn SignalPolicy,
    closes: &[f64],
    indicators: &IndicatorSet,
) -> Vec<Signal> {
    let warmup = policy.warmup();
    let mut signals = Vec::with_capacity(closes.len());
    let mut previous = Signal::Flat;

    for index in 0..closes.len() {
        let signal = if index < warmup {
            Signal::Flat
        } else {
            policy.derive_signal(index, closes, indicators, previous)
        };
        signals.push(signal);
        previous = signal;
    }

    signals
}

/// One transition per bar; the first bar has no predecessor.
pub fn derive_transitions(signals: &[Signal]) -> Vec<Transition> {
    let mut transitions = Vec::with_capacity(signals.len());
    if signals.is_empty() {
        return transitions;
    }

    transitions.push(Transition::None);
    transitions.extend(
        signals
            .windows(2)
            .map(|pair| Transition::between(pair[0], pair[1])),
    );
    transitions
}
