use fifo_ctrl::{ControllerParams, CountParams, CountTiming, Crossing, ParamError, ReadMode};
use fifo_sim::{ClockError, ClockSet, ClockSpec, CountClock, EnablePattern, StreamError};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SoakConfig {
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    #[serde(default = "defaults::depth")]
    pub depth: usize,
    #[serde(default)]
    pub read_mode: ReadMode,
    #[serde(default)]
    pub crossing: Crossing,
    #[serde(default = "defaults::ack")]
    pub ack: bool,
    /// Width of the occupancy count; 0 disables the counter.
    #[serde(default = "defaults::count_width")]
    pub count_width: u32,
    #[serde(default)]
    pub count_timing: CountTiming,
    #[serde(default = "defaults::period_ns")]
    pub write_period_ns: f64,
    #[serde(default = "defaults::period_ns")]
    pub read_period_ns: f64,
    #[serde(default)]
    pub read_phase_ns: f64,
    /// Own count clock; when absent the count domain shares the read clock.
    #[serde(default)]
    pub count_period_ns: Option<f64>,
    #[serde(default)]
    pub count_phase_ns: f64,
    #[serde(default = "defaults::pattern")]
    pub write_pattern: String,
    #[serde(default = "defaults::pattern")]
    pub read_pattern: String,
    #[serde(default = "defaults::words")]
    pub words: u32,
    #[serde(default = "defaults::max_instants")]
    pub max_instants: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid controller parameters")]
    Params(#[from] ParamError),

    #[error("invalid clock setup")]
    Clock(#[from] ClockError),

    #[error("invalid enable pattern")]
    Pattern(#[from] StreamError),

    #[error("immediate count timing needs one clock shared by all three domains")]
    ImmediateCount,
}

mod defaults {
    pub fn log_level() -> String {
        "info".into()
    }

    pub fn depth() -> usize {
        256
    }

    pub fn ack() -> bool {
        true
    }

    pub fn count_width() -> u32 {
        9
    }

    pub fn period_ns() -> f64 {
        10.0
    }

    pub fn pattern() -> String {
        "1".into()
    }

    pub fn words() -> u32 {
        100_000
    }

    pub fn max_instants() -> u64 {
        100_000_000
    }
}

fn ps(ns: f64) -> u64 {
    // negative and NaN saturate to 0 and are rejected by the clock itself
    (ns * 1000.0).round() as u64
}

impl Default for SoakConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level(),
            depth: defaults::depth(),
            read_mode: ReadMode::default(),
            crossing: Crossing::default(),
            ack: defaults::ack(),
            count_width: defaults::count_width(),
            count_timing: CountTiming::default(),
            write_period_ns: defaults::period_ns(),
            read_period_ns: defaults::period_ns(),
            read_phase_ns: 0.0,
            count_period_ns: None,
            count_phase_ns: 0.0,
            write_pattern: defaults::pattern(),
            read_pattern: defaults::pattern(),
            words: defaults::words(),
            max_instants: defaults::max_instants(),
        }
    }
}

impl SoakConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let toml_to_str = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&toml_to_str)
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let soak_config: SoakConfig = toml::from_str(s)?;
        Ok(soak_config)
    }

    /// Controller parameters, validated.
    pub fn controller_params(&self) -> Result<ControllerParams, ConfigError> {
        let params = ControllerParams {
            depth: self.depth,
            read_mode: self.read_mode,
            crossing: self.crossing,
            ack: self.ack,
            count: (self.count_width > 0).then_some(CountParams {
                width: self.count_width,
                timing: self.count_timing,
            }),
        };
        params.build()?;
        if self.count_width > 0
            && self.count_timing == CountTiming::Immediate
            && !self.shared_clock()
        {
            return Err(ConfigError::ImmediateCount);
        }
        Ok(params)
    }

    /// Write, read and count edges always coincide.
    fn shared_clock(&self) -> bool {
        let period = ps(self.write_period_ns);
        ps(self.read_period_ns) == period
            && ps(self.read_phase_ns) == 0
            && self
                .count_period_ns
                .is_none_or(|p| ps(p) == period && ps(self.count_phase_ns) == 0)
    }

    pub fn clocks(&self) -> Result<ClockSet, ConfigError> {
        let count = match self.count_period_ns {
            Some(period) => {
                CountClock::Own(ClockSpec::new(ps(period)).with_phase(ps(self.count_phase_ns)))
            }
            None => CountClock::Read,
        };
        let clocks = ClockSet::new(
            ClockSpec::new(ps(self.write_period_ns)),
            ClockSpec::new(ps(self.read_period_ns)).with_phase(ps(self.read_phase_ns)),
            count,
        )?;
        Ok(clocks)
    }

    pub fn write_pattern(&self) -> Result<EnablePattern, ConfigError> {
        Ok(EnablePattern::parse(&self.write_pattern)?)
    }

    pub fn read_pattern(&self) -> Result<EnablePattern, ConfigError> {
        Ok(EnablePattern::parse(&self.read_pattern)?)
    }
}
