//! Decoding of the device's status lines.
//!
//! A stage record looks like
//! `SPARGING,HEA,0,0,31.00,24.25,40.00,40.00,1000,ON`. Anything that does not
//! decode as one (device faults, diagnostics) is passed through as is.

use std::fmt;

use mash_lauter_control::ERROR_PREFIX;

#[derive(Debug, Clone, PartialEq)]
pub enum StatusReport {
    Stage(StageStatus),
    Passthrough(String),
}

impl StatusReport {
    /// The device reported a fault (`ERROR:` prefix).
    pub fn is_error(&self) -> bool {
        matches!(self, StatusReport::Passthrough(line) if line.starts_with(ERROR_PREFIX))
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusReport::Stage(stage) => write!(f, "{}", stage),
            StatusReport::Passthrough(line) => f.write_str(line),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageStatus {
    pub stage_name: String,
    pub stage_type: String,
    pub timing: StageTiming,
    pub hlt_temp_c: f32,
    pub grain_temp_c: f32,
    pub setpoint_c: f32,
    pub target_temp_c: f32,
    pub heater_duty_cycle: u32,
    pub pump_state: String,
}

/// A duration of zero means the stage has no defined end, so neither the
/// elapsed time nor the duration is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageTiming {
    Unavailable,
    Elapsed { time_in_stage_ms: u64, duration_ms: u64 },
}

impl StageTiming {
    pub fn time_in_stage(&self) -> String {
        match self {
            StageTiming::Unavailable => "N/A".to_string(),
            StageTiming::Elapsed { time_in_stage_ms, .. } => minutes_seconds(*time_in_stage_ms),
        }
    }

    pub fn duration(&self) -> String {
        match self {
            StageTiming::Unavailable => "N/A".to_string(),
            StageTiming::Elapsed { duration_ms, .. } => minutes_seconds(*duration_ms),
        }
    }
}

/// `90000` -> `1:30`.
pub fn minutes_seconds(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.stage_name)?;
        writeln!(f, "    Stage type:         {}", self.stage_type)?;
        writeln!(f, "    Time in stage:      {}", self.timing.time_in_stage())?;
        writeln!(f, "    Duration of stage:  {}", self.timing.duration())?;
        writeln!(f, "    HLT temperature:    {:.2}", self.hlt_temp_c)?;
        writeln!(f, "    Grain temperature:  {:.2}", self.grain_temp_c)?;
        writeln!(f, "    Setpoint:           {:.2}", self.setpoint_c)?;
        writeln!(f, "    Target temperature: {:.2}", self.target_temp_c)?;
        writeln!(f, "    Heater duty cycle:  {}", self.heater_duty_cycle)?;
        write!(f, "    Pump state:         {}", self.pump_state)
    }
}

/// Never fails: a line that is not a stage record comes back as
/// [`StatusReport::Passthrough`].
pub fn decode_status(line: &str) -> StatusReport {
    match decode_stage(line) {
        Some(stage) => StatusReport::Stage(stage),
        None => StatusReport::Passthrough(line.to_string()),
    }
}

fn decode_stage(line: &str) -> Option<StageStatus> {
    if line.starts_with(ERROR_PREFIX) {
        return None;
    }
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [name, kind, elapsed, duration, hlt, grain, setpoint, target, duty, pump] = fields[..] else {
        return None;
    };

    let duration_ms: u64 = duration.parse().ok()?;
    let timing = if duration_ms == 0 {
        StageTiming::Unavailable
    } else {
        StageTiming::Elapsed {
            time_in_stage_ms: elapsed.parse().ok()?,
            duration_ms,
        }
    };

    Some(StageStatus {
        stage_name: name.to_string(),
        stage_type: kind.to_string(),
        timing,
        hlt_temp_c: hlt.parse().ok()?,
        grain_temp_c: grain.parse().ok()?,
        setpoint_c: setpoint.parse().ok()?,
        target_temp_c: target.parse().ok()?,
        heater_duty_cycle: duty.parse().ok()?,
        pump_state: pump.to_string(),
    })
}
