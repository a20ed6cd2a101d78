use std::fmt::Write;

/// Code of a bipolar conversion with zero input.
pub const MIDPOINT: i32 = 0x80_0000;

/// Load-cell calibration factor, kilograms-force per code.
pub const LOAD_CELL_SCALE: f64 = 0.000076399109;

/// Codes per kelvin of the on-chip temperature sensor.
const DIE_CODES_PER_KELVIN: f64 = 13584.0;
const DIE_OFFSET_CELSIUS: f64 = 272.5;

/// Conversion from a raw code to engineering units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    /// `(raw - offset) * scale`
    Linear { offset: i32, scale: f64 },
    /// On-chip temperature sensor, degrees Celsius.
    DieTemperature,
}

impl Transform {
    pub fn apply(&self, raw: i32) -> f64 {
        match *self {
            Transform::Linear { offset, scale } => (raw - offset) as f64 * scale,
            Transform::DieTemperature => {
                (raw - MIDPOINT) as f64 / DIE_CODES_PER_KELVIN - DIE_OFFSET_CELSIUS
            }
        }
    }
}

/// One output record: readings in channel order, two decimals, tab separated.
/// A missing reading is written as `NaN` so the columns stay aligned.
pub fn format_record(readings: &[Option<f64>]) -> String {
    let mut line = String::new();

    for (index, reading) in readings.iter().enumerate() {
        if index > 0 {
            line.push('\t');
        }

        match reading {
            Some(value) => {
                let _ = write!(line, "{value:.2}");
            }
            None => line.push_str("NaN"),
        }
    }

    line
}
