//! InfluxDB line protocol rendering of readings.
//!
//! One line per reading: measurement name, `mac` and `format` tags, then the
//! fields the source format actually carried. No timestamp is written; the
//! receiving end assigns one on ingest.

use crate::output::OutputFormatter;
use crate::reading::{RawReading, Reading, UrlReading};
use std::collections::BTreeMap;
use std::fmt;

/// A field value in line protocol syntax.
#[derive(Debug, PartialEq)]
enum FieldValue {
    Float(f64),
    Integer(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(num) => write!(f, "{num}"),
            FieldValue::Integer(num) => write!(f, "{num}i"),
        }
    }
}

/// InfluxDB line protocol formatter.
pub struct InfluxDbFormatter {
    measurement_name: String,
}

impl InfluxDbFormatter {
    pub fn new(measurement_name: String) -> Self {
        InfluxDbFormatter { measurement_name }
    }

    fn field_set(reading: &Reading) -> BTreeMap<&'static str, FieldValue> {
        let mut fields = BTreeMap::new();
        fields.insert("rssi", FieldValue::Integer(i64::from(reading.rssi())));

        match reading {
            Reading::Url(UrlReading {
                humidity,
                temperature,
                pressure,
                identifier,
                ..
            }) => {
                fields.insert("humidity", FieldValue::Float(*humidity));
                fields.insert("temperature", FieldValue::Float(*temperature));
                fields.insert("pressure", FieldValue::Integer(i64::from(*pressure)));
                if let Some(id) = identifier {
                    fields.insert("identifier", FieldValue::Integer(i64::from(*id)));
                }
            }
            Reading::Raw(RawReading {
                humidity,
                temperature,
                pressure,
                acceleration_x,
                acceleration_y,
                acceleration_z,
                battery_voltage,
                tx_power,
                movement_counter,
                measurement_sequence,
                ..
            }) => {
                fields.insert("humidity", FieldValue::Float(*humidity));
                fields.insert("temperature", FieldValue::Float(*temperature));
                fields.insert("pressure", FieldValue::Integer(i64::from(*pressure)));
                fields.insert(
                    "acceleration_x",
                    FieldValue::Integer(i64::from(*acceleration_x)),
                );
                fields.insert(
                    "acceleration_y",
                    FieldValue::Integer(i64::from(*acceleration_y)),
                );
                fields.insert(
                    "acceleration_z",
                    FieldValue::Integer(i64::from(*acceleration_z)),
                );
                fields.insert(
                    "battery_voltage",
                    FieldValue::Integer(i64::from(*battery_voltage)),
                );
                if let Some(tx) = tx_power {
                    fields.insert("tx_power", FieldValue::Integer(i64::from(*tx)));
                }
                if let Some(count) = movement_counter {
                    fields.insert("movement_counter", FieldValue::Integer(i64::from(*count)));
                }
                if let Some(seq) = measurement_sequence {
                    fields.insert(
                        "measurement_sequence",
                        FieldValue::Integer(i64::from(*seq)),
                    );
                }
            }
        }

        fields
    }
}

impl OutputFormatter for InfluxDbFormatter {
    fn format(&self, reading: &Reading) -> String {
        let mut line = format!(
            "{},mac={},format={} ",
            self.measurement_name,
            reading.mac(),
            reading.format()
        );

        let fields = Self::field_set(reading);
        let mut first = true;
        for (key, value) in fields {
            if first {
                first = false;
            } else {
                line.push(',');
            }
            line.push_str(key);
            line.push('=');
            line.push_str(&value.to_string());
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Reading;
    use crate::test_utils::{
        TEST_MAC, format_3_advertisement, format_5_advertisement, url_advertisement,
    };

    fn formatter() -> InfluxDbFormatter {
        InfluxDbFormatter::new("ruuvi_measurement".to_string())
    }

    #[test]
    fn formats_raw_reading() {
        let reading = Reading::from_advertisement(&format_5_advertisement(TEST_MAC)).unwrap();
        let line = formatter().format(&reading);

        assert!(line.starts_with("ruuvi_measurement,mac=AA:BB:CC:DD:EE:FF,format=5 "));
        assert!(line.contains("temperature=1"));
        assert!(line.contains("humidity=25"));
        assert!(line.contains("pressure=51000i"));
        assert!(line.contains("battery_voltage=3000i"));
        assert!(line.contains("tx_power=4i"));
        assert!(line.contains("measurement_sequence=1834i"));
        assert!(line.contains("rssi=-60i"));
    }

    #[test]
    fn format_3_omits_absent_fields() {
        let reading = Reading::from_advertisement(&format_3_advertisement(TEST_MAC)).unwrap();
        let line = formatter().format(&reading);

        assert!(line.contains("battery_voltage=3100i"));
        assert!(!line.contains("tx_power"));
        assert!(!line.contains("movement_counter"));
        assert!(!line.contains("measurement_sequence"));
    }

    #[test]
    fn formats_url_reading() {
        let adv = url_advertisement(TEST_MAC, "ruu.vi/#AigWMgPoC");
        let reading = Reading::from_advertisement(&adv).unwrap();
        let line = formatter().format(&reading);

        assert!(line.starts_with("ruuvi_measurement,mac=AA:BB:CC:DD:EE:FF,format=2 "));
        assert!(line.contains("humidity=20"));
        assert!(line.contains("temperature=22.5"));
        assert!(line.contains("identifier=67i"));
        assert!(!line.contains("acceleration_x"));
    }

    #[test]
    fn fields_are_comma_separated_without_trailing_comma() {
        let reading = Reading::from_advertisement(&format_3_advertisement(TEST_MAC)).unwrap();
        let line = formatter().format(&reading);
        let fields = line.split(' ').nth(1).unwrap();
        assert!(!fields.starts_with(','));
        assert!(!fields.ends_with(','));
        assert_eq!(fields.matches('=').count(), fields.matches(',').count() + 1);
    }
}
