//! Simulation files loaded from disk and run end to end.

use std::io::Write;
use std::path::{Path, PathBuf};

use kinetic_common::config::{ConfigError, ConfigLoader, LogLevel};
use kinetic_control::sim::{Simulation, SimulationConfig};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const PD_LOOP: &str = r#"
[shared]
service_name = "pd-loop"
log_level = "debug"

[plant]
inertia = 1.0
damping = 0.5

[run]
rate_hz = 100.0
duration_s = 10.0
goal = 2.0

[control.feedback]
kind = "pid"
feedback_type = "position"
kp = 4.0
kd = 2.0
"#;

#[test]
fn pd_loop_from_file_settles() {
    let file = write_config(PD_LOOP);
    let config = SimulationConfig::load(file.path()).unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Debug);

    let report = Simulation::from_config(&config).unwrap().run();
    assert_eq!(report.ticks, 1_000);
    assert!(report.within_tolerance, "{report:?}");
    assert!(report.settle_time_s.is_some());
    assert!((report.final_state.position - 2.0).abs() < 0.01);
}

#[test]
fn shipped_elevator_config_settles() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/sim.toml");
    let config = SimulationConfig::load(&path).unwrap();
    let filtered: Vec<_> = config.control.filtered_channels().collect();
    assert_eq!(filtered, ["velocity"]);

    let report = Simulation::from_config(&config).unwrap().run();
    assert!(report.within_tolerance, "{report:?}");
    // profiled move with model feedforward barely overshoots
    assert!(report.overshoot < 0.05, "overshoot {}", report.overshoot);
}

#[test]
fn missing_file_is_reported() {
    let result = SimulationConfig::load(Path::new("/nonexistent/kinetic/sim.toml"));
    assert_eq!(result.unwrap_err(), ConfigError::FileNotFound);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("[shared\nservice_name = ");
    assert!(matches!(
        SimulationConfig::load(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn unknown_feedback_kind_is_a_parse_error() {
    let file = write_config(
        r#"
[shared]
service_name = "bad-kind"

[control.feedback]
kind = "fuzzy"
"#,
    );
    assert!(matches!(
        SimulationConfig::load(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn out_of_range_filter_gain_fails_validation() {
    let file = write_config(
        r#"
[shared]
service_name = "bad-filter"

[[control.filter.position]]
kind = "low_pass"
alpha = 1.5
"#,
    );
    let config = SimulationConfig::load(file.path()).unwrap();
    assert!(matches!(
        Simulation::from_config(&config),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn zero_profile_acceleration_fails_validation() {
    let file = write_config(
        r#"
[shared]
service_name = "bad-profile"

[control.interpolator]
kind = "trapezoid"
max_vel = 1.0
accel = 0.0
"#,
    );
    let config = SimulationConfig::load(file.path()).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn non_positive_rate_fails_validation() {
    let file = write_config(
        r#"
[shared]
service_name = "bad-rate"

[run]
rate_hz = 0.0
"#,
    );
    let config = SimulationConfig::load(file.path()).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError(msg)) if msg.contains("rate_hz")
    ));
}

#[test]
fn open_loop_defaults_never_reach_the_goal() {
    let file = write_config("[shared]\nservice_name = \"open-loop\"\n");
    let config = SimulationConfig::load(file.path()).unwrap();

    let report = Simulation::from_config(&config).unwrap().run();
    assert_eq!(report.final_output, 0.0);
    assert_eq!(report.final_state.position, 0.0);
    assert!(!report.within_tolerance);
    assert_eq!(report.settle_time_s, None);
}
