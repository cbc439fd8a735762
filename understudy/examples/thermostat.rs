//! A thermostat mock that partially overrides a real sensor.
//!
//! Run with `RUST_LOG=understudy=trace cargo run --example thermostat`
//! to watch calls being recorded and resolved.

use understudy::{
    CallMatcher, InvocationRecord, MockConfig, MockController, RecordingReporter, SourceLocation,
    Stub, matcher::predicate,
};

trait Sensor {
    fn read(&self, channel: u8) -> f32;
}

struct Probe;

impl Sensor for Probe {
    fn read(&self, channel: u8) -> f32 {
        20.0 + f32::from(channel)
    }
}

struct SpySensor {
    controller: MockController,
    real: Probe,
}

impl Sensor for SpySensor {
    fn read(&self, channel: u8) -> f32 {
        let original: &dyn Fn(u8) -> f32 = &|channel| self.real.read(channel);
        self.controller.call("read", channel, Some(original))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let reporter = RecordingReporter::new();
    let sensor = SpySensor {
        controller: MockController::with_config(
            MockConfig::default().with_name("sensor"),
            reporter.clone(),
        ),
        real: Probe,
    };

    // Channel 3 is broken: first a spike, then it keeps reporting zero.
    sensor.controller.stubbing_handle().register(
        Stub::<u8, f32>::new("read")
            .with_matcher(predicate("channel 3", |c: &u8| *c == 3))
            .then_return(99.5)
            .then_return(0.0),
    );

    for channel in [1, 3, 3, 3, 2] {
        println!("channel {channel}: {:.1}", sensor.read(channel));
    }

    let once = predicate("exactly one read", |calls: &[InvocationRecord]| calls.len() == 1);
    sensor
        .controller
        .verification_handle(once, SourceLocation::caller())
        .verify(CallMatcher::call("read", predicate("channel 3", |c: &u8| *c == 3)));

    for failure in reporter.failures() {
        println!("{failure}");
    }
    for call in sensor.controller.invocations() {
        println!("{call}");
    }
}
