//! Concurrent use of one controller through `SharedPmbus`

mod common;

use std::thread;

use common::*;

const VOUT_REPLY: [u8; 2] = [0xBB, 0x9A]; // 1.80078125 V
const IOUT_REPLY: [u8; 2] = [0xD2, 0xA0]; // 10.5 A

fn shared_bus() -> (ScriptedBus, SharedPmbus<ScriptedBus>) {
    let bus = ScriptedBus::new();
    bus.register(Command::ReadVout, &VOUT_REPLY);
    bus.register(Command::ReadIout, &IOUT_REPLY);
    let shared = SharedPmbus::new(session(&bus));
    (bus, shared)
}

#[test]
fn test_concurrent_reads_never_interleave() {
    let (bus, shared) = shared_bus();
    let rounds = 200;

    let handles: Vec<_> = [Command::ReadVout, Command::ReadIout]
        .into_iter()
        .cycle()
        .take(4)
        .map(|command| {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..rounds {
                    let value = shared.read_telemetry(command).unwrap();
                    let expected = match command {
                        Command::ReadVout => 922.0 / 512.0,
                        _ => 10.5,
                    };
                    assert_eq!(value, expected, "{command} got another register's value");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let log = bus.log();
    assert_eq!(log.len(), 4 * rounds * 2);
    for pair in log.chunks(2) {
        assert!(matches!(&pair[0], BusOp::Write(select) if select.len() == 1));
        assert_eq!(pair[1], BusOp::Read(2));
    }
}

#[test]
fn test_concurrent_setpoints_and_samples() {
    let (bus, shared) = shared_bus();

    let writer = {
        let shared = shared.clone();
        thread::spawn(move || {
            for i in 0..50 {
                let volts = 0.5 + f64::from(i) * 0.05;
                shared.set_voltage(Command::VoutCommand, setpoint(volts)).unwrap();
            }
        })
    };
    let reader = {
        let shared = shared.clone();
        thread::spawn(move || {
            for _ in 0..50 {
                let sample = shared.sample().unwrap();
                assert_eq!(sample.vout_v, 922.0 / 512.0);
                assert_eq!(sample.iout_a, 10.5);
            }
        })
    };
    writer.join().unwrap();
    reader.join().unwrap();

    // Every register select is followed directly by its read
    let log = bus.log();
    let mut ops = log.iter().peekable();
    while let Some(op) = ops.next() {
        if let BusOp::Write(bytes) = op {
            if bytes.len() == 1 {
                assert_eq!(ops.next(), Some(&BusOp::Read(2)));
            } else {
                assert_eq!(bytes.len(), 3);
                assert_eq!(bytes[0], Command::VoutCommand.code());
            }
        } else {
            panic!("read without a preceding select");
        }
    }
}

#[test]
fn test_with_session_groups_transactions() {
    let (bus, shared) = shared_bus();

    let (vout, iout) = shared
        .with_session(|pmbus| -> Result<_, PmbusError> {
            pmbus.set_vout(setpoint(1.8))?;
            Ok((
                pmbus.read_telemetry(Command::ReadVout)?,
                pmbus.read_telemetry(Command::ReadIout)?,
            ))
        })
        .unwrap();

    assert_eq!(vout, 922.0 / 512.0);
    assert_eq!(iout, 10.5);
    assert_eq!(bus.log().len(), 5);
}

#[test]
fn test_try_unwrap_last_handle() {
    let (_bus, shared) = shared_bus();
    let other = shared.clone();

    let Err(shared) = shared.try_unwrap() else {
        panic!("unwrap must fail while another handle exists");
    };
    drop(other);

    let pmbus = shared.try_unwrap().ok().unwrap();
    assert_eq!(pmbus.wire(), WireFormat::reference());
}
