use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};
use uom::si::electric_current::ampere;
use uom::si::electric_potential::volt;
use uom::si::f64::{ElectricCurrent, ElectricPotential};

use crate::command::Command;
use crate::config::{WireFormat, WordOrder};
use crate::constants::{WORD_SIZE, WRITE_WORD_FRAME_SIZE};
use crate::error::{PmbusError, TransferError};
use crate::linear11::{self, Linear11};
use crate::telemetry::TelemetrySample;
use crate::types::VoltageSetpoint;

/// Build the frame for a PMBus "write word": command byte, then the data
/// word in `order`.
pub fn write_word_frame(command: Command, word: u16, order: WordOrder) -> Bytes {
    let mut frame = BytesMut::with_capacity(WRITE_WORD_FRAME_SIZE);
    frame.put_u8(command.code());
    frame.extend_from_slice(&order.split(word));
    frame.freeze()
}

/// A PMBus session on an address-bound bus handle.
///
/// The handle only needs the two blocking primitives of [`Read`] and
/// [`Write`]; every phase of a transaction is exactly one call, and a call
/// that moves fewer bytes than requested fails the whole transaction.
/// Transactions take `&mut self`, so one owner can never interleave them. Use
/// [`SharedPmbus`](crate::SharedPmbus) when several threads need the device.
pub struct Pmbus<D> {
    device: D,
    wire: WireFormat,
}

impl<D: Read + Write> Pmbus<D> {
    pub fn new(device: D, wire: WireFormat) -> Self {
        Self { device, wire }
    }

    pub fn wire(&self) -> WireFormat {
        self.wire
    }

    pub fn get_ref(&self) -> &D {
        &self.device
    }

    pub fn into_inner(self) -> D {
        self.device
    }

    /// Write a voltage setpoint to `command` as a single 3-byte write.
    pub fn set_voltage(&mut self, command: Command, target: VoltageSetpoint) -> Result<(), PmbusError> {
        let value = Linear11::encode(target.volts())?;
        let frame = write_word_frame(command, value.to_word(), self.wire.write_order);
        self.send(command, &frame)?;
        debug!("{} set to {} ({}, raw 0x{:04X})", command, target, value, value.to_word());
        Ok(())
    }

    pub fn set_vout(&mut self, target: VoltageSetpoint) -> Result<(), PmbusError> {
        self.set_voltage(Command::VoutCommand, target)
    }

    /// Select `command`, read its 2-byte reply and decode it as LINEAR11.
    pub fn read_telemetry(&mut self, command: Command) -> Result<f64, PmbusError> {
        let word = self.read_word(command)?;
        let value = linear11::decode(word);
        debug!("{}: {:.3} (raw 0x{:04X})", command, value, word);
        Ok(value)
    }

    pub fn read_vout(&mut self) -> Result<ElectricPotential, PmbusError> {
        let volts = self.read_telemetry(Command::ReadVout)?;
        Ok(ElectricPotential::new::<volt>(volts))
    }

    pub fn read_iout(&mut self) -> Result<ElectricCurrent, PmbusError> {
        let amps = self.read_telemetry(Command::ReadIout)?;
        Ok(ElectricCurrent::new::<ampere>(amps))
    }

    /// Read VOUT, then IOUT.
    pub fn sample(&mut self) -> Result<TelemetrySample, PmbusError> {
        let vout = self.read_vout()?;
        let iout = self.read_iout()?;
        Ok(TelemetrySample::new(vout, iout))
    }

    fn read_word(&mut self, command: Command) -> Result<u16, TransferError> {
        self.send(command, &[command.code()])?;

        let mut data = [0u8; WORD_SIZE];
        let received = self
            .device
            .read(&mut data)
            .map_err(|source| TransferError::Read { command, source })?;
        trace!(bytes = hex::encode(&data[..received]), "PMBus read");

        if received < WORD_SIZE {
            return Err(TransferError::ShortRead {
                command,
                expected: WORD_SIZE,
                actual: received,
            });
        }
        Ok(self.wire.read_order.join(data))
    }

    fn send(&mut self, command: Command, frame: &[u8]) -> Result<(), TransferError> {
        trace!(bytes = hex::encode(frame), "PMBus write");
        let written = self
            .device
            .write(frame)
            .map_err(|source| TransferError::Write { command, source })?;
        if written < frame.len() {
            return Err(TransferError::ShortWrite {
                command,
                expected: frame.len(),
                actual: written,
            });
        }
        Ok(())
    }
}
