//! Linux i2c-dev bus handle.
//!
//! Opens a `/dev/i2c-N` node and binds the slave address with the
//! `I2C_SLAVE` ioctl; after that plain `read(2)`/`write(2)` on the node are
//! SMBus receive/send transfers to that address.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::DeviceConfig;
use crate::device::Pmbus;
use crate::error::{PmbusError, TransferError};
use crate::types::PmbusAddress;

mod ioctl {
    nix::ioctl_write_int_bad!(i2c_set_slave, crate::constants::I2C_SLAVE);
}

/// An open i2c-dev node bound to one slave address.
#[derive(Debug)]
pub struct I2cDevice {
    file: File,
    path: PathBuf,
    address: PmbusAddress,
}

impl I2cDevice {
    pub fn open(path: impl AsRef<Path>, address: PmbusAddress) -> Result<Self, TransferError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| TransferError::Open {
                path: path.clone(),
                source,
            })?;
        debug!("Opened I2C bus {:?}", path);

        // SAFETY: the fd belongs to `file`, which outlives the call, and
        // I2C_SLAVE takes its argument by value.
        unsafe { ioctl::i2c_set_slave(file.as_raw_fd(), address.get() as i32) }.map_err(|errno| {
            TransferError::BindAddress {
                address: address.get(),
                source: io::Error::from(errno),
            }
        })?;
        info!("Bound {:?} to PMBus address {}", path, address);

        Ok(Self { file, path, address })
    }

    /// Validate a raw address first, then open. An invalid address never
    /// touches the bus.
    pub fn open_raw(path: impl AsRef<Path>, address: i64) -> Result<Self, PmbusError> {
        let address = PmbusAddress::new(address)?;
        Ok(Self::open(path, address)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn address(&self) -> PmbusAddress {
        self.address
    }
}

impl Read for I2cDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for I2cDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Open the bus named by `config` and start a session with its wire format.
pub fn open_session(config: &DeviceConfig) -> Result<Pmbus<I2cDevice>, PmbusError> {
    let device = I2cDevice::open(&config.bus, config.address)?;
    Ok(Pmbus::new(device, config.wire))
}
