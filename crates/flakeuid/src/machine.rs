use core::net::Ipv4Addr;

use crate::{Error, FlakeId, Result};

/// Supplies the machine id a generator embeds in every identifier.
///
/// Uniqueness across a fleet depends only on every live generator holding a
/// distinct machine id. Handing those out is left to the deployment; this
/// trait is where it plugs in.
pub trait MachineIdProvider {
    /// Returns the machine id for this process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when no id can be derived.
    fn machine_id(&self) -> Result<u64>;
}

impl MachineIdProvider for u64 {
    fn machine_id(&self) -> Result<u64> {
        Ok(*self)
    }
}

/// Derives a machine id from the low 16 bits of a private IPv4 address, the
/// way the canonical Sonyflake does.
///
/// The address is supplied by the deployment; nothing here inspects network
/// interfaces.
///
/// # Example
///
/// ```
/// use core::net::Ipv4Addr;
/// use flakeuid::{MachineIdProvider, PrivateIpv4};
///
/// let provider = PrivateIpv4(Ipv4Addr::new(10, 0, 1, 2));
/// assert_eq!(provider.machine_id().unwrap(), (1 << 8) | 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrivateIpv4(pub Ipv4Addr);

impl MachineIdProvider for PrivateIpv4 {
    fn machine_id(&self) -> Result<u64> {
        if !is_private(self.0) {
            return Err(Error::config(format!(
                "{} is not a private IPv4 address",
                self.0
            )));
        }
        let [_, _, hi, lo] = self.0.octets();
        Ok(u64::from(u16::from_be_bytes([hi, lo])))
    }
}

// RFC 1918 ranges plus the shared address space (100.64.0.0/10).
fn is_private(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    ip.is_private() || (a == 100 && (64..128).contains(&b))
}

/// Checks that `machine_id` fits the machine id field of `ID`.
///
/// # Errors
///
/// Returns [`Error::InvalidMachineId`] when it does not.
pub fn validate_machine_id<ID: FlakeId>(machine_id: u64) -> Result<u64> {
    if machine_id > ID::max_machine_id() {
        return Err(Error::InvalidMachineId {
            machine_id,
            max: ID::max_machine_id(),
        });
    }
    Ok(machine_id)
}
