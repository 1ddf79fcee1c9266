//! Interface address lookup
//!
//! [`LinuxInterfaces`] asks the kernel for an interface's IPv4 address with
//! the `SIOCGIFADDR` ioctl on a throwaway UDP socket. [`NetworkInfo`] is the
//! loop-facing wrapper that remembers which interface to ask about.

use crate::core::driver::InterfaceQuery;
use crate::error::{Error, Result};
use std::net::{Ipv4Addr, UdpSocket};
use std::os::unix::io::AsRawFd;

/// Interface whose address the MIDDLE button shows
pub const DEFAULT_INTERFACE: &str = "wlan0";

/// `SIOCGIFADDR` request number
const SIOCGIFADDR: u64 = 0x8915;
/// Kernel limit on interface name length, including the NUL
const IFNAMSIZ: usize = 16;
/// `struct ifreq`: 16-byte name followed by a 24-byte union
const IFREQ_SIZE: usize = 40;
/// Offset of `sin_addr` inside the returned `sockaddr_in`
const SIN_ADDR_OFFSET: usize = IFNAMSIZ + 4;

/// Kernel-backed interface lookup
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxInterfaces;

impl InterfaceQuery for LinuxInterfaces {
    fn ipv4_address(&self, interface: &str) -> Result<Ipv4Addr> {
        let name = interface.as_bytes();
        if name.is_empty() || name.len() >= IFNAMSIZ || name.contains(&0) {
            return Err(Error::InterfaceNotFound(interface.to_string()));
        }

        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        let mut ifreq = [0u8; IFREQ_SIZE];
        ifreq[..name.len()].copy_from_slice(name);

        // SAFETY: ifreq is a correctly sized, writable struct ifreq buffer
        // that outlives the call; the socket fd is valid for its duration.
        let ret = unsafe {
            libc::ioctl(
                socket.as_raw_fd(),
                SIOCGIFADDR as _,
                ifreq.as_mut_ptr() as *mut libc::c_void,
            )
        };
        if ret < 0 {
            let err = std::io::Error::last_os_error();
            return Err(match err.raw_os_error() {
                Some(libc::ENODEV) | Some(libc::ENXIO) => {
                    Error::InterfaceNotFound(interface.to_string())
                }
                Some(libc::EADDRNOTAVAIL) => Error::AddressUnavailable(interface.to_string()),
                _ => Error::Io(err),
            });
        }

        let octets = &ifreq[SIN_ADDR_OFFSET..SIN_ADDR_OFFSET + 4];
        Ok(Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]))
    }
}

pub struct NetworkInfo {
    query: Box<dyn InterfaceQuery>,
    interface: String,
}

impl NetworkInfo {
    pub fn new(query: Box<dyn InterfaceQuery>, interface: impl Into<String>) -> Self {
        Self {
            query,
            interface: interface.into(),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// IPv4 address of the configured interface
    pub fn resolve_ipv4(&self) -> Result<Ipv4Addr> {
        self.query.ipv4_address(&self.interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_exists() {
        // lo always exists; it may be unaddressed inside a bare network namespace
        match LinuxInterfaces.ipv4_address("lo") {
            Ok(addr) => assert!(addr.is_loopback()),
            Err(Error::AddressUnavailable(_)) => {}
            Err(e) => panic!("unexpected error for lo: {}", e),
        }
    }

    #[test]
    fn test_missing_interface() {
        let err = LinuxInterfaces.ipv4_address("nosuchif0").unwrap_err();
        assert!(matches!(err, Error::InterfaceNotFound(_)));
    }

    #[test]
    fn test_invalid_names_rejected_early() {
        for name in ["", "a-very-long-interface-name"] {
            let err = LinuxInterfaces.ipv4_address(name).unwrap_err();
            assert!(matches!(err, Error::InterfaceNotFound(_)));
        }
    }

    #[test]
    fn test_network_info_uses_interface() {
        struct Fixed;
        impl InterfaceQuery for Fixed {
            fn ipv4_address(&self, interface: &str) -> Result<Ipv4Addr> {
                match interface {
                    "wlan0" => Ok(Ipv4Addr::new(192, 168, 4, 20)),
                    other => Err(Error::AddressUnavailable(other.to_string())),
                }
            }
        }

        let info = NetworkInfo::new(Box::new(Fixed), DEFAULT_INTERFACE);
        assert_eq!(info.interface(), "wlan0");
        assert_eq!(info.resolve_ipv4().unwrap(), Ipv4Addr::new(192, 168, 4, 20));

        let info = NetworkInfo::new(Box::new(Fixed), "eth0");
        assert!(matches!(
            info.resolve_ipv4(),
            Err(Error::AddressUnavailable(_))
        ));
    }
}
