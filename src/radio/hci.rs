//! Raw HCI socket capture backend.
//!
//! Listens for LE advertising reports on a raw Linux HCI socket, without the
//! BlueZ daemon. Reports are handed to the core as [`RawAdvertisement`]
//! values: address, RSSI and the untouched advertising data. No decoding or
//! vendor filtering happens here; classification is the core's job.
//!
//! Requires CAP_NET_RAW and CAP_NET_ADMIN capabilities or root privileges.

use super::{ADVERTISEMENT_CHANNEL_BUFFER_SIZE, RadioError};
use crate::advertisement::RawAdvertisement;
use crate::mac_address::MacAddress;
use libc::{AF_BLUETOOTH, SOCK_CLOEXEC, SOCK_NONBLOCK, SOCK_RAW, c_int, c_void, sockaddr, socklen_t};
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use tokio::io::unix::AsyncFd;
use tokio::sync::mpsc;

const BTPROTO_HCI: c_int = 1;
const HCI_FILTER: c_int = 2;

const HCI_COMMAND_PKT: u8 = 0x01;
const HCI_EVENT_PKT: u8 = 0x04;
const EVT_LE_META_EVENT: u8 = 0x3E;
const EVT_LE_ADVERTISING_REPORT: u8 = 0x02;

const OGF_LE_CTL: u16 = 0x08;
const OCF_LE_SET_SCAN_PARAMETERS: u16 = 0x000B;
const OCF_LE_SET_SCAN_ENABLE: u16 = 0x000C;

const LE_SCAN_PASSIVE: u8 = 0x00;
const LE_PUBLIC_ADDRESS: u8 = 0x00;
const FILTER_POLICY_ACCEPT_ALL: u8 = 0x00;

// Scan interval and window, in 0.625 ms units.
const SCAN_INTERVAL: u16 = 0x0010;
const SCAN_WINDOW: u16 = 0x0010;

/// Maximum HCI event packet size.
const EVENT_BUF_SIZE: usize = 258;

#[repr(C)]
struct SockaddrHci {
    hci_family: u16,
    hci_dev: u16,
    hci_channel: u16,
}

#[repr(C)]
struct HciFilter {
    type_mask: u32,
    event_mask: [u32; 2],
    opcode: u16,
}

/// A raw HCI socket bound to a local adapter.
struct HciSocket {
    fd: OwnedFd,
}

impl HciSocket {
    /// Open a non-blocking raw HCI socket and bind it to device `dev_id`.
    fn open(dev_id: u16) -> Result<Self, RadioError> {
        // libc directly: nix has no BTPROTO_HCI. Non-blocking so AsyncFd
        // can drive reads.
        let raw = unsafe {
            libc::socket(
                AF_BLUETOOTH,
                SOCK_RAW | SOCK_CLOEXEC | SOCK_NONBLOCK,
                BTPROTO_HCI,
            )
        };
        if raw < 0 {
            return Err(last_os_error("failed to create HCI socket"));
        }
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let addr = SockaddrHci {
            hci_family: AF_BLUETOOTH as u16,
            hci_dev: dev_id,
            hci_channel: 0, // HCI_CHANNEL_RAW
        };
        let ret = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                &addr as *const SockaddrHci as *const sockaddr,
                mem::size_of::<SockaddrHci>() as socklen_t,
            )
        };
        if ret < 0 {
            return Err(last_os_error("failed to bind HCI socket"));
        }

        Ok(HciSocket { fd })
    }

    /// Restrict incoming packets to LE meta events.
    fn filter_le_meta_events(&self) -> Result<(), RadioError> {
        let mut filter = HciFilter {
            type_mask: 0,
            event_mask: [0, 0],
            opcode: 0,
        };
        filter.type_mask |= 1 << u32::from(HCI_EVENT_PKT);
        let bit = EVT_LE_META_EVENT as usize;
        filter.event_mask[bit / 32] |= 1 << (bit % 32);

        let ret = unsafe {
            libc::setsockopt(
                self.fd.as_raw_fd(),
                0, // SOL_HCI
                HCI_FILTER,
                &filter as *const HciFilter as *const c_void,
                mem::size_of::<HciFilter>() as socklen_t,
            )
        };
        if ret < 0 {
            return Err(last_os_error("failed to set HCI filter"));
        }
        Ok(())
    }

    /// Send one HCI command with the given parameter bytes.
    fn send_command(&self, ogf: u16, ocf: u16, params: &[u8]) -> Result<(), RadioError> {
        let opcode = (ogf << 10) | ocf;
        let mut packet = Vec::with_capacity(4 + params.len());
        packet.push(HCI_COMMAND_PKT);
        packet.extend_from_slice(&opcode.to_le_bytes());
        packet.push(params.len() as u8);
        packet.extend_from_slice(params);

        let ret = unsafe {
            libc::write(
                self.fd.as_raw_fd(),
                packet.as_ptr() as *const c_void,
                packet.len(),
            )
        };
        if ret < 0 {
            return Err(last_os_error("failed to send HCI command"));
        }
        Ok(())
    }

    /// Configure passive LE scanning, duplicates not filtered.
    ///
    /// Duplicate filtering stays off on purpose: the core's sessions own the
    /// dedup semantics.
    fn enable_le_scan(&self) -> Result<(), RadioError> {
        let mut params = Vec::with_capacity(7);
        params.push(LE_SCAN_PASSIVE);
        params.extend_from_slice(&SCAN_INTERVAL.to_le_bytes());
        params.extend_from_slice(&SCAN_WINDOW.to_le_bytes());
        params.push(LE_PUBLIC_ADDRESS);
        params.push(FILTER_POLICY_ACCEPT_ALL);
        self.send_command(OGF_LE_CTL, OCF_LE_SET_SCAN_PARAMETERS, &params)?;

        self.send_command(OGF_LE_CTL, OCF_LE_SET_SCAN_ENABLE, &[0x01, 0x00])
    }
}

fn last_os_error(context: &str) -> RadioError {
    RadioError::Bluetooth(format!("{context}: {}", io::Error::last_os_error()))
}

/// Extract the first advertising report from an LE meta event packet.
///
/// Packet layout: packet type, event code, parameter length, sub-event,
/// report count, then per report: event type, address type, address
/// (little-endian), data length, data, RSSI.
fn parse_advertising_report(packet: &[u8]) -> Option<RawAdvertisement> {
    let report = packet.get(4..)?;

    let num_reports = *report.first()?;
    if num_reports == 0 {
        return None;
    }

    let mut address = [0u8; 6];
    address.copy_from_slice(report.get(3..9)?);
    address.reverse(); // HCI transmits addresses little-endian

    let data_len = *report.get(9)? as usize;
    let payload = report.get(10..10 + data_len)?.to_vec();
    let rssi = i16::from(*report.get(10 + data_len)? as i8);

    Some(RawAdvertisement {
        address: MacAddress(address),
        rssi,
        payload,
    })
}

/// Begin capturing LE advertisements on hci0.
///
/// Opens one socket for events and one for commands, enables passive
/// scanning and forwards every advertising report through the returned
/// channel until the receiver is dropped.
pub async fn start_capture() -> Result<mpsc::Receiver<RawAdvertisement>, RadioError> {
    let event_socket = HciSocket::open(0)?;
    event_socket.filter_le_meta_events()?;

    let command_socket = HciSocket::open(0)?;
    command_socket.enable_le_scan()?;

    let async_fd = AsyncFd::new(event_socket.fd)
        .map_err(|e| RadioError::Bluetooth(format!("failed to create async fd: {e}")))?;

    let (tx, rx) = mpsc::channel(ADVERTISEMENT_CHANNEL_BUFFER_SIZE);

    tokio::spawn(async move {
        let _command_socket = command_socket; // keep scanning enabled
        let mut buf = [0u8; EVENT_BUF_SIZE];

        loop {
            let mut guard = match async_fd.readable().await {
                Ok(guard) => guard,
                Err(_) => break,
            };

            // Drain every queued packet before waiting again.
            loop {
                let n = match guard.try_io(|inner| {
                    let ret = unsafe {
                        libc::read(
                            inner.as_raw_fd(),
                            buf.as_mut_ptr() as *mut c_void,
                            buf.len(),
                        )
                    };
                    if ret < 0 {
                        Err(io::Error::last_os_error())
                    } else {
                        Ok(ret as usize)
                    }
                }) {
                    Ok(Ok(n)) if n > 0 => n,
                    Ok(Ok(_)) => break,
                    Ok(Err(_)) => break,
                    Err(_) => break, // WouldBlock
                };

                if n >= 4
                    && buf[0] == HCI_EVENT_PKT
                    && buf[1] == EVT_LE_META_EVENT
                    && buf[3] == EVT_LE_ADVERTISING_REPORT
                    && let Some(adv) = parse_advertising_report(&buf[..n])
                {
                    if tx.send(adv).await.is_err() {
                        // Receiver dropped: stop capturing.
                        return;
                    }
                }
            }
        }
    });

    Ok(rx)
}
